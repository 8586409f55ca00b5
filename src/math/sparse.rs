//! Sparse global matrix assembly
//!
//! Element contributions are accumulated as COO triplets and summed when the
//! builder is finalized into CSR. Rows and columns are free-dof numbers;
//! contributions to fixed dofs never reach the builder.

use nalgebra::{DMatrix, DVector};
use nalgebra_sparse::factorization::CscCholesky;
use nalgebra_sparse::{CooMatrix, CscMatrix, CsrMatrix};

use crate::error::{ShellError, ShellResult};

/// Sparse matrix builder using COO format
#[derive(Debug, Clone, Default)]
pub struct SparseMatrixBuilder {
    size: usize,
    entries: Vec<(usize, usize, f64)>,
}

impl SparseMatrixBuilder {
    /// Start a builder for a `size` x `size` system
    ///
    /// `expected_entries` pre-sizes the triplet buffer, typically
    /// `elements * (6 * nodes_per_element)²`.
    pub fn start(size: usize, expected_entries: usize) -> Self {
        Self {
            size,
            entries: Vec::with_capacity(expected_entries),
        }
    }

    /// Add a value to the matrix (accumulates if already exists)
    #[inline]
    pub fn add(&mut self, row: usize, col: usize, value: f64) {
        if value != 0.0 {
            self.entries.push((row, col, value));
        }
    }

    /// Scatter a symmetric element matrix
    ///
    /// `dofnums[i]` is the global free number of element dof `i`, or `None`
    /// when the dof is fixed; fixed rows and columns are dropped.
    pub fn assemble_symmetric(&mut self, k_elem: &DMatrix<f64>, dofnums: &[Option<usize>]) {
        for (j, dj) in dofnums.iter().enumerate() {
            let Some(dj) = *dj else { continue };
            for (i, di) in dofnums.iter().enumerate() {
                let Some(di) = *di else { continue };
                self.add(di, dj, k_elem[(i, j)]);
            }
        }
    }

    /// Move all triplets of another builder into this one
    pub fn append(&mut self, mut other: SparseMatrixBuilder) {
        self.entries.append(&mut other.entries);
    }

    /// Finalize into CSR, summing duplicate entries
    pub fn make_matrix(self) -> CsrMatrix<f64> {
        let mut coo = CooMatrix::new(self.size, self.size);
        for (row, col, val) in self.entries {
            coo.push(row, col, val);
        }
        CsrMatrix::from(&coo)
    }

    /// Convert to dense matrix (for comparison/debugging)
    pub fn to_dense(&self) -> DMatrix<f64> {
        let mut mat = DMatrix::zeros(self.size, self.size);
        for &(row, col, val) in &self.entries {
            mat[(row, col)] += val;
        }
        mat
    }

    /// Number of stored triplets (before duplicates are summed)
    pub fn nnz(&self) -> usize {
        self.entries.len()
    }

    pub fn size(&self) -> usize {
        self.size
    }
}

/// Solve `K x = b` for a symmetric positive definite sparse matrix
pub fn solve_spd(k: &CsrMatrix<f64>, b: &DVector<f64>) -> ShellResult<DVector<f64>> {
    if k.nrows() != b.len() {
        return Err(ShellError::InvalidInput(format!(
            "right-hand side has {} entries, matrix has {} rows",
            b.len(),
            k.nrows()
        )));
    }
    let csc = CscMatrix::from(k);
    let chol = CscCholesky::factor(&csc)
        .map_err(|e| ShellError::SingularMatrix(format!("Cholesky factorization failed: {e:?}")))?;
    let rhs = DMatrix::from_column_slice(b.len(), 1, b.as_slice());
    let x = chol.solve(&rhs);
    Ok(DVector::from_column_slice(x.as_slice()))
}

/// Dense copy of a CSR matrix
pub fn csr_to_dense(k: &CsrMatrix<f64>) -> DMatrix<f64> {
    let mut dense = DMatrix::zeros(k.nrows(), k.ncols());
    for (row, col, &val) in k.triplet_iter() {
        dense[(row, col)] += val;
    }
    dense
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_sparse_builder_accumulates() {
        let mut builder = SparseMatrixBuilder::start(3, 8);
        builder.add(0, 0, 4.0);
        builder.add(0, 0, 1.0);
        builder.add(1, 2, 2.0);
        builder.add(2, 2, 0.0);

        assert_eq!(builder.nnz(), 3);
        let dense = csr_to_dense(&builder.make_matrix());
        assert_relative_eq!(dense[(0, 0)], 5.0);
        assert_relative_eq!(dense[(1, 2)], 2.0);
    }

    #[test]
    fn test_assemble_symmetric_skips_fixed_dofs() {
        let k = DMatrix::from_row_slice(3, 3, &[2.0, -1.0, 0.5, -1.0, 3.0, 0.25, 0.5, 0.25, 4.0]);
        let mut builder = SparseMatrixBuilder::start(2, 9);
        builder.assemble_symmetric(&k, &[Some(1), None, Some(0)]);
        let dense = builder.to_dense();
        assert_relative_eq!(dense[(1, 1)], 2.0);
        assert_relative_eq!(dense[(0, 0)], 4.0);
        assert_relative_eq!(dense[(0, 1)], 0.5);
        assert_relative_eq!(dense[(1, 0)], 0.5);
    }

    #[test]
    fn test_solve_spd() {
        let mut builder = SparseMatrixBuilder::start(3, 7);
        builder.add(0, 0, 4.0);
        builder.add(0, 1, -1.0);
        builder.add(1, 0, -1.0);
        builder.add(1, 1, 4.0);
        builder.add(1, 2, -1.0);
        builder.add(2, 1, -1.0);
        builder.add(2, 2, 4.0);
        let k = builder.make_matrix();
        let b = DVector::from_vec(vec![1.0, 2.0, 3.0]);

        let x = solve_spd(&k, &b).unwrap();
        let r = csr_to_dense(&k) * &x - &b;
        assert!(r.norm() < 1e-12, "residual {}", r.norm());
    }

    #[test]
    fn test_solve_rejects_indefinite_matrix() {
        let mut builder = SparseMatrixBuilder::start(2, 2);
        builder.add(0, 0, 1.0);
        builder.add(1, 1, -1.0);
        let k = builder.make_matrix();
        let b = DVector::from_vec(vec![1.0, 1.0]);
        assert!(matches!(solve_spd(&k, &b), Err(ShellError::SingularMatrix(_))));
    }
}

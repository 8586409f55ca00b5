//! Nodal fields: geometry and degrees of freedom
//!
//! A field stores `dim` values per node. Each component is either free or
//! fixed (essential boundary condition with a prescribed value). Free
//! components receive contiguous equation numbers, node-major, when
//! [`NodalField::number_dofs`] is called.

use nalgebra::DVector;

use crate::error::{ShellError, ShellResult};
use crate::math::Vec3;

#[derive(Debug, Clone)]
pub struct NodalField {
    dim: usize,
    values: Vec<f64>,
    fixed: Vec<bool>,
    dofnums: Vec<Option<usize>>,
    nfreedofs: usize,
    numbered: bool,
}

impl NodalField {
    /// Zero-valued field with all components free
    pub fn new(nnodes: usize, dim: usize) -> Self {
        Self {
            dim,
            values: vec![0.0; nnodes * dim],
            fixed: vec![false; nnodes * dim],
            dofnums: vec![None; nnodes * dim],
            nfreedofs: 0,
            numbered: false,
        }
    }

    /// Geometry field (dim 3) from nodal coordinates
    pub fn from_coords(coords: &[[f64; 3]]) -> Self {
        let mut field = Self::new(coords.len(), 3);
        field.values = coords.iter().flatten().copied().collect();
        field
    }

    /// Field of the same node count as `other`
    pub fn like(other: &NodalField, dim: usize) -> Self {
        Self::new(other.nnodes(), dim)
    }

    pub fn nnodes(&self) -> usize {
        if self.dim == 0 {
            0
        } else {
            self.values.len() / self.dim
        }
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    #[inline]
    pub fn value(&self, node: usize, component: usize) -> f64 {
        self.values[node * self.dim + component]
    }

    pub fn set_value(&mut self, node: usize, component: usize, value: f64) {
        self.values[node * self.dim + component] = value;
    }

    /// First three components of a node as a vector
    #[inline]
    pub fn vector3(&self, node: usize) -> Vec3 {
        let i = node * self.dim;
        Vec3::new(self.values[i], self.values[i + 1], self.values[i + 2])
    }

    /// Fix a component to a prescribed value; invalidates the numbering
    pub fn set_ebc(&mut self, node: usize, component: usize, value: f64) -> ShellResult<()> {
        if node >= self.nnodes() || component >= self.dim {
            return Err(ShellError::InvalidInput(format!(
                "boundary condition on node {node} component {component} is outside a {}x{} field",
                self.nnodes(),
                self.dim
            )));
        }
        let i = node * self.dim + component;
        self.fixed[i] = true;
        self.values[i] = value;
        self.numbered = false;
        Ok(())
    }

    pub fn is_fixed(&self, node: usize, component: usize) -> bool {
        self.fixed[node * self.dim + component]
    }

    /// Number the free components, node-major, starting at zero
    pub fn number_dofs(&mut self) {
        let mut next = 0;
        for (num, &fixed) in self.dofnums.iter_mut().zip(&self.fixed) {
            *num = if fixed {
                None
            } else {
                next += 1;
                Some(next - 1)
            };
        }
        self.nfreedofs = next;
        self.numbered = true;
    }

    pub fn is_numbered(&self) -> bool {
        self.numbered
    }

    /// Number of free degrees of freedom (valid after numbering)
    pub fn nfreedofs(&self) -> usize {
        self.nfreedofs
    }

    pub fn dof_number(&self, node: usize, component: usize) -> ShellResult<Option<usize>> {
        if !self.numbered {
            return Err(ShellError::DofsNotNumbered);
        }
        Ok(self.dofnums[node * self.dim + component])
    }

    /// Equation numbers of the listed nodes, node-major
    pub fn gather_dofnums(&self, nodes: &[usize], out: &mut Vec<Option<usize>>) -> ShellResult<()> {
        if !self.numbered {
            return Err(ShellError::DofsNotNumbered);
        }
        out.clear();
        for &node in nodes {
            let i = node * self.dim;
            out.extend_from_slice(&self.dofnums[i..i + self.dim]);
        }
        Ok(())
    }

    /// Values of the listed nodes, node-major
    pub fn gather_values(&self, nodes: &[usize], out: &mut Vec<f64>) {
        out.clear();
        for &node in nodes {
            let i = node * self.dim;
            out.extend_from_slice(&self.values[i..i + self.dim]);
        }
    }

    /// Node positions of the listed nodes (geometry fields)
    pub fn gather_vectors(&self, nodes: &[usize], out: &mut Vec<Vec3>) {
        out.clear();
        out.extend(nodes.iter().map(|&n| self.vector3(n)));
    }

    /// Copy a system vector into the free components
    pub fn scatter_sysvec(&mut self, x: &DVector<f64>) -> ShellResult<()> {
        if !self.numbered {
            return Err(ShellError::DofsNotNumbered);
        }
        if x.len() != self.nfreedofs {
            return Err(ShellError::FieldSizeMismatch {
                field: "system vector".to_string(),
                expected: self.nfreedofs,
                found: x.len(),
            });
        }
        for (v, num) in self.values.iter_mut().zip(&self.dofnums) {
            if let Some(n) = num {
                *v = x[*n];
            }
        }
        Ok(())
    }

    /// Fail unless the field has the expected shape
    pub(crate) fn check_shape(&self, name: &str, nnodes: usize, dim: usize) -> ShellResult<()> {
        if self.dim != dim {
            return Err(ShellError::FieldSizeMismatch {
                field: format!("{name} (components per node)"),
                expected: dim,
                found: self.dim,
            });
        }
        if self.nnodes() != nnodes {
            return Err(ShellError::FieldSizeMismatch {
                field: format!("{name} (nodes)"),
                expected: nnodes,
                found: self.nnodes(),
            });
        }
        Ok(())
    }
}

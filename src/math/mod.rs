//! Mathematical utilities for shell element calculations

pub mod constitutive;
pub mod frame;
pub mod operators;
pub mod quadrature;
pub mod sparse;
pub mod transform;

use nalgebra::{DMatrix, Matrix2, Matrix3, Matrix6, Vector3};

pub type Mat = DMatrix<f64>;
pub type Mat2 = Matrix2<f64>;
pub type Mat3 = Matrix3<f64>;
pub type Mat6 = Matrix6<f64>;
pub type Vec3 = Vector3<f64>;

/// Degrees of freedom carried by every shell node
pub const DOFS_PER_NODE: usize = 6;

/// Component indices within a node, in the element (local) frame
/// Translations u1, u2 (in-plane), u3 (normal); rotations θ1, θ2 (bending), θ3 (drilling)
pub mod component {
    pub const U1: usize = 0;
    pub const U2: usize = 1;
    pub const U3: usize = 2;
    pub const THETA1: usize = 3;
    pub const THETA2: usize = 4;
    pub const THETA3: usize = 5;
}

/// Flat index of a nodal degree of freedom in an element matrix
///
/// All element matrices are laid out node-major: `[u1, u2, u3, θ1, θ2, θ3]` per node.
#[inline]
pub const fn dof(node: usize, component: usize) -> usize {
    DOFS_PER_NODE * node + component
}

/// Accumulate `factor * Bᵀ D B` into the lower triangle of `k`
///
/// Only entries with `row >= col` are touched; call [`complete_lt`] once the
/// element matrix is fully accumulated.
pub fn add_btdb_lower<D>(k: &mut Mat, b: &Mat, d: &D, factor: f64)
where
    D: std::ops::Index<(usize, usize), Output = f64>,
{
    let nstr = b.nrows();
    let ncols = b.ncols();
    for j in 0..ncols {
        for i in j..ncols {
            let mut sum = 0.0;
            for r in 0..nstr {
                let bri = b[(r, i)];
                if bri == 0.0 {
                    continue;
                }
                for s in 0..nstr {
                    sum += bri * d[(r, s)] * b[(s, j)];
                }
            }
            k[(i, j)] += factor * sum;
        }
    }
}

/// Mirror the lower triangle of a square matrix into its upper triangle
pub fn complete_lt(k: &mut Mat) {
    let n = k.nrows();
    for j in 0..n {
        for i in (j + 1)..n {
            k[(j, i)] = k[(i, j)];
        }
    }
}

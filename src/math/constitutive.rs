//! Reduction of the 3D tangent moduli to shell constitutive blocks
//!
//! Component ordering of the 6x6 tangent: `[11, 22, 33, 12, 13, 23]`,
//! i.e. three normal components, the in-plane shear, then the two transverse shears.

use super::{Mat2, Mat3, Mat6};
use crate::error::{ShellError, ShellResult};

/// First-order shear deformation correction factor
pub const SHEAR_CORRECTION_FACTOR: f64 = 5.0 / 6.0;

/// Rows/columns of the 6x6 tangent kept in the in-plane block
const IN_PLANE: [usize; 3] = [0, 1, 3];
/// Through-thickness normal component, condensed out
const THICKNESS_NORMAL: usize = 2;

/// Plane-stress consistent in-plane moduli
///
/// Static condensation of the through-thickness normal stress:
/// `D*[i,j] = D[i,j] - D[i,33] D[33,j] / D[33,33]` over the in-plane components.
pub fn plane_stress_moduli(d: &Mat6) -> ShellResult<Mat3> {
    let d33 = d[(THICKNESS_NORMAL, THICKNESS_NORMAL)];
    if !(d33 > 0.0) {
        return Err(ShellError::Material(format!(
            "through-thickness modulus must be positive, got {d33}"
        )));
    }
    let mut dps = Mat3::zeros();
    for (a, &i) in IN_PLANE.iter().enumerate() {
        for (b, &j) in IN_PLANE.iter().enumerate() {
            dps[(a, b)] = d[(i, j)] - d[(i, THICKNESS_NORMAL)] * d[(THICKNESS_NORMAL, j)] / d33;
        }
    }
    Ok(dps)
}

/// Transverse shear moduli with the shear correction factor applied
pub fn transverse_shear_moduli(d: &Mat6) -> Mat2 {
    Mat2::new(
        SHEAR_CORRECTION_FACTOR * d[(4, 4)], 0.0,
        0.0, SHEAR_CORRECTION_FACTOR * d[(5, 5)],
    )
}

/// Shell constitutive blocks reduced from one tangent evaluation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReducedModuli {
    /// In-plane (membrane and bending) moduli
    pub in_plane: Mat3,
    /// Transverse shear moduli
    pub shear: Mat2,
}

impl ReducedModuli {
    pub fn from_tangent(d: &Mat6) -> ShellResult<Self> {
        Ok(Self {
            in_plane: plane_stress_moduli(d)?,
            shear: transverse_shear_moduli(d),
        })
    }
}

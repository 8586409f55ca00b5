//! Material models for shell elements

use serde::{Deserialize, Serialize};

use crate::error::{ShellError, ShellResult};
use crate::math::{Mat6, Vec3};

/// Source of the 3D tangent moduli used by the shell formulation
///
/// Components are ordered `[11, 22, 33, 12, 13, 23]` with engineering shear
/// strains. Implementations are queried concurrently from the element loop.
pub trait MaterialModel: Sync {
    /// 6x6 tangent moduli at a point of an element set
    fn tangent_moduli(&self, thickness: f64, location: &Vec3, label: &str) -> ShellResult<Mat6>;

    /// Mass density
    fn mass_density(&self) -> f64;

    /// Whether the tangent is independent of the location
    fn is_homogeneous(&self) -> bool {
        true
    }
}

/// Linear isotropic elastic material
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IsotropicElastic {
    /// Modulus of elasticity (Young's modulus)
    pub e: f64,
    /// Shear modulus
    pub g: f64,
    /// Poisson's ratio
    pub nu: f64,
    /// Mass density
    pub rho: f64,
}

impl IsotropicElastic {
    /// Create a material from E and nu; G is E / (2 (1 + nu))
    pub fn new(e: f64, nu: f64, rho: f64) -> Self {
        Self {
            e,
            g: e / (2.0 * (1.0 + nu)),
            nu,
            rho,
        }
    }

    /// Structural steel (A36)
    pub fn steel() -> Self {
        Self::new(200e9, 0.3, 7850.0)
    }

    /// Aluminum (6061-T6)
    pub fn aluminum() -> Self {
        Self::new(68.9e9, 0.33, 2700.0)
    }

    fn validate(&self) -> ShellResult<()> {
        if !(self.e > 0.0) {
            return Err(ShellError::Material(format!(
                "Young's modulus must be positive, got {}",
                self.e
            )));
        }
        if !(self.nu > -1.0 && self.nu < 0.5) {
            return Err(ShellError::Material(format!(
                "Poisson's ratio must lie in (-1, 0.5), got {}",
                self.nu
            )));
        }
        Ok(())
    }
}

impl Default for IsotropicElastic {
    fn default() -> Self {
        Self::steel()
    }
}

impl MaterialModel for IsotropicElastic {
    fn tangent_moduli(&self, _thickness: f64, _location: &Vec3, _label: &str) -> ShellResult<Mat6> {
        self.validate()?;
        let lambda = self.e * self.nu / ((1.0 + self.nu) * (1.0 - 2.0 * self.nu));
        let mu = self.g;

        let mut d = Mat6::zeros();
        for i in 0..3 {
            for j in 0..3 {
                d[(i, j)] = lambda;
            }
            d[(i, i)] = lambda + 2.0 * mu;
        }
        for i in 3..6 {
            d[(i, i)] = mu;
        }
        Ok(d)
    }

    fn mass_density(&self) -> f64 {
        self.rho
    }
}

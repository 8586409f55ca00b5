//! Shell FEA - flat-facet shell elements in Rust
//!
//! Stiffness and mass assembly for 3-node triangular (T3) and 4-node
//! quadrilateral (Q4) flat-facet shell elements with six dofs per node:
//! - Local element frames built from the faceted geometry, with rigid links
//!   for warped quadrilaterals
//! - Plane-stress reduction of 3D tangent moduli with shear correction
//! - Locking-free transverse shear: MITC4 on quadrilaterals, discrete shear
//!   gap on triangles
//! - Two transverse shear and drilling stabilizations:
//!   energy sampling, and projected nodal normals
//! - Parallel, deterministic assembly into a CSR matrix over the free dofs
//!
//! ## Example
//! ```rust
//! use shell_fea::prelude::*;
//!
//! let geometry = NodalField::from_coords(&[
//!     [0.0, 0.0, 0.0],
//!     [1.0, 0.0, 0.0],
//!     [1.0, 1.0, 0.0],
//!     [0.0, 1.0, 0.0],
//! ]);
//! let set = ElementSet::new(ShellFamily::Q4, vec![0, 1, 2, 3], 0.01, "plate").unwrap();
//! let material = IsotropicElastic::steel();
//!
//! let mut dofs = NodalField::like(&geometry, 6);
//! for component in 0..6 {
//!     dofs.set_ebc(0, component, 0.0).unwrap();
//! }
//! dofs.number_dofs();
//!
//! let mut assembler = ShellAssembler::new(&material, Stabilization::projected_normal());
//! assembler.associate_geometry(&[&set], &geometry).unwrap();
//!
//! let u = NodalField::like(&geometry, 3);
//! let k = assembler.stiffness(&set, &geometry, &u, &u, &dofs).unwrap();
//! assert_eq!(k.nrows(), 18);
//! ```

pub mod assembly;
pub mod config;
pub mod elements;
pub mod error;
pub mod field;
pub mod formulation;
pub mod math;

// Re-export common types
pub mod prelude {
    pub use crate::assembly::{AssemblyOptions, ElementEvaluator, ShellAssembler};
    pub use crate::config::ShellConfig;
    pub use crate::elements::{ElementSet, IsotropicElastic, MaterialModel, ShellFamily};
    pub use crate::error::{ShellError, ShellResult};
    pub use crate::field::NodalField;
    pub use crate::formulation::Stabilization;
    pub use crate::math::quadrature::IntegrationRule;
    pub use crate::math::sparse::{solve_spd, SparseMatrixBuilder};
}

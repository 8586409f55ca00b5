//! Shell element sets and material models

mod element_set;
mod material;

pub use element_set::ElementSet;
pub use material::{IsotropicElastic, MaterialModel};

use serde::{Deserialize, Serialize};

/// Flat-facet shell element family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShellFamily {
    /// 3-node triangle
    T3,
    /// 4-node quadrilateral
    Q4,
}

impl ShellFamily {
    pub const fn nodes_per_element(self) -> usize {
        match self {
            ShellFamily::T3 => 3,
            ShellFamily::Q4 => 4,
        }
    }
}

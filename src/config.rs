//! Assembler configuration
//!
//! ```json
//! {
//!   "stabilization": { "kind": "projected_normal", "drilling_stiffness_scale": 0.0001 },
//!   "assembly": { "parallel": true, "chunk_size": 128 }
//! }
//! ```
//!
//! Every field is optional; missing fields take their defaults.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::assembly::AssemblyOptions;
use crate::error::ShellResult;
use crate::formulation::Stabilization;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShellConfig {
    pub stabilization: Stabilization,
    pub assembly: AssemblyOptions,
}

impl ShellConfig {
    pub fn from_json_str(json: &str) -> ShellResult<Self> {
        let config: ShellConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: impl AsRef<Path>) -> ShellResult<Self> {
        let json = std::fs::read_to_string(path.as_ref())?;
        log::debug!("Loaded shell configuration from {}", path.as_ref().display());
        Self::from_json_str(&json)
    }

    pub fn to_json_string(&self) -> ShellResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> ShellResult<()> {
        self.stabilization.validate()?;
        self.assembly.validate()
    }
}

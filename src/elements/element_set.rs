//! Homogeneous sets of shell elements

use serde::{Deserialize, Serialize};

use super::ShellFamily;
use crate::error::{ShellError, ShellResult};

/// Elements of one family sharing a thickness and a material label
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ElementSet {
    family: ShellFamily,
    /// Node indices, `nodes_per_element` per element
    conn: Vec<usize>,
    thickness: f64,
    label: String,
}

impl ElementSet {
    /// Create a set from flat connectivity
    pub fn new(
        family: ShellFamily,
        conn: Vec<usize>,
        thickness: f64,
        label: impl Into<String>,
    ) -> ShellResult<Self> {
        let npe = family.nodes_per_element();
        if conn.len() % npe != 0 {
            return Err(ShellError::ConnectivityMismatch(format!(
                "{} node indices is not a multiple of {} for {:?}",
                conn.len(),
                npe,
                family
            )));
        }
        if !(thickness > 0.0) || !thickness.is_finite() {
            return Err(ShellError::InvalidInput(format!(
                "shell thickness must be positive, got {thickness}"
            )));
        }
        Ok(Self {
            family,
            conn,
            thickness,
            label: label.into(),
        })
    }

    /// Create a set from per-element node lists
    pub fn from_elements<const N: usize>(
        family: ShellFamily,
        elements: &[[usize; N]],
        thickness: f64,
        label: impl Into<String>,
    ) -> ShellResult<Self> {
        if N != family.nodes_per_element() {
            return Err(ShellError::ConnectivityMismatch(format!(
                "{:?} elements have {} nodes, got {}",
                family,
                family.nodes_per_element(),
                N
            )));
        }
        Self::new(family, elements.iter().flatten().copied().collect(), thickness, label)
    }

    pub fn family(&self) -> ShellFamily {
        self.family
    }

    pub fn thickness(&self) -> f64 {
        self.thickness
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn nodes_per_element(&self) -> usize {
        self.family.nodes_per_element()
    }

    /// Number of elements
    pub fn len(&self) -> usize {
        self.conn.len() / self.nodes_per_element()
    }

    pub fn is_empty(&self) -> bool {
        self.conn.is_empty()
    }

    /// Node indices of element `i`
    pub fn element(&self, i: usize) -> &[usize] {
        let npe = self.nodes_per_element();
        &self.conn[i * npe..(i + 1) * npe]
    }

    pub fn iter(&self) -> impl Iterator<Item = &[usize]> {
        self.conn.chunks_exact(self.nodes_per_element())
    }

    /// Fail if any element references a node outside `0..nnodes`
    pub fn check_nodes(&self, nnodes: usize) -> ShellResult<()> {
        if let Some(pos) = self.conn.iter().position(|&n| n >= nnodes) {
            return Err(ShellError::ConnectivityMismatch(format!(
                "element {} of set '{}' references node {} but the field has {} nodes",
                pos / self.nodes_per_element(),
                self.label,
                self.conn[pos],
                nnodes
            )));
        }
        Ok(())
    }
}

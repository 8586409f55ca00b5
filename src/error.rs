//! Error types for shell assembly

use thiserror::Error;

/// Main error type for shell element and assembly operations
#[derive(Error, Debug)]
pub enum ShellError {
    #[error("Element {element} has degenerate geometry: {reason}")]
    DegenerateGeometry { element: usize, reason: String },

    #[error("Connectivity mismatch: {0}")]
    ConnectivityMismatch(String),

    #[error("Field '{field}' has {found} entries, expected {expected}")]
    FieldSizeMismatch {
        field: String,
        expected: usize,
        found: usize,
    },

    #[error("Degrees of freedom not numbered - call number_dofs() first")]
    DofsNotNumbered,

    #[error("Material evaluation failed: {0}")]
    Material(String),

    #[error("Geometry not associated - call associate_geometry() before stiffness()")]
    GeometryNotAssociated,

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Singular system matrix: {0}")]
    SingularMatrix(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for shell operations
pub type ShellResult<T> = Result<T, ShellError>;

impl ShellError {
    pub(crate) fn degenerate(element: usize, reason: impl Into<String>) -> Self {
        ShellError::DegenerateGeometry {
            element,
            reason: reason.into(),
        }
    }
}

/*!
Common error types for the six-circle diffractometer components.
*/

use thiserror::Error;

/// Common result type used throughout the shared library
pub type Result<T> = std::result::Result<T, SharedError>;

/// Comprehensive error type for all shared operations
#[derive(Error, Debug)]
pub enum SharedError {
    /// Axis position or limits are not obtainable yet
    #[error("Axis '{0}' is not ready")]
    NotReady(String),

    /// Named axis is absent from the registry
    #[error("Unknown axis: {0}")]
    UnknownAxis(String),

    /// An axis with this name is already registered
    #[error("Axis '{0}' is already registered")]
    DuplicateAxis(String),

    /// Move target rejected by the soft limits of an axis
    #[error("Axis '{axis}': target {target} outside limits ({low}, {high})")]
    LimitViolation {
        axis: String,
        target: f64,
        low: f64,
        high: f64,
    },

    /// Radius must be finite and strictly positive
    #[error("Invalid radius: {0} (must be finite and > 0)")]
    InvalidRadius(f64),

    /// Operating mode not offered by the solver geometry
    #[error("Unknown mode '{mode}' for geometry '{geometry}'")]
    UnknownMode { mode: String, geometry: String },

    /// Malformed EPICS process variable name
    #[error("Invalid PV name: {0}")]
    InvalidPv(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),
}

impl SharedError {
    /// Create a new not-ready error for the named axis
    pub fn not_ready(axis: impl Into<String>) -> Self {
        Self::NotReady(axis.into())
    }

    /// Create a new unknown axis error
    pub fn unknown_axis(axis: impl Into<String>) -> Self {
        Self::UnknownAxis(axis.into())
    }

    /// Create a new configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Whether this error only reflects a transient not-ready condition
    pub fn is_not_ready(&self) -> bool {
        matches!(self, Self::NotReady(_))
    }
}

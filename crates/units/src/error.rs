//! Unit conversion error types.

use thiserror::Error;

use crate::Measure;

/// Result type for unit conversions
pub type Result<T> = std::result::Result<T, UnitError>;

/// Errors that can occur when converting between units.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum UnitError {
    /// Identifier is not in the unit table
    #[error("unknown unit '{0}'")]
    UnknownUnit(String),

    /// Units belong to different measures (e.g. speed and pressure)
    #[error("cannot convert '{from}' ({from_measure}) to '{to}' ({to_measure})")]
    Incompatible {
        /// Source unit identifier
        from: String,
        /// Measure of the source unit
        from_measure: Measure,
        /// Target unit identifier
        to: String,
        /// Measure of the target unit
        to_measure: Measure,
    },
}

impl UnitError {
    /// Create an UnknownUnit error
    pub fn unknown(id: impl Into<String>) -> Self {
        Self::UnknownUnit(id.into())
    }
}

//! Fluid property errors.

use thiserror::Error;

/// Result type for fluid operations.
pub type FluidResult<T> = Result<T, FluidError>;

/// Errors that can occur during fluid property calculations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FluidError {
    /// Invalid blend or backend configuration (bad weights, unknown species).
    #[error("Configuration error: {what}")]
    Configuration { what: &'static str },

    /// Non-physical values (negative density, pressure, etc.).
    #[error("Non-physical value for {what}")]
    NonPhysical { what: &'static str },

    /// Backend cannot resolve the requested state within its validity region.
    #[error("Evaluation failed: {message}")]
    Evaluation { message: String },

    /// Operation not supported (e.g., mixtures on a pure-only backend).
    #[error("Not supported: {what}")]
    NotSupported { what: &'static str },
}

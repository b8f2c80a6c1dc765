//! Error types for discharge and blowdown operations.

use thiserror::Error;
use vf_fluids::FluidError;

/// Result type for release operations.
pub type ReleaseResult<T> = Result<T, ReleaseError>;

/// Errors that can occur during discharge or blowdown calculations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ReleaseError {
    /// Invalid geometry or options (non-positive diameter, bad Cd, ...).
    #[error("Configuration error: {what}")]
    Configuration { what: &'static str },

    /// Physically impossible request (upstream pressure below ambient, ...).
    #[error("Non-physical condition: {what}")]
    NonPhysical { what: &'static str },

    /// Propagated fluid-property failure.
    #[error(transparent)]
    Fluid(#[from] FluidError),

    /// Blowdown integration could not continue; the partial time series up
    /// to `elapsed_s` remains valid.
    #[error("Simulation halted at t={elapsed_s} s: {reason}")]
    Simulation { elapsed_s: f64, reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = ReleaseError::Configuration {
            what: "diameter must be positive",
        };
        assert!(err.to_string().contains("diameter"));

        let err = ReleaseError::Simulation {
            elapsed_s: 1.25,
            reason: "backend rejected state".into(),
        };
        assert!(err.to_string().contains("1.25"));
    }

    #[test]
    fn fluid_error_converts() {
        let fluid_err = FluidError::NonPhysical { what: "pressure" };
        let release_err: ReleaseError = fluid_err.into();
        assert!(matches!(release_err, ReleaseError::Fluid(_)));
    }
}

//! Property backend trait and validation helpers.

use crate::blend::Blend;
use crate::error::{FluidError, FluidResult};
use crate::state::{SpecEnthalpy, SpecEntropy, SpecHeatCapacity};
use vf_core::units::{Density, Pressure, Temperature, Velocity};

/// The two independent thermodynamic properties fixing a state.
///
/// Modeling the pair as an enum makes a non-independent request (e.g. T and
/// T) unrepresentable; backends only need to reject values outside their
/// validity region.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyPair {
    /// Temperature and pressure.
    TP { t: Temperature, p: Pressure },
    /// Pressure and density.
    PRho { p: Pressure, rho: Density },
    /// Pressure and specific entropy.
    PS { p: Pressure, s: SpecEntropy },
    /// Density and specific entropy.
    RhoS { rho: Density, s: SpecEntropy },
    /// Density and specific enthalpy.
    RhoH { rho: Density, h: SpecEnthalpy },
}

/// Full consistent thermodynamic state for one equilibrium point.
///
/// One backend call answers every property at once; callers that need a
/// single property still get the batch, which keeps repeated queries against
/// one state from hitting the backend more than once.
#[derive(Debug, Clone, PartialEq)]
pub struct ThermoProperties {
    /// Temperature [K]
    pub t: Temperature,
    /// Pressure [Pa]
    pub p: Pressure,
    /// Density [kg/m³]
    pub rho: Density,
    /// Specific enthalpy [J/kg]
    pub h: SpecEnthalpy,
    /// Specific entropy [J/(kg·K)]
    pub s: SpecEntropy,
    /// Specific heat capacity at constant pressure [J/(kg·K)]
    pub cp: SpecHeatCapacity,
    /// Heat capacity ratio γ = cp/cv (dimensionless). Backends without a
    /// direct cv query approximate cv = cp − p/(ρT); flow physics relies on
    /// the speed of sound below, not on γ.
    pub gamma: f64,
    /// Speed of sound [m/s]
    pub a: Velocity,
}

/// Trait for equation-of-state property backends.
///
/// Implementations must be thread-safe (Send + Sync) and stateless per call:
/// identical inputs always yield identical outputs, and independent
/// simulations may evaluate concurrently.
pub trait PropertyBackend: Send + Sync {
    /// Get the backend name (for diagnostics).
    fn name(&self) -> &str;

    /// Check if this backend supports the given blend.
    fn supports_blend(&self, blend: &Blend) -> bool;

    /// Resolve a full consistent state from two independent properties.
    ///
    /// Fails with `FluidError::Evaluation` when the requested state lies
    /// outside the backend's validity region, and with
    /// `FluidError::NonPhysical` when an input value is itself impossible
    /// (negative absolute temperature, non-positive density).
    fn evaluate(&self, blend: &Blend, input: PropertyPair) -> FluidResult<ThermoProperties>;
}

/// Validation helpers for fluid properties.
pub(crate) mod validation {
    use super::*;

    pub fn validate_pressure(p: Pressure) -> FluidResult<()> {
        if !p.value.is_finite() || p.value <= 0.0 {
            return Err(FluidError::NonPhysical {
                what: "pressure must be positive and finite",
            });
        }
        Ok(())
    }

    pub fn validate_temperature(t: Temperature) -> FluidResult<()> {
        if !t.value.is_finite() || t.value <= 0.0 {
            return Err(FluidError::NonPhysical {
                what: "temperature must be positive and finite",
            });
        }
        Ok(())
    }

    pub fn validate_density(rho: Density) -> FluidResult<()> {
        if !rho.value.is_finite() || rho.value <= 0.0 {
            return Err(FluidError::NonPhysical {
                what: "density must be positive and finite",
            });
        }
        Ok(())
    }

    pub fn validate_enthalpy(h: f64) -> FluidResult<()> {
        if !h.is_finite() {
            return Err(FluidError::NonPhysical {
                what: "enthalpy must be finite",
            });
        }
        Ok(())
    }

    pub fn validate_entropy(s: f64) -> FluidResult<()> {
        if !s.is_finite() {
            return Err(FluidError::NonPhysical {
                what: "entropy must be finite",
            });
        }
        Ok(())
    }

    pub fn validate_gamma(gamma: f64) -> FluidResult<()> {
        if !gamma.is_finite() || gamma < 1.0 {
            return Err(FluidError::NonPhysical {
                what: "gamma must be >= 1 and finite",
            });
        }
        Ok(())
    }

    pub fn validate_speed_of_sound(a: Velocity) -> FluidResult<()> {
        if !a.value.is_finite() || a.value <= 0.0 {
            return Err(FluidError::NonPhysical {
                what: "speed of sound must be positive and finite",
            });
        }
        Ok(())
    }

    /// Validate a full property set before handing it to callers.
    pub fn validate_properties(props: &ThermoProperties) -> FluidResult<()> {
        validate_pressure(props.p)?;
        validate_temperature(props.t)?;
        validate_density(props.rho)?;
        validate_enthalpy(props.h)?;
        validate_entropy(props.s)?;
        validate_gamma(props.gamma)?;
        validate_speed_of_sound(props.a)?;
        if !props.cp.is_finite() || props.cp <= 0.0 {
            return Err(FluidError::NonPhysical {
                what: "cp must be positive and finite",
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::validation::*;
    use vf_core::units::{k, kgpm3, mps, pa};

    #[test]
    fn validate_positive_pressure() {
        assert!(validate_pressure(pa(101325.0)).is_ok());
        assert!(validate_pressure(pa(-100.0)).is_err());
        assert!(validate_pressure(pa(0.0)).is_err());
        assert!(validate_pressure(pa(f64::NAN)).is_err());
    }

    #[test]
    fn validate_positive_temperature() {
        assert!(validate_temperature(k(300.0)).is_ok());
        assert!(validate_temperature(k(-10.0)).is_err());
        assert!(validate_temperature(k(0.0)).is_err());
    }

    #[test]
    fn validate_density_positive() {
        assert!(validate_density(kgpm3(40.0)).is_ok());
        assert!(validate_density(kgpm3(-1.0)).is_err());
        assert!(validate_density(kgpm3(0.0)).is_err());
    }

    #[test]
    fn validate_gamma_physical() {
        assert!(validate_gamma(1.4).is_ok());
        assert!(validate_gamma(1.0).is_ok());
        assert!(validate_gamma(0.9).is_err());
        assert!(validate_gamma(f64::NAN).is_err());
    }

    #[test]
    fn validate_speed_of_sound_positive() {
        assert!(validate_speed_of_sound(mps(1300.0)).is_ok());
        assert!(validate_speed_of_sound(mps(0.0)).is_err());
    }
}

//! CoolProp-based property backend.

use crate::backend::{PropertyBackend, PropertyPair, ThermoProperties, validation};
use crate::blend::Blend;
use crate::error::{FluidError, FluidResult};
use rfluids::prelude::*;
use rfluids::substance::Pure;
use vf_core::units::{kgpm3, mps, pa};

/// Temperature search bounds [K] for inverse flashes.
///
/// The lower bound sits below hydrogen's triple point region so that deep
/// isentropic expansions from ambient-temperature storage stay resolvable.
const T_MIN: f64 = 15.0;
const T_MAX: f64 = 1500.0;
const MAX_ITER: usize = 90;
const BRACKET_TRIES: usize = 24;

/// CoolProp backend for real-gas properties.
///
/// Supports pure blends only; multi-component blends report `NotSupported`.
/// Thread-safe: rfluids Fluid instances are created per call and never
/// shared.
pub struct CoolPropBackend {}

impl CoolPropBackend {
    /// Create a new CoolProp backend.
    pub fn new() -> Self {
        Self {}
    }

    fn backend_err(context: &str, e: impl std::fmt::Display) -> FluidError {
        FluidError::Evaluation {
            message: format!("rfluids error {}: {}", context, e),
        }
    }

    /// Create a Fluid instance at a given (P, T) state.
    fn fluid_at_pt(&self, pure: Pure, p_pa: f64, t_k: f64) -> FluidResult<Fluid> {
        Fluid::from(pure)
            .in_state(FluidInput::pressure(p_pa), FluidInput::temperature(t_k))
            .map_err(|e| Self::backend_err(&format!("at P={} Pa, T={} K", p_pa, t_k), e))
    }

    /// Create a Fluid instance at a given (ρ, T) state.
    fn fluid_at_rho_t(&self, pure: Pure, rho: f64, t_k: f64) -> FluidResult<Fluid> {
        Fluid::from(pure)
            .in_state(FluidInput::density(rho), FluidInput::temperature(t_k))
            .map_err(|e| Self::backend_err(&format!("at rho={} kg/m³, T={} K", rho, t_k), e))
    }

    /// Bisection over temperature for a monotone property residual.
    ///
    /// `eval` maps a trial temperature to the property value at the fixed
    /// second input (pressure or density). `increasing` states whether the
    /// property grows with T along that line. Trial states that CoolProp
    /// rejects (two-phase, below melting) are treated as lying below the
    /// valid range, so the lower bound moves up past them.
    fn solve_t(
        &self,
        target: f64,
        increasing: bool,
        mut eval: impl FnMut(f64) -> FluidResult<f64>,
    ) -> FluidResult<f64> {
        let mut t_low = T_MIN;
        let mut t_high = T_MAX;

        // Find valid bounds; the low end may start inside an invalid region.
        let mut v_low = None;
        for _ in 0..BRACKET_TRIES {
            match eval(t_low) {
                Ok(v) => {
                    v_low = Some(v);
                    break;
                }
                Err(_) => t_low *= 1.6,
            }
        }
        let v_low = v_low.ok_or(FluidError::Evaluation {
            message: "no valid lower temperature bound for inverse flash".into(),
        })?;

        let mut v_high = None;
        for _ in 0..BRACKET_TRIES {
            match eval(t_high) {
                Ok(v) => {
                    v_high = Some(v);
                    break;
                }
                Err(_) => t_high *= 0.8,
            }
        }
        let v_high = v_high.ok_or(FluidError::Evaluation {
            message: "no valid upper temperature bound for inverse flash".into(),
        })?;

        let (f_low, f_high) = if increasing {
            (v_low - target, v_high - target)
        } else {
            (target - v_low, target - v_high)
        };

        if f_low > 0.0 || f_high < 0.0 {
            return Err(FluidError::Evaluation {
                message: format!(
                    "target property {} outside valid range [{}, {}]",
                    target, v_low, v_high
                ),
            });
        }

        for _ in 0..MAX_ITER {
            let t_mid = 0.5 * (t_low + t_high);
            match eval(t_mid) {
                Ok(v_mid) => {
                    let f_mid = if increasing { v_mid - target } else { target - v_mid };
                    if f_mid <= 0.0 {
                        t_low = t_mid;
                    } else {
                        t_high = t_mid;
                    }
                    if (t_high - t_low) <= 1e-11 * t_mid {
                        break;
                    }
                }
                Err(_) => {
                    // Invalid trial states sit at the cold end of the bracket
                    t_low = t_mid;
                }
            }
        }

        Ok(0.5 * (t_low + t_high))
    }

    /// Read the full property batch from a converged fluid instance.
    fn props_from_fluid(
        &self,
        fluid: &mut Fluid,
        p_pa: f64,
        t_k: f64,
    ) -> FluidResult<ThermoProperties> {
        let rho = fluid
            .density()
            .map_err(|e| Self::backend_err("getting density", e))?;
        let h = fluid
            .enthalpy()
            .map_err(|e| Self::backend_err("getting enthalpy", e))?;
        let s = fluid
            .entropy()
            .map_err(|e| Self::backend_err("getting entropy", e))?;
        let cp = fluid
            .specific_heat()
            .map_err(|e| Self::backend_err("getting specific heat", e))?;
        let a_val = fluid
            .sound_speed()
            .map_err(|e| Self::backend_err("getting sound speed", e))?;

        // rfluids exposes no direct cv query, so cv is approximated through
        // the ideal-gas relation cv = cp - R_specific with R_specific =
        // p/(rho*T). The resulting gamma is diagnostic only; choking and
        // velocity use the backend's true sound speed.
        let r_specific = p_pa / (rho * t_k);
        let cv = cp - r_specific;
        if cv <= 0.0 || !cv.is_finite() {
            return Err(FluidError::Evaluation {
                message: "failed to compute cv for gamma".into(),
            });
        }
        let gamma = cp / cv;

        let props = ThermoProperties {
            t: vf_core::units::k(t_k),
            p: pa(p_pa),
            rho: kgpm3(rho),
            h,
            s,
            cp,
            gamma,
            a: mps(a_val),
        };
        validation::validate_properties(&props)?;
        Ok(props)
    }

    fn props_at_pt(&self, pure: Pure, p_pa: f64, t_k: f64) -> FluidResult<ThermoProperties> {
        let mut fluid = self.fluid_at_pt(pure, p_pa, t_k)?;
        self.props_from_fluid(&mut fluid, p_pa, t_k)
    }

    fn props_at_rho_t(&self, pure: Pure, rho: f64, t_k: f64) -> FluidResult<ThermoProperties> {
        let mut fluid = self.fluid_at_rho_t(pure, rho, t_k)?;
        let p_pa = fluid
            .pressure()
            .map_err(|e| Self::backend_err("getting pressure", e))?;
        self.props_from_fluid(&mut fluid, p_pa, t_k)
    }
}

impl Default for CoolPropBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl PropertyBackend for CoolPropBackend {
    fn name(&self) -> &str {
        "CoolProp"
    }

    fn supports_blend(&self, blend: &Blend) -> bool {
        blend.is_pure().is_some()
    }

    fn evaluate(&self, blend: &Blend, input: PropertyPair) -> FluidResult<ThermoProperties> {
        let species = blend.is_pure().ok_or(FluidError::NotSupported {
            what: "multi-component blends on the CoolProp backend",
        })?;
        let pure = species.rfluids_pure();

        match input {
            PropertyPair::TP { t, p } => {
                validation::validate_temperature(t)?;
                validation::validate_pressure(p)?;
                self.props_at_pt(pure, p.value, t.value)
            }
            PropertyPair::PRho { p, rho } => {
                validation::validate_pressure(p)?;
                validation::validate_density(rho)?;
                // Density falls with temperature along an isobar
                let t_k = self.solve_t(rho.value, false, |t_trial| {
                    self.fluid_at_pt(pure, p.value, t_trial)?
                        .density()
                        .map_err(|e| Self::backend_err("getting density", e))
                })?;
                self.props_at_pt(pure, p.value, t_k)
            }
            PropertyPair::PS { p, s } => {
                validation::validate_pressure(p)?;
                validation::validate_entropy(s)?;
                let t_k = self.solve_t(s, true, |t_trial| {
                    self.fluid_at_pt(pure, p.value, t_trial)?
                        .entropy()
                        .map_err(|e| Self::backend_err("getting entropy", e))
                })?;
                self.props_at_pt(pure, p.value, t_k)
            }
            PropertyPair::RhoS { rho, s } => {
                validation::validate_density(rho)?;
                validation::validate_entropy(s)?;
                let t_k = self.solve_t(s, true, |t_trial| {
                    self.fluid_at_rho_t(pure, rho.value, t_trial)?
                        .entropy()
                        .map_err(|e| Self::backend_err("getting entropy", e))
                })?;
                self.props_at_rho_t(pure, rho.value, t_k)
            }
            PropertyPair::RhoH { rho, h } => {
                validation::validate_density(rho)?;
                validation::validate_enthalpy(h)?;
                let t_k = self.solve_t(h, true, |t_trial| {
                    self.fluid_at_rho_t(pure, rho.value, t_trial)?
                        .enthalpy()
                        .map_err(|e| Self::backend_err("getting enthalpy", e))
                })?;
                self.props_at_rho_t(pure, rho.value, t_k)
            }
        }
    }
}

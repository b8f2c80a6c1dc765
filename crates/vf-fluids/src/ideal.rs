//! Calorically-perfect ideal-gas property backend.
//!
//! Closed-form flashes for every supported property pair, with per-species
//! γ and molar mass from reference data. Accurate enough for quick
//! estimates and deterministic tests; real-gas work goes through the
//! CoolProp backend. Unlike CoolProp, this backend handles multi-component
//! blends via mole-fraction-weighted molar mass and heat capacity.

use crate::backend::{PropertyBackend, PropertyPair, ThermoProperties, validation};
use crate::blend::Blend;
use crate::error::{FluidError, FluidResult};
use vf_core::units::constants::{P_ATM, R_UNIVERSAL};
use vf_core::units::{k, kgpm3, mps, pa};

/// Reference state for enthalpy and entropy zeros.
const T_REF: f64 = 298.15;
const P_REF: f64 = P_ATM;

/// Validity region: well clear of regimes where a perfect-gas model is
/// meaningless.
const T_VALID_MIN: f64 = 1.0;
const T_VALID_MAX: f64 = 5000.0;

/// Ideal-gas backend: pv = RT with frozen per-blend cp.
pub struct IdealGasBackend {}

impl IdealGasBackend {
    pub fn new() -> Self {
        Self {}
    }

    /// Specific gas constant [J/(kg·K)] for a blend.
    fn r_specific(blend: &Blend) -> f64 {
        R_UNIVERSAL / blend.molar_mass()
    }

    /// Frozen specific heat at constant pressure [J/(kg·K)] for a blend.
    ///
    /// Molar heat capacities combine linearly in mole fractions, then
    /// convert to a mass basis through the blend molar mass.
    fn cp_specific(blend: &Blend) -> f64 {
        let cp_molar: f64 = blend
            .iter()
            .map(|(sp, x)| {
                let g = sp.gamma_ideal();
                x * g * R_UNIVERSAL / (g - 1.0)
            })
            .sum();
        cp_molar / blend.molar_mass()
    }

    /// Assemble the full property batch at (T, P).
    fn props_at(blend: &Blend, t_k: f64, p_pa: f64) -> FluidResult<ThermoProperties> {
        if !(T_VALID_MIN..=T_VALID_MAX).contains(&t_k) {
            return Err(FluidError::Evaluation {
                message: format!("temperature {} K outside ideal-gas validity region", t_k),
            });
        }

        let r = Self::r_specific(blend);
        let cp = Self::cp_specific(blend);
        let cv = cp - r;
        let gamma = cp / cv;

        let rho = p_pa / (r * t_k);
        let h = cp * (t_k - T_REF);
        let s = cp * (t_k / T_REF).ln() - r * (p_pa / P_REF).ln();
        let a = (gamma * r * t_k).sqrt();

        let props = ThermoProperties {
            t: k(t_k),
            p: pa(p_pa),
            rho: kgpm3(rho),
            h,
            s,
            cp,
            gamma,
            a: mps(a),
        };
        validation::validate_properties(&props)?;
        Ok(props)
    }
}

impl Default for IdealGasBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl PropertyBackend for IdealGasBackend {
    fn name(&self) -> &str {
        "IdealGas"
    }

    fn supports_blend(&self, _blend: &Blend) -> bool {
        true
    }

    fn evaluate(&self, blend: &Blend, input: PropertyPair) -> FluidResult<ThermoProperties> {
        let r = Self::r_specific(blend);
        let cp = Self::cp_specific(blend);
        let cv = cp - r;

        match input {
            PropertyPair::TP { t, p } => {
                validation::validate_temperature(t)?;
                validation::validate_pressure(p)?;
                Self::props_at(blend, t.value, p.value)
            }
            PropertyPair::PRho { p, rho } => {
                validation::validate_pressure(p)?;
                validation::validate_density(rho)?;
                let t_k = p.value / (r * rho.value);
                Self::props_at(blend, t_k, p.value)
            }
            PropertyPair::PS { p, s } => {
                validation::validate_pressure(p)?;
                validation::validate_entropy(s)?;
                // s = cp ln(T/T_ref) - R ln(P/P_ref)
                let t_k = T_REF * ((s + r * (p.value / P_REF).ln()) / cp).exp();
                Self::props_at(blend, t_k, p.value)
            }
            PropertyPair::RhoS { rho, s } => {
                validation::validate_density(rho)?;
                validation::validate_entropy(s)?;
                // s = cv ln(T/T_ref) - R ln(rho/rho_ref) along the ideal EOS
                let rho_ref = P_REF / (r * T_REF);
                let t_k = T_REF * ((s + r * (rho.value / rho_ref).ln()) / cv).exp();
                let p_pa = rho.value * r * t_k;
                Self::props_at(blend, t_k, p_pa)
            }
            PropertyPair::RhoH { rho, h } => {
                validation::validate_density(rho)?;
                validation::validate_enthalpy(h)?;
                let t_k = T_REF + h / cp;
                if t_k <= 0.0 {
                    return Err(FluidError::Evaluation {
                        message: format!("enthalpy {} J/kg implies non-positive temperature", h),
                    });
                }
                let p_pa = rho.value * r * t_k;
                Self::props_at(blend, t_k, p_pa)
            }
        }
    }
}

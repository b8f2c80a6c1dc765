//! Precomputed isentrope lookup table for adiabatic blowdown.
//!
//! Without heat input the tank contents stay on the initial isentrope, so
//! the entire blowdown trajectory is a one-parameter family in tank
//! density. Tabulating that family once turns every integrator substep
//! into a pair of interpolations instead of a property-backend flash.

use crate::error::{ReleaseError, ReleaseResult};
use crate::orifice::Orifice;
use vf_core::units::{Pressure, kgpm3};
use vf_fluids::{FluidState, PropertyBackend};

/// Pressures within this relative tolerance of ambient count as equalized.
const P_AMBIENT_REL_TOL: f64 = 1e-9;

/// Discharge curve along one isentrope, sampled at log-spaced densities.
///
/// Node arrays run from the ambient-pressure endpoint (lowest density) up
/// to the initial tank density, strictly ascending.
#[derive(Debug, Clone)]
pub struct IsentropeTable {
    rho: Vec<f64>,
    t: Vec<f64>,
    p: Vec<f64>,
    mdot: Vec<f64>,
}

impl IsentropeTable {
    /// Tabulate the blowdown curve from `upstream` down to ambient pressure.
    ///
    /// `nodes` is the sample count; a few hundred nodes keep interpolation
    /// error well below the property-backend accuracy.
    pub fn build(
        backend: &dyn PropertyBackend,
        upstream: &FluidState,
        orifice: &Orifice,
        p_ambient: Pressure,
        nodes: usize,
    ) -> ReleaseResult<Self> {
        if nodes < 2 {
            return Err(ReleaseError::Configuration {
                what: "isentrope table needs at least two nodes",
            });
        }

        let rho_hi = upstream.density().value;
        let rho_lo = upstream
            .expand_to_pressure(backend, p_ambient)?
            .density()
            .value;
        if !(rho_lo > 0.0 && rho_lo < rho_hi) {
            return Err(ReleaseError::NonPhysical {
                what: "upstream state does not expand to ambient pressure",
            });
        }

        let p_amb = p_ambient.value;
        let log_lo = rho_lo.ln();
        let log_step = (rho_hi.ln() - log_lo) / (nodes - 1) as f64;

        let mut rho = Vec::with_capacity(nodes);
        let mut t = Vec::with_capacity(nodes);
        let mut p = Vec::with_capacity(nodes);
        let mut mdot = Vec::with_capacity(nodes);

        for i in 0..nodes {
            let rho_i = if i == nodes - 1 {
                rho_hi
            } else {
                (log_lo + i as f64 * log_step).exp()
            };
            let state = upstream.expand_to_density(backend, kgpm3(rho_i))?;

            let flow = if state.pressure().value <= p_amb * (1.0 + P_AMBIENT_REL_TOL) {
                0.0
            } else {
                orifice
                    .mass_flow_rate(backend, &state, p_ambient)?
                    .mdot
                    .value
            };

            rho.push(rho_i);
            t.push(state.temperature().value);
            p.push(state.pressure().value);
            mdot.push(flow);
        }

        // Pressure must rise with density along an isentrope; anything else
        // means the backend returned an inconsistent node.
        for w in p.windows(2) {
            if !(w[1] > w[0]) {
                return Err(ReleaseError::NonPhysical {
                    what: "isentrope table pressure is not monotone in density",
                });
            }
        }

        Ok(Self { rho, t, p, mdot })
    }

    /// Lowest tabulated density (the ambient-pressure endpoint).
    pub fn rho_min(&self) -> f64 {
        self.rho[0]
    }

    /// Highest tabulated density (the initial tank density).
    pub fn rho_max(&self) -> f64 {
        self.rho[self.rho.len() - 1]
    }

    pub fn mdot_at(&self, rho: f64) -> f64 {
        self.interp(&self.mdot, rho)
    }

    pub fn pressure_at(&self, rho: f64) -> f64 {
        self.interp(&self.p, rho)
    }

    pub fn temperature_at(&self, rho: f64) -> f64 {
        self.interp(&self.t, rho)
    }

    /// Linear interpolation in density, clamped to the table range.
    fn interp(&self, values: &[f64], rho: f64) -> f64 {
        let n = self.rho.len();
        if rho <= self.rho[0] {
            return values[0];
        }
        if rho >= self.rho[n - 1] {
            return values[n - 1];
        }
        // partition_point: first index with node density > rho
        let hi = self.rho.partition_point(|&r| r <= rho);
        let lo = hi - 1;
        let frac = (rho - self.rho[lo]) / (self.rho[hi] - self.rho[lo]);
        values[lo] + frac * (values[hi] - values[lo])
    }
}

//! Orifice discharge model with real-gas choked/unchoked flow selection.

use crate::error::{ReleaseError, ReleaseResult};
use vf_core::units::{Area, Length, MassRate, Pressure, Velocity, kgps, m2, mps};
use vf_fluids::{FluidState, PropertyBackend};

/// Pressures within this relative tolerance are treated as equal (zero flow).
const P_EQUAL_REL_TOL: f64 = 1e-9;

/// Iterations for the sonic-throat density bisection.
const THROAT_MAX_ITER: usize = 100;

/// One discharge evaluation: flow rate plus the throat state behind it.
#[derive(Debug, Clone)]
pub struct DischargeResult {
    /// Mass flow rate through the orifice [kg/s]
    pub mdot: MassRate,
    /// Fluid state at the throat
    pub throat: FluidState,
    /// Exit velocity at the throat [m/s]
    pub velocity: Velocity,
    /// Whether the flow is choked (sonic at the throat)
    pub choked: bool,
}

/// Geometric leak model: a circular orifice with a discharge coefficient.
///
/// Immutable once constructed; stateless across calls.
#[derive(Debug, Clone, PartialEq)]
pub struct Orifice {
    diameter: Length,
    cd: f64,
}

impl Orifice {
    /// Create an orifice with an explicit discharge coefficient.
    ///
    /// Fails with `ReleaseError::Configuration` unless d > 0 and 0 < Cd ≤ 1.
    pub fn new(diameter: Length, cd: f64) -> ReleaseResult<Self> {
        if !diameter.value.is_finite() || diameter.value <= 0.0 {
            return Err(ReleaseError::Configuration {
                what: "orifice diameter must be positive and finite",
            });
        }
        if !cd.is_finite() || cd <= 0.0 || cd > 1.0 {
            return Err(ReleaseError::Configuration {
                what: "discharge coefficient must be in (0, 1]",
            });
        }
        Ok(Self { diameter, cd })
    }

    /// Create an ideal orifice (Cd = 1).
    pub fn ideal(diameter: Length) -> ReleaseResult<Self> {
        Self::new(diameter, 1.0)
    }

    pub fn diameter(&self) -> Length {
        self.diameter
    }

    pub fn cd(&self) -> f64 {
        self.cd
    }

    /// Flow area = πd²/4.
    pub fn area(&self) -> Area {
        m2(std::f64::consts::FRAC_PI_4 * self.diameter.value * self.diameter.value)
    }

    /// Compute the discharge through this orifice from an upstream state
    /// into ambient pressure.
    ///
    /// The expansion from the (stagnant) upstream state to the throat is
    /// isentropic. The sonic throat is located first; if its pressure
    /// exceeds ambient the flow is choked and ambient pressure is
    /// irrelevant, otherwise the throat re-expands to ambient pressure with
    /// the velocity set by the enthalpy drop.
    ///
    /// Fails with `ReleaseError::NonPhysical` when upstream pressure is
    /// below ambient. Equal pressures yield a zero-flow result.
    pub fn mass_flow_rate(
        &self,
        backend: &dyn PropertyBackend,
        upstream: &FluidState,
        p_ambient: Pressure,
    ) -> ReleaseResult<DischargeResult> {
        let p_up = upstream.pressure().value;
        let p_dn = p_ambient.value;

        if !p_dn.is_finite() || p_dn <= 0.0 {
            return Err(ReleaseError::Configuration {
                what: "ambient pressure must be positive and finite",
            });
        }

        let p_tol = P_EQUAL_REL_TOL * p_up.max(p_dn);
        if p_up < p_dn - p_tol {
            return Err(ReleaseError::NonPhysical {
                what: "upstream pressure below ambient: no forward flow",
            });
        }
        if (p_up - p_dn).abs() <= p_tol {
            return Ok(DischargeResult {
                mdot: kgps(0.0),
                throat: upstream.clone(),
                velocity: mps(0.0),
                choked: false,
            });
        }

        let h0 = upstream.enthalpy();

        // Locate the sonic point on the upstream isentrope: the density
        // where the energy-balance velocity matches the local sound speed.
        let sonic = self.solve_sonic_throat(backend, upstream)?;

        if sonic.pressure().value > p_dn {
            // Choked: throat is sonic, ambient pressure has no influence
            let velocity = sonic.speed_of_sound();
            let mdot = self.cd * self.area().value * sonic.density().value * velocity.value;
            return Ok(DischargeResult {
                mdot: kgps(mdot),
                throat: sonic,
                velocity,
                choked: true,
            });
        }

        // Unchoked: the throat sits at ambient pressure on the same isentrope
        let throat = upstream.expand_to_pressure(backend, p_ambient)?;
        let velocity = mps((2.0 * (h0 - throat.enthalpy())).max(0.0).sqrt());
        let mdot = self.cd * self.area().value * throat.density().value * velocity.value;
        Ok(DischargeResult {
            mdot: kgps(mdot),
            throat,
            velocity,
            choked: false,
        })
    }

    /// Bisection on throat density for the sonic condition
    /// √(2(h₀ − h(ρ))) = a(ρ) along the upstream isentrope.
    fn solve_sonic_throat(
        &self,
        backend: &dyn PropertyBackend,
        upstream: &FluidState,
    ) -> ReleaseResult<FluidState> {
        let h0 = upstream.enthalpy();
        let rho0 = upstream.density().value;

        let residual = |state: &FluidState| -> f64 {
            let v = (2.0 * (h0 - state.enthalpy())).max(0.0).sqrt();
            v - state.speed_of_sound().value
        };

        // At the upstream density the velocity is zero, so the residual is
        // negative there; walk the lower bound down until it turns positive.
        let mut rho_hi = rho0;
        let mut rho_lo = 0.5 * rho0;
        let mut lo_state = upstream.expand_to_density(backend, vf_core::units::kgpm3(rho_lo))?;
        let mut tries = 0;
        while residual(&lo_state) < 0.0 {
            tries += 1;
            if tries > 40 {
                return Err(ReleaseError::NonPhysical {
                    what: "sonic throat not bracketed on upstream isentrope",
                });
            }
            rho_hi = rho_lo;
            rho_lo *= 0.7;
            lo_state = upstream.expand_to_density(backend, vf_core::units::kgpm3(rho_lo))?;
        }

        let mut throat = lo_state;
        for _ in 0..THROAT_MAX_ITER {
            let rho_mid = 0.5 * (rho_lo + rho_hi);
            let mid_state = upstream.expand_to_density(backend, vf_core::units::kgpm3(rho_mid))?;
            if residual(&mid_state) > 0.0 {
                rho_lo = rho_mid;
            } else {
                rho_hi = rho_mid;
            }
            throat = mid_state;
            if (rho_hi - rho_lo) <= 1e-13 * rho_mid {
                break;
            }
        }

        Ok(throat)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vf_core::units::{k, m, pa};
    use vf_fluids::{Blend, IdealGasBackend, Species};

    fn h2_state(backend: &IdealGasBackend, p_pa: f64) -> FluidState {
        FluidState::from_tp(backend, Blend::pure(Species::H2), k(298.0), pa(p_pa)).unwrap()
    }

    #[test]
    fn rejects_bad_geometry() {
        assert!(matches!(
            Orifice::new(m(0.0), 1.0),
            Err(ReleaseError::Configuration { .. })
        ));
        assert!(matches!(
            Orifice::new(m(-0.01), 1.0),
            Err(ReleaseError::Configuration { .. })
        ));
        assert!(matches!(
            Orifice::new(m(0.01), 0.0),
            Err(ReleaseError::Configuration { .. })
        ));
        assert!(matches!(
            Orifice::new(m(0.01), 1.5),
            Err(ReleaseError::Configuration { .. })
        ));
    }

    #[test]
    fn area_from_diameter() {
        let orifice = Orifice::ideal(m(0.03)).unwrap();
        let expected = std::f64::consts::PI * 0.03 * 0.03 / 4.0;
        assert!((orifice.area().value - expected).abs() < 1e-12);
    }

    #[test]
    fn zero_flow_at_equal_pressures() {
        let backend = IdealGasBackend::new();
        let upstream = h2_state(&backend, 101_325.0);
        let orifice = Orifice::ideal(m(0.01)).unwrap();

        let result = orifice
            .mass_flow_rate(&backend, &upstream, pa(101_325.0))
            .unwrap();
        assert_eq!(result.mdot.value, 0.0);
        assert!(!result.choked);
    }

    #[test]
    fn backflow_is_an_error() {
        let backend = IdealGasBackend::new();
        let upstream = h2_state(&backend, 101_325.0);
        let orifice = Orifice::ideal(m(0.01)).unwrap();

        let result = orifice.mass_flow_rate(&backend, &upstream, pa(200_000.0));
        assert!(matches!(result, Err(ReleaseError::NonPhysical { .. })));
    }

    #[test]
    fn high_ratio_flow_is_choked() {
        let backend = IdealGasBackend::new();
        let upstream = h2_state(&backend, 10e6);
        let orifice = Orifice::ideal(m(0.003)).unwrap();

        let result = orifice
            .mass_flow_rate(&backend, &upstream, pa(101_325.0))
            .unwrap();
        assert!(result.choked);
        assert!(result.mdot.value > 0.0);
        // Sonic throat: velocity equals the local sound speed
        let a_throat = result.throat.speed_of_sound().value;
        assert!((result.velocity.value - a_throat).abs() / a_throat < 1e-9);
        // Ideal gas: throat pressure ratio is (2/(γ+1))^(γ/(γ-1)) ≈ 0.527 for γ=1.405
        let ratio = result.throat.pressure().value / 10e6;
        assert!((ratio - 0.527).abs() < 0.005, "throat ratio {}", ratio);
    }

    #[test]
    fn low_ratio_flow_is_unchoked() {
        let backend = IdealGasBackend::new();
        let upstream = h2_state(&backend, 120_000.0);
        let orifice = Orifice::ideal(m(0.003)).unwrap();

        let result = orifice
            .mass_flow_rate(&backend, &upstream, pa(101_325.0))
            .unwrap();
        assert!(!result.choked);
        assert!(result.mdot.value > 0.0);
        // Unchoked throat sits at ambient pressure
        let p_err = (result.throat.pressure().value - 101_325.0).abs();
        assert!(p_err < 1.0, "throat pressure error {} Pa", p_err);
        // Subsonic at the throat
        assert!(result.velocity.value < result.throat.speed_of_sound().value);
    }

    #[test]
    fn continuous_across_choking_boundary() {
        let backend = IdealGasBackend::new();
        let orifice = Orifice::ideal(m(0.003)).unwrap();
        let upstream = h2_state(&backend, 1e6);

        // Find the boundary: ambient equal to the sonic throat pressure
        let deeply_choked = orifice
            .mass_flow_rate(&backend, &upstream, pa(1e4))
            .unwrap();
        let p_star = deeply_choked.throat.pressure().value;

        let just_choked = orifice
            .mass_flow_rate(&backend, &upstream, pa(p_star * (1.0 - 1e-6)))
            .unwrap();
        let just_unchoked = orifice
            .mass_flow_rate(&backend, &upstream, pa(p_star * (1.0 + 1e-6)))
            .unwrap();

        assert!(just_choked.choked);
        assert!(!just_unchoked.choked);
        let rel_diff = (just_choked.mdot.value - just_unchoked.mdot.value).abs()
            / just_choked.mdot.value;
        assert!(rel_diff < 1e-8, "boundary discontinuity: {}", rel_diff);
    }

    #[test]
    fn monotone_in_upstream_pressure() {
        let backend = IdealGasBackend::new();
        let orifice = Orifice::ideal(m(0.003)).unwrap();
        let p_amb = pa(101_325.0);

        let mut last = 0.0;
        for p_mpa in [0.15, 0.3, 0.6, 1.0, 3.0, 10.0, 30.0, 90.0] {
            let upstream = h2_state(&backend, p_mpa * 1e6);
            let mdot = orifice
                .mass_flow_rate(&backend, &upstream, p_amb)
                .unwrap()
                .mdot
                .value;
            assert!(
                mdot > last,
                "mdot not increasing: {} kg/s at {} MPa",
                mdot,
                p_mpa
            );
            last = mdot;
        }
    }
}

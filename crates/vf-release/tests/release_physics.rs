//! End-to-end physics checks for discharge and blowdown.
//!
//! Runs against the ideal-gas backend so results are deterministic and the
//! suite needs no native property library; the same code paths are
//! exercised against CoolProp in `vf-fluids`' smoke suite.

use vf_core::units::{constants, k, m, m3, pa, s, w};
use vf_fluids::{Blend, FluidState, IdealGasBackend, PropertyBackend, Species};
use vf_release::{BlowdownOptions, BlowdownTermination, Orifice, ReleaseError, Tank};

fn h2_state(backend: &dyn PropertyBackend, t_k: f64, p_pa: f64) -> FluidState {
    init_logs();
    FluidState::from_tp(backend, Blend::pure(Species::H2), k(t_k), pa(p_pa)).unwrap()
}

/// Route tracing events through the test harness's captured output.
fn init_logs() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

/// Choked ideal-gas discharge has a closed form; the isentrope bisection
/// must land on it.
#[test]
fn choked_discharge_matches_analytic_ideal_gas() {
    let backend = IdealGasBackend::new();
    let upstream = h2_state(&backend, 298.0, 90e6);
    let orifice = Orifice::ideal(m(0.03)).unwrap();

    let result = orifice
        .mass_flow_rate(&backend, &upstream, pa(constants::P_ATM))
        .unwrap();
    assert!(result.choked);

    let gamma = Species::H2.gamma_ideal();
    let r_s = constants::R_UNIVERSAL / Species::H2.molar_mass();
    let area = std::f64::consts::FRAC_PI_4 * 0.03 * 0.03;
    let analytic = area
        * 90e6
        * (gamma / (r_s * 298.0)).sqrt()
        * (2.0 / (gamma + 1.0)).powf((gamma + 1.0) / (2.0 * (gamma - 1.0)));

    let rel_err = (result.mdot.value - analytic).abs() / analytic;
    assert!(rel_err < 1e-6, "choked flow off analytic by {rel_err}");
}

/// The table-driven adiabatic path and the mass/entropy ODE with vanishing
/// heat input are two discretizations of the same physics; their sampled
/// trajectories must agree closely.
#[test]
fn isentrope_table_agrees_with_ode_path() {
    let backend = IdealGasBackend::new();
    let fluid = h2_state(&backend, 298.0, 20e6);
    let tank = Tank::new(fluid, m3(0.1)).unwrap();
    let orifice = Orifice::ideal(m(0.001)).unwrap();

    let fast = tank
        .blowdown(
            &backend,
            &orifice,
            &BlowdownOptions {
                t_max: s(100.0),
                ..Default::default()
            },
        )
        .unwrap();
    let ode = tank
        .blowdown(
            &backend,
            &orifice,
            &BlowdownOptions {
                t_max: s(100.0),
                heat_flux: Some(w(1e-10)),
                ..Default::default()
            },
        )
        .unwrap();

    assert!(fast.is_complete());
    assert!(ode.is_complete());
    assert_eq!(fast.records.len(), ode.records.len());

    for (a, b) in fast.records.iter().zip(ode.records.iter()) {
        assert_eq!(a.t.value, b.t.value);
        let dm = (a.mdot.value - b.mdot.value).abs();
        let dp = (a.fluid.pressure().value - b.fluid.pressure().value).abs();
        let dt = (a.fluid.temperature().value - b.fluid.temperature().value).abs();
        assert!(dm < 1e-4, "mdot mismatch {dm} kg/s at t={}", a.t.value);
        assert!(dp < 1000.0, "pressure mismatch {dp} Pa at t={}", a.t.value);
        assert!(dt < 0.1, "temperature mismatch {dt} K at t={}", a.t.value);
    }
}

/// Mass leaving through the orifice must equal the drop in tank inventory.
#[test]
fn blowdown_conserves_mass() {
    let backend = IdealGasBackend::new();
    let fluid = h2_state(&backend, 298.0, 20e6);
    let tank = Tank::new(fluid, m3(0.02)).unwrap();
    let orifice = Orifice::ideal(m(0.002)).unwrap();

    let history = tank
        .blowdown(
            &backend,
            &orifice,
            &BlowdownOptions {
                samples: 120,
                ..Default::default()
            },
        )
        .unwrap();
    assert!(history.is_complete());

    // Trapezoid integral of the sampled flow rate
    let mut integral = 0.0;
    for pair in history.records.windows(2) {
        let dt = pair[1].t.value - pair[0].t.value;
        integral += 0.5 * (pair[0].mdot.value + pair[1].mdot.value) * dt;
    }

    let released = history.released_mass().value;
    assert!(released > 0.0);
    let rel_err = (integral - released).abs() / released;
    assert!(rel_err < 0.02, "mass balance error {rel_err}");
}

/// Tank temperature falls during an adiabatic release.
#[test]
fn adiabatic_blowdown_cools_the_tank() {
    let backend = IdealGasBackend::new();
    let fluid = h2_state(&backend, 298.0, 20e6);
    let tank = Tank::new(fluid, m3(0.02)).unwrap();
    let orifice = Orifice::ideal(m(0.002)).unwrap();

    let history = tank
        .blowdown(&backend, &orifice, &BlowdownOptions::default())
        .unwrap();
    let t_final = history.records.last().unwrap().fluid.temperature().value;
    assert!(t_final < 250.0, "expected strong cooling, got {t_final} K");

    for pair in history.records.windows(2) {
        assert!(pair[1].fluid.temperature().value <= pair[0].fluid.temperature().value);
    }
}

/// Heat input raises the tank entropy, so the heated run stays warmer and
/// at higher pressure than the adiabatic one.
#[test]
fn heat_input_slows_depressurization() {
    let backend = IdealGasBackend::new();
    let fluid = h2_state(&backend, 298.0, 5e6);
    let tank = Tank::new(fluid, m3(0.01)).unwrap();
    let orifice = Orifice::ideal(m(0.001)).unwrap();

    let adiabatic = tank
        .blowdown(&backend, &orifice, &BlowdownOptions::default())
        .unwrap();
    let heated = tank
        .blowdown(
            &backend,
            &orifice,
            &BlowdownOptions {
                heat_flux: Some(w(2000.0)),
                ..Default::default()
            },
        )
        .unwrap();

    let last_common = adiabatic.records.len().min(heated.records.len()) - 1;
    let t_adiabatic = adiabatic.records[last_common].fluid.temperature().value;
    let t_heated = heated.records[last_common].fluid.temperature().value;
    assert!(
        t_heated > t_adiabatic,
        "heated run not warmer: {t_heated} vs {t_adiabatic} K"
    );
}

/// A small tank with a large orifice must equalize well before the horizon.
#[test]
fn small_tank_reaches_ambient() {
    let backend = IdealGasBackend::new();
    let fluid = h2_state(&backend, 298.0, 90e6);
    let tank = Tank::new(fluid, m3(0.005)).unwrap();
    let orifice = Orifice::ideal(m(0.03)).unwrap();

    let history = tank
        .blowdown(&backend, &orifice, &BlowdownOptions::default())
        .unwrap();
    assert!(matches!(
        history.termination,
        BlowdownTermination::AmbientPressure | BlowdownTermination::Depleted
    ));
    let p_final = history.records.last().unwrap().fluid.pressure().value;
    assert!(p_final < 1.1 * constants::P_ATM);
    for pair in history.records.windows(2) {
        assert!(pair[1].fluid.pressure().value <= pair[0].fluid.pressure().value);
    }
}

/// Large tank, small hole: the horizon expires with flow still going.
#[test]
fn slow_release_hits_time_horizon() {
    let backend = IdealGasBackend::new();
    let fluid = h2_state(&backend, 298.0, 20e6);
    let tank = Tank::new(fluid, m3(1.0)).unwrap();
    let orifice = Orifice::ideal(m(0.0005)).unwrap();

    let history = tank
        .blowdown(
            &backend,
            &orifice,
            &BlowdownOptions {
                t_max: s(1.0),
                ..Default::default()
            },
        )
        .unwrap();
    assert_eq!(history.termination, BlowdownTermination::TimeHorizon);
    assert!(history.records.last().unwrap().mdot.value > 0.0);
}

#[test]
fn invalid_setups_are_rejected() {
    let backend = IdealGasBackend::new();
    let fluid = h2_state(&backend, 298.0, 50_000.0);
    let orifice = Orifice::ideal(m(0.001)).unwrap();

    // Upstream below ambient
    let result = orifice.mass_flow_rate(&backend, &fluid, pa(constants::P_ATM));
    assert!(matches!(result, Err(ReleaseError::NonPhysical { .. })));

    // Degenerate geometry
    assert!(Orifice::new(m(0.0), 1.0).is_err());
    assert!(Orifice::new(m(0.01), 1.2).is_err());

    // Blowdown of an infinite reservoir
    let reservoir = Tank::reservoir(h2_state(&backend, 298.0, 20e6));
    let result = reservoir.blowdown(&backend, &orifice, &BlowdownOptions::default());
    assert!(matches!(result, Err(ReleaseError::Configuration { .. })));
}

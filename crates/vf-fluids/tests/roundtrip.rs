//! Round-trip consistency of the property backend contract.
//!
//! Uses the ideal-gas backend so the checks are deterministic and do not
//! need the native CoolProp library; the same contract is exercised against
//! CoolProp in the smoke suite.

use proptest::prelude::*;
use vf_core::units::{k, pa};
use vf_fluids::{Blend, IdealGasBackend, PropertyBackend, PropertyPair, Species};

proptest! {
    #[test]
    fn tp_ps_round_trip_recovers_temperature(
        t_k in 200.0_f64..600.0_f64,
        p_mpa in 0.1_f64..100.0_f64,
    ) {
        let backend = IdealGasBackend::new();
        let blend = Blend::pure(Species::H2);
        let p = pa(p_mpa * 1e6);

        let base = backend
            .evaluate(&blend, PropertyPair::TP { t: k(t_k), p })
            .unwrap();
        let recovered = backend
            .evaluate(&blend, PropertyPair::PS { p, s: base.s })
            .unwrap();

        let rel_err = (recovered.t.value - t_k).abs() / t_k;
        prop_assert!(rel_err < 1e-6, "round-trip error {}", rel_err);
    }

    #[test]
    fn density_flash_is_consistent(
        t_k in 200.0_f64..600.0_f64,
        p_mpa in 0.1_f64..100.0_f64,
    ) {
        let backend = IdealGasBackend::new();
        let blend = Blend::pure(Species::CH4);
        let p = pa(p_mpa * 1e6);

        let base = backend
            .evaluate(&blend, PropertyPair::TP { t: k(t_k), p })
            .unwrap();
        let recovered = backend
            .evaluate(&blend, PropertyPair::PRho { p, rho: base.rho })
            .unwrap();

        let rel_err = (recovered.t.value - t_k).abs() / t_k;
        prop_assert!(rel_err < 1e-9);
    }
}

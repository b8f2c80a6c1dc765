//! Ancillary radiative property helpers.
//!
//! Downstream flame-radiation models need the Planck-mean absorption
//! coefficient of the combustion-product gas. It is a pure function of one
//! `FluidState`; nothing here integrates or iterates.

use crate::species::Species;
use crate::state::FluidState;
use vf_core::units::constants::P_ATM;

/// Planck-mean absorption coefficients [1/(m·atm)] near flame temperatures,
/// Hottel-style curve-fit values for the two radiatively active products.
const K_H2O: f64 = 0.23;
const K_CO2: f64 = 0.29;

/// Planck-mean absorption coefficient [1/m] of a gas state.
///
/// Only H₂O and CO₂ contribute; transparent species (H₂, N₂, O₂, ...)
/// return zero. The coefficient scales with the partial pressure of each
/// active species in atmospheres.
pub fn planck_mean_absorption(state: &FluidState) -> f64 {
    let p_atm = state.pressure().value / P_ATM;
    let x_h2o = state.blend().mole_fraction(Species::H2O);
    let x_co2 = state.blend().mole_fraction(Species::CO2);
    K_H2O * x_h2o * p_atm + K_CO2 * x_co2 * p_atm
}

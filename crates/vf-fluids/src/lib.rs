//! vf-fluids: real-gas fluid properties for ventflow.
//!
//! Provides:
//! - Chemical species definitions (H2, CH4, N2, etc.)
//! - Blend handling (pure fluids and weighted mixtures)
//! - The `PropertyBackend` trait: a full consistent state from any two
//!   independent thermodynamic properties
//! - CoolProp backend (via `rfluids`) for real fluid properties
//! - Calorically-perfect ideal-gas backend for deterministic testing
//! - Immutable `FluidState` snapshots with isentropic-flow helpers
//!
//! # Architecture
//!
//! The `PropertyBackend` trait isolates the rest of ventflow from backend
//! dependencies. CoolProp is the primary backend; the ideal-gas backend is
//! a closed-form alternative used where real-fluid accuracy is not needed
//! (tests, quick estimates).
//!
//! # Example
//!
//! ```no_run
//! use vf_fluids::{Blend, CoolPropBackend, FluidState, Species};
//! use vf_core::units::{k, pa};
//!
//! let backend = CoolPropBackend::new();
//! let blend = Blend::pure(Species::H2);
//! let state = FluidState::from_tp(&backend, blend, k(298.0), pa(90e6)).unwrap();
//! println!("Density: {} kg/m³", state.density().value);
//! ```

pub mod absorption;
pub mod backend;
pub mod blend;
pub mod coolprop;
pub mod error;
pub mod ideal;
pub mod species;
pub mod state;

// Re-exports for ergonomics
pub use absorption::planck_mean_absorption;
pub use backend::{PropertyBackend, PropertyPair, ThermoProperties};
pub use blend::Blend;
pub use coolprop::CoolPropBackend;
pub use error::{FluidError, FluidResult};
pub use ideal::IdealGasBackend;
pub use species::Species;
pub use state::{FluidState, SpecEnthalpy, SpecEntropy, SpecHeatCapacity};

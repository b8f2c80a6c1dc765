//! Pressurized-gas release modeling: orifice discharge and tank blowdown.
//!
//! The crate answers two questions about a gas inventory behind a leak:
//! how fast it escapes right now (steady discharge through an [`Orifice`]),
//! and how the escape evolves as the vessel empties ([`Tank::blowdown`]).
//! All thermodynamics go through the `vf-fluids` property-backend
//! abstraction, so real-gas behavior at hundred-MPa storage conditions is
//! handled by the backend, not by ideal-gas shortcuts baked in here.
//!
//! ```no_run
//! use vf_core::units::{k, m, m3, pa};
//! use vf_fluids::{Blend, CoolPropBackend, FluidState, Species};
//! use vf_release::{BlowdownOptions, Orifice, Tank};
//!
//! # fn main() -> vf_release::ReleaseResult<()> {
//! let backend = CoolPropBackend::new();
//! let fluid = FluidState::from_tp(&backend, Blend::pure(Species::H2), k(298.0), pa(90e6))?;
//! let tank = Tank::new(fluid, m3(0.1))?;
//! let orifice = Orifice::new(m(0.003), 0.85)?;
//!
//! let history = tank.blowdown(&backend, &orifice, &BlowdownOptions::default())?;
//! for record in &history.records {
//!     println!("{:>8.3} s  {:.4} kg/s", record.t.value, record.mdot.value);
//! }
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod integrator;
pub mod orifice;
pub mod table;
pub mod tank;
pub mod timegrid;

pub use error::{ReleaseError, ReleaseResult};
pub use orifice::{DischargeResult, Orifice};
pub use table::IsentropeTable;
pub use tank::{
    BlowdownHistory, BlowdownOptions, BlowdownRecord, BlowdownTermination, Tank,
};

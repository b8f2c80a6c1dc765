//! Immutable thermodynamic state snapshots.

use crate::backend::{PropertyBackend, PropertyPair, ThermoProperties};
use crate::blend::Blend;
use crate::error::FluidResult;
use vf_core::units::{Density, Pressure, Temperature, Velocity};

/// Specific enthalpy [J/kg].
///
/// Not part of uom's standard set, so we use f64 with clear documentation.
pub type SpecEnthalpy = f64;

/// Specific entropy [J/(kg·K)].
///
/// Not part of uom's standard set, so we use f64 with clear documentation.
pub type SpecEntropy = f64;

/// Specific heat capacity [J/(kg·K)].
pub type SpecHeatCapacity = f64;

/// Immutable snapshot of one equilibrium fluid state.
///
/// Constructed only through a `PropertyBackend`, so T, P, ρ, h, s and the
/// speed of sound are always mutually consistent for the blend. State
/// changes produce a new `FluidState`; nothing is mutated in place.
#[derive(Debug, Clone, PartialEq)]
pub struct FluidState {
    blend: Blend,
    props: ThermoProperties,
}

impl FluidState {
    /// Create a state from temperature and pressure.
    pub fn from_tp(
        backend: &dyn PropertyBackend,
        blend: Blend,
        t: Temperature,
        p: Pressure,
    ) -> FluidResult<Self> {
        let props = backend.evaluate(&blend, PropertyPair::TP { t, p })?;
        Ok(Self { blend, props })
    }

    /// Create a state from pressure and density.
    pub fn from_prho(
        backend: &dyn PropertyBackend,
        blend: Blend,
        p: Pressure,
        rho: Density,
    ) -> FluidResult<Self> {
        let props = backend.evaluate(&blend, PropertyPair::PRho { p, rho })?;
        Ok(Self { blend, props })
    }

    /// Create a state from pressure and specific entropy.
    pub fn from_ps(
        backend: &dyn PropertyBackend,
        blend: Blend,
        p: Pressure,
        s: SpecEntropy,
    ) -> FluidResult<Self> {
        let props = backend.evaluate(&blend, PropertyPair::PS { p, s })?;
        Ok(Self { blend, props })
    }

    /// Create a state from density and specific entropy.
    ///
    /// This is the natural flash for conservation-law integrators whose
    /// state variables are mass and entropy.
    pub fn from_rho_s(
        backend: &dyn PropertyBackend,
        blend: Blend,
        rho: Density,
        s: SpecEntropy,
    ) -> FluidResult<Self> {
        let props = backend.evaluate(&blend, PropertyPair::RhoS { rho, s })?;
        Ok(Self { blend, props })
    }

    /// The state reached by isentropic expansion (or compression) from this
    /// state to the given density.
    ///
    /// Used to locate orifice throat conditions, where the expansion through
    /// the contraction is modeled as reversible and adiabatic.
    pub fn expand_to_density(
        &self,
        backend: &dyn PropertyBackend,
        rho: Density,
    ) -> FluidResult<Self> {
        let props = backend.evaluate(
            &self.blend,
            PropertyPair::RhoS {
                rho,
                s: self.props.s,
            },
        )?;
        Ok(Self {
            blend: self.blend.clone(),
            props,
        })
    }

    /// The state reached by isentropic expansion from this state to the
    /// given pressure.
    pub fn expand_to_pressure(
        &self,
        backend: &dyn PropertyBackend,
        p: Pressure,
    ) -> FluidResult<Self> {
        let props = backend.evaluate(
            &self.blend,
            PropertyPair::PS {
                p,
                s: self.props.s,
            },
        )?;
        Ok(Self {
            blend: self.blend.clone(),
            props,
        })
    }

    pub fn blend(&self) -> &Blend {
        &self.blend
    }

    pub fn temperature(&self) -> Temperature {
        self.props.t
    }

    pub fn pressure(&self) -> Pressure {
        self.props.p
    }

    pub fn density(&self) -> Density {
        self.props.rho
    }

    pub fn enthalpy(&self) -> SpecEnthalpy {
        self.props.h
    }

    pub fn entropy(&self) -> SpecEntropy {
        self.props.s
    }

    pub fn cp(&self) -> SpecHeatCapacity {
        self.props.cp
    }

    pub fn gamma(&self) -> f64 {
        self.props.gamma
    }

    pub fn speed_of_sound(&self) -> Velocity {
        self.props.a
    }

    /// All properties as one batch (for callers that forward them wholesale).
    pub fn properties(&self) -> &ThermoProperties {
        &self.props
    }
}

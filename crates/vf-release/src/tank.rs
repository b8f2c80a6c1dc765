//! Tank blowdown: time-resolved depressurization through an orifice.

use tracing::{debug, trace};

use crate::error::{ReleaseError, ReleaseResult};
use crate::integrator::{CashKarp45, rk4_step};
use crate::orifice::{DischargeResult, Orifice};
use crate::table::IsentropeTable;
use crate::timegrid::log_time_grid;
use vf_core::units::{Mass, MassRate, Power, Pressure, Time, Volume, constants, kg, kgpm3, kgps, pa, s};
use vf_fluids::{FluidState, PropertyBackend};

/// Tank pressure within this relative tolerance of ambient ends the run.
const P_AMBIENT_REL_TOL: f64 = 1e-9;

/// Remaining-mass fraction below which the tank counts as empty.
const MASS_FLOOR_FRAC: f64 = 1e-6;

/// First non-zero sample time on the logarithmic output grid.
const T_FIRST: f64 = 1e-3;

/// RK4 substeps per output interval on the table-driven path.
const TABLE_SUBSTEPS: usize = 32;

/// A rigid vessel holding a fluid inventory behind an orifice.
///
/// A zero-volume tank models an infinite reservoir: its state never
/// changes and only steady discharge applies.
#[derive(Debug, Clone)]
pub struct Tank {
    fluid: FluidState,
    volume: Volume,
    mass: Mass,
}

impl Tank {
    /// Create a tank from its fluid state and internal volume.
    ///
    /// Volume zero is allowed and marks a steady (infinite) source.
    pub fn new(fluid: FluidState, volume: Volume) -> ReleaseResult<Self> {
        if !volume.value.is_finite() || volume.value < 0.0 {
            return Err(ReleaseError::Configuration {
                what: "tank volume must be non-negative and finite",
            });
        }
        let mass = kg(fluid.density().value * volume.value);
        Ok(Self {
            fluid,
            volume,
            mass,
        })
    }

    /// Create a tank by flashing (T, P) for a blend through the backend.
    pub fn from_tp(
        backend: &dyn PropertyBackend,
        blend: vf_fluids::Blend,
        t: vf_core::units::Temperature,
        p: Pressure,
        volume: Volume,
    ) -> ReleaseResult<Self> {
        let fluid = FluidState::from_tp(backend, blend, t, p)?;
        Self::new(fluid, volume)
    }

    /// Create a tank holding a target mass; volume follows from m/ρ.
    pub fn from_mass(fluid: FluidState, mass: Mass) -> ReleaseResult<Self> {
        if !mass.value.is_finite() || mass.value <= 0.0 {
            return Err(ReleaseError::Configuration {
                what: "tank mass must be positive and finite",
            });
        }
        let volume = vf_core::units::m3(mass.value / fluid.density().value);
        Ok(Self {
            fluid,
            volume,
            mass,
        })
    }

    /// A zero-volume tank: an infinite reservoir at a fixed state.
    pub fn reservoir(fluid: FluidState) -> Self {
        Self {
            mass: kg(0.0),
            volume: vf_core::units::m3(0.0),
            fluid,
        }
    }

    pub fn fluid(&self) -> &FluidState {
        &self.fluid
    }

    pub fn volume(&self) -> Volume {
        self.volume
    }

    pub fn mass(&self) -> Mass {
        self.mass
    }

    /// Whether this tank is a steady source (zero volume).
    pub fn is_steady(&self) -> bool {
        self.volume.value == 0.0
    }

    /// Instantaneous discharge at the current tank state.
    pub fn steady_discharge(
        &self,
        backend: &dyn PropertyBackend,
        orifice: &Orifice,
        p_ambient: Pressure,
    ) -> ReleaseResult<DischargeResult> {
        orifice.mass_flow_rate(backend, &self.fluid, p_ambient)
    }

    /// Time-integrated blowdown of a finite tank through an orifice.
    ///
    /// Without heat input the contents stay on the initial isentrope and the
    /// run is driven from a precomputed lookup table. With heat input the
    /// tank state is advanced as a mass/entropy ODE system, flashing the
    /// property backend at every step.
    ///
    /// A mid-run property failure does not discard the results: the history
    /// is returned with `BlowdownTermination::Failed` and every sample up to
    /// the failure intact.
    pub fn blowdown(
        &self,
        backend: &dyn PropertyBackend,
        orifice: &Orifice,
        options: &BlowdownOptions,
    ) -> ReleaseResult<BlowdownHistory> {
        if self.is_steady() {
            return Err(ReleaseError::Configuration {
                what: "blowdown requires a finite tank volume",
            });
        }
        options.validate()?;

        let p_amb = options.p_ambient.value;
        let p0 = self.fluid.pressure().value;
        if p0 < p_amb * (1.0 - P_AMBIENT_REL_TOL) {
            return Err(ReleaseError::NonPhysical {
                what: "tank pressure below ambient: no forward flow",
            });
        }

        // First sample is always the initial state at t = 0
        let initial = BlowdownRecord {
            t: s(0.0),
            mass: self.mass,
            mdot: self.sample_mdot(backend, orifice, &self.fluid, options.p_ambient)?,
            fluid: self.fluid.clone(),
        };

        if p0 <= p_amb * (1.0 + P_AMBIENT_REL_TOL) {
            return Ok(BlowdownHistory {
                records: vec![initial],
                termination: BlowdownTermination::AmbientPressure,
            });
        }

        let t_max = options.t_max.value;
        let grid = log_time_grid(T_FIRST.min(t_max / 2.0), t_max, options.samples);

        match options.heat_flux {
            None => {
                debug!(
                    nodes = options.table_nodes,
                    "adiabatic blowdown: isentrope table path"
                );
                self.blowdown_isentropic(backend, orifice, options, initial, &grid)
            }
            Some(q) => {
                debug!(q_w = q.value, "heated blowdown: mass/entropy ODE path");
                self.blowdown_heated(backend, orifice, options, initial, &grid, q)
            }
        }
    }

    /// Adiabatic path: one state variable (tank density) against the table.
    fn blowdown_isentropic(
        &self,
        backend: &dyn PropertyBackend,
        orifice: &Orifice,
        options: &BlowdownOptions,
        initial: BlowdownRecord,
        grid: &[f64],
    ) -> ReleaseResult<BlowdownHistory> {
        let mut records = vec![initial];

        // A backend that cannot resolve the isentrope down to ambient fails
        // here, before any time has elapsed; report it like any other
        // mid-run halt so the caller still gets the initial sample.
        let table = match IsentropeTable::build(
            backend,
            &self.fluid,
            orifice,
            options.p_ambient,
            options.table_nodes,
        ) {
            Ok(table) => table,
            Err(err) => {
                debug!(elapsed_s = 0.0, "blowdown halted: {err}");
                return Ok(BlowdownHistory {
                    records,
                    termination: BlowdownTermination::Failed {
                        elapsed_s: 0.0,
                        reason: err.to_string(),
                    },
                });
            }
        };
        let volume = self.volume.value;
        let rho_floor = (MASS_FLOOR_FRAC * self.mass.value / volume).max(table.rho_min());

        let rhs = |_t: f64, y: &[f64; 1]| -> ReleaseResult<[f64; 1]> {
            let rho = y[0];
            if rho <= rho_floor {
                return Ok([0.0]);
            }
            Ok([-table.mdot_at(rho) / volume])
        };

        let mut rho = self.fluid.density().value;

        for w in grid.windows(2) {
            let (t0, t1) = (w[0], w[1]);
            let dt = (t1 - t0) / TABLE_SUBSTEPS as f64;
            let mut y = [rho];
            for i in 0..TABLE_SUBSTEPS {
                y = rk4_step(rhs, t0 + i as f64 * dt, &y, dt)?;
            }
            rho = y[0].max(table.rho_min());
            let p_interp = table.pressure_at(rho);
            trace!(
                t = t1,
                p_pa = p_interp,
                t_k = table.temperature_at(rho),
                "blowdown sample"
            );

            // Samples are flashed through the real backend so the recorded
            // states carry full EOS consistency, not table interpolants. A
            // flash or flow-rate failure here ends the run with the partial
            // history intact.
            let sampled = self
                .fluid
                .expand_to_density(backend, kgpm3(rho))
                .map_err(ReleaseError::from)
                .and_then(|state| {
                    let mdot = self.sample_mdot(backend, orifice, &state, options.p_ambient)?;
                    Ok((state, mdot))
                });
            let (fluid, mdot) = match sampled {
                Ok(sample) => sample,
                Err(err) => {
                    let elapsed = records.last().map(|r| r.t.value).unwrap_or(0.0);
                    debug!(elapsed_s = elapsed, "blowdown halted: {err}");
                    return Ok(BlowdownHistory {
                        records,
                        termination: BlowdownTermination::Failed {
                            elapsed_s: elapsed,
                            reason: err.to_string(),
                        },
                    });
                }
            };
            records.push(BlowdownRecord {
                t: s(t1),
                mass: kg(rho * volume),
                mdot,
                fluid,
            });

            if rho * volume <= MASS_FLOOR_FRAC * self.mass.value {
                debug!(t1, "blowdown terminated: inventory depleted");
                return Ok(BlowdownHistory {
                    records,
                    termination: BlowdownTermination::Depleted,
                });
            }
            if p_interp <= options.p_ambient.value * (1.0 + P_AMBIENT_REL_TOL) {
                debug!(t1, "blowdown terminated: ambient pressure reached");
                return Ok(BlowdownHistory {
                    records,
                    termination: BlowdownTermination::AmbientPressure,
                });
            }
        }

        debug!("blowdown terminated: time horizon reached");
        Ok(BlowdownHistory {
            records,
            termination: BlowdownTermination::TimeHorizon,
        })
    }

    /// Heated path: mass/entropy ODE with per-step backend flashes.
    ///
    /// The entropy balance ds/dt = Q̇/(mT) reduces exactly to the isentrope
    /// as Q̇ → 0, so the two paths agree in that limit.
    fn blowdown_heated(
        &self,
        backend: &dyn PropertyBackend,
        orifice: &Orifice,
        options: &BlowdownOptions,
        initial: BlowdownRecord,
        grid: &[f64],
        heat_flux: Power,
    ) -> ReleaseResult<BlowdownHistory> {
        let volume = self.volume.value;
        let blend = self.fluid.blend().clone();
        let m_floor = MASS_FLOOR_FRAC * self.mass.value;
        let p_amb = options.p_ambient;
        let q = heat_flux.value;
        let integrator = CashKarp45::default();

        let rhs = |_t: f64, y: &[f64; 2]| -> ReleaseResult<[f64; 2]> {
            let (m, entropy) = (y[0], y[1]);
            if m <= m_floor {
                return Ok([0.0, 0.0]);
            }
            let state =
                FluidState::from_rho_s(backend, blend.clone(), kgpm3(m / volume), entropy)?;
            if state.pressure().value <= p_amb.value * (1.0 + P_AMBIENT_REL_TOL) {
                return Ok([0.0, 0.0]);
            }
            let flow = orifice.mass_flow_rate(backend, &state, p_amb)?;
            Ok([
                -flow.mdot.value,
                q / (m * state.temperature().value),
            ])
        };

        let mut records = vec![initial];
        let mut y = [self.mass.value, self.fluid.entropy()];

        for w in grid.windows(2) {
            let (t0, t1) = (w[0], w[1]);

            let step = integrator
                .integrate(rhs, t0, t1, y, options.max_steps)
                .and_then(|y_next| {
                    let state = FluidState::from_rho_s(
                        backend,
                        blend.clone(),
                        kgpm3(y_next[0] / volume),
                        y_next[1],
                    )?;
                    let mdot = self.sample_mdot(backend, orifice, &state, p_amb)?;
                    Ok((y_next, state, mdot))
                });
            let (y_next, fluid, mdot) = match step {
                Ok(v) => v,
                Err(err) => {
                    let elapsed = records.last().map(|r| r.t.value).unwrap_or(0.0);
                    debug!(elapsed_s = elapsed, "blowdown halted: {err}");
                    return Ok(BlowdownHistory {
                        records,
                        termination: BlowdownTermination::Failed {
                            elapsed_s: elapsed,
                            reason: err.to_string(),
                        },
                    });
                }
            };
            y = y_next;

            records.push(BlowdownRecord {
                t: s(t1),
                mass: kg(y[0]),
                mdot,
                fluid: fluid.clone(),
            });

            if y[0] <= m_floor {
                debug!(t1, "blowdown terminated: inventory depleted");
                return Ok(BlowdownHistory {
                    records,
                    termination: BlowdownTermination::Depleted,
                });
            }
            if fluid.pressure().value <= p_amb.value * (1.0 + P_AMBIENT_REL_TOL) {
                debug!(t1, "blowdown terminated: ambient pressure reached");
                return Ok(BlowdownHistory {
                    records,
                    termination: BlowdownTermination::AmbientPressure,
                });
            }
        }

        debug!("blowdown terminated: time horizon reached");
        Ok(BlowdownHistory {
            records,
            termination: BlowdownTermination::TimeHorizon,
        })
    }

    /// Discharge rate at a sampled tank state, zero once equalized.
    fn sample_mdot(
        &self,
        backend: &dyn PropertyBackend,
        orifice: &Orifice,
        fluid: &FluidState,
        p_ambient: Pressure,
    ) -> ReleaseResult<MassRate> {
        if fluid.pressure().value <= p_ambient.value * (1.0 + P_AMBIENT_REL_TOL) {
            return Ok(kgps(0.0));
        }
        Ok(orifice.mass_flow_rate(backend, fluid, p_ambient)?.mdot)
    }
}

/// Knobs for a blowdown run. `Default` gives atmospheric ambient, no heat
/// input, and a 30 s horizon.
#[derive(Debug, Clone)]
pub struct BlowdownOptions {
    /// Back pressure the orifice discharges into
    pub p_ambient: Pressure,
    /// External heat input to the tank contents; `None` selects the
    /// adiabatic isentrope fast path
    pub heat_flux: Option<Power>,
    /// Simulation horizon
    pub t_max: Time,
    /// Accepted-step cap per output interval on the ODE path
    pub max_steps: usize,
    /// Non-zero output samples on the logarithmic time grid
    pub samples: usize,
    /// Density nodes in the isentrope lookup table
    pub table_nodes: usize,
}

impl Default for BlowdownOptions {
    fn default() -> Self {
        Self {
            p_ambient: pa(constants::P_ATM),
            heat_flux: None,
            t_max: s(30.0),
            max_steps: 100_000,
            samples: 60,
            table_nodes: 500,
        }
    }
}

impl BlowdownOptions {
    fn validate(&self) -> ReleaseResult<()> {
        if !self.p_ambient.value.is_finite() || self.p_ambient.value <= 0.0 {
            return Err(ReleaseError::Configuration {
                what: "ambient pressure must be positive and finite",
            });
        }
        if !self.t_max.value.is_finite() || self.t_max.value <= 0.0 {
            return Err(ReleaseError::Configuration {
                what: "time horizon must be positive and finite",
            });
        }
        if let Some(q) = self.heat_flux {
            if !q.value.is_finite() {
                return Err(ReleaseError::Configuration {
                    what: "heat flux must be finite",
                });
            }
        }
        if self.samples < 1 {
            return Err(ReleaseError::Configuration {
                what: "at least one output sample is required",
            });
        }
        if self.table_nodes < 2 {
            return Err(ReleaseError::Configuration {
                what: "isentrope table needs at least two nodes",
            });
        }
        Ok(())
    }
}

/// One output sample of a blowdown run.
#[derive(Debug, Clone)]
pub struct BlowdownRecord {
    pub t: Time,
    /// Tank contents at this instant, flashed through the property backend
    pub fluid: FluidState,
    pub mass: Mass,
    pub mdot: MassRate,
}

/// How a blowdown run ended.
#[derive(Debug, Clone, PartialEq)]
pub enum BlowdownTermination {
    /// Tank equalized with ambient
    AmbientPressure,
    /// Inventory fell below the mass floor
    Depleted,
    /// Time horizon reached with flow still going
    TimeHorizon,
    /// A property evaluation failed mid-run; samples before `elapsed_s`
    /// remain valid
    Failed { elapsed_s: f64, reason: String },
}

/// Time series produced by [`Tank::blowdown`].
#[derive(Debug, Clone)]
pub struct BlowdownHistory {
    pub records: Vec<BlowdownRecord>,
    pub termination: BlowdownTermination,
}

impl BlowdownHistory {
    /// Whether the run ended on a physical condition rather than a failure.
    pub fn is_complete(&self) -> bool {
        !matches!(self.termination, BlowdownTermination::Failed { .. })
    }

    /// Promote a failed termination to a hard error, keeping the history
    /// otherwise.
    pub fn into_result(self) -> ReleaseResult<Self> {
        match self.termination {
            BlowdownTermination::Failed { elapsed_s, reason } => {
                Err(ReleaseError::Simulation { elapsed_s, reason })
            }
            _ => Ok(self),
        }
    }

    /// Total mass released over the recorded interval.
    pub fn released_mass(&self) -> Mass {
        match (self.records.first(), self.records.last()) {
            (Some(first), Some(last)) => kg(first.mass.value - last.mass.value),
            _ => kg(0.0),
        }
    }

    /// Time of the last recorded sample.
    pub fn duration(&self) -> Time {
        self.records.last().map(|r| r.t).unwrap_or(s(0.0))
    }
}

//! Time integrators for the blowdown ODE systems.

use crate::error::{ReleaseError, ReleaseResult};

/// Classical fixed-step RK4 over a small state array.
pub fn rk4_step<const N: usize>(
    mut rhs: impl FnMut(f64, &[f64; N]) -> ReleaseResult<[f64; N]>,
    t: f64,
    y: &[f64; N],
    dt: f64,
) -> ReleaseResult<[f64; N]> {
    let k1 = rhs(t, y)?;
    let k2 = rhs(t + 0.5 * dt, &add_scaled(y, &k1, 0.5 * dt))?;
    let k3 = rhs(t + 0.5 * dt, &add_scaled(y, &k2, 0.5 * dt))?;
    let k4 = rhs(t + dt, &add_scaled(y, &k3, dt))?;

    let mut out = *y;
    for i in 0..N {
        out[i] += dt / 6.0 * (k1[i] + 2.0 * k2[i] + 2.0 * k3[i] + k4[i]);
    }
    Ok(out)
}

fn add_scaled<const N: usize>(y: &[f64; N], k: &[f64; N], dt: f64) -> [f64; N] {
    let mut out = *y;
    for i in 0..N {
        out[i] += dt * k[i];
    }
    out
}

/// Adaptive Cash-Karp Runge-Kutta 4(5) integrator.
///
/// Embedded 4th/5th-order pair with step-size control; used for the
/// heat-flux blowdown path where each right-hand-side evaluation costs a
/// property-backend flash and step sizes vary by orders of magnitude over
/// a run.
#[derive(Clone, Debug)]
pub struct CashKarp45 {
    pub rel_tol: f64,
    pub abs_tol: f64,
    /// Smallest allowed step (guards against stalling on a discontinuity)
    pub min_dt: f64,
}

impl Default for CashKarp45 {
    fn default() -> Self {
        Self {
            rel_tol: 1e-9,
            abs_tol: 1e-12,
            min_dt: 1e-12,
        }
    }
}

// Cash-Karp tableau
const A2: f64 = 1.0 / 5.0;
const A3: [f64; 2] = [3.0 / 40.0, 9.0 / 40.0];
const A4: [f64; 3] = [3.0 / 10.0, -9.0 / 10.0, 6.0 / 5.0];
const A5: [f64; 4] = [-11.0 / 54.0, 5.0 / 2.0, -70.0 / 27.0, 35.0 / 27.0];
const A6: [f64; 5] = [
    1631.0 / 55296.0,
    175.0 / 512.0,
    575.0 / 13824.0,
    44275.0 / 110592.0,
    253.0 / 4096.0,
];
const B5: [f64; 6] = [
    37.0 / 378.0,
    0.0,
    250.0 / 621.0,
    125.0 / 594.0,
    0.0,
    512.0 / 1771.0,
];
const B4: [f64; 6] = [
    2825.0 / 27648.0,
    0.0,
    18575.0 / 48384.0,
    13525.0 / 55296.0,
    277.0 / 14336.0,
    1.0 / 4.0,
];

impl CashKarp45 {
    /// Integrate y' = rhs(t, y) from t0 to t1, returning the state at t1.
    ///
    /// `max_steps` bounds the number of accepted steps so a pathological
    /// right-hand side cannot spin forever.
    pub fn integrate<const N: usize>(
        &self,
        mut rhs: impl FnMut(f64, &[f64; N]) -> ReleaseResult<[f64; N]>,
        t0: f64,
        t1: f64,
        y0: [f64; N],
        max_steps: usize,
    ) -> ReleaseResult<[f64; N]> {
        if t1 <= t0 {
            return Ok(y0);
        }

        let mut t = t0;
        let mut y = y0;
        let mut dt = (t1 - t0) / 16.0;

        for _ in 0..max_steps {
            if t >= t1 {
                return Ok(y);
            }
            dt = dt.min(t1 - t);

            let (y_next, err_ratio) = self.try_step(&mut rhs, t, &y, dt)?;

            if err_ratio <= 1.0 || dt <= self.min_dt {
                t += dt;
                y = y_next;
            }

            // PI-free step control: shrink hard on rejection, grow gently
            let factor = if err_ratio > 0.0 {
                (0.9 * err_ratio.powf(-0.2)).clamp(0.2, 5.0)
            } else {
                5.0
            };
            dt = (dt * factor).max(self.min_dt);
        }

        Err(ReleaseError::Simulation {
            elapsed_s: t,
            reason: "adaptive integrator exceeded max step count".into(),
        })
    }

    /// One trial Cash-Karp step; returns (5th-order solution, error ratio).
    fn try_step<const N: usize>(
        &self,
        rhs: &mut impl FnMut(f64, &[f64; N]) -> ReleaseResult<[f64; N]>,
        t: f64,
        y: &[f64; N],
        dt: f64,
    ) -> ReleaseResult<([f64; N], f64)> {
        let k1 = rhs(t, y)?;

        let mut y2 = *y;
        for i in 0..N {
            y2[i] += dt * A2 * k1[i];
        }
        let k2 = rhs(t + dt / 5.0, &y2)?;

        let mut y3 = *y;
        for i in 0..N {
            y3[i] += dt * (A3[0] * k1[i] + A3[1] * k2[i]);
        }
        let k3 = rhs(t + 3.0 * dt / 10.0, &y3)?;

        let mut y4 = *y;
        for i in 0..N {
            y4[i] += dt * (A4[0] * k1[i] + A4[1] * k2[i] + A4[2] * k3[i]);
        }
        let k4 = rhs(t + 3.0 * dt / 5.0, &y4)?;

        let mut y5 = *y;
        for i in 0..N {
            y5[i] += dt * (A5[0] * k1[i] + A5[1] * k2[i] + A5[2] * k3[i] + A5[3] * k4[i]);
        }
        let k5 = rhs(t + dt, &y5)?;

        let mut y6 = *y;
        for i in 0..N {
            y6[i] += dt
                * (A6[0] * k1[i] + A6[1] * k2[i] + A6[2] * k3[i] + A6[3] * k4[i] + A6[4] * k5[i]);
        }
        let k6 = rhs(t + 7.0 * dt / 8.0, &y6)?;

        let ks = [k1, k2, k3, k4, k5, k6];

        let mut y_out = *y;
        let mut err_ratio: f64 = 0.0;
        for i in 0..N {
            let mut d5 = 0.0;
            let mut d4 = 0.0;
            for (j, k) in ks.iter().enumerate() {
                d5 += B5[j] * k[i];
                d4 += B4[j] * k[i];
            }
            y_out[i] += dt * d5;
            let err = dt * (d5 - d4);
            let scale = self.abs_tol + self.rel_tol * y[i].abs().max(y_out[i].abs());
            err_ratio = err_ratio.max((err / scale).abs());
        }

        Ok((y_out, err_ratio))
    }
}

//! Sample-time generation for blowdown histories.

/// Log-spaced sample times from `t_first` to `t_end`, with 0.0 prepended.
///
/// Blowdown transients move fastest right after the release opens, so a
/// logarithmic grid concentrates samples where the solution changes.
/// `samples` counts the non-zero times; the returned vector has
/// `samples + 1` entries starting at exactly 0.0.
pub fn log_time_grid(t_first: f64, t_end: f64, samples: usize) -> Vec<f64> {
    debug_assert!(t_first > 0.0 && t_end > t_first && samples >= 1);

    let mut grid = Vec::with_capacity(samples + 1);
    grid.push(0.0);
    if samples == 1 {
        grid.push(t_end);
        return grid;
    }

    let log_first = t_first.ln();
    let log_step = (t_end.ln() - log_first) / (samples - 1) as f64;
    for i in 0..samples {
        let t = if i == samples - 1 {
            t_end
        } else {
            (log_first + i as f64 * log_step).exp()
        };
        grid.push(t);
    }
    grid
}

use signal_core::types::Crossover;

/// Crossing of line `a` over line `b` between the previous and current bar.
pub(crate) fn crossover(prev_a: f64, prev_b: f64, a: f64, b: f64) -> Option<Crossover> {
    if a > b && prev_a <= prev_b {
        Some(Crossover::Up)
    } else if a < b && prev_a >= prev_b {
        Some(Crossover::Down)
    } else {
        None
    }
}

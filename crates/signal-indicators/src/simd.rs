//! SIMD helpers shared by the indicator implementations.
//!
//! These use the `wide` crate for portable SIMD operations. Every helper
//! falls back to scalar code for the tail that does not fill a lane.

use wide::f64x4;

/// Split consecutive differences into gains and losses.
///
/// Element `j` of both outputs describes the move from `data[j]` to
/// `data[j + 1]`; losses are reported as positive magnitudes.
pub fn split_deltas(data: &[f64]) -> (Vec<f64>, Vec<f64>) {
    if data.len() < 2 {
        return (vec![], vec![]);
    }

    let n = data.len() - 1;
    let mut gains = Vec::with_capacity(n);
    let mut losses = Vec::with_capacity(n);
    let zero = f64x4::splat(0.0);

    let chunks = n / 4;
    for i in 0..chunks {
        let idx = i * 4;
        let prev = f64x4::new([data[idx], data[idx + 1], data[idx + 2], data[idx + 3]]);
        let curr = f64x4::new([data[idx + 1], data[idx + 2], data[idx + 3], data[idx + 4]]);

        let diff = curr - prev;
        gains.extend(diff.max(zero).to_array());
        losses.extend((-diff).max(zero).to_array());
    }

    for i in (chunks * 4)..n {
        let change = data[i + 1] - data[i];
        gains.push(change.max(0.0));
        losses.push((-change).max(0.0));
    }

    (gains, losses)
}

/// Sum of squared deviations from `mean`.
pub fn sum_sq_dev(window: &[f64], mean: f64) -> f64 {
    let chunks = window.len() / 4;
    let mean_vec = f64x4::splat(mean);
    let mut acc = f64x4::splat(0.0);

    for i in 0..chunks {
        let idx = i * 4;
        let values = f64x4::new([window[idx], window[idx + 1], window[idx + 2], window[idx + 3]]);
        let diff = values - mean_vec;
        acc += diff * diff;
    }

    let mut total = acc.reduce_add();
    for &value in &window[(chunks * 4)..] {
        let diff = value - mean;
        total += diff * diff;
    }
    total
}

/// Minimum and maximum of a slice, or `None` when empty.
pub fn minmax(data: &[f64]) -> Option<(f64, f64)> {
    if data.is_empty() {
        return None;
    }

    let chunks = data.len() / 4;
    let mut min_vec = f64x4::splat(f64::INFINITY);
    let mut max_vec = f64x4::splat(f64::NEG_INFINITY);

    for i in 0..chunks {
        let idx = i * 4;
        let values = f64x4::new([data[idx], data[idx + 1], data[idx + 2], data[idx + 3]]);
        min_vec = min_vec.min(values);
        max_vec = max_vec.max(values);
    }

    let mut min = min_vec.to_array().into_iter().fold(f64::INFINITY, f64::min);
    let mut max = max_vec.to_array().into_iter().fold(f64::NEG_INFINITY, f64::max);

    for &value in &data[(chunks * 4)..] {
        min = min.min(value);
        max = max.max(value);
    }

    Some((min, max))
}

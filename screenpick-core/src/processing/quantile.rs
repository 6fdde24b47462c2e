//! Linear-interpolation quantile estimation.

use crate::error::{CoreError, CoreResult};

/// Returns the `q` quantile of `data` (q in [0, 1]).
///
/// The data is sorted ascending and the value at position `q * (n - 1)` is
/// linearly interpolated between its neighbouring order statistics, so
/// `q = 0` is the minimum, `q = 1` the maximum and `q = 0.5` the usual median.
pub fn quantile(data: &[f64], q: f64) -> CoreResult<f64> {
    if data.is_empty() {
        return Err(CoreError::EmptyData("quantile"));
    }
    if !(0.0..=1.0).contains(&q) {
        return Err(CoreError::InvalidQuantile(q));
    }

    let mut sorted = data.to_vec();
    sorted.sort_by(f64::total_cmp);

    let position = q * (sorted.len() - 1) as f64;
    let lower = position.floor() as usize;
    let upper = position.ceil() as usize;
    let fraction = position - lower as f64;

    Ok(sorted[lower] + (sorted[upper] - sorted[lower]) * fraction)
}

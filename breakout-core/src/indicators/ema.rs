//! Exponential moving average by kernel convolution.
//!
//! Kernel: `exp(linspace(-1, 0, period))`, normalized to sum 1.
//! Output[i] = sum over k of kernel[k] * values[i - k] (full convolution,
//! truncated to the input length). The first `period` outputs are then
//! overwritten with output[`period`]; callers drop them before use.

/// Normalized exponential weights over `[-1, 0]`, length `period`.
pub fn exp_kernel(period: usize) -> Vec<f64> {
    let raw: Vec<f64> = match period {
        0 => return Vec::new(),
        1 => vec![(-1.0f64).exp()],
        _ => {
            let step = 1.0 / (period - 1) as f64;
            (0..period).map(|i| (-1.0 + i as f64 * step).exp()).collect()
        }
    };
    let sum: f64 = raw.iter().sum();
    raw.into_iter().map(|w| w / sum).collect()
}

/// Smoothed copy of `values`, same length as the input.
///
/// When `values.len() <= period` there is no output at index `period` and
/// the flattening step is skipped. A zero period returns the input unchanged.
pub fn exp_moving_average(values: &[f64], period: usize) -> Vec<f64> {
    if period == 0 {
        return values.to_vec();
    }

    let kernel = exp_kernel(period);
    let mut result: Vec<f64> = (0..values.len())
        .map(|i| {
            kernel
                .iter()
                .take(i + 1)
                .enumerate()
                .map(|(k, w)| w * values[i - k])
                .sum::<f64>()
        })
        .collect();

    if let Some(&anchor) = result.get(period) {
        result[..period].fill(anchor);
    }
    result
}

/// Smoothed values with the first `period` warm-up entries dropped.
pub fn smoothed_tail(values: &[f64], period: usize) -> Vec<f64> {
    let mut smoothed = exp_moving_average(values, period);
    smoothed.drain(..period.min(smoothed.len()));
    smoothed
}

//! Cross- and auto-correlation
//!
//! Correlation is convolution with the time-reversed second sequence, so
//! both share the convolution engine. In `Full` mode output index i holds
//! lag i - (len(y) - 1), where lag k pairs x[n] with y[n - k].

use super::fast_conv::{convolve_with, ConvolutionMethod, ConvolveMode};
use crate::error::{DspError, Result};

/// Cross-correlation of `x` and `y`
pub fn correlate(
    x: &[f64],
    y: &[f64],
    mode: ConvolveMode,
    method: ConvolutionMethod,
) -> Result<Vec<f64>> {
    if x.is_empty() || y.is_empty() {
        return Err(DspError::invalid("x", "correlation inputs cannot be empty"));
    }
    tracing::debug!(
        len_x = x.len(),
        len_y = y.len(),
        %mode,
        %method,
        "computing cross-correlation"
    );

    let reversed: Vec<f64> = y.iter().rev().copied().collect();
    convolve_with(x, &reversed, mode, method)
}

/// Auto-correlation of `x`; in `Full` mode the zero lag sits at index len(x) - 1
pub fn autocorrelate(x: &[f64], mode: ConvolveMode, method: ConvolutionMethod) -> Result<Vec<f64>> {
    correlate(x, x, mode, method)
}

/// Lag of every output sample of [`correlate`]
pub fn correlation_lags(len_x: usize, len_y: usize, mode: ConvolveMode) -> Result<Vec<isize>> {
    if len_x == 0 || len_y == 0 {
        return Err(DspError::invalid("len_x", "correlation inputs cannot be empty"));
    }
    let first = -(len_y as isize - 1);
    let start = mode.start(len_x, len_y) as isize;
    Ok((0..mode.output_len(len_x, len_y) as isize)
        .map(|i| first + start + i)
        .collect())
}

/// Delay of `y` relative to `x` in samples
///
/// Positive when `y` is a later copy of `x`: the full-mode correlation
/// peaks at lag -d for a delay of d samples.
pub fn estimate_delay(x: &[f64], y: &[f64]) -> Result<isize> {
    let corr = correlate(x, y, ConvolveMode::Full, ConvolutionMethod::Auto)?;
    let lags = correlation_lags(x.len(), y.len(), ConvolveMode::Full)?;
    let peak = corr
        .iter()
        .enumerate()
        .max_by(|(_, a), (_, b)| a.total_cmp(b))
        .map(|(i, _)| i)
        .ok_or_else(|| DspError::Computation("empty correlation".into()))?;
    Ok(-lags[peak])
}

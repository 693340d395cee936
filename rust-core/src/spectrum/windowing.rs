//! Windowing helpers for spectral analysis
//!
//! Applies windows to time-domain segments before FFT to reduce spectral leakage

use crate::error::Result;
use crate::windows::{get_window, WindowType};

/// Apply window to signal
///
/// # Arguments
/// * `signal` - Input signal (window length = signal length)
/// * `window_type` - Type of window to apply
///
/// # Returns
/// Windowed signal. A window that cannot be generated is an error; the
/// signal is never passed through unwindowed.
pub fn apply_window(signal: &[f64], window_type: WindowType) -> Result<Vec<f64>> {
    let window = get_window(window_type, signal.len())?;

    Ok(signal
        .iter()
        .zip(window.iter())
        .map(|(&s, &w)| s * w)
        .collect())
}

/// Multiply `segment` by precomputed coefficients in place
pub(crate) fn apply_coefficients(segment: &mut [f64], window: &[f64]) {
    for (s, w) in segment.iter_mut().zip(window) {
        *s *= w;
    }
}

/// Sum of coefficients, sum(w[n])
pub fn window_sum(window: &[f64]) -> f64 {
    window.iter().sum()
}

/// Window energy, sum(w[n]^2)
pub fn window_energy(window: &[f64]) -> f64 {
    window.iter().map(|&w| w * w).sum()
}

/// Calculate window correction factor
///
/// When applying windows, the signal amplitude is reduced. Multiply FFT
/// magnitudes by this factor to undo the coherent gain.
pub fn window_correction_factor(window_type: WindowType, length: usize) -> Result<f64> {
    let window = get_window(window_type, length)?;
    Ok(length as f64 / window_sum(&window))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_window() {
        let signal = vec![1.0; 101];
        let windowed = apply_window(&signal, WindowType::Hamming).unwrap();

        assert_eq!(windowed.len(), 101);

        // Center should be 1.0
        assert!((windowed[50] - 1.0).abs() < 1e-12);

        // Edges should be reduced (Hamming ~0.08)
        assert!(windowed[0] < 0.1);
        assert!(windowed[100] < 0.1);
    }

    #[test]
    fn test_apply_window_to_empty_signal_fails() {
        assert!(apply_window(&[], WindowType::Hann).is_err());
    }

    #[test]
    fn test_correction_factor() {
        let factor_rect = window_correction_factor(WindowType::Rectangular, 100).unwrap();
        let factor_hamming = window_correction_factor(WindowType::Hamming, 100).unwrap();

        // Rectangular window has no correction needed
        assert!((factor_rect - 1.0).abs() < 1e-12);

        // Hamming window reduces amplitude, so correction > 1
        assert!(factor_hamming > 1.5 && factor_hamming < 2.5);
    }

    #[test]
    fn test_window_sums() {
        let w = [0.0, 0.5, 1.0, 0.5, 0.0];
        assert_eq!(window_sum(&w), 2.0);
        assert_eq!(window_energy(&w), 1.5);
    }
}

//! Short-time Fourier transform
//!
//! Frames the signal, windows each frame, zero-pads to `n_fft` and keeps
//! the one-sided spectrum. Output is indexed `[frequency_bin, frame]`.

use super::fft::{rfftfreq, FftEngine};
use super::framing::{frame, PadMode};
use super::windowing::apply_coefficients;
use crate::error::{require_positive, DspError, Result};
use crate::parallel::try_map_indexed;
use crate::windows::{get_window, WindowType};
use ndarray::Array2;
use num_complex::Complex64;

/// STFT configuration
#[derive(Debug, Clone, PartialEq)]
pub struct StftConfig {
    /// FFT length; determines frequency resolution
    pub n_fft: usize,

    /// Samples between successive frames (default: win_length / 4)
    pub hop_length: Option<usize>,

    /// Window length, at most n_fft (default: n_fft)
    pub win_length: Option<usize>,

    /// Window applied to every frame
    pub window: WindowType,

    /// Pad so frame t is centered on sample t * hop_length
    pub center: bool,

    /// Padding used when `center` is set
    pub pad_mode: PadMode,
}

impl Default for StftConfig {
    fn default() -> Self {
        Self {
            n_fft: 2048,
            hop_length: None,
            win_length: None,
            window: WindowType::Hann,
            center: true,
            pad_mode: PadMode::Constant,
        }
    }
}

impl StftConfig {
    pub fn new(n_fft: usize) -> Self {
        Self {
            n_fft,
            ..Self::default()
        }
    }

    pub fn with_hop_length(mut self, hop_length: usize) -> Self {
        self.hop_length = Some(hop_length);
        self
    }

    pub fn with_win_length(mut self, win_length: usize) -> Self {
        self.win_length = Some(win_length);
        self
    }

    pub fn with_window(mut self, window: WindowType) -> Self {
        self.window = window;
        self
    }

    pub fn with_center(mut self, center: bool, pad_mode: PadMode) -> Self {
        self.center = center;
        self.pad_mode = pad_mode;
        self
    }

    /// Resolved window length
    pub fn win_length(&self) -> usize {
        self.win_length.unwrap_or(self.n_fft)
    }

    /// Resolved hop length
    pub fn hop_length(&self) -> usize {
        self.hop_length.unwrap_or(self.win_length() / 4)
    }

    /// Number of one-sided frequency rows
    pub fn n_bins(&self) -> usize {
        self.n_fft / 2 + 1
    }

    /// Check lengths before any work is done
    pub fn validate(&self) -> Result<()> {
        require_positive("n_fft", self.n_fft)?;
        let win_length = require_positive("win_length", self.win_length())?;
        if win_length > self.n_fft {
            return Err(DspError::invalid(
                "win_length",
                format!("win_length ({win_length}) cannot exceed n_fft ({})", self.n_fft),
            ));
        }
        if self.hop_length() == 0 {
            return Err(DspError::invalid(
                "hop_length",
                format!("resolved hop length is zero (win_length = {win_length})"),
            ));
        }
        Ok(())
    }

    /// Time in seconds of each frame's reference sample
    ///
    /// With `center` set this is the frame center; otherwise the frame start.
    pub fn frame_times(&self, n_frames: usize, sr: f64) -> Vec<f64> {
        let hop = self.hop_length() as f64;
        (0..n_frames).map(|t| t as f64 * hop / sr).collect()
    }
}

/// Center frequency of every STFT row
pub fn stft_frequencies(sr: f64, n_fft: usize) -> Result<Vec<f64>> {
    rfftfreq(n_fft, sr)
}

/// Compute the STFT of `signal`
///
/// # Returns
/// Complex matrix shaped `[n_fft/2 + 1, n_frames]`
pub fn stft(signal: &[f64], config: &StftConfig) -> Result<Array2<Complex64>> {
    config.validate()?;

    let n_fft = config.n_fft;
    let win_length = config.win_length();
    let hop_length = config.hop_length();
    tracing::debug!(
        n_fft,
        hop_length,
        win_length,
        window = %config.window,
        center = config.center,
        pad_mode = %config.pad_mode,
        len = signal.len(),
        "computing STFT"
    );

    let window = get_window(config.window, win_length)?;
    let frames = frame(signal, win_length, hop_length, config.center, config.pad_mode)?;
    let engine = FftEngine::new(n_fft)?;

    let columns = try_map_indexed(frames.len(), |t| {
        let mut segment = frames.frame(t).to_vec();
        apply_coefficients(&mut segment, &window);
        engine.forward_real(&segment)
    })?;

    let mut matrix = Array2::zeros((config.n_bins(), columns.len()));
    for (t, column) in columns.into_iter().enumerate() {
        for (k, value) in column.into_iter().enumerate() {
            matrix[[k, t]] = value;
        }
    }

    Ok(matrix)
}

/// Magnitude of an STFT matrix
pub fn magnitude(matrix: &Array2<Complex64>) -> Array2<f64> {
    matrix.mapv(|c| c.norm())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use std::f64::consts::PI;

    fn tone(freq: f64, sr: f64, seconds: f64) -> Vec<f64> {
        let len = (sr * seconds) as usize;
        (0..len).map(|n| (2.0 * PI * freq * n as f64 / sr).sin()).collect()
    }

    #[test]
    fn test_stft_shape() {
        let signal = tone(440.0, 22050.0, 2.0);
        let config = StftConfig::new(1024).with_hop_length(256);
        let matrix = stft(&signal, &config).unwrap();

        assert_eq!(matrix.nrows(), 513);
        assert_eq!(matrix.ncols(), signal.len().div_ceil(256));
    }

    #[test]
    fn test_default_hop_is_quarter_window() {
        let config = StftConfig::new(512).with_win_length(256);
        assert_eq!(config.hop_length(), 64);

        let signal = vec![0.0; 1000];
        let matrix = stft(&signal, &config).unwrap();
        // centered: 1 + (1000 + 256 - 256) / 64
        assert_eq!(matrix.dim(), (257, 1 + 1000 / 64));
    }

    #[test]
    fn test_stft_peak_bin() {
        let sr = 8000.0;
        let signal = tone(1000.0, sr, 0.5);
        let config = StftConfig::new(256).with_hop_length(64);
        let mag = magnitude(&stft(&signal, &config).unwrap());
        let freqs = stft_frequencies(sr, 256).unwrap();

        // A column well inside the signal peaks at 1 kHz
        let column = mag.column(20);
        let (peak, _) = column
            .iter()
            .enumerate()
            .max_by(|(_, a), (_, b)| a.total_cmp(b))
            .unwrap();
        assert_abs_diff_eq!(freqs[peak], 1000.0, epsilon = 1e-9);
    }

    #[test]
    fn test_uncentered_column_matches_windowed_fft() {
        let signal: Vec<f64> = (0..300).map(|n| ((n * n) as f64 * 0.001).sin()).collect();
        let config = StftConfig::new(128)
            .with_win_length(100)
            .with_hop_length(50)
            .with_window(WindowType::Hamming)
            .with_center(false, PadMode::Constant);
        let matrix = stft(&signal, &config).unwrap();
        assert_eq!(matrix.ncols(), 1 + (300 - 100) / 50);

        let window = get_window(WindowType::Hamming, 100).unwrap();
        let segment: Vec<f64> = signal[100..200]
            .iter()
            .zip(&window)
            .map(|(s, w)| s * w)
            .collect();
        let expected = FftEngine::new(128).unwrap().forward_real(&segment).unwrap();

        for (k, value) in expected.iter().enumerate() {
            assert_abs_diff_eq!(matrix[[k, 2]].re, value.re, epsilon = 1e-9);
            assert_abs_diff_eq!(matrix[[k, 2]].im, value.im, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_invalid_config() {
        let signal = vec![0.0; 100];
        assert!(stft(&signal, &StftConfig::new(0)).is_err());
        assert!(stft(&signal, &StftConfig::new(64).with_win_length(128)).is_err());
        assert!(stft(&signal, &StftConfig::new(2)).is_err()); // hop 2/4 == 0
        assert!(stft(&signal, &StftConfig::new(64).with_hop_length(0)).is_err());
    }

    #[test]
    fn test_frame_times() {
        let config = StftConfig::new(1024).with_hop_length(512);
        let times = config.frame_times(3, 1024.0);
        assert_eq!(times, vec![0.0, 0.5, 1.0]);
    }
}

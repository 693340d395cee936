//! Constant-Q transform
//!
//! Bins are geometrically spaced, fmin * 2^(k / bins_per_octave), and every
//! bin is analysed with its own windowed complex exponential whose length
//! is inversely proportional to the bin frequency. That keeps
//! Q = center_frequency / bandwidth constant across bins.

use crate::error::{require_positive, require_positive_f64, DspError, Result};
use crate::parallel::try_map_indexed;
use crate::windows::{get_window, WindowType};
use ndarray::Array2;
use num_complex::Complex64;
use std::f64::consts::PI;

/// Frequency of C1, the lowest reference pitch (Hz)
pub const C1_HZ: f64 = 32.703_195_662_574_83;

/// Longest analysis kernel accepted, in samples (2^20, about 24 s at 44.1 kHz)
pub const MAX_KERNEL_LENGTH: usize = 1 << 20;

/// CQT configuration
#[derive(Debug, Clone, PartialEq)]
pub struct CqtConfig {
    /// Samples between successive columns
    pub hop_length: usize,

    /// Lowest bin frequency (default: C1)
    pub fmin: Option<f64>,

    /// Total number of bins
    pub n_bins: usize,

    pub bins_per_octave: usize,

    /// Scales every kernel length; values below 1 trade frequency for time resolution
    pub filter_scale: f64,

    /// Tuning offset in fractions of a bin, shifts every center frequency
    pub tuning: f64,

    /// Window shaping each kernel
    pub window: WindowType,
}

impl Default for CqtConfig {
    fn default() -> Self {
        Self {
            hop_length: 512,
            fmin: None,
            n_bins: 84,
            bins_per_octave: 12,
            filter_scale: 1.0,
            tuning: 0.0,
            window: WindowType::Hann,
        }
    }
}

impl CqtConfig {
    pub fn fmin(&self) -> f64 {
        self.fmin.unwrap_or(C1_HZ)
    }

    /// Quality factor shared by all bins
    pub fn q(&self) -> f64 {
        self.filter_scale / (2f64.powf(1.0 / self.bins_per_octave as f64) - 1.0)
    }

    fn validate(&self, sr: f64) -> Result<()> {
        require_positive_f64("sr", sr)?;
        require_positive("hop_length", self.hop_length)?;
        require_positive("n_bins", self.n_bins)?;
        require_positive("bins_per_octave", self.bins_per_octave)?;
        require_positive_f64("fmin", self.fmin())?;
        require_positive_f64("filter_scale", self.filter_scale)?;
        if !self.tuning.is_finite() {
            return Err(DspError::invalid("tuning", "must be finite"));
        }

        let freqs = self.center_frequencies()?;
        if let Some(&lowest) = freqs.first() {
            let longest = kernel_length(lowest, sr, self.q());
            if longest > MAX_KERNEL_LENGTH as f64 {
                return Err(DspError::invalid(
                    "fmin",
                    format!(
                        "lowest bin ({lowest:.4} Hz) needs a {longest:.0}-sample kernel, \
                         above the maximum of {MAX_KERNEL_LENGTH}"
                    ),
                ));
            }
        }

        let nyquist = sr / 2.0;
        if let Some(&highest) = freqs.last() {
            if highest >= nyquist {
                return Err(DspError::invalid(
                    "n_bins",
                    format!(
                        "highest bin ({highest:.2} Hz) is at or above Nyquist ({nyquist:.2} Hz)"
                    ),
                ));
            }
        }
        Ok(())
    }

    /// Center frequency of every bin, including the tuning offset
    pub fn center_frequencies(&self) -> Result<Vec<f64>> {
        let bins_per_octave = require_positive("bins_per_octave", self.bins_per_octave)?;
        let tuned = self.fmin() * 2f64.powf(self.tuning / bins_per_octave as f64);
        cqt_frequencies(self.n_bins, tuned, bins_per_octave)
    }
}

/// fmin * 2^(k / bins_per_octave) for k in 0..n_bins
pub fn cqt_frequencies(n_bins: usize, fmin: f64, bins_per_octave: usize) -> Result<Vec<f64>> {
    require_positive("bins_per_octave", bins_per_octave)?;
    require_positive_f64("fmin", fmin)?;
    Ok((0..n_bins)
        .map(|k| fmin * 2f64.powf(k as f64 / bins_per_octave as f64))
        .collect())
}

/// Unrounded kernel length for a bin at `freq`
fn kernel_length(freq: f64, sr: f64, q: f64) -> f64 {
    (q * sr / freq).ceil()
}

/// Analysis kernel of one bin
struct Kernel {
    /// Offset of the first tap relative to the column's center sample
    start: isize,

    /// Conjugated, L1-normalised taps
    taps: Vec<Complex64>,
}

impl Kernel {
    fn new(freq: f64, sr: f64, q: f64, window_type: WindowType) -> Result<Self> {
        // Three taps keep a non-zero sum for windows with zero endpoints
        let length = (kernel_length(freq, sr, q) as usize).max(3);
        let window = get_window(window_type, length)?;
        let norm: f64 = window.iter().sum();
        let half = (length / 2) as isize;

        // Phase is referenced to the kernel center so columns do not rotate with t
        let taps = window
            .iter()
            .enumerate()
            .map(|(n, &w)| {
                let phase = -2.0 * PI * freq * (n as isize - half) as f64 / sr;
                Complex64::from_polar(w / norm, phase)
            })
            .collect();

        Ok(Self {
            start: -half,
            taps,
        })
    }

    fn len(&self) -> usize {
        self.taps.len()
    }

    /// Inner product with the segment centered on `center`, zeros outside the signal
    fn respond(&self, signal: &[f64], center: isize) -> Complex64 {
        let first = center + self.start;
        let lo = (-first).max(0) as usize;
        let hi = (signal.len() as isize - first).clamp(0, self.taps.len() as isize) as usize;
        if lo >= hi {
            return Complex64::new(0.0, 0.0);
        }
        let offset = (first + lo as isize) as usize;
        self.taps[lo..hi]
            .iter()
            .zip(&signal[offset..offset + (hi - lo)])
            .map(|(&tap, &x)| tap * x)
            .sum()
    }
}

/// Number of CQT columns for a signal of `len` samples
pub fn cqt_frame_count(len: usize, hop_length: usize) -> usize {
    1 + len / hop_length
}

/// Compute the constant-Q transform of `signal`
///
/// # Returns
/// Complex matrix shaped `[n_bins, 1 + len / hop_length]`; column t is
/// centered on sample t * hop_length
pub fn cqt(signal: &[f64], sr: f64, config: &CqtConfig) -> Result<Array2<Complex64>> {
    config.validate(sr)?;

    let freqs = config.center_frequencies()?;
    let q = config.q();
    tracing::debug!(
        sr,
        hop_length = config.hop_length,
        fmin = config.fmin(),
        n_bins = config.n_bins,
        bins_per_octave = config.bins_per_octave,
        q,
        len = signal.len(),
        "computing CQT"
    );

    let kernels = freqs
        .iter()
        .map(|&f| Kernel::new(f, sr, q, config.window))
        .collect::<Result<Vec<_>>>()?;
    tracing::debug!(
        longest = kernels.first().map(Kernel::len),
        shortest = kernels.last().map(Kernel::len),
        "built CQT kernel bank"
    );

    let n_frames = cqt_frame_count(signal.len(), config.hop_length);
    let columns = try_map_indexed(n_frames, |t| {
        let center = (t * config.hop_length) as isize;
        Ok(kernels
            .iter()
            .map(|kernel| kernel.respond(signal, center))
            .collect::<Vec<_>>())
    })?;

    let mut matrix = Array2::zeros((config.n_bins, n_frames));
    for (t, column) in columns.into_iter().enumerate() {
        for (k, value) in column.into_iter().enumerate() {
            matrix[[k, t]] = value;
        }
    }

    Ok(matrix)
}

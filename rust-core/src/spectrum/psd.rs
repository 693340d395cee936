//! Power spectral density estimation
//!
//! Periodogram (single window) and Welch (segmented, averaged) estimators.
//! Both return one-sided estimates: power at negative frequencies is folded
//! onto the matching positive bin, so every bin except DC and Nyquist is doubled.

use super::fft::{rfftfreq, FftEngine};
use super::windowing::{apply_coefficients, window_energy, window_sum};
use crate::error::{require_positive, require_positive_f64, DspError, Result};
use crate::parallel::try_map_indexed;
use crate::windows::{get_window, WindowType};
use std::fmt;
use std::str::FromStr;

/// Trend removed from each segment before the FFT
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Detrend {
    None,
    /// Subtract the mean
    #[default]
    Constant,
    /// Subtract the least-squares line
    Linear,
}

impl FromStr for Detrend {
    type Err = DspError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" | "false" => Ok(Detrend::None),
            "constant" => Ok(Detrend::Constant),
            "linear" => Ok(Detrend::Linear),
            other => Err(DspError::invalid(
                "detrend",
                format!("unsupported detrend '{other}'"),
            )),
        }
    }
}

impl fmt::Display for Detrend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Detrend::None => "none",
            Detrend::Constant => "constant",
            Detrend::Linear => "linear",
        })
    }
}

/// Units of the estimate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Scaling {
    /// Power spectral density (V^2/Hz)
    #[default]
    Density,
    /// Power spectrum (V^2)
    Spectrum,
}

impl FromStr for Scaling {
    type Err = DspError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "density" => Ok(Scaling::Density),
            "spectrum" => Ok(Scaling::Spectrum),
            other => Err(DspError::invalid(
                "scaling",
                format!("unsupported scaling '{other}'"),
            )),
        }
    }
}

impl fmt::Display for Scaling {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Scaling::Density => "density",
            Scaling::Spectrum => "spectrum",
        })
    }
}

/// One-sided PSD estimate
#[derive(Debug, Clone, PartialEq)]
pub struct PsdEstimate {
    /// Frequencies in Hz, 0..=fs/2
    pub frequencies: Vec<f64>,

    /// Power per frequency, units per [`Scaling`]
    pub power: Vec<f64>,
}

impl PsdEstimate {
    /// Frequency and power of the strongest bin
    pub fn peak(&self) -> Option<(f64, f64)> {
        self.power
            .iter()
            .enumerate()
            .max_by(|(_, a), (_, b)| a.total_cmp(b))
            .map(|(i, &p)| (self.frequencies[i], p))
    }

    /// Power of the bin closest to `freq`
    pub fn power_at(&self, freq: f64) -> Option<f64> {
        self.frequencies
            .iter()
            .enumerate()
            .min_by(|(_, a), (_, b)| (*a - freq).abs().total_cmp(&(*b - freq).abs()))
            .map(|(i, _)| self.power[i])
    }
}

/// Periodogram configuration
#[derive(Debug, Clone, PartialEq)]
pub struct PeriodogramConfig {
    /// Sampling frequency in Hz
    pub fs: f64,
    pub window: WindowType,
    /// FFT length (default: signal length; shorter values truncate the signal)
    pub nfft: Option<usize>,
    pub detrend: Detrend,
    pub scaling: Scaling,
}

impl Default for PeriodogramConfig {
    fn default() -> Self {
        Self {
            fs: 1.0,
            window: WindowType::Hann,
            nfft: None,
            detrend: Detrend::Constant,
            scaling: Scaling::Density,
        }
    }
}

/// Welch configuration
#[derive(Debug, Clone, PartialEq)]
pub struct WelchConfig {
    /// Sampling frequency in Hz
    pub fs: f64,
    pub window: WindowType,
    /// Segment length (default: 256, capped at the signal length)
    pub nperseg: Option<usize>,
    /// Samples shared by consecutive segments (default: nperseg / 2)
    pub noverlap: Option<usize>,
    /// FFT length per segment (default: nperseg)
    pub nfft: Option<usize>,
    pub detrend: Detrend,
    pub scaling: Scaling,
}

impl Default for WelchConfig {
    fn default() -> Self {
        Self {
            fs: 1.0,
            window: WindowType::Hann,
            nperseg: None,
            noverlap: None,
            nfft: None,
            detrend: Detrend::Constant,
            scaling: Scaling::Density,
        }
    }
}

/// Remove a constant or linear trend
pub fn detrend(x: &[f64], mode: Detrend) -> Vec<f64> {
    if x.is_empty() {
        return Vec::new();
    }
    let n = x.len() as f64;
    let mean = x.iter().sum::<f64>() / n;

    match mode {
        Detrend::None => x.to_vec(),
        Detrend::Constant => x.iter().map(|&v| v - mean).collect(),
        Detrend::Linear => {
            let t_mean = (n - 1.0) / 2.0;
            let (mut num, mut den) = (0.0, 0.0);
            for (i, &v) in x.iter().enumerate() {
                let dt = i as f64 - t_mean;
                num += dt * (v - mean);
                den += dt * dt;
            }
            let slope = if den > 0.0 { num / den } else { 0.0 };
            x.iter()
                .enumerate()
                .map(|(i, &v)| v - mean - slope * (i as f64 - t_mean))
                .collect()
        }
    }
}

/// Per-segment periodogram shared by both estimators
struct SegmentEstimator {
    window: Vec<f64>,
    engine: FftEngine,
    scale: f64,
    detrend: Detrend,
}

impl SegmentEstimator {
    fn new(
        window_type: WindowType,
        segment_length: usize,
        nfft: usize,
        fs: f64,
        scaling: Scaling,
        detrend: Detrend,
    ) -> Result<Self> {
        let window = get_window(window_type, segment_length)?;
        let scale = match scaling {
            Scaling::Density => 1.0 / (fs * window_energy(&window)),
            Scaling::Spectrum => 1.0 / window_sum(&window).powi(2),
        };
        if !scale.is_finite() {
            return Err(DspError::invalid(
                "window",
                format!("{window_type} window of length {segment_length} has zero gain"),
            ));
        }

        Ok(Self {
            window,
            engine: FftEngine::new(nfft)?,
            scale,
            detrend,
        })
    }

    fn estimate(&self, segment: &[f64]) -> Result<Vec<f64>> {
        let mut buffer = detrend(segment, self.detrend);
        apply_coefficients(&mut buffer, &self.window);
        let bins = self.engine.forward_real(&buffer)?;

        let nfft = self.engine.fft_size();
        let nyquist = (nfft % 2 == 0).then_some(nfft / 2);
        Ok(bins
            .iter()
            .enumerate()
            .map(|(k, c)| {
                let p = c.norm_sqr() * self.scale;
                if k == 0 || Some(k) == nyquist {
                    p
                } else {
                    2.0 * p
                }
            })
            .collect())
    }
}

/// Periodogram power spectral density estimate
pub fn periodogram(x: &[f64], config: &PeriodogramConfig) -> Result<PsdEstimate> {
    if x.is_empty() {
        return Err(DspError::invalid("x", "input signal cannot be empty"));
    }
    let fs = require_positive_f64("fs", config.fs)?;
    let nfft = require_positive("nfft", config.nfft.unwrap_or(x.len()))?;
    tracing::debug!(
        fs,
        window = %config.window,
        nfft,
        detrend = %config.detrend,
        scaling = %config.scaling,
        len = x.len(),
        "computing periodogram"
    );

    let segment = &x[..x.len().min(nfft)];
    let estimator = SegmentEstimator::new(
        config.window,
        segment.len(),
        nfft,
        fs,
        config.scaling,
        config.detrend,
    )?;

    Ok(PsdEstimate {
        frequencies: rfftfreq(nfft, fs)?,
        power: estimator.estimate(segment)?,
    })
}

/// Welch power spectral density estimate
///
/// Averages the periodograms of overlapping segments, trading frequency
/// resolution for lower estimator variance.
pub fn welch(x: &[f64], config: &WelchConfig) -> Result<PsdEstimate> {
    if x.is_empty() {
        return Err(DspError::invalid("x", "input signal cannot be empty"));
    }
    let fs = require_positive_f64("fs", config.fs)?;

    let mut nperseg = require_positive("nperseg", config.nperseg.unwrap_or(256))?;
    if nperseg > x.len() {
        if config.nperseg.is_some() {
            tracing::warn!(
                nperseg,
                len = x.len(),
                "nperseg is greater than the signal length, using nperseg = len"
            );
        }
        nperseg = x.len();
    }

    let noverlap = config.noverlap.unwrap_or(nperseg / 2);
    if noverlap >= nperseg {
        return Err(DspError::invalid(
            "noverlap",
            format!("noverlap ({noverlap}) must be less than nperseg ({nperseg})"),
        ));
    }

    let nfft = config.nfft.unwrap_or(nperseg);
    if nfft < nperseg {
        return Err(DspError::invalid(
            "nfft",
            format!("nfft ({nfft}) must be greater than or equal to nperseg ({nperseg})"),
        ));
    }

    let step = nperseg - noverlap;
    let n_segments = 1 + (x.len() - nperseg) / step;
    tracing::debug!(
        fs,
        window = %config.window,
        nperseg,
        noverlap,
        nfft,
        n_segments,
        detrend = %config.detrend,
        scaling = %config.scaling,
        "computing Welch PSD"
    );

    let estimator = SegmentEstimator::new(
        config.window,
        nperseg,
        nfft,
        fs,
        config.scaling,
        config.detrend,
    )?;

    let segments = try_map_indexed(n_segments, |i| {
        let start = i * step;
        estimator.estimate(&x[start..start + nperseg])
    })?;

    let mut power = vec![0.0; nfft / 2 + 1];
    for segment in &segments {
        for (acc, p) in power.iter_mut().zip(segment) {
            *acc += p;
        }
    }
    let count = n_segments as f64;
    for p in power.iter_mut() {
        *p /= count;
    }

    Ok(PsdEstimate {
        frequencies: rfftfreq(nfft, fs)?,
        power,
    })
}

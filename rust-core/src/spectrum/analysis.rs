//! High-level spectrum analyzer
//!
//! Combines the FFT engine with windowing for one-shot spectral analysis

use super::fft::{FftEngine, Spectrum};
use super::windowing::{apply_window, window_correction_factor};
use crate::error::{require_positive, require_positive_f64, Result};
use crate::windows::WindowType;

/// Spectrum analyzer configuration
#[derive(Debug, Clone, PartialEq)]
pub struct AnalyzerConfig {
    /// FFT size; `None` uses the length of each analyzed signal
    pub fft_size: Option<usize>,

    /// Window applied at the signal's own length before the transform
    pub window: Option<WindowType>,

    /// Sample rate in Hz
    pub sample_rate: f64,

    /// Undo the window's coherent gain in [`SpectrumAnalyzer::analyze_db`]
    pub apply_correction: bool,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            fft_size: None,
            window: Some(WindowType::Hann),
            sample_rate: 1.0,
            apply_correction: false,
        }
    }
}

/// Windowed FFT analyzer
#[derive(Debug, Clone)]
pub struct SpectrumAnalyzer {
    config: AnalyzerConfig,
    fft_engine: Option<FftEngine>,
}

impl SpectrumAnalyzer {
    /// Create new spectrum analyzer
    ///
    /// A fixed `fft_size` plans its transform once here.
    pub fn new(config: AnalyzerConfig) -> Result<Self> {
        require_positive_f64("sample_rate", config.sample_rate)?;
        let fft_engine = config.fft_size.map(FftEngine::new).transpose()?;

        Ok(Self { config, fft_engine })
    }

    /// Full complex spectrum of the windowed signal
    ///
    /// # Arguments
    /// * `signal` - Input signal, zero-padded or truncated to the FFT size
    ///
    /// # Returns
    /// All N bins with their signed frequency axis in Hz
    pub fn analyze(&self, signal: &[f64]) -> Result<Spectrum> {
        tracing::debug!(
            len = signal.len(),
            fft_size = ?self.config.fft_size,
            window = ?self.config.window,
            "analyzing spectrum"
        );

        let windowed;
        let input = match self.config.window {
            Some(window) if !signal.is_empty() => {
                windowed = apply_window(signal, window)?;
                windowed.as_slice()
            }
            _ => signal,
        };

        match &self.fft_engine {
            Some(engine) => engine.forward(input, self.config.sample_rate),
            None => {
                let n = require_positive("signal length", signal.len())?;
                FftEngine::new(n)?.forward(input, self.config.sample_rate)
            }
        }
    }

    /// One-sided magnitude in dB
    ///
    /// # Arguments
    /// * `signal` - Input signal
    /// * `reference` - Reference level for dB (0 dB at `reference`)
    ///
    /// # Returns
    /// `20 log10(|X[k]| / reference)` for bins 0..=N/2, floored at 1e-10 magnitude.
    /// With `apply_correction` the magnitudes are first scaled by the
    /// window's correction factor at the signal length.
    pub fn analyze_db(&self, signal: &[f64], reference: f64) -> Result<Vec<f64>> {
        require_positive_f64("reference", reference)?;
        let spectrum = self.analyze(signal)?;
        let one_sided = spectrum.len() / 2 + 1;

        let correction = match self.config.window {
            Some(window) if self.config.apply_correction => {
                window_correction_factor(window, signal.len())?
            }
            _ => 1.0,
        };

        Ok(spectrum.bins[..one_sided]
            .iter()
            .map(|bin| 20.0 * ((bin.norm() * correction).max(1e-10) / reference).log10())
            .collect())
    }

    /// Replace the configuration, replanning only when the FFT size changed
    pub fn update_config(&mut self, config: AnalyzerConfig) -> Result<()> {
        require_positive_f64("sample_rate", config.sample_rate)?;
        if config.fft_size != self.config.fft_size {
            self.fft_engine = config.fft_size.map(FftEngine::new).transpose()?;
        }
        self.config = config;
        Ok(())
    }

    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    fn argmax(values: &[f64]) -> usize {
        values
            .iter()
            .enumerate()
            .max_by(|(_, a), (_, b)| a.total_cmp(b))
            .map(|(i, _)| i)
            .unwrap()
    }

    #[test]
    fn test_analyzer_detects_tone() {
        let analyzer = SpectrumAnalyzer::new(AnalyzerConfig {
            sample_rate: 100.0,
            ..AnalyzerConfig::default()
        })
        .unwrap();

        // 10 Hz sine sampled at 100 Hz for one second
        let signal: Vec<f64> = (0..100)
            .map(|n| (2.0 * PI * 10.0 * n as f64 / 100.0).sin())
            .collect();

        let spectrum = analyzer.analyze(&signal).unwrap();
        assert_eq!(spectrum.len(), 100);

        let magnitude = spectrum.magnitude();
        let peak = argmax(&magnitude[..50]);
        assert!((spectrum.frequencies[peak] - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_fixed_fft_size_pads_and_truncates() {
        let analyzer = SpectrumAnalyzer::new(AnalyzerConfig {
            fft_size: Some(256),
            window: None,
            sample_rate: 48000.0,
            ..AnalyzerConfig::default()
        })
        .unwrap();

        assert_eq!(analyzer.analyze(&[1.0; 100]).unwrap().len(), 256);
        assert_eq!(analyzer.analyze(&[1.0; 1000]).unwrap().len(), 256);
    }

    #[test]
    fn test_window_is_applied_at_signal_length() {
        let analyzer = SpectrumAnalyzer::new(AnalyzerConfig {
            fft_size: Some(64),
            window: Some(WindowType::Hann),
            sample_rate: 1.0,
            ..AnalyzerConfig::default()
        })
        .unwrap();

        // DC bin equals the sum of the 32-point Hann window, not a 64-point one
        let spectrum = analyzer.analyze(&[1.0; 32]).unwrap();
        let window = crate::windows::get_window(WindowType::Hann, 32).unwrap();
        let expected: f64 = window.iter().sum();
        assert!((spectrum.bins[0].re - expected).abs() < 1e-9);
    }

    #[test]
    fn test_analyzer_db() {
        let analyzer = SpectrumAnalyzer::new(AnalyzerConfig {
            fft_size: Some(1024),
            window: None,
            sample_rate: 48000.0,
            ..AnalyzerConfig::default()
        })
        .unwrap();

        let spectrum_db = analyzer.analyze_db(&[1.0; 1024], 1.0).unwrap();
        assert_eq!(spectrum_db.len(), 513);

        // DC magnitude is 1024, about 60 dB; other bins sit at the floor
        assert!((spectrum_db[0] - 20.0 * 1024f64.log10()).abs() < 1e-9);
        assert!(spectrum_db[10] <= -199.0);
    }

    #[test]
    fn test_correction_restores_tone_level() {
        let fs = 1024.0;
        let signal: Vec<f64> = (0..1024)
            .map(|n| (2.0 * PI * 64.0 * n as f64 / fs).sin())
            .collect();

        let plain = SpectrumAnalyzer::new(AnalyzerConfig {
            window: None,
            sample_rate: fs,
            ..AnalyzerConfig::default()
        })
        .unwrap();
        let corrected = SpectrumAnalyzer::new(AnalyzerConfig {
            window: Some(WindowType::Hann),
            sample_rate: fs,
            apply_correction: true,
            ..AnalyzerConfig::default()
        })
        .unwrap();
        let uncorrected = SpectrumAnalyzer::new(AnalyzerConfig {
            window: Some(WindowType::Hann),
            sample_rate: fs,
            ..AnalyzerConfig::default()
        })
        .unwrap();

        let reference = plain.analyze_db(&signal, 1.0).unwrap()[64];
        let level = corrected.analyze_db(&signal, 1.0).unwrap()[64];
        assert!((level - reference).abs() < 0.05, "{level} vs {reference}");

        // Hann halves the coherent gain, about -6 dB without correction
        let raw = uncorrected.analyze_db(&signal, 1.0).unwrap()[64];
        assert!((reference - raw - 6.0).abs() < 0.1, "{raw} vs {reference}");
    }

    #[test]
    fn test_update_config_replans() {
        let mut analyzer = SpectrumAnalyzer::new(AnalyzerConfig::default()).unwrap();
        assert_eq!(analyzer.analyze(&[0.5; 10]).unwrap().len(), 10);

        analyzer
            .update_config(AnalyzerConfig {
                fft_size: Some(32),
                ..AnalyzerConfig::default()
            })
            .unwrap();
        assert_eq!(analyzer.config().fft_size, Some(32));
        assert_eq!(analyzer.analyze(&[0.5; 10]).unwrap().len(), 32);
    }

    #[test]
    fn test_invalid_configuration() {
        assert!(SpectrumAnalyzer::new(AnalyzerConfig {
            sample_rate: 0.0,
            ..AnalyzerConfig::default()
        })
        .is_err());
        assert!(SpectrumAnalyzer::new(AnalyzerConfig {
            fft_size: Some(0),
            ..AnalyzerConfig::default()
        })
        .is_err());

        let analyzer = SpectrumAnalyzer::new(AnalyzerConfig::default()).unwrap();
        assert!(analyzer.analyze(&[]).is_err());
        assert!(analyzer.analyze_db(&[1.0; 8], -1.0).is_err());
    }
}

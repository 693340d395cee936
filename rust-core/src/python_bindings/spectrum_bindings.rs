//! Python bindings for spectrum analysis

use super::signal_from;
use crate::spectrum::{AnalyzerConfig, SpectrumAnalyzer};
use crate::windows::WindowType;
use num_complex::Complex64;
use numpy::{PyArray1, PyReadonlyArrayDyn};
use pyo3::prelude::*;

fn parse_window(window: Option<&str>) -> PyResult<Option<WindowType>> {
    Ok(window.map(str::parse::<WindowType>).transpose()?)
}

/// Spectrum analyzer exposed to Python
#[pyclass(name = "SpectrumAnalyzer")]
pub struct PySpectrumAnalyzer {
    analyzer: SpectrumAnalyzer,
}

#[pymethods]
impl PySpectrumAnalyzer {
    /// Create a new spectrum analyzer
    ///
    /// Args:
    ///     fft_size: FFT size (default: length of each analyzed signal)
    ///     window: Window name, or None for no window
    ///     sample_rate: Sample rate in Hz
    ///     apply_correction: Undo the window's amplitude loss in analyze_db
    #[new]
    #[pyo3(signature = (fft_size=None, window=Some("hann"), sample_rate=1.0, apply_correction=false))]
    fn new(
        fft_size: Option<usize>,
        window: Option<&str>,
        sample_rate: f64,
        apply_correction: bool,
    ) -> PyResult<Self> {
        let config = AnalyzerConfig {
            fft_size,
            window: parse_window(window)?,
            sample_rate,
            apply_correction,
        };

        Ok(Self {
            analyzer: SpectrumAnalyzer::new(config)?,
        })
    }

    /// Analyze signal and return its full spectrum
    ///
    /// Returns:
    ///     (frequencies, spectrum) tuple
    fn analyze<'py>(
        &self,
        py: Python<'py>,
        signal: PyReadonlyArrayDyn<'py, f64>,
    ) -> PyResult<(&'py PyArray1<f64>, &'py PyArray1<Complex64>)> {
        let signal = signal_from(&signal)?;
        let spectrum = self.analyzer.analyze(&signal)?;

        Ok((
            PyArray1::from_vec(py, spectrum.frequencies),
            PyArray1::from_vec(py, spectrum.bins),
        ))
    }

    /// Analyze signal and return one-sided magnitude in dB
    ///
    /// Args:
    ///     signal: Input signal as numpy array
    ///     reference: Reference level for dB calculation (default: 1.0)
    #[pyo3(signature = (signal, reference=1.0))]
    fn analyze_db<'py>(
        &self,
        py: Python<'py>,
        signal: PyReadonlyArrayDyn<'py, f64>,
        reference: f64,
    ) -> PyResult<&'py PyArray1<f64>> {
        let signal = signal_from(&signal)?;
        let spectrum = self.analyzer.analyze_db(&signal, reference)?;

        Ok(PyArray1::from_vec(py, spectrum))
    }

    /// Update configuration; omitted arguments keep their current value
    #[pyo3(signature = (fft_size=None, window=None, sample_rate=None, apply_correction=None))]
    fn update_config(
        &mut self,
        fft_size: Option<usize>,
        window: Option<&str>,
        sample_rate: Option<f64>,
        apply_correction: Option<bool>,
    ) -> PyResult<()> {
        let mut config = self.analyzer.config().clone();

        if let Some(size) = fft_size {
            config.fft_size = Some(size);
        }
        if window.is_some() {
            config.window = parse_window(window)?;
        }
        if let Some(sr) = sample_rate {
            config.sample_rate = sr;
        }
        if let Some(corr) = apply_correction {
            config.apply_correction = corr;
        }

        Ok(self.analyzer.update_config(config)?)
    }

    /// Get current sample rate
    fn get_sample_rate(&self) -> f64 {
        self.analyzer.config().sample_rate
    }

    /// Get current FFT size, None when it follows the signal length
    fn get_fft_size(&self) -> Option<usize> {
        self.analyzer.config().fft_size
    }
}

//! Python bindings for convolution, correlation, PSD and envelopes

use super::signal_from;
use crate::convolution::{self, ConvolutionMethod, ConvolveMode};
use crate::envelope::{EnvelopeDetector, RmsEnergy};
use crate::error::{DspError, Result};
use crate::spectrum::{self, PeriodogramConfig, WelchConfig};
use numpy::{PyArray1, PyReadonlyArrayDyn};
use pyo3::prelude::*;
use pyo3::types::PyDict;
use std::sync::Arc;

/// Linear convolution
#[pyfunction]
#[pyo3(signature = (signal, kernel, mode="same", method="auto"))]
pub fn convolve<'py>(
    py: Python<'py>,
    signal: PyReadonlyArrayDyn<'py, f64>,
    kernel: PyReadonlyArrayDyn<'py, f64>,
    mode: &str,
    method: &str,
) -> PyResult<&'py PyArray1<f64>> {
    let signal = signal_from(&signal)?;
    let kernel = signal_from(&kernel)?;
    let result = convolution::convolve_with(&signal, &kernel, mode.parse()?, method.parse()?)?;
    Ok(PyArray1::from_vec(py, result))
}

/// Cross-correlation; in full mode index i holds lag i - (len(in2) - 1)
#[pyfunction]
#[pyo3(signature = (in1, in2, mode="full", method="auto"))]
pub fn correlate<'py>(
    py: Python<'py>,
    in1: PyReadonlyArrayDyn<'py, f64>,
    in2: PyReadonlyArrayDyn<'py, f64>,
    mode: &str,
    method: &str,
) -> PyResult<&'py PyArray1<f64>> {
    let x = signal_from(&in1)?;
    let y = signal_from(&in2)?;
    let mode: ConvolveMode = mode.parse()?;
    let method: ConvolutionMethod = method.parse()?;
    Ok(PyArray1::from_vec(py, convolution::correlate(&x, &y, mode, method)?))
}

/// Auto-correlation; in full mode the zero lag sits at index len(x) - 1
#[pyfunction]
#[pyo3(signature = (x, mode="full", method="auto"))]
pub fn autocorrelate<'py>(
    py: Python<'py>,
    x: PyReadonlyArrayDyn<'py, f64>,
    mode: &str,
    method: &str,
) -> PyResult<&'py PyArray1<f64>> {
    let x = signal_from(&x)?;
    let result = convolution::autocorrelate(&x, mode.parse()?, method.parse()?)?;
    Ok(PyArray1::from_vec(py, result))
}

/// Periodogram PSD estimate
///
/// Returns:
///     (frequencies, power) tuple
#[pyfunction]
#[pyo3(signature = (x, fs=1.0, window="hann", nfft=None, detrend="constant", scaling="density"))]
pub fn periodogram<'py>(
    py: Python<'py>,
    x: PyReadonlyArrayDyn<'py, f64>,
    fs: f64,
    window: &str,
    nfft: Option<usize>,
    detrend: &str,
    scaling: &str,
) -> PyResult<(&'py PyArray1<f64>, &'py PyArray1<f64>)> {
    let x = signal_from(&x)?;
    let config = PeriodogramConfig {
        fs,
        window: window.parse()?,
        nfft,
        detrend: detrend.parse()?,
        scaling: scaling.parse()?,
    };

    let estimate = spectrum::periodogram(&x, &config)?;
    Ok((
        PyArray1::from_vec(py, estimate.frequencies),
        PyArray1::from_vec(py, estimate.power),
    ))
}

/// Welch PSD estimate
///
/// Returns:
///     (frequencies, power) tuple
#[pyfunction]
#[pyo3(signature = (x, fs=1.0, window="hann", nperseg=None, noverlap=None, nfft=None, detrend="constant", scaling="density"))]
#[allow(clippy::too_many_arguments)]
pub fn welch<'py>(
    py: Python<'py>,
    x: PyReadonlyArrayDyn<'py, f64>,
    fs: f64,
    window: &str,
    nperseg: Option<usize>,
    noverlap: Option<usize>,
    nfft: Option<usize>,
    detrend: &str,
    scaling: &str,
) -> PyResult<(&'py PyArray1<f64>, &'py PyArray1<f64>)> {
    let x = signal_from(&x)?;
    let config = WelchConfig {
        fs,
        window: window.parse()?,
        nperseg,
        noverlap,
        nfft,
        detrend: detrend.parse()?,
        scaling: scaling.parse()?,
    };

    let estimate = spectrum::welch(&x, &config)?;
    Ok((
        PyArray1::from_vec(py, estimate.frequencies),
        PyArray1::from_vec(py, estimate.power),
    ))
}

/// RMS capability backed by a Python callable
///
/// Called as `rms(y=..., frame_length=..., hop_length=..., center=...)`,
/// matching `librosa.feature.rms`; the result is flattened.
struct PyRmsEnergy {
    callable: PyObject,
}

impl RmsEnergy for PyRmsEnergy {
    fn rms_energy(
        &self,
        signal: &[f64],
        frame_length: usize,
        hop_length: usize,
        center: bool,
    ) -> Result<Vec<f64>> {
        Python::with_gil(|py| {
            let call = || -> PyResult<Vec<f64>> {
                let kwargs = PyDict::new(py);
                kwargs.set_item("y", PyArray1::from_slice(py, signal))?;
                kwargs.set_item("frame_length", frame_length)?;
                kwargs.set_item("hop_length", hop_length)?;
                kwargs.set_item("center", center)?;

                let result = self.callable.call(py, (), Some(kwargs))?;
                let array: PyReadonlyArrayDyn<'_, f64> = result.extract(py)?;
                let values = array.as_array().iter().copied().collect();
                Ok(values)
            };
            call().map_err(|err| DspError::Computation(format!("RMS callable failed: {err}")))
        })
    }
}

/// Amplitude envelope
///
/// Args:
///     y: 1-D input signal
///     method: "hilbert" or "rms"
///     frame_length: Frame length, required for "rms"
///     hop_length: Hop length, required for "rms"
///     rms: Callable computing frame RMS (e.g. librosa.feature.rms), required for "rms"
#[pyfunction]
#[pyo3(signature = (y, method="hilbert", frame_length=None, hop_length=None, rms=None))]
pub fn amplitude_envelope<'py>(
    py: Python<'py>,
    y: PyReadonlyArrayDyn<'py, f64>,
    method: &str,
    frame_length: Option<usize>,
    hop_length: Option<usize>,
    rms: Option<PyObject>,
) -> PyResult<&'py PyArray1<f64>> {
    let signal = signal_from(&y)?;
    let detector = match rms {
        Some(callable) => EnvelopeDetector::with_rms(Arc::new(PyRmsEnergy { callable })),
        None => EnvelopeDetector::new(),
    };

    let envelope = detector.envelope(&signal, method.parse()?, frame_length, hop_length)?;
    Ok(PyArray1::from_vec(py, envelope))
}

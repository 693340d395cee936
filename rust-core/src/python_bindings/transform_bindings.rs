//! Python bindings for FFT, STFT, CQT and windows

use super::signal_from;
use crate::spectrum::{self, CqtConfig, PadMode, StftConfig};
use crate::windows::{self, WindowType};
use num_complex::Complex64;
use numpy::{IntoPyArray, PyArray1, PyArray2, PyReadonlyArray1, PyReadonlyArrayDyn};
use pyo3::exceptions::PyRuntimeWarning;
use pyo3::prelude::*;

/// Full complex FFT of a real signal
///
/// Args:
///     data: 1-D input signal
///     fs: Sampling frequency in Hz
///     n: FFT length (zero-pads or truncates; default: len(data))
///     window: Optional window name applied at the signal's length.
///         Defaults to None, an unwindowed transform like the core fft;
///         pass window="hann" for a Hann-windowed spectrum.
///
/// Returns:
///     (frequencies, spectrum) tuple
#[pyfunction]
#[pyo3(signature = (data, fs=1.0, n=None, window=None))]
pub fn fft<'py>(
    py: Python<'py>,
    data: PyReadonlyArrayDyn<'py, f64>,
    fs: f64,
    n: Option<usize>,
    window: Option<&str>,
) -> PyResult<(&'py PyArray1<f64>, &'py PyArray1<Complex64>)> {
    let signal = signal_from(&data)?;
    let signal = match window {
        Some(name) if !signal.is_empty() => {
            spectrum::apply_window(&signal, name.parse::<WindowType>()?)?
        }
        _ => signal,
    };

    let spectrum = spectrum::fft(&signal, n, fs)?;
    Ok((
        PyArray1::from_vec(py, spectrum.frequencies),
        PyArray1::from_vec(py, spectrum.bins),
    ))
}

/// Inverse FFT returning the real part
///
/// Emits a RuntimeWarning when the discarded imaginary part is not negligible.
#[pyfunction]
#[pyo3(signature = (spectrum, n=None))]
pub fn ifft<'py>(
    py: Python<'py>,
    spectrum: PyReadonlyArray1<'py, Complex64>,
    n: Option<usize>,
) -> PyResult<&'py PyArray1<f64>> {
    let bins = spectrum.as_array().to_vec();
    let reconstruction = spectrum::ifft(&bins, n)?;

    if let Some(warning) = reconstruction.warning {
        PyErr::warn(py, py.get_type::<PyRuntimeWarning>(), &warning.to_string(), 1)?;
    }
    Ok(PyArray1::from_vec(py, reconstruction.signal))
}

/// Short-time Fourier transform, shape (1 + n_fft / 2, n_frames)
#[pyfunction]
#[pyo3(signature = (y, n_fft=2048, hop_length=None, win_length=None, window="hann", center=true, pad_mode="constant"))]
#[allow(clippy::too_many_arguments)]
pub fn stft<'py>(
    py: Python<'py>,
    y: PyReadonlyArrayDyn<'py, f64>,
    n_fft: usize,
    hop_length: Option<usize>,
    win_length: Option<usize>,
    window: &str,
    center: bool,
    pad_mode: &str,
) -> PyResult<&'py PyArray2<Complex64>> {
    let signal = signal_from(&y)?;
    let config = StftConfig {
        n_fft,
        hop_length,
        win_length,
        window: window.parse()?,
        center,
        pad_mode: pad_mode.parse::<PadMode>()?,
    };

    Ok(spectrum::stft(&signal, &config)?.into_pyarray(py))
}

/// Constant-Q transform, shape (n_bins, 1 + len(y) / hop_length)
#[pyfunction]
#[pyo3(signature = (y, sr, hop_length=512, fmin=None, n_bins=84, bins_per_octave=12, tuning=0.0, filter_scale=1.0, window="hann"))]
#[allow(clippy::too_many_arguments)]
pub fn cqt<'py>(
    py: Python<'py>,
    y: PyReadonlyArrayDyn<'py, f64>,
    sr: f64,
    hop_length: usize,
    fmin: Option<f64>,
    n_bins: usize,
    bins_per_octave: usize,
    tuning: f64,
    filter_scale: f64,
    window: &str,
) -> PyResult<&'py PyArray2<Complex64>> {
    let signal = signal_from(&y)?;
    let config = CqtConfig {
        hop_length,
        fmin,
        n_bins,
        bins_per_octave,
        filter_scale,
        tuning,
        window: window.parse()?,
    };

    Ok(spectrum::cqt(&signal, sr, &config)?.into_pyarray(py))
}

/// Symmetric window coefficients
#[pyfunction]
#[pyo3(signature = (window_type, length))]
pub fn get_window<'py>(
    py: Python<'py>,
    window_type: &str,
    length: usize,
) -> PyResult<&'py PyArray1<f64>> {
    let coefficients = windows::get_window(window_type.parse()?, length)?;
    Ok(PyArray1::from_vec(py, coefficients))
}

/// Multiply a signal by a window of the same length
#[pyfunction]
#[pyo3(signature = (data, window_type="hann"))]
pub fn apply_window<'py>(
    py: Python<'py>,
    data: PyReadonlyArrayDyn<'py, f64>,
    window_type: &str,
) -> PyResult<&'py PyArray1<f64>> {
    let signal = signal_from(&data)?;
    let windowed = spectrum::apply_window(&signal, window_type.parse()?)?;
    Ok(PyArray1::from_vec(py, windowed))
}

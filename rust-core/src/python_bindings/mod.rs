//! PyO3 bindings for Python integration

use crate::error::DspError;
use crate::signal::as_signal;
use numpy::PyReadonlyArrayDyn;
use pyo3::exceptions::{PyRuntimeError, PyValueError};
use pyo3::prelude::*;

mod analysis_bindings;
mod spectrum_bindings;
mod transform_bindings;

impl From<DspError> for PyErr {
    fn from(err: DspError) -> Self {
        if err.is_input_error() {
            PyValueError::new_err(err.to_string())
        } else {
            PyRuntimeError::new_err(err.to_string())
        }
    }
}

/// Copy a NumPy array into a signal, rejecting anything that is not 1-D
pub(crate) fn signal_from(array: &PyReadonlyArrayDyn<'_, f64>) -> PyResult<Vec<f64>> {
    Ok(as_signal(array.as_array())?.to_vec())
}

/// Python module definition
#[pymodule]
fn sygnals(_py: Python, m: &PyModule) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(transform_bindings::fft, m)?)?;
    m.add_function(wrap_pyfunction!(transform_bindings::ifft, m)?)?;
    m.add_function(wrap_pyfunction!(transform_bindings::stft, m)?)?;
    m.add_function(wrap_pyfunction!(transform_bindings::cqt, m)?)?;
    m.add_function(wrap_pyfunction!(transform_bindings::get_window, m)?)?;
    m.add_function(wrap_pyfunction!(transform_bindings::apply_window, m)?)?;

    m.add_function(wrap_pyfunction!(analysis_bindings::convolve, m)?)?;
    m.add_function(wrap_pyfunction!(analysis_bindings::correlate, m)?)?;
    m.add_function(wrap_pyfunction!(analysis_bindings::autocorrelate, m)?)?;
    m.add_function(wrap_pyfunction!(analysis_bindings::periodogram, m)?)?;
    m.add_function(wrap_pyfunction!(analysis_bindings::welch, m)?)?;
    m.add_function(wrap_pyfunction!(analysis_bindings::amplitude_envelope, m)?)?;

    m.add_class::<spectrum_bindings::PySpectrumAnalyzer>()?;

    Ok(())
}

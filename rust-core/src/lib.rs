//! Sygnals - Signal Analysis Transform Core
//!
//! FFT, STFT, constant-Q and power-spectral-density transforms plus
//! convolution, correlation and envelope detection over real 1-D signals,
//! with optional Python bindings.

// Suppress PyO3 non-local impl warnings (harmless macro-generated code)
#![cfg_attr(feature = "python", allow(non_local_definitions))]

pub mod convolution;
pub mod envelope;
pub mod error;
mod parallel;
pub mod signal;
pub mod spectrum;
pub mod windows;

#[cfg(feature = "python")]
pub mod python_bindings;

pub use convolution::{autocorrelate, convolve, correlate, ConvolutionMethod, ConvolveMode};
pub use envelope::{EnvelopeDetector, EnvelopeMethod, RmsEnergy};
pub use error::{DspError, NumericalWarning, Result};
pub use signal::as_signal;
pub use spectrum::{CqtConfig, PeriodogramConfig, SpectrumAnalyzer, StftConfig, WelchConfig};
pub use windows::{get_window, WindowType};

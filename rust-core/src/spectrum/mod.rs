//! Spectral transforms built on a shared FFT kernel

pub mod analysis;
pub mod cqt;
pub mod fft;
pub mod framing;
pub mod psd;
pub mod stft;
pub mod windowing;

pub use analysis::{AnalyzerConfig, SpectrumAnalyzer};
pub use cqt::{cqt, cqt_frequencies, CqtConfig};
pub use fft::{fft, fftfreq, ifft, rfftfreq, FftEngine, Reconstruction, Spectrum};
pub use framing::{frame, Frames, PadMode};
pub use psd::{periodogram, welch, Detrend, PeriodogramConfig, PsdEstimate, Scaling, WelchConfig};
pub use stft::{stft, stft_frequencies, StftConfig};
pub use windowing::apply_window;

//! Linear convolution and correlation

pub mod correlation;
pub mod fast_conv;

pub use correlation::{autocorrelate, correlate, correlation_lags, estimate_delay};
pub use fast_conv::{
    convolve, convolve_with, direct_convolve, fft_convolve, ConvolutionMethod, ConvolveMode,
    FftConvolver,
};

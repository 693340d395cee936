//! FFT engine for real-valued signals
//!
//! Forward/inverse discrete Fourier transforms over an arbitrary length N
//! (zero-padding or truncating the input), plus frequency-axis helpers.

use crate::error::{
    require_positive, require_positive_f64, DspError, NumericalWarning, Result, IMAG_TOLERANCE,
};
use num_complex::Complex64;
use realfft::{RealFftPlanner, RealToComplex};
use rustfft::{Fft, FftPlanner};
use std::sync::Arc;

/// Frequency axis paired with complex bins of the same length
#[derive(Debug, Clone, PartialEq)]
pub struct Spectrum {
    /// Signed frequencies in Hz (see [`fftfreq`])
    pub frequencies: Vec<f64>,

    /// Complex DFT bins
    pub bins: Vec<Complex64>,
}

impl Spectrum {
    pub fn len(&self) -> usize {
        self.bins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bins.is_empty()
    }

    /// |X[k]|
    pub fn magnitude(&self) -> Vec<f64> {
        self.bins.iter().map(|c| c.norm()).collect()
    }

    /// |X[k]|^2
    pub fn power(&self) -> Vec<f64> {
        self.bins.iter().map(|c| c.norm_sqr()).collect()
    }

    /// Total spectral energy, sum(|X[k]|^2) / N
    ///
    /// Equals the time-domain energy of the transformed segment (Parseval).
    pub fn energy(&self) -> f64 {
        if self.bins.is_empty() {
            return 0.0;
        }
        self.bins.iter().map(|c| c.norm_sqr()).sum::<f64>() / self.bins.len() as f64
    }
}

/// Real signal recovered by an inverse transform
#[derive(Debug, Clone, PartialEq)]
pub struct Reconstruction {
    /// Real part of the inverse transform
    pub signal: Vec<f64>,

    /// Set when the discarded imaginary part exceeded [`IMAG_TOLERANCE`]
    pub warning: Option<NumericalWarning>,
}

impl Reconstruction {
    pub fn into_signal(self) -> Vec<f64> {
        self.signal
    }
}

/// FFT engine for a fixed transform length
///
/// Plans are created once and shared read-only; every call owns its
/// working buffers, so one engine can serve many threads.
#[derive(Clone)]
pub struct FftEngine {
    /// FFT size (number of samples)
    fft_size: usize,

    /// Complex forward transform
    forward: Arc<dyn Fft<f64>>,

    /// Complex inverse transform (unnormalized)
    inverse: Arc<dyn Fft<f64>>,

    /// Real-to-complex forward transform
    r2c: Arc<dyn RealToComplex<f64>>,
}

impl std::fmt::Debug for FftEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FftEngine")
            .field("fft_size", &self.fft_size)
            .finish_non_exhaustive()
    }
}

impl FftEngine {
    /// Create new FFT engine
    ///
    /// # Arguments
    /// * `fft_size` - FFT size (number of samples, any length >= 1)
    pub fn new(fft_size: usize) -> Result<Self> {
        require_positive("n", fft_size)?;

        let mut planner = FftPlanner::<f64>::new();
        let forward = planner.plan_fft_forward(fft_size);
        let inverse = planner.plan_fft_inverse(fft_size);

        let mut real_planner = RealFftPlanner::<f64>::new();
        let r2c = real_planner.plan_fft_forward(fft_size);

        Ok(Self {
            fft_size,
            forward,
            inverse,
            r2c,
        })
    }

    /// Get FFT size
    pub fn fft_size(&self) -> usize {
        self.fft_size
    }

    /// Get number of one-sided frequency bins (fft_size/2 + 1)
    pub fn num_bins(&self) -> usize {
        self.fft_size / 2 + 1
    }

    /// Full length-N DFT of `signal` with its signed frequency axis
    ///
    /// The input is zero-padded when shorter than N and truncated when longer.
    pub fn forward(&self, signal: &[f64], fs: f64) -> Result<Spectrum> {
        require_positive_f64("fs", fs)?;
        let bins = self.forward_complex(signal);
        Ok(Spectrum {
            frequencies: fftfreq(self.fft_size, fs)?,
            bins,
        })
    }

    /// Full complex DFT without a frequency axis
    pub fn forward_complex(&self, signal: &[f64]) -> Vec<Complex64> {
        let mut buffer = vec![Complex64::new(0.0, 0.0); self.fft_size];
        let copy_len = signal.len().min(self.fft_size);
        for (dst, &src) in buffer.iter_mut().zip(&signal[..copy_len]) {
            dst.re = src;
        }
        self.forward.process(&mut buffer);
        buffer
    }

    /// In-place inverse transform scaled by 1/N; `buffer` must be `fft_size` long
    pub(crate) fn inverse_in_place(&self, buffer: &mut [Complex64]) {
        self.inverse.process(buffer);
        let scale = 1.0 / self.fft_size as f64;
        for c in buffer.iter_mut() {
            *c *= scale;
        }
    }

    /// One-sided DFT of a real signal, bins 0..=N/2
    pub fn forward_real(&self, signal: &[f64]) -> Result<Vec<Complex64>> {
        let mut input = self.r2c.make_input_vec();
        let copy_len = signal.len().min(self.fft_size);
        input[..copy_len].copy_from_slice(&signal[..copy_len]);

        let mut output = self.r2c.make_output_vec();
        self.r2c
            .process(&mut input, &mut output)
            .map_err(|e| DspError::Computation(format!("real FFT failed: {e}")))?;
        Ok(output)
    }

    /// Inverse DFT returning the real part
    ///
    /// `bins` is zero-padded or truncated to N. A [`NumericalWarning`] is
    /// attached when the discarded imaginary part is larger than
    /// [`IMAG_TOLERANCE`]; this happens when the bins lack conjugate symmetry.
    pub fn inverse(&self, bins: &[Complex64]) -> Reconstruction {
        let mut buffer = vec![Complex64::new(0.0, 0.0); self.fft_size];
        let copy_len = bins.len().min(self.fft_size);
        buffer[..copy_len].copy_from_slice(&bins[..copy_len]);

        self.inverse_in_place(&mut buffer);

        let max_residue = buffer.iter().map(|c| c.im.abs()).fold(0.0, f64::max);
        let warning = if max_residue > IMAG_TOLERANCE {
            tracing::warn!(
                max_residue,
                "significant imaginary part in inverse FFT; input spectrum may lack conjugate symmetry"
            );
            Some(NumericalWarning {
                max_residue,
                tolerance: IMAG_TOLERANCE,
            })
        } else {
            None
        };

        Reconstruction {
            signal: buffer.into_iter().map(|c| c.re).collect(),
            warning,
        }
    }
}

/// Length-`n` DFT of `signal` sampled at `fs`
pub fn fft(signal: &[f64], n: Option<usize>, fs: f64) -> Result<Spectrum> {
    let n = n.unwrap_or(signal.len());
    tracing::debug!(n, fs, len = signal.len(), "computing FFT");
    FftEngine::new(n)?.forward(signal, fs)
}

/// Length-`n` inverse DFT, real part only
pub fn ifft(bins: &[Complex64], n: Option<usize>) -> Result<Reconstruction> {
    let n = n.unwrap_or(bins.len());
    tracing::debug!(n, len = bins.len(), "computing inverse FFT");
    Ok(FftEngine::new(n)?.inverse(bins))
}

/// Signed frequency of every bin of a length-`n` DFT
///
/// Bins 0..=(n-1)/2 are non-negative and ascending; the remaining bins
/// are negative, ascending toward zero. Bin k maps to k*fs/n.
pub fn fftfreq(n: usize, fs: f64) -> Result<Vec<f64>> {
    require_positive("n", n)?;
    require_positive_f64("fs", fs)?;
    let positive = (n - 1) / 2 + 1;
    let step = fs / n as f64;
    Ok((0..n)
        .map(|k| {
            if k < positive {
                k as f64 * step
            } else {
                -((n - k) as f64) * step
            }
        })
        .collect())
}

/// Non-negative frequencies of the one-sided spectrum, bins 0..=n/2
pub fn rfftfreq(n: usize, fs: f64) -> Result<Vec<f64>> {
    require_positive("n", n)?;
    require_positive_f64("fs", fs)?;
    let step = fs / n as f64;
    Ok((0..=n / 2).map(|k| k as f64 * step).collect())
}

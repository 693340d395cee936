//! FFT-based linear convolution
//!
//! Zero-pads both sequences to a power of two >= N+M-1 so the circular
//! product of their spectra equals the linear convolution.
//! Complexity: O((N+M) log(N+M)) vs O(N*M) for the direct sum.

use crate::error::{DspError, Result};
use crate::spectrum::fft::FftEngine;
use num_complex::Complex64;
use std::fmt;
use std::str::FromStr;

/// Which part of the full convolution is returned
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConvolveMode {
    /// Every overlap, length N+M-1
    #[default]
    Full,
    /// Only full overlaps, length max(N,M)-min(N,M)+1
    Valid,
    /// Length max(N,M), centered within the full result
    Same,
}

impl ConvolveMode {
    /// Output length for inputs of length `n` and `m` (both >= 1)
    pub fn output_len(&self, n: usize, m: usize) -> usize {
        match self {
            ConvolveMode::Full => n + m - 1,
            ConvolveMode::Valid => n.max(m) - n.min(m) + 1,
            ConvolveMode::Same => n.max(m),
        }
    }

    /// Index into the full result where this mode's output starts
    pub fn start(&self, n: usize, m: usize) -> usize {
        match self {
            ConvolveMode::Full => 0,
            ConvolveMode::Valid => n.min(m) - 1,
            ConvolveMode::Same => (n.min(m) - 1) / 2,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ConvolveMode::Full => "full",
            ConvolveMode::Valid => "valid",
            ConvolveMode::Same => "same",
        }
    }
}

impl fmt::Display for ConvolveMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ConvolveMode {
    type Err = DspError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "full" => Ok(ConvolveMode::Full),
            "valid" => Ok(ConvolveMode::Valid),
            "same" => Ok(ConvolveMode::Same),
            other => Err(DspError::invalid(
                "mode",
                format!("unsupported mode '{other}', expected full, valid or same"),
            )),
        }
    }
}

/// Algorithm used to evaluate a convolution or correlation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConvolutionMethod {
    /// Direct for small problems, FFT otherwise
    #[default]
    Auto,
    Direct,
    Fft,
}

impl ConvolutionMethod {
    /// Concrete method for inputs of length `n` and `m`
    pub fn resolve(&self, n: usize, m: usize) -> ConvolutionMethod {
        match self {
            ConvolutionMethod::Auto => {
                if n.min(m) <= 16 || n.saturating_mul(m) <= 1 << 14 {
                    ConvolutionMethod::Direct
                } else {
                    ConvolutionMethod::Fft
                }
            }
            other => *other,
        }
    }
}

impl fmt::Display for ConvolutionMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ConvolutionMethod::Auto => "auto",
            ConvolutionMethod::Direct => "direct",
            ConvolutionMethod::Fft => "fft",
        })
    }
}

impl FromStr for ConvolutionMethod {
    type Err = DspError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "auto" => Ok(ConvolutionMethod::Auto),
            "direct" => Ok(ConvolutionMethod::Direct),
            "fft" => Ok(ConvolutionMethod::Fft),
            other => Err(DspError::invalid(
                "method",
                format!("unsupported method '{other}', expected auto, direct or fft"),
            )),
        }
    }
}

/// Convolver holding a kernel spectrum, reusable for any input up to `max_input_len`
pub struct FftConvolver {
    /// Kernel coefficients in frequency domain
    kernel_fft: Vec<Complex64>,

    /// Kernel length
    kernel_len: usize,

    /// Longest input the FFT size accommodates
    max_input_len: usize,

    engine: FftEngine,
}

impl FftConvolver {
    /// Create new FFT convolver
    ///
    /// # Note
    /// FFT size is chosen as next power of 2 >= (max_input_len + kernel_len - 1)
    pub fn new(kernel: &[f64], max_input_len: usize) -> Result<Self> {
        if kernel.is_empty() {
            return Err(DspError::invalid("kernel", "kernel cannot be empty"));
        }
        if max_input_len == 0 {
            return Err(DspError::invalid("data", "input cannot be empty"));
        }

        let fft_size = (max_input_len + kernel.len() - 1).next_power_of_two();
        let engine = FftEngine::new(fft_size)?;
        let kernel_fft = engine.forward_complex(kernel);

        Ok(Self {
            kernel_fft,
            kernel_len: kernel.len(),
            max_input_len,
            engine,
        })
    }

    pub fn fft_size(&self) -> usize {
        self.engine.fft_size()
    }

    pub fn kernel_len(&self) -> usize {
        self.kernel_len
    }

    /// Full linear convolution of `data` with the kernel
    pub fn full(&self, data: &[f64]) -> Result<Vec<f64>> {
        if data.is_empty() {
            return Err(DspError::invalid("data", "input cannot be empty"));
        }
        if data.len() > self.max_input_len {
            return Err(DspError::invalid(
                "data",
                format!(
                    "input length {} exceeds the planned maximum {}",
                    data.len(),
                    self.max_input_len
                ),
            ));
        }

        // 1. Forward FFT of the zero-padded input
        let mut buffer = self.engine.forward_complex(data);

        // 2. Multiply in frequency domain (convolution in time domain)
        for (x, h) in buffer.iter_mut().zip(&self.kernel_fft) {
            *x *= h;
        }

        // 3. Inverse FFT, scaled by 1/N
        self.engine.inverse_in_place(&mut buffer);

        Ok(buffer[..data.len() + self.kernel_len - 1]
            .iter()
            .map(|c| c.re)
            .collect())
    }
}

fn check_inputs(data: &[f64], kernel: &[f64]) -> Result<()> {
    if data.is_empty() {
        return Err(DspError::invalid("data", "input cannot be empty"));
    }
    if kernel.is_empty() {
        return Err(DspError::invalid("kernel", "kernel cannot be empty"));
    }
    Ok(())
}

fn trim(full: Vec<f64>, n: usize, m: usize, mode: ConvolveMode) -> Vec<f64> {
    if mode == ConvolveMode::Full {
        return full;
    }
    let start = mode.start(n, m);
    full[start..start + mode.output_len(n, m)].to_vec()
}

/// Convolution via the convolution theorem
pub fn fft_convolve(data: &[f64], kernel: &[f64], mode: ConvolveMode) -> Result<Vec<f64>> {
    check_inputs(data, kernel)?;
    let full = FftConvolver::new(kernel, data.len())?.full(data)?;
    Ok(trim(full, data.len(), kernel.len(), mode))
}

/// Convolution by direct summation, O(N*M)
pub fn direct_convolve(data: &[f64], kernel: &[f64], mode: ConvolveMode) -> Result<Vec<f64>> {
    check_inputs(data, kernel)?;
    let mut full = vec![0.0; data.len() + kernel.len() - 1];
    for (i, &x) in data.iter().enumerate() {
        for (j, &h) in kernel.iter().enumerate() {
            full[i + j] += x * h;
        }
    }
    Ok(trim(full, data.len(), kernel.len(), mode))
}

/// Linear convolution of two sequences, method chosen automatically
pub fn convolve(data: &[f64], kernel: &[f64], mode: ConvolveMode) -> Result<Vec<f64>> {
    convolve_with(data, kernel, mode, ConvolutionMethod::Auto)
}

/// Linear convolution of two sequences using `method`
pub fn convolve_with(
    data: &[f64],
    kernel: &[f64],
    mode: ConvolveMode,
    method: ConvolutionMethod,
) -> Result<Vec<f64>> {
    check_inputs(data, kernel)?;
    let resolved = method.resolve(data.len(), kernel.len());
    tracing::debug!(
        data_len = data.len(),
        kernel_len = kernel.len(),
        %mode,
        method = %resolved,
        "applying convolution"
    );

    match resolved {
        ConvolutionMethod::Direct => direct_convolve(data, kernel, mode),
        _ => fft_convolve(data, kernel, mode),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn sequence(len: usize, seed: f64) -> Vec<f64> {
        (0..len)
            .map(|i| ((i as f64 + seed) * 0.731).sin() * (1.0 + i as f64 * 0.01))
            .collect()
    }

    #[test]
    fn test_identity_kernel_same_mode() {
        let out = convolve(&[1.0, 2.0, 3.0], &[1.0], ConvolveMode::Same).unwrap();
        assert_eq!(out, vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_fft_convolver_impulse() {
        // Simple 5-tap kernel
        let h = vec![0.1, 0.2, 0.4, 0.2, 0.1];
        let convolver = FftConvolver::new(&h, 32).unwrap();
        assert_eq!(convolver.fft_size(), 64);

        // Impulse input
        let mut input = vec![0.0; 32];
        input[0] = 1.0;

        let output = convolver.full(&input).unwrap();
        assert_eq!(output.len(), 36);

        // First 5 samples should match kernel coefficients
        for (i, &expected) in h.iter().enumerate() {
            assert!(
                (output[i] - expected).abs() < 1e-10,
                "Mismatch at {}: {} vs {}",
                i,
                output[i],
                expected
            );
        }
    }

    #[test]
    fn test_fft_vs_direct() {
        let data = sequence(300, 0.0);
        let kernel = sequence(41, 3.0);

        for mode in [ConvolveMode::Full, ConvolveMode::Valid, ConvolveMode::Same] {
            let fast = fft_convolve(&data, &kernel, mode).unwrap();
            let direct = direct_convolve(&data, &kernel, mode).unwrap();
            assert_eq!(fast.len(), direct.len());
            for (a, b) in fast.iter().zip(&direct) {
                assert_abs_diff_eq!(a, b, epsilon = 1e-9);
            }
        }
    }

    #[test]
    fn test_mode_lengths() {
        let data = sequence(10, 0.0);
        let kernel = sequence(4, 1.0);
        for (a, b) in [(&data, &kernel), (&kernel, &data)] {
            assert_eq!(convolve(a, b, ConvolveMode::Full).unwrap().len(), 13);
            assert_eq!(convolve(a, b, ConvolveMode::Valid).unwrap().len(), 7);
            assert_eq!(convolve(a, b, ConvolveMode::Same).unwrap().len(), 10);
        }
    }

    #[test]
    fn test_valid_and_same_windows() {
        let data = [1.0, 2.0, 3.0, 4.0, 5.0];
        let kernel = [1.0, 1.0, 1.0];
        // full: 1 3 6 9 12 9 5
        assert_eq!(
            convolve(&data, &kernel, ConvolveMode::Full).unwrap(),
            vec![1.0, 3.0, 6.0, 9.0, 12.0, 9.0, 5.0]
        );
        assert_eq!(
            convolve(&data, &kernel, ConvolveMode::Valid).unwrap(),
            vec![6.0, 9.0, 12.0]
        );
        assert_eq!(
            convolve(&data, &kernel, ConvolveMode::Same).unwrap(),
            vec![3.0, 6.0, 9.0, 12.0, 9.0]
        );
    }

    #[test]
    fn test_commutative() {
        let a = sequence(50, 0.0);
        let b = sequence(70, 2.0);
        let ab = convolve_with(&a, &b, ConvolveMode::Same, ConvolutionMethod::Fft).unwrap();
        let ba = convolve_with(&b, &a, ConvolveMode::Same, ConvolutionMethod::Fft).unwrap();
        for (x, y) in ab.iter().zip(&ba) {
            assert_abs_diff_eq!(x, y, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_empty_inputs_rejected() {
        assert!(convolve(&[], &[1.0], ConvolveMode::Full).is_err());
        assert!(convolve(&[1.0], &[], ConvolveMode::Full).is_err());
        assert!(FftConvolver::new(&[], 8).is_err());
        let convolver = FftConvolver::new(&[1.0], 4).unwrap();
        assert!(convolver.full(&[0.0; 5]).is_err());
    }

    #[test]
    fn test_parse_mode_and_method() {
        assert_eq!("same".parse::<ConvolveMode>().unwrap(), ConvolveMode::Same);
        assert_eq!("FFT".parse::<ConvolutionMethod>().unwrap(), ConvolutionMethod::Fft);
        assert!("circular".parse::<ConvolveMode>().is_err());
        assert_eq!(ConvolutionMethod::Auto.resolve(4, 1000), ConvolutionMethod::Direct);
        assert_eq!(ConvolutionMethod::Auto.resolve(4096, 512), ConvolutionMethod::Fft);
    }
}

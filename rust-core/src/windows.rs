//! Window functions for spectral analysis
//!
//! All windows are symmetric (non-periodic): w[n] == w[L-1-n], suitable for
//! direct multiplication against a finite segment.

use crate::error::{require_positive, DspError, Result};
use std::f64::consts::PI;
use std::fmt;
use std::str::FromStr;

/// Window function types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WindowType {
    /// Rectangular window (no windowing)
    Rectangular,

    /// Hann window: w[n] = 0.5 - 0.5*cos(2πn/(L-1))
    /// Sidelobe attenuation: ~31 dB, endpoints exactly zero
    Hann,

    /// Hamming window: w[n] = 0.54 - 0.46*cos(2πn/(L-1))
    /// Sidelobe attenuation: ~43 dB
    Hamming,

    /// Blackman window: w[n] = 0.42 - 0.5*cos(2πn/(L-1)) + 0.08*cos(4πn/(L-1))
    /// Sidelobe attenuation: ~58 dB
    Blackman,

    /// Bartlett (triangular with zero endpoints): w[n] = 1 - |2n/(L-1) - 1|
    Bartlett,

    /// 4-term Blackman-Harris, ~92 dB sidelobes
    BlackmanHarris,
}

impl WindowType {
    pub const ALL: [WindowType; 6] = [
        WindowType::Rectangular,
        WindowType::Hann,
        WindowType::Hamming,
        WindowType::Blackman,
        WindowType::Bartlett,
        WindowType::BlackmanHarris,
    ];

    /// Canonical lowercase name
    pub fn name(&self) -> &'static str {
        match self {
            WindowType::Rectangular => "boxcar",
            WindowType::Hann => "hann",
            WindowType::Hamming => "hamming",
            WindowType::Blackman => "blackman",
            WindowType::Bartlett => "bartlett",
            WindowType::BlackmanHarris => "blackmanharris",
        }
    }

    /// Cosine-sum coefficients a0, a1, a2, a3
    fn cosine_terms(&self) -> Option<[f64; 4]> {
        match self {
            WindowType::Hann => Some([0.5, 0.5, 0.0, 0.0]),
            WindowType::Hamming => Some([0.54, 0.46, 0.0, 0.0]),
            WindowType::Blackman => Some([0.42, 0.5, 0.08, 0.0]),
            WindowType::BlackmanHarris => Some([0.35875, 0.48829, 0.14128, 0.01168]),
            WindowType::Rectangular | WindowType::Bartlett => None,
        }
    }

    fn coefficient(&self, n: usize, length: usize) -> f64 {
        let denom = (length - 1) as f64;
        match self.cosine_terms() {
            Some([a0, a1, a2, a3]) => {
                let x = 2.0 * PI * n as f64 / denom;
                a0 - a1 * x.cos() + a2 * (2.0 * x).cos() - a3 * (3.0 * x).cos()
            }
            None => match self {
                WindowType::Bartlett => 1.0 - (2.0 * n as f64 / denom - 1.0).abs(),
                _ => 1.0,
            },
        }
    }
}

impl fmt::Display for WindowType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for WindowType {
    type Err = DspError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "boxcar" | "rectangular" | "rect" | "ones" => Ok(WindowType::Rectangular),
            "hann" | "hanning" => Ok(WindowType::Hann),
            "hamming" => Ok(WindowType::Hamming),
            "blackman" => Ok(WindowType::Blackman),
            "bartlett" => Ok(WindowType::Bartlett),
            "blackmanharris" | "blackman-harris" => Ok(WindowType::BlackmanHarris),
            other => Err(DspError::invalid(
                "window",
                format!("unknown window type '{other}'"),
            )),
        }
    }
}

/// Generate symmetric window coefficients
///
/// # Arguments
/// * `window_type` - Type of window function
/// * `length` - Number of samples (L >= 1)
///
/// # Returns
/// Vector of window coefficients w[n] for n = 0..L-1
pub fn get_window(window_type: WindowType, length: usize) -> Result<Vec<f64>> {
    require_positive("length", length)?;

    if length == 1 {
        return Ok(vec![1.0]);
    }

    // Compute the first half and mirror it so both ends match bit-for-bit
    let mut window = vec![0.0; length];
    for n in 0..length.div_ceil(2) {
        let w = window_type.coefficient(n, length);
        window[n] = w;
        window[length - 1 - n] = w;
    }

    Ok(window)
}

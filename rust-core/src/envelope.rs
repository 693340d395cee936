//! Amplitude envelope detection
//!
//! Two methods: the magnitude of the analytic signal (Hilbert transform),
//! and a frame-energy envelope delegated to an injected RMS capability.

use crate::error::{require_positive, DspError, Result};
use crate::spectrum::fft::FftEngine;
use num_complex::Complex64;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Frame-wise RMS energy supplied by the audio-features collaborator
///
/// Implemented for any `Fn(&[f64], usize, usize, bool) -> Result<Vec<f64>>`.
pub trait RmsEnergy: Send + Sync {
    /// Per-frame RMS of `signal`
    fn rms_energy(
        &self,
        signal: &[f64],
        frame_length: usize,
        hop_length: usize,
        center: bool,
    ) -> Result<Vec<f64>>;
}

impl<F> RmsEnergy for F
where
    F: Fn(&[f64], usize, usize, bool) -> Result<Vec<f64>> + Send + Sync,
{
    fn rms_energy(
        &self,
        signal: &[f64],
        frame_length: usize,
        hop_length: usize,
        center: bool,
    ) -> Result<Vec<f64>> {
        self(signal, frame_length, hop_length, center)
    }
}

/// Envelope method
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EnvelopeMethod {
    /// Instantaneous amplitude, one value per sample
    #[default]
    Hilbert,
    /// Frame RMS, one value per frame
    Rms,
}

impl fmt::Display for EnvelopeMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            EnvelopeMethod::Hilbert => "hilbert",
            EnvelopeMethod::Rms => "rms",
        })
    }
}

impl FromStr for EnvelopeMethod {
    type Err = DspError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "hilbert" => Ok(EnvelopeMethod::Hilbert),
            "rms" => Ok(EnvelopeMethod::Rms),
            other => Err(DspError::invalid(
                "method",
                format!("unsupported envelope method '{other}', expected hilbert or rms"),
            )),
        }
    }
}

/// Analytic signal y + j*H(y)
///
/// Negative-frequency bins are zeroed and positive ones doubled (DC and,
/// for even lengths, Nyquist are kept as is) before the inverse transform.
pub fn analytic_signal(y: &[f64]) -> Result<Vec<Complex64>> {
    if y.is_empty() {
        return Ok(Vec::new());
    }
    let n = y.len();
    let engine = FftEngine::new(n)?;
    let mut spectrum = engine.forward_complex(y);

    let half = n / 2;
    for (k, bin) in spectrum.iter_mut().enumerate() {
        let gain = if k == 0 || (n % 2 == 0 && k == half) {
            1.0
        } else if k <= half {
            2.0
        } else {
            0.0
        };
        *bin *= gain;
    }

    engine.inverse_in_place(&mut spectrum);
    Ok(spectrum)
}

/// Hilbert envelope, same length as `y`
pub fn envelope_hilbert(y: &[f64]) -> Result<Vec<f64>> {
    tracing::debug!(len = y.len(), "computing Hilbert envelope");
    Ok(analytic_signal(y)?.iter().map(|c| c.norm()).collect())
}

/// Envelope detector with an optional RMS capability
#[derive(Clone, Default)]
pub struct EnvelopeDetector {
    rms: Option<Arc<dyn RmsEnergy>>,
}

impl fmt::Debug for EnvelopeDetector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EnvelopeDetector")
            .field("rms_available", &self.has_rms_capability())
            .finish()
    }
}

impl EnvelopeDetector {
    /// Detector without an RMS capability; only the Hilbert method is usable
    pub fn new() -> Self {
        Self::default()
    }

    /// Detector backed by `rms`
    pub fn with_rms(rms: Arc<dyn RmsEnergy>) -> Self {
        Self { rms: Some(rms) }
    }

    /// True when [`EnvelopeDetector::rms`] can be called
    pub fn has_rms_capability(&self) -> bool {
        self.rms.is_some()
    }

    pub fn hilbert(&self, y: &[f64]) -> Result<Vec<f64>> {
        envelope_hilbert(y)
    }

    /// Frame RMS envelope, computed by the injected capability with `center = true`
    ///
    /// The capability's output is returned unmodified.
    pub fn rms(&self, y: &[f64], frame_length: usize, hop_length: usize) -> Result<Vec<f64>> {
        let rms = self
            .rms
            .as_ref()
            .ok_or(DspError::MissingCapability("RMS energy function"))?;
        require_positive("frame_length", frame_length)?;
        require_positive("hop_length", hop_length)?;
        tracing::debug!(len = y.len(), frame_length, hop_length, "computing RMS envelope");

        rms.rms_energy(y, frame_length, hop_length, true)
    }

    /// Envelope by `method`; the RMS method needs both frame and hop lengths
    pub fn envelope(
        &self,
        y: &[f64],
        method: EnvelopeMethod,
        frame_length: Option<usize>,
        hop_length: Option<usize>,
    ) -> Result<Vec<f64>> {
        match method {
            EnvelopeMethod::Hilbert => self.hilbert(y),
            EnvelopeMethod::Rms => {
                if !self.has_rms_capability() {
                    return Err(DspError::MissingCapability("RMS energy function"));
                }
                let frame_length = frame_length.ok_or_else(|| {
                    DspError::invalid("frame_length", "required for the rms envelope method")
                })?;
                let hop_length = hop_length.ok_or_else(|| {
                    DspError::invalid("hop_length", "required for the rms envelope method")
                })?;
                self.rms(y, frame_length, hop_length)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use std::f64::consts::PI;
    use std::sync::atomic::{AtomicBool, Ordering};

    fn frame_rms(
        signal: &[f64],
        frame_length: usize,
        hop_length: usize,
        center: bool,
    ) -> Result<Vec<f64>> {
        let pad = if center { frame_length / 2 } else { 0 };
        let mut padded = vec![0.0; pad];
        padded.extend_from_slice(signal);
        padded.extend(std::iter::repeat(0.0).take(pad));
        if padded.len() < frame_length {
            return Ok(Vec::new());
        }
        let n_frames = 1 + (padded.len() - frame_length) / hop_length;
        Ok((0..n_frames)
            .map(|t| {
                let frame = &padded[t * hop_length..t * hop_length + frame_length];
                (frame.iter().map(|v| v * v).sum::<f64>() / frame_length as f64).sqrt()
            })
            .collect())
    }

    #[test]
    fn test_hilbert_envelope_of_sine_is_flat() {
        // Integer number of cycles keeps the transform free of edge effects
        let y: Vec<f64> = (0..1000)
            .map(|n| 0.7 * (2.0 * PI * 25.0 * n as f64 / 1000.0).sin())
            .collect();
        let env = envelope_hilbert(&y).unwrap();
        assert_eq!(env.len(), y.len());
        for v in env {
            assert_abs_diff_eq!(v, 0.7, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_analytic_signal_real_part_is_input() {
        for len in [9, 16] {
            let y: Vec<f64> = (0..len).map(|n| (n as f64 * 0.9).cos() + 0.3).collect();
            let analytic = analytic_signal(&y).unwrap();
            for (a, &b) in analytic.iter().zip(&y) {
                assert_abs_diff_eq!(a.re, b, epsilon = 1e-12);
            }
        }
    }

    #[test]
    fn test_hilbert_of_cosine_is_sine() {
        let n = 64;
        let y: Vec<f64> = (0..n).map(|i| (2.0 * PI * 4.0 * i as f64 / n as f64).cos()).collect();
        let analytic = analytic_signal(&y).unwrap();
        for (i, c) in analytic.iter().enumerate() {
            let expected = (2.0 * PI * 4.0 * i as f64 / n as f64).sin();
            assert_abs_diff_eq!(c.im, expected, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_decaying_envelope() {
        let sr = 1000.0;
        let y: Vec<f64> = (0..1000)
            .map(|n| {
                let t = n as f64 / sr;
                (2.0 * PI * 50.0 * t).sin() * (-t * 5.0).exp()
            })
            .collect();
        let env = envelope_hilbert(&y).unwrap();
        assert!(env.iter().all(|&v| v >= 0.0));
        // Away from the edges the envelope tracks exp(-5t)
        for n in [200, 400, 600] {
            let expected = (-(n as f64) / sr * 5.0).exp();
            assert!((env[n] - expected).abs() < 0.05, "{n}: {} vs {expected}", env[n]);
        }
    }

    #[test]
    fn test_empty_input() {
        assert!(envelope_hilbert(&[]).unwrap().is_empty());
    }

    #[test]
    fn test_rms_requires_capability() {
        let detector = EnvelopeDetector::new();
        assert!(!detector.has_rms_capability());
        assert_eq!(
            detector.rms(&[1.0; 16], 4, 2).unwrap_err(),
            DspError::MissingCapability("RMS energy function")
        );
        assert!(matches!(
            detector.envelope(&[1.0; 16], EnvelopeMethod::Rms, Some(4), Some(2)),
            Err(DspError::MissingCapability(_))
        ));
    }

    #[test]
    fn test_rms_delegates_with_center() {
        let saw_center = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&saw_center);
        let detector = EnvelopeDetector::with_rms(Arc::new(
            move |signal: &[f64], frame_length: usize, hop_length: usize, center: bool| {
                flag.store(center, Ordering::SeqCst);
                frame_rms(signal, frame_length, hop_length, center)
            },
        ));
        assert!(detector.has_rms_capability());

        let y: Vec<f64> = (0..256).map(|n| (n as f64 * 0.3).sin()).collect();
        let env = detector.rms(&y, 64, 32).unwrap();
        assert!(saw_center.load(Ordering::SeqCst));
        assert_eq!(env, frame_rms(&y, 64, 32, true).unwrap());
        assert_eq!(env.len(), 1 + 256 / 32);
    }

    #[test]
    fn test_rms_errors_propagate_unchanged() {
        let detector = EnvelopeDetector::with_rms(Arc::new(
            |_: &[f64], _: usize, _: usize, _: bool| -> Result<Vec<f64>> {
                Err(DspError::Computation("rms backend failed".into()))
            },
        ));
        assert_eq!(
            detector.rms(&[0.0; 8], 4, 2).unwrap_err(),
            DspError::Computation("rms backend failed".into())
        );
    }

    #[test]
    fn test_envelope_dispatch() {
        let detector = EnvelopeDetector::with_rms(Arc::new(frame_rms));
        let y = vec![0.5; 64];

        assert_eq!(detector.envelope(&y, EnvelopeMethod::Hilbert, None, None).unwrap().len(), 64);
        assert!(matches!(
            detector.envelope(&y, EnvelopeMethod::Rms, None, Some(8)),
            Err(DspError::InvalidParameter { name: "frame_length", .. })
        ));
        assert!(detector.rms(&y, 0, 8).is_err());
        assert_eq!("RMS".parse::<EnvelopeMethod>().unwrap(), EnvelopeMethod::Rms);
        assert!("peak".parse::<EnvelopeMethod>().is_err());
    }
}

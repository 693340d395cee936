//! Overlapping frame extraction
//!
//! Splits a signal into fixed-length frames advancing by a hop, optionally
//! padding both ends so that frame t is centered on sample t * hop.

use crate::error::{require_positive, DspError, Result};
use ndarray::Array2;
use std::fmt;
use std::str::FromStr;

/// Padding policy used when frames are centered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PadMode {
    /// Pad with zeros
    #[default]
    Constant,

    /// Repeat the first/last sample
    Edge,

    /// Mirror about the first/last sample, excluding the sample itself
    Reflect,
}

impl PadMode {
    pub fn name(&self) -> &'static str {
        match self {
            PadMode::Constant => "constant",
            PadMode::Edge => "edge",
            PadMode::Reflect => "reflect",
        }
    }
}

impl fmt::Display for PadMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for PadMode {
    type Err = DspError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "constant" | "zeros" => Ok(PadMode::Constant),
            "edge" => Ok(PadMode::Edge),
            "reflect" => Ok(PadMode::Reflect),
            other => Err(DspError::invalid(
                "pad_mode",
                format!("unsupported pad mode '{other}'"),
            )),
        }
    }
}

/// One frame of a [`Frames`] set
#[derive(Debug, Clone, Copy)]
pub struct Frame<'a> {
    /// Frame index t
    pub index: usize,

    /// Position of the first sample relative to the unpadded signal
    /// (t * hop - pad); negative when the frame starts in the padding
    pub offset: isize,

    pub samples: &'a [f64],
}

/// Frames of a signal, backed by one (possibly padded) buffer
#[derive(Debug, Clone)]
pub struct Frames {
    padded: Vec<f64>,
    frame_length: usize,
    hop_length: usize,
    pad: usize,
    n_frames: usize,
}

impl Frames {
    pub fn len(&self) -> usize {
        self.n_frames
    }

    pub fn is_empty(&self) -> bool {
        self.n_frames == 0
    }

    pub fn frame_length(&self) -> usize {
        self.frame_length
    }

    pub fn hop_length(&self) -> usize {
        self.hop_length
    }

    /// Samples added in front of the signal
    pub fn pad(&self) -> usize {
        self.pad
    }

    /// Samples of frame `t`
    ///
    /// # Panics
    /// If `t >= self.len()`
    pub fn frame(&self, t: usize) -> &[f64] {
        assert!(t < self.n_frames, "frame index {t} out of range");
        let start = t * self.hop_length;
        &self.padded[start..start + self.frame_length]
    }

    /// Signed offset of frame `t` into the unpadded signal
    pub fn offset(&self, t: usize) -> isize {
        (t * self.hop_length) as isize - self.pad as isize
    }

    pub fn iter(&self) -> impl ExactSizeIterator<Item = Frame<'_>> + '_ {
        (0..self.n_frames).map(move |t| Frame {
            index: t,
            offset: self.offset(t),
            samples: self.frame(t),
        })
    }

    /// Frames as columns of a `[frame_length, n_frames]` matrix
    pub fn to_array(&self) -> Array2<f64> {
        Array2::from_shape_fn((self.frame_length, self.n_frames), |(i, t)| {
            self.padded[t * self.hop_length + i]
        })
    }
}

/// Number of whole frames that fit in `len` samples
pub fn frame_count(len: usize, frame_length: usize, hop_length: usize) -> usize {
    if len < frame_length {
        0
    } else {
        1 + (len - frame_length) / hop_length
    }
}

/// Split `signal` into overlapping frames
///
/// # Arguments
/// * `frame_length` - Samples per frame
/// * `hop_length` - Advance between consecutive frames
/// * `center` - Pad `frame_length / 2` samples on each side with `pad_mode`
///   so frame 0 is centered on sample 0
pub fn frame(
    signal: &[f64],
    frame_length: usize,
    hop_length: usize,
    center: bool,
    pad_mode: PadMode,
) -> Result<Frames> {
    require_positive("frame_length", frame_length)?;
    require_positive("hop_length", hop_length)?;

    let (padded, pad) = if center {
        let pad = frame_length / 2;
        (pad_signal(signal, pad, pad_mode), pad)
    } else {
        (signal.to_vec(), 0)
    };

    let n_frames = frame_count(padded.len(), frame_length, hop_length);

    Ok(Frames {
        padded,
        frame_length,
        hop_length,
        pad,
        n_frames,
    })
}

/// Pad `pad` samples on both sides of `signal`
pub fn pad_signal(signal: &[f64], pad: usize, mode: PadMode) -> Vec<f64> {
    let len = signal.len() as isize;
    let mut padded = Vec::with_capacity(signal.len() + 2 * pad);

    for i in -(pad as isize)..len + pad as isize {
        let value = if (0..len).contains(&i) {
            signal[i as usize]
        } else if len == 0 {
            0.0
        } else {
            match mode {
                PadMode::Constant => 0.0,
                PadMode::Edge => signal[i.clamp(0, len - 1) as usize],
                PadMode::Reflect => signal[reflect_index(i, len)],
            }
        };
        padded.push(value);
    }

    padded
}

/// Map an out-of-range index onto the signal by repeated mirroring
fn reflect_index(i: isize, len: isize) -> usize {
    if len == 1 {
        return 0;
    }
    let period = 2 * (len - 1);
    let m = i.rem_euclid(period);
    (if m < len { m } else { period - m }) as usize
}

//! Index-ordered fan-out for per-frame work
//!
//! With the `parallel` feature, frames/segments are computed on the rayon
//! pool. Either way results come back ordered by index, so column t always
//! belongs to frame t regardless of completion order.

use crate::error::Result;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Evaluate `f(0..n)` and collect results in index order, stopping at the first error
#[cfg(feature = "parallel")]
pub(crate) fn try_map_indexed<T, F>(n: usize, f: F) -> Result<Vec<T>>
where
    T: Send,
    F: Fn(usize) -> Result<T> + Sync + Send,
{
    (0..n).into_par_iter().map(f).collect()
}

/// Evaluate `f(0..n)` and collect results in index order, stopping at the first error
#[cfg(not(feature = "parallel"))]
pub(crate) fn try_map_indexed<T, F>(n: usize, f: F) -> Result<Vec<T>>
where
    T: Send,
    F: Fn(usize) -> Result<T> + Sync + Send,
{
    (0..n).map(f).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DspError;

    #[test]
    fn test_results_are_index_ordered() {
        let out = try_map_indexed(1000, |i| Ok(i * 2)).unwrap();
        assert!(out.iter().enumerate().all(|(i, &v)| v == i * 2));
    }

    #[test]
    fn test_error_propagates() {
        let out: Result<Vec<usize>> = try_map_indexed(10, |i| {
            if i == 7 {
                Err(DspError::Computation("frame 7".into()))
            } else {
                Ok(i)
            }
        });
        assert!(out.is_err());
    }
}

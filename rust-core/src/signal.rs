//! Boundary check for array-shaped input

use crate::error::{DspError, Result};
use ndarray::{ArrayView1, ArrayViewD, Ix1};

/// View `data` as a one-dimensional signal
///
/// Anything that is not exactly 1-D is rejected with `InvalidShape`.
pub fn as_signal(data: ArrayViewD<'_, f64>) -> Result<ArrayView1<'_, f64>> {
    let shape = data.shape().to_vec();
    data.into_dimensionality::<Ix1>().map_err(|_| {
        DspError::InvalidShape(format!(
            "expected a 1-D signal, got {} dimensions with shape {:?}",
            shape.len(),
            shape
        ))
    })
}

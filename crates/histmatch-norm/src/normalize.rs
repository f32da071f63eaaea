//! Affine intensity normalization
//!
//! Maps every pixel `v` of a slice to `(v - offset) / sigma`, producing a
//! new slice. `offset` is the intensity of the fitted mode center and
//! `sigma` its spread in bins, so the background mode ends up centered on
//! zero.

use crate::gaussian::GaussianFit;
use crate::histogram::Histogram;
use crate::{NormError, NormResult};
use histmatch_core::FPix;

/// Compute `(v - offset) / sigma` for every pixel of `slice`
///
/// The result is a fresh slice with the same dimensions and no display
/// range. Arithmetic is done in `f64` and rounded once per pixel.
///
/// # Errors
///
/// Returns `DivisionByZero` if `sigma` is zero or not finite.
pub fn normalize_slice(slice: &FPix, offset: f64, sigma: f64) -> NormResult<FPix> {
    if sigma == 0.0 || !sigma.is_finite() {
        return Err(NormError::DivisionByZero { sigma });
    }
    Ok(slice.map(|v| ((v as f64 - offset) / sigma) as f32))
}

/// Normalize `slice` with a Gaussian fitted to its histogram
///
/// The offset is the intensity at the fitted mean bin position:
/// `origin + mean * bin_width`.
pub fn normalize_with_fit(slice: &FPix, hist: &Histogram, fit: &GaussianFit) -> NormResult<FPix> {
    normalize_slice(slice, hist.intensity_at(fit.mean), fit.sigma)
}

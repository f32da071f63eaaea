//! Fixed-bin intensity histograms of float slices
//!
//! A [`Histogram`] counts the pixels of one slice in `nbins` bins of equal
//! width. With the default [`BinRange::ZeroToMax`] the bins cover
//! `[0, max]` and the slice minimum is ignored; [`BinRange::MinToMax`]
//! covers `[min, max]` instead.
//!
//! Pixel `v` lands in bin `floor((v - origin) / bin_width)`, clamped to
//! `[0, nbins - 1]`, so every pixel is counted exactly once.

use crate::{NormError, NormResult};
use histmatch_core::FPix;

/// Default number of histogram bins
pub const DEFAULT_NBINS: usize = 128;

/// Intensity interval covered by the histogram bins
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BinRange {
    /// Bins span `[0, max]`: `bin_width = max / nbins`
    #[default]
    ZeroToMax,
    /// Bins span `[min, max]`: `bin_width = (max - min) / nbins`
    MinToMax,
}

/// Pixel counts of one slice
#[derive(Debug, Clone, PartialEq)]
pub struct Histogram {
    counts: Vec<u32>,
    /// Intensity at the left edge of bin 0
    origin: f64,
    /// Intensity width of each bin
    bin_width: f64,
}

impl Histogram {
    /// Build the histogram of `slice` over its own intensity range
    ///
    /// The range is the slice's display range when one is set, otherwise
    /// its data minimum and maximum.
    ///
    /// # Errors
    ///
    /// - `InvalidParameters` if `nbins == 0` or the slice is too large
    /// - `DegenerateRange` if the resulting bin width is not positive
    pub fn build(slice: &FPix, nbins: usize, bin_range: BinRange) -> NormResult<Histogram> {
        let (min, max) = slice.range().unwrap_or((f32::NAN, f32::NAN));
        Self::build_in_range(slice, min, max, nbins, bin_range)
    }

    /// Build the histogram of `slice` with an explicit `(min, max)`
    pub fn build_in_range(
        slice: &FPix,
        min: f32,
        max: f32,
        nbins: usize,
        bin_range: BinRange,
    ) -> NormResult<Histogram> {
        if nbins == 0 {
            return Err(NormError::InvalidParameters(
                "nbins must be >= 1".to_string(),
            ));
        }
        if slice.pixel_count() > u32::MAX as usize {
            return Err(NormError::InvalidParameters(format!(
                "slice has {} pixels, at most {} supported",
                slice.pixel_count(),
                u32::MAX
            )));
        }

        let origin = match bin_range {
            BinRange::ZeroToMax => 0.0,
            BinRange::MinToMax => min as f64,
        };
        let bin_width = (max as f64 - origin) / nbins as f64;
        if !(bin_width > 0.0 && bin_width.is_finite()) {
            return Err(NormError::DegenerateRange { min, max });
        }

        let mut counts = vec![0u32; nbins];
        let last = nbins - 1;
        for &v in slice.data() {
            let b = ((v as f64 - origin) / bin_width).floor();
            // NaN fails both comparisons and lands in bin 0
            let idx = if b >= last as f64 {
                last
            } else if b > 0.0 {
                b as usize
            } else {
                0
            };
            counts[idx] += 1;
        }

        Ok(Histogram {
            counts,
            origin,
            bin_width,
        })
    }

    /// Wrap precomputed counts
    ///
    /// # Errors
    ///
    /// Returns `InvalidParameters` for empty counts and `DegenerateRange`
    /// for a non-positive bin width.
    pub fn from_counts(counts: Vec<u32>, origin: f64, bin_width: f64) -> NormResult<Histogram> {
        if counts.is_empty() {
            return Err(NormError::InvalidParameters(
                "nbins must be >= 1".to_string(),
            ));
        }
        if !(bin_width > 0.0 && bin_width.is_finite()) {
            return Err(NormError::DegenerateRange {
                min: origin as f32,
                max: (origin + bin_width * counts.len() as f64) as f32,
            });
        }
        Ok(Histogram {
            counts,
            origin,
            bin_width,
        })
    }

    /// Bin counts
    #[inline]
    pub fn counts(&self) -> &[u32] {
        &self.counts
    }

    /// Count in bin `index`
    #[inline]
    pub fn get(&self, index: usize) -> Option<u32> {
        self.counts.get(index).copied()
    }

    /// Number of bins
    #[inline]
    pub fn nbins(&self) -> usize {
        self.counts.len()
    }

    /// Intensity at the left edge of bin 0
    #[inline]
    pub fn origin(&self) -> f64 {
        self.origin
    }

    /// Intensity width of one bin
    #[inline]
    pub fn bin_width(&self) -> f64 {
        self.bin_width
    }

    /// Sum of all counts
    pub fn total(&self) -> u64 {
        self.counts.iter().map(|&c| c as u64).sum()
    }

    /// Index of the largest count; the lowest index wins ties
    pub fn peak_index(&self) -> usize {
        let mut peak = 0;
        for (i, &c) in self.counts.iter().enumerate() {
            if c > self.counts[peak] {
                peak = i;
            }
        }
        peak
    }

    /// Intensity at the center of bin `index`
    #[inline]
    pub fn bin_center_value(&self, index: usize) -> f64 {
        self.intensity_at(index as f64 + 0.5)
    }

    /// Intensity corresponding to a (fractional) bin-index position
    ///
    /// Position `x` maps to `origin + x * bin_width`, so bin `i` starts at
    /// position `i`.
    #[inline]
    pub fn intensity_at(&self, x: f64) -> f64 {
        self.origin + x * self.bin_width
    }
}

//! FPix - Floating-point image slice
//!
//! `FPix` is a 2D array of `f32` values. It is the unit of work for the
//! normalization pipeline: one `FPix` per slice of a stack.
//!
//! Besides pixel data, an `FPix` may carry an explicit display range
//! `(min, max)` supplied by whoever acquired the slice. When no range is
//! set, [`FPix::range`] derives it from the data.
//!
//! # Examples
//!
//! ```
//! use histmatch_core::FPix;
//!
//! let mut fpix = FPix::new(100, 100).unwrap();
//! fpix.set_pixel(10, 20, 0.5).unwrap();
//! assert_eq!(fpix.get_pixel(10, 20).unwrap(), 0.5);
//!
//! let (min, max) = fpix.range().unwrap();
//! assert_eq!((min, max), (0.0, 0.5));
//! ```

use crate::error::{Error, Result};

/// Floating-point image
///
/// # Memory Layout
///
/// Data is stored in row-major order with no padding. The pixel at (x, y)
/// is at index `y * width + x`.
#[derive(Debug, Clone, PartialEq)]
pub struct FPix {
    /// Width in pixels
    width: u32,
    /// Height in pixels
    height: u32,
    /// Pixel data (row-major, no padding)
    data: Vec<f32>,
    /// Supplied intensity range, if any
    display_range: Option<(f32, f32)>,
}

impl FPix {
    /// Create a new FPix with all pixels set to zero
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidDimension` if width or height is 0.
    ///
    /// # Examples
    ///
    /// ```
    /// use histmatch_core::FPix;
    ///
    /// let fpix = FPix::new(640, 480).unwrap();
    /// assert_eq!(fpix.dimensions(), (640, 480));
    /// ```
    pub fn new(width: u32, height: u32) -> Result<Self> {
        Self::new_with_value(width, height, 0.0)
    }

    /// Create a new FPix with all pixels set to the specified value
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidDimension` if width or height is 0.
    pub fn new_with_value(width: u32, height: u32, value: f32) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(Error::InvalidDimension { width, height });
        }

        let size = (width as usize) * (height as usize);
        Ok(FPix {
            width,
            height,
            data: vec![value; size],
            display_range: None,
        })
    }

    /// Create a FPix from raw row-major data
    ///
    /// # Errors
    ///
    /// Returns an error if dimensions are invalid or data length doesn't match.
    pub fn from_data(width: u32, height: u32, data: Vec<f32>) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(Error::InvalidDimension { width, height });
        }

        let expected_size = (width as usize) * (height as usize);
        if data.len() != expected_size {
            return Err(Error::InvalidParameter(format!(
                "data length {} doesn't match {}x{} = {}",
                data.len(),
                width,
                height,
                expected_size
            )));
        }

        Ok(FPix {
            width,
            height,
            data,
            display_range: None,
        })
    }

    /// Create a FPix of the given size where each pixel is `f(x, y)`
    pub fn from_fn<F>(width: u32, height: u32, mut f: F) -> Result<Self>
    where
        F: FnMut(u32, u32) -> f32,
    {
        let mut fpix = FPix::new(width, height)?;
        for y in 0..height {
            for (x, v) in fpix.row_mut(y).iter_mut().enumerate() {
                *v = f(x as u32, y);
            }
        }
        Ok(fpix)
    }

    /// Get the image width in pixels
    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Get the image height in pixels
    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Get the image dimensions as (width, height)
    #[inline]
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Number of pixels (`width * height`)
    #[inline]
    pub fn pixel_count(&self) -> usize {
        self.data.len()
    }

    /// Get the pixel value at (x, y)
    ///
    /// # Errors
    ///
    /// Returns `Error::IndexOutOfBounds` if coordinates are out of range.
    #[inline]
    pub fn get_pixel(&self, x: u32, y: u32) -> Result<f32> {
        let idx = self.index_of(x, y)?;
        Ok(self.data[idx])
    }

    /// Set the pixel value at (x, y)
    ///
    /// # Errors
    ///
    /// Returns `Error::IndexOutOfBounds` if coordinates are out of range.
    #[inline]
    pub fn set_pixel(&mut self, x: u32, y: u32, value: f32) -> Result<()> {
        let idx = self.index_of(x, y)?;
        self.data[idx] = value;
        Ok(())
    }

    fn index_of(&self, x: u32, y: u32) -> Result<usize> {
        let idx = (y as usize) * (self.width as usize) + (x as usize);
        if x >= self.width || y >= self.height {
            return Err(Error::IndexOutOfBounds {
                index: idx,
                len: self.data.len(),
            });
        }
        Ok(idx)
    }

    /// Get raw access to the pixel data
    #[inline]
    pub fn data(&self) -> &[f32] {
        &self.data
    }

    /// Get mutable access to the pixel data
    #[inline]
    pub fn data_mut(&mut self) -> &mut [f32] {
        &mut self.data
    }

    /// Consume the image and return its pixel buffer
    pub fn into_data(self) -> Vec<f32> {
        self.data
    }

    /// Get a row of pixel data
    ///
    /// # Panics
    ///
    /// Panics if `y >= height`.
    #[inline]
    pub fn row(&self, y: u32) -> &[f32] {
        let start = (y as usize) * (self.width as usize);
        &self.data[start..start + self.width as usize]
    }

    /// Get a mutable row of pixel data
    ///
    /// # Panics
    ///
    /// Panics if `y >= height`.
    #[inline]
    pub fn row_mut(&mut self, y: u32) -> &mut [f32] {
        let start = (y as usize) * (self.width as usize);
        let end = start + self.width as usize;
        &mut self.data[start..end]
    }

    // ========================================================================
    // Intensity range
    // ========================================================================

    /// Supplied display range, if one was set
    #[inline]
    pub fn display_range(&self) -> Option<(f32, f32)> {
        self.display_range
    }

    /// Attach an explicit `(min, max)` intensity range to this slice
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidParameter` if either bound is NaN or
    /// `min > max`.
    pub fn set_display_range(&mut self, min: f32, max: f32) -> Result<()> {
        if min.is_nan() || max.is_nan() || min > max {
            return Err(Error::InvalidParameter(format!(
                "invalid display range [{min}, {max}]"
            )));
        }
        self.display_range = Some((min, max));
        Ok(())
    }

    /// Drop the supplied range so [`FPix::range`] falls back to the data
    pub fn clear_display_range(&mut self) {
        self.display_range = None;
    }

    /// Builder form of [`FPix::set_display_range`]
    pub fn with_display_range(mut self, min: f32, max: f32) -> Result<Self> {
        self.set_display_range(min, max)?;
        Ok(self)
    }

    /// Intensity range of the slice
    ///
    /// Returns the supplied display range when set, otherwise the
    /// minimum and maximum of the non-NaN pixel values. Returns `None`
    /// only when every pixel is NaN.
    pub fn range(&self) -> Option<(f32, f32)> {
        if let Some(range) = self.display_range {
            return Some(range);
        }
        Some((self.min_value()?, self.max_value()?))
    }

    // ========================================================================
    // Statistics
    // ========================================================================

    /// Get the minimum non-NaN value and its location (value, x, y)
    pub fn min(&self) -> Option<(f32, u32, u32)> {
        self.extreme(|candidate, best| candidate < best)
    }

    /// Get the minimum non-NaN value
    pub fn min_value(&self) -> Option<f32> {
        self.min().map(|(v, _, _)| v)
    }

    /// Get the maximum non-NaN value and its location (value, x, y)
    pub fn max(&self) -> Option<(f32, u32, u32)> {
        self.extreme(|candidate, best| candidate > best)
    }

    /// Get the maximum non-NaN value
    pub fn max_value(&self) -> Option<f32> {
        self.max().map(|(v, _, _)| v)
    }

    fn extreme(&self, better: impl Fn(f32, f32) -> bool) -> Option<(f32, u32, u32)> {
        let mut best: Option<(f32, usize)> = None;
        for (i, &v) in self.data.iter().enumerate() {
            if v.is_nan() {
                continue;
            }
            match best {
                Some((b, _)) if !better(v, b) => {}
                _ => best = Some((v, i)),
            }
        }
        best.map(|(v, i)| {
            let w = self.width as usize;
            (v, (i % w) as u32, (i / w) as u32)
        })
    }

    /// Mean of all pixel values (computed in `f64`)
    pub fn mean(&self) -> f32 {
        let sum: f64 = self.data.iter().map(|&v| v as f64).sum();
        (sum / self.data.len() as f64) as f32
    }

    // ========================================================================
    // Arithmetic
    // ========================================================================

    /// Create a new FPix with `f` applied to every pixel
    ///
    /// The result has the same dimensions and no display range. The
    /// source is left untouched.
    pub fn map<F>(&self, f: F) -> FPix
    where
        F: Fn(f32) -> f32,
    {
        FPix {
            width: self.width,
            height: self.height,
            data: self.data.iter().map(|&v| f(v)).collect(),
            display_range: None,
        }
    }

    /// Compute `multiplier * pixel + addend` for every pixel
    pub fn linear_combination(&self, multiplier: f32, addend: f32) -> FPix {
        self.map(|v| multiplier * v + addend)
    }

    /// Create a zero-filled FPix with the same dimensions
    pub fn create_template(&self) -> FPix {
        FPix {
            width: self.width,
            height: self.height,
            data: vec![0.0; self.data.len()],
            display_range: None,
        }
    }

    /// Check that `other` has the same dimensions as `self`
    ///
    /// # Errors
    ///
    /// Returns `Error::DimensionMismatch` otherwise.
    pub fn check_same_size(&self, other: &FPix) -> Result<()> {
        if self.dimensions() != other.dimensions() {
            return Err(Error::DimensionMismatch {
                expected: self.dimensions(),
                actual: other.dimensions(),
            });
        }
        Ok(())
    }
}

//! Pta - Point arrays
//!
//! Arrays of `(x, y)` observations. The normalization pipeline collects
//! `(bin index, count)` pairs into a `Pta` and fits a curve to them with
//! the least-squares routines in [`lsf`].
//!
//! # Storage layout
//!
//! Points are stored as separate X and Y vectors (SoA layout) in `f64`,
//! which is the precision the fitting code works in.

pub mod lsf;

use crate::error::{Error, Result};

/// Array of points.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Pta {
    /// X coordinates
    x: Vec<f64>,
    /// Y coordinates
    y: Vec<f64>,
}

impl Pta {
    /// Create a new empty Pta.
    pub fn new() -> Self {
        Self {
            x: Vec::new(),
            y: Vec::new(),
        }
    }

    /// Create a Pta with pre-allocated capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            x: Vec::with_capacity(capacity),
            y: Vec::with_capacity(capacity),
        }
    }

    /// Create a Pta from coordinate vectors.
    ///
    /// # Errors
    ///
    /// Returns an error if `x` and `y` have different lengths.
    pub fn from_vecs(x: Vec<f64>, y: Vec<f64>) -> Result<Self> {
        if x.len() != y.len() {
            return Err(Error::InvalidParameter(format!(
                "coordinate length mismatch: {} x values, {} y values",
                x.len(),
                y.len()
            )));
        }
        Ok(Self { x, y })
    }

    /// Get the number of points.
    #[inline]
    pub fn len(&self) -> usize {
        self.x.len()
    }

    /// Check if empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    /// Get a point by index.
    pub fn get(&self, index: usize) -> Option<(f64, f64)> {
        Some((*self.x.get(index)?, *self.y.get(index)?))
    }

    /// Add a point.
    pub fn push(&mut self, x: f64, y: f64) {
        self.x.push(x);
        self.y.push(y);
    }

    /// All X coordinates.
    #[inline]
    pub fn x_coords(&self) -> &[f64] {
        &self.x
    }

    /// All Y coordinates.
    #[inline]
    pub fn y_coords(&self) -> &[f64] {
        &self.y
    }

    /// Iterate over points as `(x, y)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.x.iter().copied().zip(self.y.iter().copied())
    }

    /// Index of the point with the largest y value (first one on ties).
    pub fn argmax_y(&self) -> Option<usize> {
        let mut best: Option<(usize, f64)> = None;
        for (i, &y) in self.y.iter().enumerate() {
            match best {
                Some((_, b)) if y <= b => {}
                _ => best = Some((i, y)),
            }
        }
        best.map(|(i, _)| i)
    }
}

//! FPixa - Stack of floating-point slices
//!
//! An `FPixa` is an ordered sequence of [`FPix`] slices that all share the
//! same width and height, together with a title. It models a volumetric
//! stack where the slice index is the only identity a slice has.

use crate::error::{Error, Result};
use crate::fpix::FPix;

/// Ordered stack of equally sized `FPix` slices
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FPixa {
    slices: Vec<FPix>,
    title: String,
}

impl FPixa {
    /// Create a new empty stack
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty stack with pre-allocated capacity
    pub fn with_capacity(capacity: usize) -> Self {
        FPixa {
            slices: Vec::with_capacity(capacity),
            title: String::new(),
        }
    }

    /// Build a stack from slices
    ///
    /// # Errors
    ///
    /// Returns `Error::DimensionMismatch` if the slices differ in size.
    pub fn from_slices(slices: Vec<FPix>) -> Result<Self> {
        let mut stack = FPixa::with_capacity(slices.len());
        for slice in slices {
            stack.push(slice)?;
        }
        Ok(stack)
    }

    /// Stack title
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Set the stack title
    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    /// Builder form of [`FPixa::set_title`]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.set_title(title);
        self
    }

    /// Number of slices
    #[inline]
    pub fn len(&self) -> usize {
        self.slices.len()
    }

    /// Check if the stack has no slices
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.slices.is_empty()
    }

    /// Shared (width, height) of the slices, `None` for an empty stack
    pub fn dimensions(&self) -> Option<(u32, u32)> {
        self.slices.first().map(FPix::dimensions)
    }

    /// Get a slice by index
    pub fn get(&self, index: usize) -> Option<&FPix> {
        self.slices.get(index)
    }

    /// Get a slice by index, failing with `IndexOutOfBounds`
    pub fn slice(&self, index: usize) -> Result<&FPix> {
        self.slices.get(index).ok_or(Error::IndexOutOfBounds {
            index,
            len: self.slices.len(),
        })
    }

    /// Append a slice
    ///
    /// # Errors
    ///
    /// Returns `Error::DimensionMismatch` if the slice size differs from
    /// the slices already in the stack.
    pub fn push(&mut self, slice: FPix) -> Result<()> {
        if let Some(first) = self.slices.first() {
            first.check_same_size(&slice)?;
        }
        self.slices.push(slice);
        Ok(())
    }

    /// Replace the slice at `index`, returning the old one
    ///
    /// # Errors
    ///
    /// Returns `Error::IndexOutOfBounds` or `Error::DimensionMismatch`.
    pub fn replace(&mut self, index: usize, slice: FPix) -> Result<FPix> {
        let len = self.slices.len();
        let old = self
            .slices
            .get_mut(index)
            .ok_or(Error::IndexOutOfBounds { index, len })?;
        old.check_same_size(&slice)?;
        Ok(std::mem::replace(old, slice))
    }

    /// Iterate over slices in order
    pub fn iter(&self) -> std::slice::Iter<'_, FPix> {
        self.slices.iter()
    }

    /// Borrow all slices
    pub fn slices(&self) -> &[FPix] {
        &self.slices
    }

    /// Consume the stack and return its slices
    pub fn into_slices(self) -> Vec<FPix> {
        self.slices
    }
}

impl<'a> IntoIterator for &'a FPixa {
    type Item = &'a FPix;
    type IntoIter = std::slice::Iter<'a, FPix>;

    fn into_iter(self) -> Self::IntoIter {
        self.slices.iter()
    }
}

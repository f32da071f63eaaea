//! histmatch - Per-slice histogram matching for image stacks
//!
//! Removes slice-to-slice brightness and contrast drift from volumetric
//! stacks (for example optical projection tomography). The dominant
//! intensity mode of every slice is fitted with a Gaussian and the slice
//! is rescaled so that mode is centered on zero with unit spread in bins.
//!
//! # Example
//!
//! ```
//! use histmatch::{FPix, FPixa};
//! use histmatch::norm::normalize_stack;
//!
//! // Background mode around 40 with a sparse bright tail
//! let slice = FPix::from_fn(32, 32, |x, y| {
//!     let d = (x as f32 - 16.0).abs() + (y as f32 - 16.0).abs();
//!     40.0 + 10.0 * (-d * d / 200.0).exp() + ((x * 7 + y * 13) % 5) as f32
//! })
//! .unwrap();
//! let stack = FPixa::from_slices(vec![slice]).unwrap().with_title("opt");
//!
//! match normalize_stack(&stack, 32) {
//!     Ok(out) => assert_eq!(out.title(), "opt_hm"),
//!     Err(e) => eprintln!("normalization failed: {e}"),
//! }
//! ```

// Re-export core types (primary data structures used everywhere)
pub use histmatch_core::*;

// Re-export the pipeline as a module to avoid name conflicts
pub use histmatch_norm as norm;

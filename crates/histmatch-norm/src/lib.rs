//! histmatch-norm - Per-slice histogram normalization
//!
//! Each slice of a stack goes through the same pipeline:
//!
//! - **Histogram**: fixed-bin counts over the slice intensity range
//! - **Mode window**: dominant peak and the monotone run of bins around it
//! - **Gaussian fit**: Levenberg-Marquardt fit of the window observations
//! - **Normalization**: `(v - offset) / sigma` with the fitted center and
//!   spread
//!
//! Slices are independent and are processed in parallel by default.
//!
//! # Example
//!
//! ```no_run
//! use histmatch_core::FPixa;
//! use histmatch_norm::{NormalizeOptions, normalize_stack_with};
//!
//! # fn run(stack: &FPixa) -> histmatch_norm::NormResult<()> {
//! let options = NormalizeOptions::default().with_nbins(256);
//! let normalized = normalize_stack_with(stack, &options)?;
//! assert_eq!(normalized.len(), stack.len());
//! # Ok(())
//! # }
//! ```

mod error;
pub mod gaussian;
pub mod histogram;
pub mod normalize;
pub mod stack;
pub mod window;

pub use error::{NormError, NormResult};

pub use gaussian::{FitOptions, GaussianFit, MIN_FIT_POINTS};
pub use histogram::{BinRange, DEFAULT_NBINS, Histogram};
pub use normalize::{normalize_slice, normalize_with_fit};
pub use stack::{
    CancelFlag, NormalizeOptions, SliceReport, TITLE_SUFFIX, normalize_slice_with,
    normalize_stack, normalize_stack_reports, normalize_stack_with,
};
pub use window::ModeWindow;

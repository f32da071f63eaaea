//! histmatch-test - Regression test framework for histmatch
//!
//! This crate provides a value-comparison regression harness modeled on
//! golden-value regression programs, plus deterministic generators for
//! synthetic slices with known histograms.
//!
//! # Usage
//!
//! ```ignore
//! use histmatch_test::{RegParams, gaussian_histogram, histogram_slice};
//!
//! let mut rp = RegParams::new("window");
//! rp.compare_values(64.0, peak as f64, 0.0);
//! assert!(rp.cleanup());
//! ```

mod error;
mod params;
mod synth;

pub use error::{TestError, TestResult};
pub use params::RegParams;
pub use synth::{
    SimpleRng, gaussian_histogram, gaussian_slice, histogram_slice, ramp_slice, uniform_slice,
};

//! histmatch Core - Basic data structures for slice normalization
//!
//! This crate provides the fundamental data structures used throughout
//! the histmatch library:
//!
//! - [`FPix`] - Floating-point image slice with an optional display range
//! - [`FPixa`] - Ordered stack of equally sized slices
//! - [`Pta`] - Point arrays, with Gaussian least-squares fitting in [`pta::lsf`]

pub mod error;
pub mod fpix;
pub mod fpixa;
pub mod pta;

pub use error::{Error, Result};
pub use fpix::FPix;
pub use fpixa::FPixa;
pub use pta::Pta;
pub use pta::lsf::{GaussianLsf, GaussianParams, LmConfig, apply_gaussian_fit};

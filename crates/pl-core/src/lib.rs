//! pl-core: shared foundation for pitchloop.
//!
//! Contains:
//! - numeric (Real + field validators + step counting)
//! - error (shared error type)

pub mod error;
pub mod numeric;

pub use error::{CoreError, CoreResult};
pub use numeric::*;

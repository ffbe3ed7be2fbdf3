//! Basic utilities: error type, math helpers, logging setup.

pub mod error;
pub mod logging;
pub mod math;

pub use error::{Error, Result};
pub use math::{BBox, Decomposed};

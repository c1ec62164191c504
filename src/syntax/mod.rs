//! Grammar engine for auto-scan reports.
//!
//! [`parse`] turns report text into a [`RawTree`] or fails with a
//! [`SyntaxError`] pointing at the narrowest span it can attribute.

mod error;
mod parser;

pub(crate) use error::clamp_to_boundary;
pub use error::{Location, Position, SyntaxError};
pub use parser::{parse, RawTree};

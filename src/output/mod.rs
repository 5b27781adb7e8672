//! Output formatting module
//!
//! Console and JSON rendering of run results.

mod formatter;

pub use formatter::{OutputFormat, ResultFormatter};

//! Output formatting module
//!
//! Renders a run summary as a table, JSON, CSV or a one-line summary.

mod formatter;

pub use formatter::{write_results_to_file, OutputFormat, ResultFormatter};

//! File staging for packito.
//!
//! This module handles:
//! - Recursive, link-following copies into the output directory
//! - Directory expansion when only single-file copies are available
//! - Reporting non-fatal copy failures to a diagnostic sink

pub mod copier;
pub mod sink;

pub use copier::{CopyMode, TreeStager};
pub use sink::{DiagnosticSink, MemorySink, TracingSink};

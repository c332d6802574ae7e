//! Configuration loading and parsing for packito.
//!
//! This module handles:
//! - JSON options file parsing
//! - Fallback to the built-in default options
//! - Publisher settings derivation

pub mod parser;
pub mod resolve;
pub mod types;

pub use parser::{parse_options_file, parse_options_str, read_json_file};
pub use resolve::{load_options, resolve_options};
pub use types::{
	DEFAULT_OPTIONS_FILE, Options, PublisherSettings, PublisherSpec, REMOVE_WILDCARD,
};

use crate::config::parser::parse_options_file;
use crate::config::types::{DEFAULT_OPTIONS_FILE, Options};
use crate::error::Result;
use std::path::Path;

/// Load the options file strictly, surfacing read and parse errors.
///
/// `file_name` defaults to `.packito.json`, `dir` to the current directory.
pub fn load_options(file_name: Option<&Path>, dir: Option<&Path>) -> Result<Options> {
	let file_name = file_name.unwrap_or(Path::new(DEFAULT_OPTIONS_FILE));
	let dir = dir.unwrap_or(Path::new("./"));
	parse_options_file(file_name, dir)
}

/// Resolve options for a run.
///
/// A missing or invalid options file is a normal case: the failure is
/// logged at debug level and the built-in defaults are returned instead.
pub fn resolve_options(file_name: Option<&Path>, dir: Option<&Path>) -> Options {
	match load_options(file_name, dir) {
		Ok(options) => options,
		Err(e) => {
			tracing::debug!(error = %e, "using default options");
			Options::default()
		}
	}
}

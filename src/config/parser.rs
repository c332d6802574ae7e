use crate::config::types::Options;
use crate::error::{PackitoError, Result};
use serde::de::DeserializeOwned;
use std::path::Path;

/// Read and deserialize a JSON document at `dir/file_name`.
///
/// The file handle is scoped to this call and released on every path.
pub fn read_json_file<T: DeserializeOwned>(file_name: &Path, dir: &Path) -> Result<T> {
	let path = dir.join(file_name);
	let content = std::fs::read_to_string(&path).map_err(|source| PackitoError::ReadError {
		path: path.clone(),
		source,
	})?;

	serde_json::from_str(&content).map_err(|source| PackitoError::ParseError { path, source })
}

/// Parse an options file from `dir/file_name`.
pub fn parse_options_file(file_name: &Path, dir: &Path) -> Result<Options> {
	read_json_file(file_name, dir)
}

/// Parse options from a string (useful for testing).
pub fn parse_options_str(content: &str, path: &Path) -> Result<Options> {
	serde_json::from_str(content).map_err(|source| PackitoError::ParseError {
		path: path.to_path_buf(),
		source,
	})
}

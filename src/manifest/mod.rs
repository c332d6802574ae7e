//! Package manifest handling for packito.
//!
//! This module handles:
//! - Loading the source `package.json`
//! - Field removal and replacement rules
//! - Tab-indented serialization of the transformed manifest

pub mod transform;

pub use transform::{apply_removals, apply_replacements, is_truthy, transform_manifest};

use crate::config::parser::read_json_file;
use crate::error::{PackitoError, Result};
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use std::path::Path;

/// Conventional manifest file name, both as source and as output.
pub const DEFAULT_MANIFEST_FILE: &str = "package.json";

/// A package manifest. Untyped so unknown fields pass through untouched;
/// key order is preserved.
pub type Manifest = serde_json::Map<String, serde_json::Value>;

/// Load `package.json` from `dir`.
pub fn load_manifest(dir: &Path) -> Result<Manifest> {
	read_json_file(Path::new(DEFAULT_MANIFEST_FILE), dir)
}

/// Serialize a manifest as pretty JSON indented with tabs.
pub fn to_pretty_json(manifest: &Manifest) -> Result<String> {
	let mut buf = Vec::new();
	let formatter = PrettyFormatter::with_indent(b"\t");
	let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
	manifest
		.serialize(&mut ser)
		.map_err(|source| PackitoError::ManifestSerialize { source })?;

	// serde_json only ever emits UTF-8
	Ok(String::from_utf8_lossy(&buf).into_owned())
}

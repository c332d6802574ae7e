use std::path::PathBuf;

/// Library-level structured errors for packito.
///
/// Use `thiserror` for structured errors that library consumers can match on.
/// The CLI binary wraps these with `anyhow` for rich context chains.
#[derive(Debug, thiserror::Error)]
pub enum PackitoError {
	#[error("Failed to read file: {path}")]
	ReadError {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	#[error("Failed to parse JSON file: {path}")]
	ParseError {
		path: PathBuf,
		#[source]
		source: serde_json::Error,
	},

	#[error("Failed to serialize manifest")]
	ManifestSerialize {
		#[source]
		source: serde_json::Error,
	},

	#[error("Failed to write manifest: {path}")]
	ManifestWrite {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	#[error("Could not copy {from} to {to}")]
	StageFailed {
		from: PathBuf,
		to: PathBuf,
		#[source]
		source: std::io::Error,
	},

	#[error("Command execution failed: {command}")]
	CommandFailed {
		command: String,
		#[source]
		source: std::io::Error,
	},

	#[error("Command not found: {command}")]
	CommandNotFound { command: String },
}

/// Result type alias using PackitoError.
pub type Result<T> = std::result::Result<T, PackitoError>;

//! Publisher execution for packito.
//!
//! This module handles:
//! - Resolving the publisher command line
//! - Spawning the publisher with inherited or captured output
//! - Exit code and signal propagation

use crate::config::types::PublisherSettings;
use crate::error::{PackitoError, Result};
use std::io::Write;
use std::path::Path;
use std::process::{Command, ExitStatus, Stdio};

/// Exit code reported when nothing was published.
pub const NOT_PUBLISHED: i32 = -1;

/// How the publisher process terminated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitDescriptor {
	/// Exit code, or `-1` when the process did not exit normally or never ran.
	pub code: i32,

	/// Terminating signal, on Unix.
	pub signal: Option<i32>,
}

impl ExitDescriptor {
	/// Descriptor for a publish step that did not run.
	pub fn not_published() -> Self {
		Self {
			code: NOT_PUBLISHED,
			signal: None,
		}
	}

	pub fn success(&self) -> bool {
		self.code == 0
	}
}

impl From<ExitStatus> for ExitDescriptor {
	fn from(status: ExitStatus) -> Self {
		#[cfg(unix)]
		let signal = {
			use std::os::unix::process::ExitStatusExt;
			status.signal()
		};
		#[cfg(not(unix))]
		let signal = None;

		Self {
			code: status.code().unwrap_or(NOT_PUBLISHED),
			signal,
		}
	}
}

/// Resolve the executable and arguments for the publish step.
///
/// Explicit arguments win over the configured publisher, whose `name` is
/// split on whitespace. Returns `None` when there is nothing to run.
pub fn resolve_publish_command(
	explicit_args: Option<&[String]>,
	publisher: Option<&PublisherSettings>,
) -> Option<(String, Vec<String>)> {
	if let Some((exe, args)) = explicit_args.and_then(|args| args.split_first()) {
		return Some((exe.clone(), args.to_vec()));
	}

	let mut parts = publisher?.name.split_whitespace().map(str::to_string);
	let exe = parts.next()?;
	Some((exe, parts.collect()))
}

/// Execute the publisher.
///
/// Stdin and stderr are inherited. Stdout is inherited too unless a
/// `console` writer is given, in which case it is streamed into it.
pub fn execute_command(
	exe: &str,
	args: &[String],
	cwd: Option<&Path>,
	console: Option<&mut dyn Write>,
) -> Result<ExitDescriptor> {
	let mut cmd = Command::new(exe);
	cmd.args(args)
		.stdin(Stdio::inherit())
		.stderr(Stdio::inherit());
	if let Some(cwd) = cwd {
		cmd.current_dir(cwd);
	}

	let spawn_error = |source: std::io::Error| {
		if source.kind() == std::io::ErrorKind::NotFound {
			PackitoError::CommandNotFound {
				command: exe.to_string(),
			}
		} else {
			PackitoError::CommandFailed {
				command: exe.to_string(),
				source,
			}
		}
	};

	let status = match console {
		None => cmd.stdout(Stdio::inherit()).status().map_err(spawn_error)?,
		Some(console) => {
			let mut child = cmd.stdout(Stdio::piped()).spawn().map_err(spawn_error)?;
			if let Some(mut stdout) = child.stdout.take() {
				std::io::copy(&mut stdout, console).map_err(|source| {
					PackitoError::CommandFailed {
						command: exe.to_string(),
						source,
					}
				})?;
			}
			child.wait().map_err(|source| PackitoError::CommandFailed {
				command: exe.to_string(),
				source,
			})?
		}
	};

	Ok(status.into())
}

#[cfg(test)]
mod tests {
	use super::*;

	fn args(items: &[&str]) -> Vec<String> {
		items.iter().map(|s| s.to_string()).collect()
	}

	#[test]
	fn test_resolve_from_publisher_name() {
		let publisher = PublisherSettings::new("npm publish --access  public");
		let resolved = resolve_publish_command(None, Some(&publisher));

		assert_eq!(
			resolved,
			Some(("npm".to_string(), args(&["publish", "--access", "public"])))
		);
	}

	#[test]
	fn test_resolve_explicit_args_win() {
		let publisher = PublisherSettings::new("npm publish");
		let explicit = args(&["yarn", "publish", "--tag", "next"]);
		let resolved = resolve_publish_command(Some(explicit.as_slice()), Some(&publisher));

		assert_eq!(
			resolved,
			Some(("yarn".to_string(), args(&["publish", "--tag", "next"])))
		);
	}

	#[test]
	fn test_resolve_empty_explicit_args_fall_back() {
		let publisher = PublisherSettings::new("npm publish");
		let resolved = resolve_publish_command(Some(&[][..]), Some(&publisher));

		assert_eq!(resolved, Some(("npm".to_string(), args(&["publish"]))));
	}

	#[test]
	fn test_resolve_nothing() {
		assert_eq!(resolve_publish_command(None, None), None);
		assert_eq!(resolve_publish_command(Some(&[][..]), None), None);

		let blank = PublisherSettings::new("   ");
		assert_eq!(resolve_publish_command(None, Some(&blank)), None);
	}

	#[test]
	fn test_not_published_descriptor() {
		let descriptor = ExitDescriptor::not_published();
		assert_eq!(descriptor.code, -1);
		assert!(descriptor.signal.is_none());
		assert!(!descriptor.success());
	}

	#[cfg(unix)]
	#[test]
	fn test_execute_streams_to_console() {
		let mut console = Vec::new();
		let descriptor = execute_command(
			"echo",
			&args(&["published"]),
			None,
			Some(&mut console as &mut dyn Write),
		)
		.unwrap();

		assert!(descriptor.success());
		assert_eq!(String::from_utf8(console).unwrap(), "published\n");
	}

	#[cfg(unix)]
	#[test]
	fn test_execute_propagates_exit_code() {
		let mut console = Vec::new();
		let descriptor = execute_command(
			"sh",
			&args(&["-c", "exit 3"]),
			None,
			Some(&mut console as &mut dyn Write),
		)
		.unwrap();

		assert_eq!(descriptor.code, 3);
		assert!(descriptor.signal.is_none());
	}

	#[test]
	fn test_execute_command_not_found() {
		let result = execute_command("nonexistent_publisher_12345", &[], None, None);

		match result.unwrap_err() {
			PackitoError::CommandNotFound { command } => {
				assert_eq!(command, "nonexistent_publisher_12345");
			}
			other => panic!("Expected CommandNotFound, got {other:?}"),
		}
	}
}

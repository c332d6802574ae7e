use crate::error::PackitoError;
use crate::stage::sink::DiagnosticSink;
use rayon::prelude::*;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Copy primitive available to the stager.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CopyMode {
	/// Recursive, link-following copy of files and directories.
	#[default]
	Recursive,

	/// Single-file copies only. Directories are expanded entry by entry.
	FileOnly,
}

/// Copies declared files and directories into an output directory.
///
/// Failures never propagate: each one is reported to the diagnostic sink
/// (when present) and the remaining entries carry on.
#[derive(Clone, Default)]
pub struct TreeStager {
	mode: CopyMode,
	sink: Option<Arc<dyn DiagnosticSink>>,
}

impl std::fmt::Debug for TreeStager {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("TreeStager")
			.field("mode", &self.mode)
			.field("sink", &self.sink.is_some())
			.finish()
	}
}

impl TreeStager {
	pub fn new(mode: CopyMode, sink: Option<Arc<dyn DiagnosticSink>>) -> Self {
		Self { mode, sink }
	}

	/// Stage every source into `output_dir` concurrently.
	///
	/// Returns once all entries have settled, whether copied or reported.
	pub fn stage_all(&self, sources: &[PathBuf], output_dir: &Path) {
		sources
			.par_iter()
			.for_each(|source| self.copy_recursive(source, output_dir));
	}

	/// Copy `source` into `output_dir`, keeping its base name.
	pub fn copy_recursive(&self, source: &Path, output_dir: &Path) {
		let destination = destination_for(source, output_dir);

		if is_within(output_dir, source) {
			self.report(PackitoError::StageFailed {
				from: source.to_path_buf(),
				to: destination,
				source: io::Error::new(
					io::ErrorKind::InvalidInput,
					"cannot copy a directory into a subdirectory of itself",
				),
			});
			return;
		}

		let attempt = match self.mode {
			CopyMode::Recursive => copy_tree(source, &destination),
			CopyMode::FileOnly => fs::copy(source, &destination).map(|_| ()),
		};

		match attempt {
			Ok(()) => {
				tracing::debug!(from = %source.display(), to = %destination.display(), "staged");
			}
			Err(_) if self.mode == CopyMode::FileOnly && source.is_dir() => {
				self.expand_dir(source, &destination);
			}
			Err(source_err) => self.report(PackitoError::StageFailed {
				from: source.to_path_buf(),
				to: destination,
				source: source_err,
			}),
		}
	}

	/// Stage each child of `source` into `destination`, siblings in parallel.
	fn expand_dir(&self, source: &Path, destination: &Path) {
		let children = fs::create_dir_all(destination)
			.and_then(|()| fs::read_dir(source))
			.and_then(|entries| {
				entries
					.map(|entry| entry.map(|e| e.path()))
					.collect::<io::Result<Vec<_>>>()
			});

		match children {
			Ok(children) => children
				.par_iter()
				.for_each(|child| self.copy_recursive(child, destination)),
			Err(source_err) => self.report(PackitoError::StageFailed {
				from: source.to_path_buf(),
				to: destination.to_path_buf(),
				source: source_err,
			}),
		}
	}

	fn report(&self, err: PackitoError) {
		let message = match &err {
			PackitoError::StageFailed { source, .. } => format!("{err}, {source}"),
			_ => err.to_string(),
		};

		match &self.sink {
			Some(sink) => sink.error(&message),
			None => tracing::debug!("{}", message),
		}
	}
}

fn destination_for(source: &Path, output_dir: &Path) -> PathBuf {
	match source.file_name() {
		Some(name) => output_dir.join(name),
		None => output_dir.to_path_buf(),
	}
}

/// Whether `dir` is `source` or lies below it, once both are canonicalized.
///
/// Paths that cannot be canonicalized (not created yet, or missing) are
/// never considered nested.
fn is_within(dir: &Path, source: &Path) -> bool {
	if !source.is_dir() {
		return false;
	}
	match (fs::canonicalize(dir), fs::canonicalize(source)) {
		(Ok(dir), Ok(source)) => dir.starts_with(source),
		_ => false,
	}
}

/// Recursively copy a file or directory tree.
///
/// Symlinks are followed: a linked directory is materialised as a real
/// directory and a linked file as a regular file.
fn copy_tree(source: &Path, destination: &Path) -> io::Result<()> {
	if !source.is_dir() {
		return fs::copy(source, destination).map(|_| ());
	}

	fs::create_dir_all(destination)?;
	for entry in fs::read_dir(source)? {
		let entry = entry?;
		copy_tree(&entry.path(), &destination.join(entry.file_name()))?;
	}
	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::stage::sink::MemorySink;

	fn write(path: &Path, content: &str) {
		if let Some(parent) = path.parent() {
			fs::create_dir_all(parent).unwrap();
		}
		fs::write(path, content).unwrap();
	}

	fn stager(mode: CopyMode) -> (TreeStager, Arc<MemorySink>) {
		let sink = Arc::new(MemorySink::new());
		let stager = TreeStager::new(mode, Some(sink.clone() as Arc<dyn DiagnosticSink>));
		(stager, sink)
	}

	#[test]
	fn test_copy_single_file() {
		let src = tempfile::tempdir().unwrap();
		let out = tempfile::tempdir().unwrap();
		write(&src.path().join("README.md"), "# readme");

		let (stager, sink) = stager(CopyMode::Recursive);
		stager.copy_recursive(&src.path().join("README.md"), out.path());

		assert_eq!(
			fs::read_to_string(out.path().join("README.md")).unwrap(),
			"# readme"
		);
		assert!(sink.messages().is_empty());
	}

	#[test]
	fn test_copy_directory_recursive_mode() {
		let src = tempfile::tempdir().unwrap();
		let out = tempfile::tempdir().unwrap();
		write(&src.path().join("docs/index.md"), "index");
		write(&src.path().join("docs/api/types.md"), "types");

		let (stager, sink) = stager(CopyMode::Recursive);
		stager.copy_recursive(&src.path().join("docs"), out.path());

		assert_eq!(
			fs::read_to_string(out.path().join("docs/index.md")).unwrap(),
			"index"
		);
		assert_eq!(
			fs::read_to_string(out.path().join("docs/api/types.md")).unwrap(),
			"types"
		);
		assert!(sink.messages().is_empty());
	}

	#[test]
	fn test_copy_directory_file_only_mode_expands() {
		let src = tempfile::tempdir().unwrap();
		let out = tempfile::tempdir().unwrap();
		write(&src.path().join("docs/index.md"), "index");
		write(&src.path().join("docs/api/types.md"), "types");
		write(&src.path().join("docs/api/deep/more.md"), "more");

		let (stager, sink) = stager(CopyMode::FileOnly);
		stager.copy_recursive(&src.path().join("docs"), out.path());

		assert_eq!(
			fs::read_to_string(out.path().join("docs/index.md")).unwrap(),
			"index"
		);
		assert_eq!(
			fs::read_to_string(out.path().join("docs/api/types.md")).unwrap(),
			"types"
		);
		assert_eq!(
			fs::read_to_string(out.path().join("docs/api/deep/more.md")).unwrap(),
			"more"
		);
		assert!(sink.messages().is_empty());
	}

	#[cfg(unix)]
	#[test]
	fn test_copy_follows_symlinks() {
		let src = tempfile::tempdir().unwrap();
		let out = tempfile::tempdir().unwrap();
		write(&src.path().join("real/file.txt"), "data");
		std::os::unix::fs::symlink(src.path().join("real"), src.path().join("linked")).unwrap();

		let (stager, _sink) = stager(CopyMode::Recursive);
		stager.copy_recursive(&src.path().join("linked"), out.path());

		let copied = out.path().join("linked");
		assert!(!fs::symlink_metadata(&copied).unwrap().file_type().is_symlink());
		assert_eq!(
			fs::read_to_string(copied.join("file.txt")).unwrap(),
			"data"
		);
	}

	#[test]
	fn test_missing_source_is_reported() {
		let src = tempfile::tempdir().unwrap();
		let out = tempfile::tempdir().unwrap();
		let missing = src.path().join("LICENSE");

		let (stager, sink) = stager(CopyMode::Recursive);
		stager.copy_recursive(&missing, out.path());

		let messages = sink.messages();
		assert_eq!(messages.len(), 1);
		assert!(messages[0].starts_with("Could not copy"));
		assert!(messages[0].contains(&missing.display().to_string()));
		assert!(messages[0].contains(&out.path().join("LICENSE").display().to_string()));
	}

	#[test]
	fn test_missing_source_without_sink_is_dropped() {
		let out = tempfile::tempdir().unwrap();
		let stager = TreeStager::default();

		stager.copy_recursive(Path::new("/nonexistent/packito/LICENSE"), out.path());

		assert!(!out.path().join("LICENSE").exists());
	}

	#[test]
	fn test_copy_into_own_subdirectory_is_reported() {
		let root = tempfile::tempdir().unwrap();
		let out = root.path().join("dist");
		write(&root.path().join("README.md"), "readme");
		fs::create_dir(&out).unwrap();

		for mode in [CopyMode::Recursive, CopyMode::FileOnly] {
			let (stager, sink) = stager(mode);
			stager.copy_recursive(&root.path().join("."), &out);

			let messages = sink.messages();
			assert_eq!(messages.len(), 1, "{mode:?}: {messages:?}");
			assert!(messages[0].contains("subdirectory of itself"));
			assert_eq!(fs::read_dir(&out).unwrap().count(), 0);
		}
	}

	#[test]
	fn test_copy_into_sibling_directory_is_allowed() {
		let root = tempfile::tempdir().unwrap();
		write(&root.path().join("lib/index.js"), "js");
		let out = root.path().join("dist");
		fs::create_dir(&out).unwrap();

		let (stager, sink) = stager(CopyMode::Recursive);
		stager.copy_recursive(&root.path().join("lib"), &out);

		assert!(out.join("lib/index.js").exists());
		assert!(sink.messages().is_empty());
	}

	#[test]
	fn test_stage_all_failures_do_not_block_siblings() {
		let src = tempfile::tempdir().unwrap();
		let out = tempfile::tempdir().unwrap();
		write(&src.path().join("README.md"), "readme");
		write(&src.path().join("lib/index.js"), "js");

		let sources = vec![
			src.path().join("missing-a"),
			src.path().join("README.md"),
			src.path().join("missing-b"),
			src.path().join("lib"),
		];

		let (stager, sink) = stager(CopyMode::Recursive);
		stager.stage_all(&sources, out.path());

		assert!(out.path().join("README.md").exists());
		assert!(out.path().join("lib/index.js").exists());
		assert_eq!(sink.messages().len(), 2);
	}
}

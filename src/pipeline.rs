//! The packito run: resolve options, transform the manifest, write the
//! output directory, then publish.

use crate::config::resolve::resolve_options;
use crate::config::types::{DEFAULT_OPTIONS_FILE, Options, PublisherSettings};
use crate::error::{PackitoError, Result};
use crate::exec::{ExitDescriptor, execute_command, resolve_publish_command};
use crate::manifest::transform::transform_manifest;
use crate::manifest::{DEFAULT_MANIFEST_FILE, Manifest, load_manifest, to_pretty_json};
use crate::stage::{CopyMode, DiagnosticSink, TreeStager};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Default output directory when neither settings nor options name one.
pub const DEFAULT_OUTPUT_DIR: &str = "./dist";

/// Construction-time settings for a run.
#[derive(Clone)]
pub struct PackitoSettings {
	/// Output directory, unless the options file sets `output`.
	pub output_dir: PathBuf,

	/// Directory the options file and source manifest are read from.
	pub base_dir: PathBuf,

	/// Options file name inside `base_dir`.
	pub options_file: PathBuf,

	/// Skip the publish step entirely.
	pub no_publish: bool,

	/// Explicit publisher command line, overriding the configured publisher.
	pub publisher_args: Option<Vec<String>>,

	/// Copy primitive used when staging files.
	pub copy_mode: CopyMode,

	/// Receiver for non-fatal staging failures.
	pub sink: Option<Arc<dyn DiagnosticSink>>,
}

impl Default for PackitoSettings {
	fn default() -> Self {
		Self {
			output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
			base_dir: PathBuf::from("./"),
			options_file: PathBuf::from(DEFAULT_OPTIONS_FILE),
			no_publish: false,
			publisher_args: None,
			copy_mode: CopyMode::default(),
			sink: None,
		}
	}
}

impl std::fmt::Debug for PackitoSettings {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("PackitoSettings")
			.field("output_dir", &self.output_dir)
			.field("base_dir", &self.base_dir)
			.field("options_file", &self.options_file)
			.field("no_publish", &self.no_publish)
			.field("publisher_args", &self.publisher_args)
			.field("copy_mode", &self.copy_mode)
			.field("sink", &self.sink.is_some())
			.finish()
	}
}

/// State of a single packaging run.
#[derive(Debug)]
pub struct Packito {
	settings: PackitoSettings,
	stager: TreeStager,
	options: Option<Options>,
	manifest: Option<Manifest>,
	publisher: Option<PublisherSettings>,
	payload: Option<String>,
}

impl Packito {
	pub fn new(settings: PackitoSettings) -> Self {
		let stager = TreeStager::new(settings.copy_mode, settings.sink.clone());
		Self {
			settings,
			stager,
			options: None,
			manifest: None,
			publisher: None,
			payload: None,
		}
	}

	/// Options adopted for this run, if resolved yet.
	pub fn options(&self) -> Option<&Options> {
		self.options.as_ref()
	}

	/// The transformed manifest, if transformed yet.
	pub fn manifest(&self) -> Option<&Manifest> {
		self.manifest.as_ref()
	}

	pub fn publisher(&self) -> Option<&PublisherSettings> {
		self.publisher.as_ref()
	}

	/// Serialized manifest waiting to be written.
	pub fn payload(&self) -> Option<&str> {
		self.payload.as_deref()
	}

	/// Resolve the options file, falling back to defaults, and adopt the
	/// result for the rest of the run.
	pub fn read_options(&mut self, file_name: Option<&Path>, dir: Option<&Path>) -> &Options {
		let file_name = file_name.unwrap_or(&self.settings.options_file);
		let dir = dir.unwrap_or(&self.settings.base_dir);
		self.options.insert(resolve_options(Some(file_name), Some(dir)))
	}

	/// Apply the options to a manifest.
	///
	/// Without a manifest, `package.json` is read from the base directory;
	/// when that fails the run continues with an empty manifest. Without
	/// options, the options already adopted for this run are used, or the
	/// options file is resolved.
	pub fn transform(
		&mut self,
		manifest: Option<Manifest>,
		options: Option<Options>,
	) -> Result<&Manifest> {
		let mut manifest = match manifest {
			Some(manifest) => manifest,
			None => load_manifest(&self.settings.base_dir).unwrap_or_else(|e| {
				tracing::warn!(error = %e, "could not load source manifest, continuing with an empty one");
				Manifest::new()
			}),
		};

		let options = match options.or_else(|| self.options.take()) {
			Some(options) => options,
			None => resolve_options(
				Some(self.settings.options_file.as_path()),
				Some(self.settings.base_dir.as_path()),
			),
		};

		transform_manifest(&mut manifest, &options);
		self.publisher = options.publisher_settings();
		self.options = Some(options);
		self.payload = Some(to_pretty_json(&manifest)?);

		Ok(&*self.manifest.insert(manifest))
	}

	/// Effective output directory: the options' `output`, else the settings'.
	///
	/// A relative `output` is taken from the base directory, like the
	/// options file that names it. The settings' directory is used as given.
	pub fn output_dir(&self) -> PathBuf {
		match self.options.as_ref().and_then(|o| o.output.as_deref()) {
			Some(output) => self.settings.base_dir.join(output),
			None => self.settings.output_dir.clone(),
		}
	}

	/// Write the transformed manifest into the output directory, then stage
	/// the files listed in `copy` (relative to the base directory).
	///
	/// Staging runs even when the manifest write fails; the write failure is
	/// returned once staging has settled. Copy failures go to the diagnostic
	/// sink only.
	pub fn write(&mut self, manifest_file: Option<&str>) -> Result<PathBuf> {
		let written = self.write_manifest(manifest_file.unwrap_or(DEFAULT_MANIFEST_FILE));

		let output_dir = self.output_dir();
		if let Some(options) = &self.options {
			let sources: Vec<PathBuf> = options
				.copy
				.iter()
				.map(|source| self.settings.base_dir.join(source))
				.collect();
			self.stager.stage_all(&sources, &output_dir);
		}

		written
	}

	fn write_manifest(&mut self, file_name: &str) -> Result<PathBuf> {
		if self.payload.is_none() {
			self.transform(None, None)?;
		}

		let output_dir = self.output_dir();
		// Only "already exists" is expected here; anything else resurfaces
		// from the write below.
		if let Err(e) = std::fs::create_dir_all(&output_dir)
			&& e.kind() != std::io::ErrorKind::AlreadyExists
		{
			tracing::warn!(dir = %output_dir.display(), error = %e, "could not create output directory");
		}

		let path = output_dir.join(file_name);
		let payload = self.payload.as_deref().unwrap_or_default();
		std::fs::write(&path, payload).map_err(|source| PackitoError::ManifestWrite {
			path: path.clone(),
			source,
		})?;

		tracing::info!(path = %path.display(), "wrote manifest");
		Ok(path)
	}

	/// Run the publisher, unless publishing is suppressed or nothing is
	/// configured, in which case the descriptor carries code `-1`.
	pub fn publish(&self, console: Option<&mut dyn Write>) -> Result<ExitDescriptor> {
		if self.settings.no_publish {
			return Ok(ExitDescriptor::not_published());
		}

		let Some((exe, args)) = resolve_publish_command(
			self.settings.publisher_args.as_deref(),
			self.publisher.as_ref(),
		) else {
			return Ok(ExitDescriptor::not_published());
		};

		tracing::info!(command = %exe, args = ?args, "publishing");
		execute_command(&exe, &args, None, console)
	}

	/// Resolve options, transform, write, and publish.
	///
	/// A failed manifest write stops the run before publishing.
	pub fn run(&mut self, console: Option<&mut dyn Write>) -> Result<ExitDescriptor> {
		self.read_options(None, None);
		self.transform(None, None)?;
		self.write(None)?;
		self.publish(console)
	}
}

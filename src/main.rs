use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use packito_cli::config::{DEFAULT_OPTIONS_FILE, Options, load_options, resolve_options};
use packito_cli::exec::NOT_PUBLISHED;
use packito_cli::pipeline::{DEFAULT_OUTPUT_DIR, Packito, PackitoSettings};
use packito_cli::stage::{CopyMode, DiagnosticSink, TracingSink};

#[derive(Parser)]
#[command(name = "packito")]
#[command(
	author,
	version,
	about = "CLI tool for preparing and publishing a distributable package manifest"
)]
struct Cli {
	#[command(subcommand)]
	command: Option<Commands>,

	/// Output directory (overridden by `output` in the options file)
	#[arg(short, long, value_name = "DIR", default_value = DEFAULT_OUTPUT_DIR)]
	output: PathBuf,

	/// Options file name
	#[arg(short, long, value_name = "FILE", default_value = DEFAULT_OPTIONS_FILE)]
	config: PathBuf,

	/// Directory containing package.json and the options file
	#[arg(short, long, value_name = "DIR", default_value = "./")]
	dir: PathBuf,

	/// Don't run the publisher
	#[arg(short, long)]
	no_publish: bool,

	/// Copy directories one file at a time instead of recursively
	#[arg(long)]
	file_copy: bool,

	/// Enable debug logging
	#[arg(short, long)]
	verbose: bool,

	/// Create a default options file in the package directory
	#[arg(long)]
	init: bool,

	/// Overwrite an existing options file when using --init
	#[arg(long, requires = "init")]
	force: bool,

	/// Publisher command, overriding the one in the options file
	#[arg(last = true, value_name = "PUBLISHER")]
	publisher: Vec<String>,
}

#[derive(Subcommand)]
enum Commands {
	/// Configuration management commands
	Config {
		#[command(subcommand)]
		action: ConfigAction,
	},
}

#[derive(Subcommand)]
enum ConfigAction {
	/// Display the resolved options, defaults included
	Show,
	/// Check the options file for errors without running anything
	Validate,
}

fn main() -> ExitCode {
	let cli = Cli::parse();
	init_logging(cli.verbose);

	match run(cli) {
		Ok(code) => code,
		Err(e) => {
			eprintln!("error: {e:?}");
			ExitCode::FAILURE
		}
	}
}

fn init_logging(verbose: bool) {
	let default_level = if verbose { "debug" } else { "warn" };
	let filter =
		EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
	tracing_subscriber::fmt()
		.with_env_filter(filter)
		.with_writer(std::io::stderr)
		.without_time()
		.init();
}

fn run(cli: Cli) -> Result<ExitCode> {
	if cli.init {
		return handle_init(&cli.dir.join(&cli.config), cli.force);
	}

	if let Some(command) = cli.command {
		return match command {
			Commands::Config { action } => match action {
				ConfigAction::Show => handle_config_show(&cli.config, &cli.dir),
				ConfigAction::Validate => handle_config_validate(&cli.config, &cli.dir),
			},
		};
	}

	handle_package(cli)
}

fn handle_init(config_path: &Path, force: bool) -> Result<ExitCode> {
	if config_path.exists() && !force {
		anyhow::bail!(
			"{} already exists. Use --force to overwrite.",
			config_path.display()
		);
	}

	let template = serde_json::to_string_pretty(&Options::default())
		.context("Failed to render default options")?;
	std::fs::write(config_path, template + "\n")
		.with_context(|| format!("Failed to write {}", config_path.display()))?;

	println!("Created {}", config_path.display());
	Ok(ExitCode::SUCCESS)
}

fn handle_config_show(file: &Path, dir: &Path) -> Result<ExitCode> {
	let options = resolve_options(Some(file), Some(dir));
	let rendered =
		serde_json::to_string_pretty(&options).context("Failed to render options")?;
	println!("{rendered}");
	Ok(ExitCode::SUCCESS)
}

fn handle_config_validate(file: &Path, dir: &Path) -> Result<ExitCode> {
	match load_options(Some(file), Some(dir)) {
		Ok(options) => {
			println!(
				"{} is valid ({} removals, {} replacements, {} copies)",
				dir.join(file).display(),
				options.remove.len(),
				options.replace.len(),
				options.copy.len()
			);
			Ok(ExitCode::SUCCESS)
		}
		Err(e) => {
			eprintln!("Configuration error: {:?}", anyhow::Error::from(e));
			Ok(ExitCode::FAILURE)
		}
	}
}

fn handle_package(cli: Cli) -> Result<ExitCode> {
	let sink: Arc<dyn DiagnosticSink> = Arc::new(TracingSink);
	let settings = PackitoSettings {
		output_dir: cli.output,
		base_dir: cli.dir,
		options_file: cli.config,
		no_publish: cli.no_publish,
		publisher_args: (!cli.publisher.is_empty()).then_some(cli.publisher),
		copy_mode: if cli.file_copy {
			CopyMode::FileOnly
		} else {
			CopyMode::Recursive
		},
		sink: Some(sink),
	};

	let mut packito = Packito::new(settings);
	packito.read_options(None, None);
	packito
		.transform(None, None)
		.context("Failed to transform manifest")?;

	let written = packito.write(None).context("Failed to write package")?;
	println!("Wrote {}", written.display());

	let descriptor = packito.publish(None).context("Failed to run publisher")?;
	if let Some(signal) = descriptor.signal {
		eprintln!("Publisher terminated by signal {signal}");
		return Ok(ExitCode::FAILURE);
	}

	Ok(exit_code_for(descriptor.code))
}

/// Map a publisher exit code onto the process exit code.
///
/// Codes that do not fit a process exit status become a plain failure.
fn exit_code_for(code: i32) -> ExitCode {
	match code {
		NOT_PUBLISHED | 0 => ExitCode::SUCCESS,
		code => u8::try_from(code).map_or(ExitCode::FAILURE, ExitCode::from),
	}
}

//! Packito - CLI tool for preparing a distributable package manifest.
//!
//! This library provides the core functionality for packito, including:
//! - Options file parsing with built-in defaults
//! - Manifest field removal and replacement
//! - Staging auxiliary files into the output directory
//! - Running the publisher command
//!
//! # Example
//!
//! ```no_run
//! use packito_cli::pipeline::{Packito, PackitoSettings};
//!
//! let mut packito = Packito::new(PackitoSettings {
//!     no_publish: true,
//!     ..PackitoSettings::default()
//! });
//!
//! packito.read_options(None, None);
//! packito.transform(None, None).unwrap();
//! let written = packito.write(None).unwrap();
//! println!("Wrote {}", written.display());
//! ```

pub mod config;
pub mod error;
pub mod exec;
pub mod manifest;
pub mod pipeline;
pub mod stage;

pub use error::{PackitoError, Result};
pub use pipeline::{Packito, PackitoSettings};

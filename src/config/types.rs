use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::path::PathBuf;

/// Default options file name, looked up in the base directory.
pub const DEFAULT_OPTIONS_FILE: &str = ".packito.json";

/// Marker conventionally used in `remove` to mean "always remove".
///
/// It carries no matching semantics: any truthy directive removes the field.
pub const REMOVE_WILDCARD: &str = "*";

/// Options read from a `.packito.json` file.
///
/// Only the recognized top-level fields are typed. Directive values inside
/// `remove` and `replace` stay as raw JSON since their meaning depends on
/// truthiness, not on a schema. A recognized field holding the wrong JSON
/// type is treated as carrying no rules; it does not invalidate the file.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Options {
	/// Manifest fields to strip, keyed by field name.
	/// A field is removed when its directive is truthy.
	#[serde(default = "default_remove", deserialize_with = "lenient")]
	pub remove: Map<String, Value>,

	/// Manifest fields to overwrite (or create) when the value is truthy.
	#[serde(
		default,
		deserialize_with = "lenient",
		skip_serializing_if = "Map::is_empty"
	)]
	pub replace: Map<String, Value>,

	/// Command used to publish the output directory.
	#[serde(
		default,
		deserialize_with = "lenient",
		skip_serializing_if = "Option::is_none"
	)]
	pub publisher: Option<PublisherSpec>,

	/// Output directory, overriding the one given at construction time.
	#[serde(
		default,
		deserialize_with = "lenient",
		skip_serializing_if = "Option::is_none"
	)]
	pub output: Option<PathBuf>,

	/// Files and directories staged verbatim into the output directory.
	#[serde(default = "default_copy", deserialize_with = "lenient")]
	pub copy: Vec<PathBuf>,
}

/// The `publisher` field: either a bare command string or a settings object.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum PublisherSpec {
	Name(String),
	Settings(PublisherSettings),
}

/// Resolved publisher identity.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct PublisherSettings {
	/// Command line, split on whitespace into executable and arguments.
	pub name: String,

	/// Any other keys given in the options file, kept verbatim.
	#[serde(flatten)]
	pub extra: Map<String, Value>,
}

impl PublisherSettings {
	pub fn new(name: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			extra: Map::new(),
		}
	}
}

impl From<PublisherSpec> for PublisherSettings {
	fn from(spec: PublisherSpec) -> Self {
		match spec {
			PublisherSpec::Name(name) => PublisherSettings::new(name),
			PublisherSpec::Settings(settings) => settings,
		}
	}
}

/// Deserialize a field, falling back to its empty value when the JSON has
/// an unexpected shape.
fn lenient<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
	D: Deserializer<'de>,
	T: DeserializeOwned + Default,
{
	let value = Value::deserialize(deserializer)?;
	Ok(T::deserialize(&value).unwrap_or_else(|e| {
		tracing::debug!(%value, error = %e, "ignoring options field with unexpected type");
		T::default()
	}))
}

fn default_remove() -> Map<String, Value> {
	let mut remove = Map::new();
	remove.insert("devDependencies".to_string(), Value::from(REMOVE_WILDCARD));
	remove.insert("script".to_string(), Value::from(REMOVE_WILDCARD));
	remove
}

fn default_copy() -> Vec<PathBuf> {
	vec![PathBuf::from("README.md"), PathBuf::from("LICENSE")]
}

impl Default for Options {
	/// The built-in configuration used when no options file can be read.
	fn default() -> Self {
		Self {
			remove: default_remove(),
			replace: Map::new(),
			publisher: None,
			output: None,
			copy: default_copy(),
		}
	}
}

impl Options {
	/// Derive publisher settings, if any were configured.
	pub fn publisher_settings(&self) -> Option<PublisherSettings> {
		self.publisher.clone().map(PublisherSettings::from)
	}
}

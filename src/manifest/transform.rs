use crate::config::types::Options;
use crate::manifest::Manifest;
use serde_json::Value;

/// JSON truthiness: `null`, `false`, `0`, and `""` are falsy, everything
/// else (including empty arrays and objects) is truthy.
pub fn is_truthy(value: &Value) -> bool {
	match value {
		Value::Null => false,
		Value::Bool(b) => *b,
		Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
		Value::String(s) => !s.is_empty(),
		Value::Array(_) | Value::Object(_) => true,
	}
}

/// Delete every manifest field whose `remove` directive is truthy.
pub fn apply_removals(manifest: &mut Manifest, options: &Options) {
	for (key, directive) in &options.remove {
		if is_truthy(directive) && manifest.shift_remove(key).is_some() {
			tracing::debug!(field = %key, "removed manifest field");
		}
	}
}

/// Overwrite (or create) every manifest field whose `replace` value is truthy.
pub fn apply_replacements(manifest: &mut Manifest, options: &Options) {
	for (key, value) in &options.replace {
		if is_truthy(value) {
			manifest.insert(key.clone(), value.clone());
		}
	}
}

/// Apply removal rules, then replacement rules.
///
/// A key listed in both ends up with its replacement value.
pub fn transform_manifest(manifest: &mut Manifest, options: &Options) {
	apply_removals(manifest, options);
	apply_replacements(manifest, options);
}

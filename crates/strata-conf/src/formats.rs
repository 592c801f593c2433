//! File decoders
//!
//! Every supported format is decoded into a JSON value tree and flattened
//! into dotted keys (`database.primary.url`), which is the only shape the
//! resolver ever sees.

use super::error::SourceError;
use super::properties;
use indexmap::IndexMap;
use serde_json::{Map, Value};
use std::fs;
use std::path::Path;

/// Supported configuration file formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileFormat {
	Properties,
	Json,
	Yaml,
	Toml,
}

impl FileFormat {
	/// Preference order used when probing for files
	pub const ALL: [FileFormat; 4] = [
		FileFormat::Properties,
		FileFormat::Json,
		FileFormat::Yaml,
		FileFormat::Toml,
	];

	/// Detect the format from a file extension
	///
	/// # Examples
	///
	/// ```
	/// use strata_conf::formats::FileFormat;
	///
	/// assert_eq!(FileFormat::from_path("uat.yml"), Some(FileFormat::Yaml));
	/// assert_eq!(FileFormat::from_path("settings.ini"), None);
	/// ```
	pub fn from_path(path: impl AsRef<Path>) -> Option<Self> {
		let ext = path.as_ref().extension()?.to_str()?.to_ascii_lowercase();
		match ext.as_str() {
			"properties" => Some(Self::Properties),
			"json" => Some(Self::Json),
			"yaml" | "yml" => Some(Self::Yaml),
			"toml" => Some(Self::Toml),
			_ => None,
		}
	}

	/// Canonical file extension
	pub fn extension(self) -> &'static str {
		match self {
			Self::Properties => "properties",
			Self::Json => "json",
			Self::Yaml => "yaml",
			Self::Toml => "toml",
		}
	}

	/// Label used in source names and error messages
	pub fn label(self) -> &'static str {
		match self {
			Self::Properties => "Properties",
			Self::Json => "JSON",
			Self::Yaml => "YAML",
			Self::Toml => "TOML",
		}
	}

	/// Priority of a file source of this format when loaded explicitly
	pub fn default_priority(self) -> i32 {
		match self {
			Self::Properties | Self::Json => super::sources::priority::FILE,
			Self::Yaml => 35,
			Self::Toml => 25,
		}
	}
}

impl std::fmt::Display for FileFormat {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.write_str(self.label())
	}
}

/// Read and decode a file
///
/// Properties files that are not valid UTF-8 are read as ISO-8859-1, the
/// traditional encoding of that format. Other formats must be UTF-8.
pub fn read_file(path: &Path, format: FileFormat) -> Result<IndexMap<String, String>, SourceError> {
	let bytes = fs::read(path).map_err(|source| SourceError::Io {
		path: path.to_path_buf(),
		source,
	})?;

	let content = match String::from_utf8(bytes) {
		Ok(content) => content,
		Err(e) if format == FileFormat::Properties => e.into_bytes().into_iter().map(char::from).collect(),
		Err(e) => return Err(malformed(path, format, format!("invalid UTF-8: {}", e.utf8_error()))),
	};

	decode(&content, format).map_err(|message| malformed(path, format, message))
}

fn malformed(path: &Path, format: FileFormat, message: String) -> SourceError {
	tracing::warn!(path = %path.display(), format = format.label(), "Malformed configuration file");
	SourceError::Parse {
		path: path.to_path_buf(),
		format: format.label(),
		message,
	}
}

/// Decode file content into flattened dotted keys
///
/// # Examples
///
/// ```
/// use strata_conf::formats::{FileFormat, decode};
///
/// let values = decode("[database]\nport = 5432\n", FileFormat::Toml).unwrap();
/// assert_eq!(values.get("database.port").map(String::as_str), Some("5432"));
/// ```
pub fn decode(content: &str, format: FileFormat) -> Result<IndexMap<String, String>, String> {
	let tree = match format {
		FileFormat::Properties => return properties::parse(content),
		FileFormat::Json => serde_json::from_str::<Value>(content).map_err(|e| e.to_string())?,
		FileFormat::Yaml => match serde_yaml::from_str::<serde_yaml::Value>(content)
			.map_err(|e| e.to_string())?
		{
			// An empty YAML document decodes to nothing
			serde_yaml::Value::Null => Value::Object(Map::new()),
			tree => yaml_to_json(tree)?,
		},
		FileFormat::Toml => {
			let table = content
				.parse::<toml::Table>()
				.map_err(|e| e.to_string())?;
			toml_to_json(toml::Value::Table(table))
		}
	};

	let root = match tree {
		Value::Object(map) => map,
		_ => return Err("Expected a table or object at root".to_string()),
	};

	let mut flat = IndexMap::new();
	for (key, value) in &root {
		flatten_into(key, value, &mut flat);
	}
	Ok(flat)
}

/// Non-finite floats have no JSON number form and are kept as text
fn float_to_json(f: f64) -> Value {
	serde_json::Number::from_f64(f)
		.map(Value::Number)
		.unwrap_or_else(|| Value::String(f.to_string()))
}

fn toml_to_json(value: toml::Value) -> Value {
	match value {
		toml::Value::String(s) => Value::String(s),
		toml::Value::Integer(i) => Value::Number(i.into()),
		toml::Value::Float(f) => float_to_json(f),
		toml::Value::Boolean(b) => Value::Bool(b),
		toml::Value::Datetime(dt) => Value::String(dt.to_string()),
		toml::Value::Array(items) => Value::Array(items.into_iter().map(toml_to_json).collect()),
		toml::Value::Table(table) => Value::Object(
			table
				.into_iter()
				.map(|(k, v)| (k, toml_to_json(v)))
				.collect(),
		),
	}
}

fn yaml_to_json(value: serde_yaml::Value) -> Result<Value, String> {
	let converted = match value {
		serde_yaml::Value::Null => Value::Null,
		serde_yaml::Value::Bool(b) => Value::Bool(b),
		serde_yaml::Value::Number(n) => {
			if let Some(i) = n.as_i64() {
				Value::Number(i.into())
			} else if let Some(u) = n.as_u64() {
				Value::Number(u.into())
			} else {
				float_to_json(n.as_f64().unwrap_or(f64::NAN))
			}
		}
		serde_yaml::Value::String(s) => Value::String(s),
		serde_yaml::Value::Sequence(items) => Value::Array(
			items
				.into_iter()
				.map(yaml_to_json)
				.collect::<Result<_, _>>()?,
		),
		serde_yaml::Value::Mapping(mapping) => {
			let mut map = Map::new();
			for (key, value) in mapping {
				let key = match key {
					serde_yaml::Value::String(s) => s,
					serde_yaml::Value::Number(n) => n.to_string(),
					serde_yaml::Value::Bool(b) => b.to_string(),
					other => return Err(format!("Unsupported mapping key: {:?}", other)),
				};
				map.insert(key, yaml_to_json(value)?);
			}
			Value::Object(map)
		}
		serde_yaml::Value::Tagged(tagged) => yaml_to_json(tagged.value)?,
	};
	Ok(converted)
}

fn scalar_to_string(value: &Value) -> Option<String> {
	match value {
		Value::String(s) => Some(s.clone()),
		Value::Number(n) => Some(n.to_string()),
		Value::Bool(b) => Some(b.to_string()),
		Value::Null | Value::Array(_) | Value::Object(_) => None,
	}
}

fn flatten_into(prefix: &str, value: &Value, out: &mut IndexMap<String, String>) {
	match value {
		Value::Null => {}
		Value::Object(map) => {
			for (key, nested) in map {
				flatten_into(&format!("{}.{}", prefix, key), nested, out);
			}
		}
		Value::Array(items) if items.iter().all(|v| !v.is_array() && !v.is_object()) => {
			let joined = items
				.iter()
				.filter_map(scalar_to_string)
				.collect::<Vec<_>>()
				.join(",");
			out.insert(prefix.to_string(), joined);
		}
		Value::Array(items) => {
			for (index, item) in items.iter().enumerate() {
				flatten_into(&format!("{}.{}", prefix, index), item, out);
			}
		}
		scalar => {
			if let Some(s) = scalar_to_string(scalar) {
				out.insert(prefix.to_string(), s);
			}
		}
	}
}

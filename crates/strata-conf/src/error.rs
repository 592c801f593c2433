//! Error types for configuration resolution and source loading

use std::path::PathBuf;

/// Placeholder shown instead of a sensitive value on every display surface.
pub const MASK: &str = "***MASKED***";

/// Errors raised by the required and typed access paths.
///
/// Absence of a value is not an error on its own: `get`/`get_optional`
/// report it as `None`. Only callers that demand a value (or a specific
/// type) see one of these. File loading reports [`SourceError`] instead.
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
	#[error("Missing required configuration: '{key}'")]
	MissingRequired { key: String },

	#[error("Cannot convert value '{value}' of '{key}' to {target}")]
	TypeConversion {
		key: String,
		/// Raw value, or [`MASK`] when the key is sensitive
		value: String,
		target: &'static str,
	},
}

impl ConfigError {
	/// Build a conversion error, hiding the raw value for sensitive keys.
	pub(crate) fn conversion(
		key: &str,
		value: &str,
		sensitive: bool,
		target: &'static str,
	) -> Self {
		Self::TypeConversion {
			key: key.to_string(),
			value: if sensitive {
				MASK.to_string()
			} else {
				value.to_string()
			},
			target,
		}
	}

	/// Name of the key this error is about
	pub fn key(&self) -> &str {
		match self {
			Self::MissingRequired { key } | Self::TypeConversion { key, .. } => key,
		}
	}
}

/// Error type for configuration sources backed by files
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
	#[error("Failed to read {path}: {source}")]
	Io {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	#[error("Failed to parse {format} file {path}: {message}")]
	Parse {
		path: PathBuf,
		format: &'static str,
		message: String,
	},

	#[error("Unsupported configuration file: {0}")]
	UnsupportedFormat(String),
}

impl SourceError {
	/// Path of the file that failed, when known
	pub fn path(&self) -> Option<&std::path::Path> {
		match self {
			Self::Io { path, .. } | Self::Parse { path, .. } => Some(path),
			Self::UnsupportedFormat(_) => None,
		}
	}
}

/// Result alias used across the crate
pub type ConfigResult<T> = Result<T, ConfigError>;

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_conversion_error_masks_sensitive_value() {
		let err = ConfigError::conversion("api.key", "sk_live_123", true, "i32");
		let message = err.to_string();

		assert!(message.contains(MASK));
		assert!(!message.contains("sk_live_123"));
		assert_eq!(err.key(), "api.key");
	}

	#[test]
	fn test_conversion_error_keeps_plain_value() {
		let err = ConfigError::conversion("pool.size", "ten", false, "i32");

		assert_eq!(
			err.to_string(),
			"Cannot convert value 'ten' of 'pool.size' to i32"
		);
	}

	#[test]
	fn test_missing_required_message() {
		let err = ConfigError::MissingRequired {
			key: "database.url".to_string(),
		};

		assert_eq!(
			err.to_string(),
			"Missing required configuration: 'database.url'"
		);
		assert_eq!(err.key(), "database.url");
	}
}

//! Source diagnostics and display helpers
//!
//! Everything here is meant to be printed or logged, so sensitive values
//! are always replaced by [`MASK`].

use super::config::Config;
use super::error::MASK;
use super::key::ConfigKey;
use super::resolver::ResolvedValue;
use indexmap::IndexMap;
use std::fmt;

/// Where the current value of a key comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceInfo {
	pub key: String,
	/// Display-safe value: [`MASK`] for a found sensitive value
	pub value: Option<String>,
	pub source_name: Option<String>,
	pub found: bool,
	pub from_default: bool,
	pub sensitive: bool,
}

impl SourceInfo {
	fn from_resolved<K: ConfigKey + ?Sized>(key: &K, resolved: ResolvedValue) -> Self {
		let found = resolved.found();
		Self {
			key: key.key().to_string(),
			value: mask_if(resolved.value, key.is_sensitive()),
			source_name: resolved.source_name,
			found,
			from_default: resolved.from_default,
			sensitive: key.is_sensitive(),
		}
	}

	/// Label of the provider: source name, `default`, or `not set`
	pub fn origin(&self) -> &str {
		match (&self.source_name, self.from_default) {
			(Some(name), _) => name.as_str(),
			(None, true) => "default",
			(None, false) => "not set",
		}
	}
}

impl fmt::Display for SourceInfo {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(
			f,
			"{} = {} [{}]",
			self.key,
			self.value.as_deref().unwrap_or("<not set>"),
			self.origin()
		)
	}
}

fn mask_if(value: Option<String>, sensitive: bool) -> Option<String> {
	match value {
		Some(_) if sensitive => Some(MASK.to_string()),
		other => other,
	}
}

impl Config {
	/// Report which source (or the default) produced the value of `key`
	///
	/// # Examples
	///
	/// ```
	/// use strata_conf::{Config, KeyDescriptor, MASK};
	/// use strata_conf::sources::MapSource;
	///
	/// let config = Config::empty();
	/// config.add_source(MapSource::new("vault", 70).with_value("db.password", "s3cret"));
	///
	/// let info = config.source_info(&KeyDescriptor::new("db.password").sensitive());
	/// assert_eq!(info.value.as_deref(), Some(MASK));
	/// assert_eq!(info.source_name.as_deref(), Some("vault"));
	/// ```
	pub fn source_info<K: ConfigKey + ?Sized>(&self, key: &K) -> SourceInfo {
		SourceInfo::from_resolved(key, self.resolve(key))
	}

	/// [`source_info`](Self::source_info) for several keys, keyed by name
	/// in the given order
	pub fn all_source_info<K: ConfigKey>(
		&self,
		keys: impl IntoIterator<Item = K>,
	) -> IndexMap<String, SourceInfo> {
		keys.into_iter()
			.map(|key| {
				let info = self.source_info(&key);
				(info.key.clone(), info)
			})
			.collect()
	}

	/// Value for display: masked when the key is sensitive
	pub fn get_for_display<K: ConfigKey + ?Sized>(&self, key: &K) -> Option<String> {
		mask_if(self.get(key), key.is_sensitive())
	}

	/// One `key = value` line per key, sensitive values masked
	///
	/// # Examples
	///
	/// ```
	/// use strata_conf::{Config, KeyDescriptor};
	///
	/// let config = Config::empty();
	/// let name = KeyDescriptor::new("app.name").with_default("demo");
	/// let key = KeyDescriptor::new("api.key").with_default("abc").sensitive();
	///
	/// assert_eq!(
	///     config.get_all_for_display([&name, &key]),
	///     "app.name = demo\napi.key = ***MASKED***"
	/// );
	/// ```
	pub fn get_all_for_display<K: ConfigKey>(&self, keys: impl IntoIterator<Item = K>) -> String {
		keys.into_iter()
			.map(|key| {
				let value = self.get_for_display(&key);
				format!("{} = {}", key.key(), value.as_deref().unwrap_or("<not set>"))
			})
			.collect::<Vec<_>>()
			.join("\n")
	}
}

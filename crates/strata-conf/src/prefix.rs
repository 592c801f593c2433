//! Prefix-based retrieval across all sources
//!
//! Key discovery needs sources that can enumerate their keys (see
//! [`ConfigSource::keys`](crate::sources::ConfigSource::keys)). Each
//! discovered key is then resolved like a point lookup, so its value is the
//! one the highest-priority source holds.
//!
//! Values returned by [`Config::get_by_prefix`] are NOT masked: sources do
//! not know which keys are sensitive. Use [`Config::get_by_prefix_masked`]
//! with the key declarations when the output is displayed.

use super::config::Config;
use super::error::MASK;
use super::key::ConfigKey;
use super::registry::SharedSource;
use super::resolver;
use std::collections::{BTreeMap, BTreeSet, HashSet};

fn discover(sources: &[SharedSource], prefix: &str) -> BTreeSet<String> {
	sources
		.iter()
		.filter_map(|source| source.keys())
		.flatten()
		.filter(|key| key.starts_with(prefix))
		.collect()
}

impl Config {
	/// Every known key starting with `prefix`, sorted
	pub fn keys_with_prefix(&self, prefix: &str) -> BTreeSet<String> {
		discover(&self.registry().snapshot(), prefix)
	}

	/// Every known key starting with `prefix`, mapped to its resolved value
	///
	/// # Examples
	///
	/// ```
	/// use strata_conf::Config;
	/// use strata_conf::sources::MapSource;
	///
	/// let config = Config::empty();
	/// config.add_source(MapSource::new("files", 30)
	///     .with_value("database.url", "postgres://file")
	///     .with_value("database.pool", "10")
	///     .with_value("cache.ttl", "300"));
	/// config.add_source(MapSource::new("overrides", 70)
	///     .with_value("database.url", "postgres://override"));
	///
	/// let database = config.get_by_prefix("database.");
	/// assert_eq!(database.len(), 2);
	/// assert_eq!(database["database.url"], "postgres://override");
	/// ```
	pub fn get_by_prefix(&self, prefix: &str) -> BTreeMap<String, String> {
		let sources = self.registry().snapshot();
		discover(&sources, prefix)
			.into_iter()
			.filter_map(|key| {
				let (value, _) = resolver::from_sources(&sources, &key)?;
				Some((key, value))
			})
			.collect()
	}

	/// [`get_by_prefix`](Self::get_by_prefix) with the values of keys
	/// declared sensitive in `keys` replaced by the mask
	pub fn get_by_prefix_masked<K: ConfigKey>(
		&self,
		prefix: &str,
		keys: impl IntoIterator<Item = K>,
	) -> BTreeMap<String, String> {
		let sensitive: HashSet<String> = keys
			.into_iter()
			.filter(|k| k.is_sensitive())
			.map(|k| k.key().to_string())
			.collect();

		let mut values = self.get_by_prefix(prefix);
		for (key, value) in values.iter_mut() {
			if sensitive.contains(key) {
				*value = MASK.to_string();
			}
		}
		values
	}
}

//! Configuration sources
//!
//! A source is a named, prioritized provider of raw string values. The
//! registry asks sources in priority order (environment variables >
//! process properties > config files > key defaults), so a source only has
//! to answer "do you have a value for this key".

use super::error::SourceError;
use super::formats::{self, FileFormat};
use indexmap::IndexMap;
use parking_lot::RwLock;
use std::env;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Conventional priorities of the built-in sources
pub mod priority {
	/// External run parameters, above everything else
	pub const PARAMETERS: i32 = 80;
	/// Process environment variables
	pub const ENVIRONMENT: i32 = 60;
	/// In-process settable properties
	pub const PROCESS_PROPERTIES: i32 = 50;
	/// Environment-specific file layer of the auto-loader
	pub const ENVIRONMENT_FILE: i32 = 40;
	/// Environment section found inside a global file
	pub const ENVIRONMENT_SECTION: i32 = 35;
	/// Global file layer of the auto-loader
	pub const GLOBAL_FILE: i32 = 30;
	/// Explicitly loaded properties or JSON file
	pub const FILE: i32 = 30;
	/// Key defaults; not a source, shown for reference
	pub const DEFAULTS: i32 = 0;
}

/// Trait for configuration sources
pub trait ConfigSource: Send + Sync {
	/// Name reported by diagnostics
	fn name(&self) -> &str;

	/// Get the priority of this source (higher = more important)
	fn priority(&self) -> i32;

	/// Raw value for `key`, reflecting the source state at call time
	fn get(&self, key: &str) -> Option<String>;

	/// Every key this source can answer for, or `None` when the source
	/// cannot enumerate its keys. Such sources still take part in point
	/// lookups but contribute nothing to prefix queries.
	fn keys(&self) -> Option<Vec<String>> {
		None
	}

	/// Like [`get`](Self::get), but matching key names case-insensitively
	/// when the exact key is absent.
	fn get_ignore_case(&self, key: &str) -> Option<String> {
		if let Some(value) = self.get(key) {
			return Some(value);
		}
		self.keys()?
			.into_iter()
			.find(|candidate| candidate.eq_ignore_ascii_case(key))
			.and_then(|candidate| self.get(&candidate))
	}
}

/// Environment variable name for a dotted key (`api.timeout` -> `API_TIMEOUT`)
pub fn env_var_name(key: &str) -> String {
	key.chars()
		.map(|c| match c {
			'.' | '-' => '_',
			c => c.to_ascii_uppercase(),
		})
		.collect()
}

enum EnvBacking {
	Process,
	Fixed(IndexMap<String, String>),
}

/// Environment variable configuration source
///
/// A key is looked up verbatim first, then under its upper snake case
/// name, so `api.timeout` is also satisfied by `API_TIMEOUT`.
pub struct EnvSource {
	backing: EnvBacking,
	priority: i32,
}

impl EnvSource {
	/// Create a source reading the process environment
	///
	/// # Examples
	///
	/// ```
	/// use strata_conf::sources::{ConfigSource, EnvSource};
	///
	/// let source = EnvSource::new();
	/// assert_eq!(source.priority(), 60);
	/// ```
	pub fn new() -> Self {
		Self {
			backing: EnvBacking::Process,
			priority: priority::ENVIRONMENT,
		}
	}

	/// Create a source over a fixed set of variables instead of the process
	/// environment
	///
	/// # Examples
	///
	/// ```
	/// use strata_conf::sources::{ConfigSource, EnvSource};
	///
	/// let source = EnvSource::from_vars([("API_TIMEOUT", "5000")]);
	/// assert_eq!(source.get("api.timeout").as_deref(), Some("5000"));
	/// ```
	pub fn from_vars<K, V>(vars: impl IntoIterator<Item = (K, V)>) -> Self
	where
		K: Into<String>,
		V: Into<String>,
	{
		Self {
			backing: EnvBacking::Fixed(
				vars.into_iter()
					.map(|(k, v)| (k.into(), v.into()))
					.collect(),
			),
			priority: priority::ENVIRONMENT,
		}
	}

	/// Override the default priority
	pub fn with_priority(mut self, priority: i32) -> Self {
		self.priority = priority;
		self
	}

	fn var(&self, name: &str) -> Option<String> {
		match &self.backing {
			EnvBacking::Process => env::var(name).ok(),
			EnvBacking::Fixed(vars) => vars.get(name).cloned(),
		}
	}
}

impl Default for EnvSource {
	fn default() -> Self {
		Self::new()
	}
}

impl ConfigSource for EnvSource {
	fn name(&self) -> &str {
		"Environment variables"
	}

	fn priority(&self) -> i32 {
		self.priority
	}

	fn get(&self, key: &str) -> Option<String> {
		if key.is_empty() || key.contains(['=', '\0']) {
			return None;
		}
		self.var(key).or_else(|| {
			let name = env_var_name(key);
			if name == key { None } else { self.var(&name) }
		})
	}

	fn keys(&self) -> Option<Vec<String>> {
		let keys = match &self.backing {
			// Variables that are not valid unicode cannot be returned as values
			EnvBacking::Process => env::vars_os()
				.filter_map(|(k, v)| {
					let k = k.into_string().ok()?;
					v.into_string().ok().map(|_| k)
				})
				.collect(),
			EnvBacking::Fixed(vars) => vars.keys().cloned().collect(),
		};
		Some(keys)
	}
}

/// Shared, settable key/value store living for the duration of the process
///
/// This is the counterpart of JVM-style system properties: tests and
/// setup code write to it, and a [`ProcessPropertySource`] reads it on
/// every lookup. Cloning yields another handle to the same store.
#[derive(Clone, Default)]
pub struct PropertyStore {
	inner: Arc<RwLock<IndexMap<String, String>>>,
}

impl PropertyStore {
	pub fn new() -> Self {
		Self::default()
	}

	/// Set a property, returning the previous value
	pub fn set(&self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
		self.inner.write().insert(key.into(), value.into())
	}

	/// Remove a property, returning its value
	pub fn remove(&self, key: &str) -> Option<String> {
		self.inner.write().shift_remove(key)
	}

	pub fn get(&self, key: &str) -> Option<String> {
		self.inner.read().get(key).cloned()
	}

	pub fn contains(&self, key: &str) -> bool {
		self.inner.read().contains_key(key)
	}

	pub fn clear(&self) {
		self.inner.write().clear();
	}

	pub fn keys(&self) -> Vec<String> {
		self.inner.read().keys().cloned().collect()
	}

	pub fn len(&self) -> usize {
		self.inner.read().len()
	}

	pub fn is_empty(&self) -> bool {
		self.inner.read().is_empty()
	}
}

impl std::fmt::Debug for PropertyStore {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		// Property values may hold secrets; only the key set is shown
		f.debug_struct("PropertyStore")
			.field("keys", &self.keys())
			.finish()
	}
}

/// Source reading a [`PropertyStore`]
pub struct ProcessPropertySource {
	store: PropertyStore,
	priority: i32,
}

impl ProcessPropertySource {
	/// Create a source over `store`
	///
	/// # Examples
	///
	/// ```
	/// use strata_conf::sources::{ConfigSource, ProcessPropertySource, PropertyStore};
	///
	/// let store = PropertyStore::new();
	/// let source = ProcessPropertySource::new(store.clone());
	///
	/// store.set("browser", "firefox");
	/// assert_eq!(source.get("browser").as_deref(), Some("firefox"));
	/// ```
	pub fn new(store: PropertyStore) -> Self {
		Self {
			store,
			priority: priority::PROCESS_PROPERTIES,
		}
	}

	pub fn with_priority(mut self, priority: i32) -> Self {
		self.priority = priority;
		self
	}
}

impl ConfigSource for ProcessPropertySource {
	fn name(&self) -> &str {
		"Process properties"
	}

	fn priority(&self) -> i32 {
		self.priority
	}

	fn get(&self, key: &str) -> Option<String> {
		self.store.get(key)
	}

	fn keys(&self) -> Option<Vec<String>> {
		Some(self.store.keys())
	}
}

/// In-memory source with a caller-chosen name and priority
pub struct MapSource {
	name: String,
	priority: i32,
	values: IndexMap<String, String>,
}

impl MapSource {
	/// Create an empty map source
	///
	/// # Examples
	///
	/// ```
	/// use strata_conf::sources::{ConfigSource, MapSource};
	///
	/// let source = MapSource::new("overrides", 70)
	///     .with_value("app.name", "custom");
	///
	/// assert_eq!(source.get("app.name").as_deref(), Some("custom"));
	/// ```
	pub fn new(name: impl Into<String>, priority: i32) -> Self {
		Self {
			name: name.into(),
			priority,
			values: IndexMap::new(),
		}
	}

	/// Add a value for a key
	pub fn with_value(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
		self.values.insert(key.into(), value.into());
		self
	}

	/// Add several values at once
	pub fn with_values<K, V>(mut self, values: impl IntoIterator<Item = (K, V)>) -> Self
	where
		K: Into<String>,
		V: Into<String>,
	{
		self.values
			.extend(values.into_iter().map(|(k, v)| (k.into(), v.into())));
		self
	}
}

impl ConfigSource for MapSource {
	fn name(&self) -> &str {
		&self.name
	}

	fn priority(&self) -> i32 {
		self.priority
	}

	fn get(&self, key: &str) -> Option<String> {
		self.values.get(key).cloned()
	}

	fn keys(&self) -> Option<Vec<String>> {
		Some(self.values.keys().cloned().collect())
	}
}

/// External run parameters (test-runner parameters, command-line overrides)
///
/// With a prefix, only parameters named `<prefix><key>` are visible and the
/// prefix is stripped, e.g. `conf.app.name` answers for `app.name`.
pub struct ParameterSource {
	values: IndexMap<String, String>,
	prefix: Option<String>,
	priority: i32,
}

impl ParameterSource {
	/// Create a parameter source
	///
	/// # Examples
	///
	/// ```
	/// use strata_conf::sources::{ConfigSource, ParameterSource};
	///
	/// let source = ParameterSource::new([("conf.api.timeout", "120000"), ("browser", "chrome")])
	///     .with_prefix("conf.");
	///
	/// assert_eq!(source.get("api.timeout").as_deref(), Some("120000"));
	/// assert_eq!(source.get("browser"), None);
	/// ```
	pub fn new<K, V>(values: impl IntoIterator<Item = (K, V)>) -> Self
	where
		K: Into<String>,
		V: Into<String>,
	{
		Self {
			values: values
				.into_iter()
				.map(|(k, v)| (k.into(), v.into()))
				.collect(),
			prefix: None,
			priority: priority::PARAMETERS,
		}
	}

	/// Only expose parameters starting with `prefix`
	pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
		self.prefix = Some(prefix.into());
		self
	}

	pub fn with_priority(mut self, priority: i32) -> Self {
		self.priority = priority;
		self
	}
}

impl ConfigSource for ParameterSource {
	fn name(&self) -> &str {
		"Parameters"
	}

	fn priority(&self) -> i32 {
		self.priority
	}

	fn get(&self, key: &str) -> Option<String> {
		match &self.prefix {
			Some(prefix) => self.values.get(&format!("{}{}", prefix, key)).cloned(),
			None => self.values.get(key).cloned(),
		}
	}

	fn keys(&self) -> Option<Vec<String>> {
		let keys = match &self.prefix {
			Some(prefix) => self
				.values
				.keys()
				.filter_map(|k| k.strip_prefix(prefix.as_str()))
				.map(str::to_string)
				.collect(),
			None => self.values.keys().cloned().collect(),
		};
		Some(keys)
	}
}

/// Source backed by a parsed configuration file, flattened to dotted keys
pub struct FileSource {
	name: String,
	path: PathBuf,
	format: FileFormat,
	priority: i32,
	values: IndexMap<String, String>,
}

impl FileSource {
	/// Load a file, picking the decoder from its extension
	///
	/// # Examples
	///
	/// ```no_run
	/// use strata_conf::sources::FileSource;
	///
	/// let source = FileSource::load("config/global.yaml").unwrap();
	/// ```
	pub fn load(path: impl AsRef<Path>) -> Result<Self, SourceError> {
		let path = path.as_ref();
		let format = FileFormat::from_path(path).ok_or_else(|| {
			SourceError::UnsupportedFormat(format!("{}", path.display()))
		})?;
		Self::load_as(path, format)
	}

	/// Load a file with an explicit format
	pub fn load_as(path: impl AsRef<Path>, format: FileFormat) -> Result<Self, SourceError> {
		let path = path.as_ref();
		let values = formats::read_file(path, format)?;
		tracing::debug!(
			path = %path.display(),
			format = format.label(),
			keys = values.len(),
			"Loaded configuration file"
		);
		Ok(Self::from_values(path, format, values))
	}

	/// Build a file source from already decoded values
	pub fn from_values(
		path: impl Into<PathBuf>,
		format: FileFormat,
		values: IndexMap<String, String>,
	) -> Self {
		let path = path.into();
		Self {
			name: format!("{}({})", format.label(), path.display()),
			path,
			format,
			priority: format.default_priority(),
			values,
		}
	}

	pub fn with_priority(mut self, priority: i32) -> Self {
		self.priority = priority;
		self
	}

	pub fn with_name(mut self, name: impl Into<String>) -> Self {
		self.name = name.into();
		self
	}

	pub fn path(&self) -> &Path {
		&self.path
	}

	pub fn format(&self) -> FileFormat {
		self.format
	}

	/// Decoded, flattened values in file order
	pub fn values(&self) -> &IndexMap<String, String> {
		&self.values
	}
}

impl ConfigSource for FileSource {
	fn name(&self) -> &str {
		&self.name
	}

	fn priority(&self) -> i32 {
		self.priority
	}

	fn get(&self, key: &str) -> Option<String> {
		self.values.get(key).cloned()
	}

	fn keys(&self) -> Option<Vec<String>> {
		Some(self.values.keys().cloned().collect())
	}
}

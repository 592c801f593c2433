//! The configuration context
//!
//! [`Config`] owns the source registry and the process property store and
//! exposes resolution, typed access and validation over them. It is
//! `Send + Sync`; share it behind an `Arc` (or a `static`) when several
//! threads read configuration.

use super::convert::{self, FromConfigValue};
use super::error::{ConfigError, ConfigResult, SourceError};
use super::formats::FileFormat;
use super::key::ConfigKey;
use super::registry::{SharedSource, SourceRegistry, default_sources};
use super::resolver::{self, ResolvedValue};
use super::sources::{ConfigSource, FileSource, PropertyStore};
use super::validation::{self, ValidationResult, ValidationRules};
use parking_lot::RwLock;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

pub struct Config {
	registry: SourceRegistry,
	properties: PropertyStore,
	pub(crate) environment: RwLock<Option<String>>,
}

impl Config {
	/// Create a context with the default sources (environment variables
	/// and process properties)
	///
	/// # Examples
	///
	/// ```
	/// use strata_conf::Config;
	///
	/// let config = Config::new();
	/// assert_eq!(config.source_names(), vec!["Environment variables", "Process properties"]);
	/// ```
	pub fn new() -> Self {
		let config = Self::empty();
		config.clear_sources_and_use_defaults();
		config
	}

	/// Create a context without any source
	pub fn empty() -> Self {
		Self {
			registry: SourceRegistry::new(),
			properties: PropertyStore::new(),
			environment: RwLock::new(None),
		}
	}

	/// Create a context over the given sources only
	pub fn with_sources(sources: impl IntoIterator<Item = SharedSource>) -> Self {
		let config = Self::empty();
		config.registry.replace(sources);
		config
	}

	pub fn registry(&self) -> &SourceRegistry {
		&self.registry
	}

	/// Store read by the process property source
	pub fn properties(&self) -> &PropertyStore {
		&self.properties
	}

	/// Set a process property
	pub fn set_property(&self, key: impl Into<String>, value: impl Into<String>) {
		self.properties.set(key, value);
	}

	/// Remove a process property
	pub fn clear_property(&self, key: &str) {
		self.properties.remove(key);
	}

	// Source administration

	pub fn add_source(&self, source: impl ConfigSource + 'static) {
		self.registry.add(Arc::new(source));
	}

	pub fn add_shared_source(&self, source: SharedSource) {
		self.registry.add(source);
	}

	/// Remove every source named `name`; returns how many were removed
	pub fn remove_source(&self, name: &str) -> usize {
		self.registry.remove(name)
	}

	pub fn clear_sources(&self) {
		self.registry.clear();
	}

	/// Drop all sources and reinstall the defaults. The environment name of
	/// a previous auto-load is forgotten as well.
	pub fn clear_sources_and_use_defaults(&self) {
		self.registry.replace(default_sources(&self.properties));
		*self.environment.write() = None;
	}

	pub fn replace_sources(&self, sources: impl IntoIterator<Item = SharedSource>) {
		self.registry.replace(sources);
	}

	/// Source names in resolution order
	pub fn source_names(&self) -> Vec<String> {
		self.registry.names()
	}

	// File loading

	/// Load a configuration file as a source; the format comes from the
	/// file extension
	pub fn load_file(&self, path: impl AsRef<Path>) -> Result<(), SourceError> {
		self.add_source(FileSource::load(path)?);
		Ok(())
	}

	pub fn load_properties(&self, path: impl AsRef<Path>) -> Result<(), SourceError> {
		self.add_source(FileSource::load_as(path, FileFormat::Properties)?);
		Ok(())
	}

	pub fn load_json(&self, path: impl AsRef<Path>) -> Result<(), SourceError> {
		self.add_source(FileSource::load_as(path, FileFormat::Json)?);
		Ok(())
	}

	pub fn load_yaml(&self, path: impl AsRef<Path>) -> Result<(), SourceError> {
		self.add_source(FileSource::load_as(path, FileFormat::Yaml)?);
		Ok(())
	}

	pub fn load_toml(&self, path: impl AsRef<Path>) -> Result<(), SourceError> {
		self.add_source(FileSource::load_as(path, FileFormat::Toml)?);
		Ok(())
	}

	// Resolution

	/// Resolve `key` against the sources in priority order, then its default
	///
	/// # Examples
	///
	/// ```
	/// use strata_conf::{Config, KeyDescriptor};
	/// use strata_conf::sources::MapSource;
	///
	/// let config = Config::empty();
	/// config.add_source(MapSource::new("A", 30).with_value("app.name", "X"));
	/// config.add_source(MapSource::new("B", 50).with_value("app.name", "Y"));
	///
	/// let resolved = config.resolve(&KeyDescriptor::new("app.name"));
	/// assert_eq!(resolved.as_deref(), Some("Y"));
	/// assert_eq!(resolved.source_name.as_deref(), Some("B"));
	/// ```
	pub fn resolve<K: ConfigKey + ?Sized>(&self, key: &K) -> ResolvedValue {
		resolver::resolve(&self.registry.snapshot(), key.key(), key.default_value())
	}

	/// Raw value, unmasked even for sensitive keys
	pub fn get<K: ConfigKey + ?Sized>(&self, key: &K) -> Option<String> {
		self.resolve(key).value
	}

	/// Same as [`get`](Self::get); never fails
	pub fn get_optional<K: ConfigKey + ?Sized>(&self, key: &K) -> Option<String> {
		self.get(key)
	}

	/// Value from the sources, or `fallback` when none has one. The key's
	/// own default is not consulted.
	pub fn get_or_default<K: ConfigKey + ?Sized>(&self, key: &K, fallback: &str) -> String {
		resolver::from_sources(&self.registry.snapshot(), key.key())
			.map(|(value, _)| value)
			.unwrap_or_else(|| fallback.to_string())
	}

	/// Value, or [`ConfigError::MissingRequired`] when neither a source
	/// nor the default provides one
	pub fn get_required<K: ConfigKey + ?Sized>(&self, key: &K) -> ConfigResult<String> {
		self.get(key).ok_or_else(|| ConfigError::MissingRequired {
			key: key.key().to_string(),
		})
	}

	/// Typed value; missing values are [`ConfigError::MissingRequired`],
	/// malformed ones [`ConfigError::TypeConversion`]
	pub fn get_as<T, K>(&self, key: &K) -> ConfigResult<T>
	where
		T: FromConfigValue,
		K: ConfigKey + ?Sized,
	{
		self.get_optional_as(key)?
			.ok_or_else(|| ConfigError::MissingRequired {
				key: key.key().to_string(),
			})
	}

	/// Typed value, `Ok(None)` when absent
	pub fn get_optional_as<T, K>(&self, key: &K) -> ConfigResult<Option<T>>
	where
		T: FromConfigValue,
		K: ConfigKey + ?Sized,
	{
		self.get(key)
			.map(|raw| convert_raw(key, &raw, T::from_config_value, T::TYPE_NAME))
			.transpose()
	}

	pub fn get_i32<K: ConfigKey + ?Sized>(&self, key: &K) -> ConfigResult<i32> {
		self.get_as(key)
	}

	pub fn get_i64<K: ConfigKey + ?Sized>(&self, key: &K) -> ConfigResult<i64> {
		self.get_as(key)
	}

	pub fn get_f64<K: ConfigKey + ?Sized>(&self, key: &K) -> ConfigResult<f64> {
		self.get_as(key)
	}

	/// Strict boolean: `true` or `false` in any case, anything else is a
	/// conversion error
	pub fn get_bool<K: ConfigKey + ?Sized>(&self, key: &K) -> ConfigResult<bool> {
		self.get_as(key)
	}

	/// Boolean that also accepts `yes/no`, `on/off` and `1/0`
	pub fn get_bool_lenient<K: ConfigKey + ?Sized>(&self, key: &K) -> ConfigResult<bool> {
		let raw = self.get_required(key)?;
		convert_raw(key, &raw, convert::parse_bool_lenient, "bool")
	}

	/// Comma-separated list
	pub fn get_list<K: ConfigKey + ?Sized>(&self, key: &K) -> ConfigResult<Vec<String>> {
		self.get_as(key)
	}

	/// Duration such as `1500`, `30s`, `5m` (a bare number is milliseconds)
	pub fn get_duration<K: ConfigKey + ?Sized>(&self, key: &K) -> ConfigResult<Duration> {
		self.get_as(key)
	}

	// Validation

	/// Run the checks attached to `keys`, collecting every violation
	pub fn validate<K: ConfigKey>(&self, keys: impl IntoIterator<Item = K>) -> ValidationResult {
		self.run_validation(keys, None)
	}

	/// Like [`validate`](Self::validate), adding the checks from `rules`
	pub fn validate_with<K: ConfigKey>(
		&self,
		keys: impl IntoIterator<Item = K>,
		rules: &ValidationRules,
	) -> ValidationResult {
		self.run_validation(keys, Some(rules))
	}

	fn run_validation<K: ConfigKey>(
		&self,
		keys: impl IntoIterator<Item = K>,
		rules: Option<&ValidationRules>,
	) -> ValidationResult {
		let sources = self.registry.snapshot();
		let mut result = ValidationResult::default();
		for key in keys {
			let resolved = resolver::resolve(&sources, key.key(), key.default_value());
			validation::check_key(&key, resolved.as_deref(), rules, &mut result);
		}
		if !result.is_valid() {
			tracing::debug!(errors = result.error_count(), "Configuration validation failed");
		}
		result
	}
}

impl Default for Config {
	fn default() -> Self {
		Self::new()
	}
}

impl std::fmt::Debug for Config {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Config")
			.field("sources", &self.registry)
			.field("environment", &*self.environment.read())
			.finish()
	}
}

fn convert_raw<T, K: ConfigKey + ?Sized>(
	key: &K,
	raw: &str,
	parse: impl FnOnce(&str) -> Option<T>,
	target: &'static str,
) -> ConfigResult<T> {
	parse(raw).ok_or_else(|| ConfigError::conversion(key.key(), raw, key.is_sensitive(), target))
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::sources::MapSource;
	use crate::{KeyDescriptor, MASK};
	use rstest::{fixture, rstest};

	#[fixture]
	fn config() -> Config {
		let config = Config::empty();
		config.add_source(
			MapSource::new("files", 30)
				.with_value("pool.size", "20")
				.with_value("pool.bad", "twenty")
				.with_value("flag", "TRUE")
				.with_value("flag.lenient", "yes")
				.with_value("browsers", "chrome, firefox")
				.with_value("timeout", "30s")
				.with_value("ratio", "0.75")
				.with_value("secret.pin", "12ab"),
		);
		config
	}

	#[rstest]
	fn test_typed_getters(config: Config) {
		assert_eq!(config.get_i32(&KeyDescriptor::new("pool.size")).unwrap(), 20);
		assert_eq!(config.get_i64(&KeyDescriptor::new("pool.size")).unwrap(), 20);
		assert_eq!(config.get_f64(&KeyDescriptor::new("ratio")).unwrap(), 0.75);
		assert!(config.get_bool(&KeyDescriptor::new("flag")).unwrap());
		assert_eq!(
			config.get_list(&KeyDescriptor::new("browsers")).unwrap(),
			vec!["chrome", "firefox"]
		);
		assert_eq!(
			config.get_duration(&KeyDescriptor::new("timeout")).unwrap(),
			Duration::from_secs(30)
		);
	}

	#[rstest]
	fn test_malformed_value_does_not_use_default(config: Config) {
		let key = KeyDescriptor::new("pool.bad").with_default("5");

		let err = config.get_i32(&key).unwrap_err();

		assert!(matches!(
			err,
			ConfigError::TypeConversion { ref key, ref value, target: "i32" }
				if key == "pool.bad" && value == "twenty"
		));
	}

	#[rstest]
	fn test_conversion_error_masks_sensitive_value(config: Config) {
		let key = KeyDescriptor::new("secret.pin").sensitive();

		match config.get_i32(&key) {
			Err(ConfigError::TypeConversion { value, .. }) => assert_eq!(value, MASK),
			other => panic!("unexpected result: {:?}", other),
		}
	}

	#[rstest]
	fn test_missing_typed_value(config: Config) {
		let err = config.get_i32(&KeyDescriptor::new("absent")).unwrap_err();

		assert!(matches!(err, ConfigError::MissingRequired { ref key } if key == "absent"));
	}

	#[rstest]
	fn test_default_is_converted_when_absent(config: Config) {
		let key = KeyDescriptor::new("absent").with_default("7");

		assert_eq!(config.get_i32(&key).unwrap(), 7);
	}

	#[rstest]
	fn test_strict_and_lenient_booleans(config: Config) {
		let key = KeyDescriptor::new("flag.lenient");

		assert!(matches!(
			config.get_bool(&key),
			Err(ConfigError::TypeConversion { .. })
		));
		assert!(config.get_bool_lenient(&key).unwrap());
	}

	#[rstest]
	fn test_get_or_default_ignores_key_default(config: Config) {
		let key = KeyDescriptor::new("absent").with_default("from-key");

		assert_eq!(config.get_or_default(&key, "explicit"), "explicit");
		assert_eq!(
			config.get_or_default(&KeyDescriptor::new("pool.size"), "explicit"),
			"20"
		);
	}

	#[rstest]
	fn test_required_and_optional(config: Config) {
		let absent = KeyDescriptor::new("absent");

		assert_eq!(config.get_optional(&absent), None);
		assert!(config.get_required(&absent).is_err());
		assert_eq!(
			config.get_required(&KeyDescriptor::new("pool.size")).unwrap(),
			"20"
		);
		assert_eq!(config.get_optional_as::<i32, _>(&absent).unwrap(), None);
	}

	#[test]
	fn test_clear_sources_and_use_defaults_forgets_environment() {
		let config = Config::empty();
		*config.environment.write() = Some("uat".to_string());
		config.add_source(MapSource::new("custom", 70));

		config.clear_sources_and_use_defaults();

		assert_eq!(config.source_names().len(), 2);
		assert!(config.environment.read().is_none());
	}

	#[test]
	fn test_property_writes_are_visible_without_refresh() {
		let config = Config::new();
		let key = KeyDescriptor::new("strata.test.unique.property").with_default("default");

		assert_eq!(config.get(&key).as_deref(), Some("default"));
		config.set_property("strata.test.unique.property", "set");
		assert_eq!(config.get(&key).as_deref(), Some("set"));
		config.clear_property("strata.test.unique.property");
		assert_eq!(config.get(&key).as_deref(), Some("default"));
	}

	fn write(dir: &tempfile::TempDir, name: &str, content: &str) -> std::path::PathBuf {
		let path = dir.path().join(name);
		std::fs::write(&path, content).unwrap();
		path
	}

	#[test]
	fn test_load_missing_file_is_io_error() {
		let dir = tempfile::TempDir::new().unwrap();
		let config = Config::empty();
		let missing = dir.path().join("missing.json");

		let err = config.load_json(&missing).unwrap_err();

		assert!(matches!(err, SourceError::Io { .. }));
		assert_eq!(err.path(), Some(missing.as_path()));
		assert!(config.source_names().is_empty());
	}

	#[test]
	fn test_explicit_loaders_order_by_format_priority() {
		let dir = tempfile::TempDir::new().unwrap();
		let toml = write(&dir, "a.toml", "shared = \"toml\"\n");
		let yaml = write(&dir, "a.yaml", "shared: yaml\n");
		let properties = write(&dir, "a.properties", "shared=properties\n");
		let json = write(&dir, "a.json", r#"{"shared": "json"}"#);
		let config = Config::empty();

		config.load_toml(&toml).unwrap();
		config.load_json(&json).unwrap();
		config.load_properties(&properties).unwrap();
		config.load_yaml(&yaml).unwrap();

		assert_eq!(
			config.source_names(),
			vec![
				format!("YAML({})", yaml.display()),
				format!("JSON({})", json.display()),
				format!("Properties({})", properties.display()),
				format!("TOML({})", toml.display()),
			]
		);
		assert_eq!(config.get(&KeyDescriptor::new("shared")).as_deref(), Some("yaml"));
	}

	#[test]
	fn test_equal_format_priorities_keep_load_order() {
		let dir = tempfile::TempDir::new().unwrap();
		let properties = write(&dir, "a.properties", "shared=properties\n");
		let json = write(&dir, "a.json", r#"{"shared": "json"}"#);
		let config = Config::empty();

		config.load_properties(&properties).unwrap();
		config.load_json(&json).unwrap();

		assert_eq!(
			config.get(&KeyDescriptor::new("shared")).as_deref(),
			Some("properties")
		);
	}

	#[rstest]
	#[case("app.properties", "db.port=5432\n", "Properties")]
	#[case("app.json", r#"{"db": {"port": 5432}}"#, "JSON")]
	#[case("app.yaml", "db:\n  port: 5432\n", "YAML")]
	#[case("app.yml", "db:\n  port: 5432\n", "YAML")]
	#[case("app.toml", "[db]\nport = 5432\n", "TOML")]
	#[case("APP.JSON", r#"{"db": {"port": 5432}}"#, "JSON")]
	fn test_load_file_picks_decoder_from_extension(
		#[case] name: &str,
		#[case] content: &str,
		#[case] label: &str,
	) {
		let dir = tempfile::TempDir::new().unwrap();
		let path = write(&dir, name, content);
		let config = Config::empty();

		config.load_file(&path).unwrap();

		assert_eq!(config.get_i32(&KeyDescriptor::new("db.port")).unwrap(), 5432);
		assert_eq!(
			config.source_names(),
			vec![format!("{}({})", label, path.display())]
		);
	}

	#[test]
	fn test_load_file_rejects_unknown_extension() {
		let dir = tempfile::TempDir::new().unwrap();
		let path = write(&dir, "app.ini", "a=b\n");
		let config = Config::empty();

		let err = config.load_file(&path).unwrap_err();

		assert!(matches!(err, SourceError::UnsupportedFormat(_)));
		assert!(config.source_names().is_empty());
	}

	#[test]
	fn test_malformed_file_is_not_registered() {
		let dir = tempfile::TempDir::new().unwrap();
		let path = write(&dir, "app.toml", "key = ");
		let config = Config::empty();

		let err = config.load_toml(&path).unwrap_err();

		assert!(matches!(err, SourceError::Parse { format: "TOML", .. }));
		assert!(config.source_names().is_empty());
	}
}

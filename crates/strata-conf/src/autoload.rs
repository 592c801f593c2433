//! Environment detection and layered file loading
//!
//! Auto-loading runs once, at setup time:
//!
//! 1. Detect the environment name by probing the discovery keys
//!    (`APP_ENV`, `ENVIRONMENT`, `ENV`) against the registered sources,
//!    ignoring case. Without a hit the default environment (`local`) is used.
//! 2. Register every existing global file (`global.*`, then `common.*`) at
//!    [`GLOBAL_FILE`](priority::GLOBAL_FILE) priority. Keys of the form
//!    `<environment>.<rest>` inside a global file also form an overlay at
//!    [`ENVIRONMENT_SECTION`](priority::ENVIRONMENT_SECTION) priority.
//! 3. Register every existing `<environment>.*` file at
//!    [`ENVIRONMENT_FILE`](priority::ENVIRONMENT_FILE) priority.
//!
//! Environment names and base names match file names and section keys
//! ignoring ASCII case, so `APP_ENV=UAT` selects `uat.properties` and a
//! `[uat]` section alike. An exact file name wins over other spellings.
//!
//! Layers are merged only through source priority. Calling the loader again
//! registers the layers again; clear the sources first when reloading.

use super::config::Config;
use super::error::SourceError;
use super::formats::FileFormat;
use super::registry::SharedSource;
use super::sources::{ConfigSource, FileSource, MapSource, priority};
use indexmap::IndexMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Keys probed, in order, to detect the environment name
pub const DEFAULT_DISCOVERY_KEYS: [&str; 3] = ["APP_ENV", "ENVIRONMENT", "ENV"];

/// Environment used when no discovery key is set
pub const DEFAULT_ENVIRONMENT: &str = "local";

/// Base names of the global layer, in load order
pub const DEFAULT_GLOBAL_BASENAMES: [&str; 2] = ["global", "common"];

/// Options of [`Config::auto_load_with`]
#[derive(Debug, Clone)]
pub struct AutoLoadOptions {
	config_dir: PathBuf,
	discovery_keys: Vec<String>,
	default_environment: String,
	global_basenames: Vec<String>,
}

impl AutoLoadOptions {
	/// Options with the conventional defaults
	///
	/// # Examples
	///
	/// ```
	/// use strata_conf::autoload::AutoLoadOptions;
	///
	/// let options = AutoLoadOptions::new()
	///     .with_config_dir("config")
	///     .with_default_environment("dev");
	///
	/// assert_eq!(options.config_dir().to_str(), Some("config"));
	/// assert_eq!(options.discovery_keys(), ["APP_ENV", "ENVIRONMENT", "ENV"]);
	/// ```
	pub fn new() -> Self {
		Self::default()
	}

	/// Directory holding the configuration files
	pub fn with_config_dir(mut self, dir: impl Into<PathBuf>) -> Self {
		self.config_dir = dir.into();
		self
	}

	/// Keys probed, in order, for the environment name
	pub fn with_discovery_keys<S: Into<String>>(mut self, keys: impl IntoIterator<Item = S>) -> Self {
		self.discovery_keys = keys.into_iter().map(Into::into).collect();
		self
	}

	pub fn with_default_environment(mut self, environment: impl Into<String>) -> Self {
		self.default_environment = environment.into();
		self
	}

	/// Base names of the global files, in load order
	pub fn with_global_basenames<S: Into<String>>(
		mut self,
		names: impl IntoIterator<Item = S>,
	) -> Self {
		self.global_basenames = names.into_iter().map(Into::into).collect();
		self
	}

	pub fn config_dir(&self) -> &Path {
		&self.config_dir
	}

	pub fn discovery_keys(&self) -> &[String] {
		&self.discovery_keys
	}

	pub fn default_environment(&self) -> &str {
		&self.default_environment
	}

	pub fn global_basenames(&self) -> &[String] {
		&self.global_basenames
	}
}

impl Default for AutoLoadOptions {
	fn default() -> Self {
		Self {
			config_dir: PathBuf::from("."),
			discovery_keys: DEFAULT_DISCOVERY_KEYS.iter().map(|k| k.to_string()).collect(),
			default_environment: DEFAULT_ENVIRONMENT.to_string(),
			global_basenames: DEFAULT_GLOBAL_BASENAMES
				.iter()
				.map(|k| k.to_string())
				.collect(),
		}
	}
}

impl Config {
	/// Detect the environment and load the global and environment layers
	/// from the working directory, returning the environment name
	pub fn auto_load_config(&self) -> Result<String, SourceError> {
		self.auto_load_with(&AutoLoadOptions::default())
	}

	/// Detect the environment and load the file layers described by
	/// `options`, returning the environment name
	///
	/// A missing file is skipped. A file that exists but cannot be decoded
	/// aborts the load before any layer is registered.
	///
	/// # Examples
	///
	/// ```
	/// use strata_conf::{Config, KeyDescriptor};
	/// use strata_conf::autoload::AutoLoadOptions;
	/// use strata_conf::sources::MapSource;
	///
	/// let dir = tempfile::tempdir().unwrap();
	/// std::fs::write(dir.path().join("global.properties"), "api.timeout=10000\ncache.ttl=300\n").unwrap();
	/// std::fs::write(dir.path().join("uat.properties"), "api.timeout=60000\n").unwrap();
	///
	/// let config = Config::empty();
	/// config.add_source(MapSource::new("runner", 80).with_value("app_env", "uat"));
	///
	/// let env = config
	///     .auto_load_with(&AutoLoadOptions::new().with_config_dir(dir.path()))
	///     .unwrap();
	///
	/// assert_eq!(env, "uat");
	/// assert_eq!(config.get(&KeyDescriptor::new("api.timeout")).as_deref(), Some("60000"));
	/// assert_eq!(config.get(&KeyDescriptor::new("cache.ttl")).as_deref(), Some("300"));
	/// ```
	pub fn auto_load_with(&self, options: &AutoLoadOptions) -> Result<String, SourceError> {
		let environment = self.detect_environment(options);

		let mut layers = global_layer(options, &environment)?;
		layers.extend(environment_layer(options, &environment)?);

		tracing::debug!(
			environment = %environment,
			sources = layers.len(),
			"Registering auto-loaded configuration layers"
		);
		for source in layers {
			self.add_shared_source(source);
		}

		*self.environment.write() = Some(environment.clone());
		Ok(environment)
	}

	/// Environment name the registered sources point at, without loading
	/// anything
	pub fn detect_environment(&self, options: &AutoLoadOptions) -> String {
		let sources = self.registry().snapshot();

		for key in options.discovery_keys() {
			let hit = sources.iter().find_map(|source| {
				let value = source.get_ignore_case(key)?;
				let value = value.trim();
				(!value.is_empty()).then(|| (value.to_string(), source.name().to_string()))
			});
			if let Some((environment, source)) = hit {
				tracing::info!(environment = %environment, key = %key, source = %source, "Detected environment");
				return environment;
			}
		}

		tracing::info!(
			environment = options.default_environment(),
			"No environment configured, using default"
		);
		options.default_environment().to_string()
	}

	/// Environment detected by the last auto-load, if any
	pub fn environment_name(&self) -> Option<String> {
		self.environment.read().clone()
	}
}

fn global_layer(options: &AutoLoadOptions, environment: &str) -> Result<Vec<SharedSource>, SourceError> {
	let mut layer: Vec<SharedSource> = Vec::new();
	for basename in options.global_basenames() {
		for format in FileFormat::ALL {
			let Some(file) = load_if_present(options.config_dir(), basename, format)? else {
				continue;
			};
			let file = file.with_priority(priority::GLOBAL_FILE);
			let section = environment_section(&file, environment);

			layer.push(Arc::new(file));
			if let Some(section) = section {
				layer.push(Arc::new(section));
			}
		}
	}
	Ok(layer)
}

fn environment_layer(
	options: &AutoLoadOptions,
	environment: &str,
) -> Result<Vec<SharedSource>, SourceError> {
	// The name becomes part of a file path
	if environment.contains(['/', '\\']) || environment.contains("..") {
		tracing::warn!(
			environment = %environment,
			"Environment name is not a plain file name, skipping environment files"
		);
		return Ok(Vec::new());
	}

	let mut layer: Vec<SharedSource> = Vec::new();
	for format in FileFormat::ALL {
		if let Some(file) = load_if_present(options.config_dir(), environment, format)? {
			layer.push(Arc::new(file.with_priority(priority::ENVIRONMENT_FILE)));
		}
	}
	Ok(layer)
}

fn load_if_present(
	dir: &Path,
	basename: &str,
	format: FileFormat,
) -> Result<Option<FileSource>, SourceError> {
	let file_name = format!("{}.{}", basename, format.extension());
	let Some(path) = find_file(dir, &file_name) else {
		tracing::debug!(path = %dir.join(&file_name).display(), "Configuration file not found, skipping");
		return Ok(None);
	};
	FileSource::load_as(&path, format).map(Some)
}

/// Locate `file_name` in `dir`, ignoring ASCII case
///
/// Among several case variants the lexicographically smallest name is used.
fn find_file(dir: &Path, file_name: &str) -> Option<PathBuf> {
	let exact = dir.join(file_name);
	if exact.is_file() {
		return Some(exact);
	}

	std::fs::read_dir(dir)
		.ok()?
		.filter_map(Result::ok)
		.filter(|entry| {
			entry
				.file_name()
				.to_str()
				.is_some_and(|name| name.eq_ignore_ascii_case(file_name))
		})
		.map(|entry| entry.path())
		.filter(|path| path.is_file())
		.min()
}

/// Overlay holding the `<environment>.<rest>` keys of `file` as `<rest>`
fn environment_section(file: &FileSource, environment: &str) -> Option<MapSource> {
	let values: IndexMap<String, String> = file
		.values()
		.iter()
		.filter_map(|(key, value)| {
			let (head, rest) = key.split_once('.')?;
			(head.eq_ignore_ascii_case(environment) && !rest.is_empty())
				.then(|| (rest.to_string(), value.clone()))
		})
		.collect();

	if values.is_empty() {
		return None;
	}
	tracing::debug!(
		source = file.name(),
		environment = %environment,
		keys = values.len(),
		"Found environment section in global file"
	);
	Some(
		MapSource::new(
			format!("{}[{}]", file.name(), environment),
			priority::ENVIRONMENT_SECTION,
		)
		.with_values(values),
	)
}

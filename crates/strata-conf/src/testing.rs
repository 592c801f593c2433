//! Testing utilities
//!
//! Helpers for tests that need real environment variables or configuration
//! files on disk. Environment changes are process-wide: run such tests with
//! `#[serial]` from `serial_test`.

use super::autoload::AutoLoadOptions;
use super::config::Config;
use indexmap::IndexMap;
use std::env;
use std::io;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Isolated environment for configuration tests
///
/// Owns a temporary directory for configuration files and restores every
/// environment variable it touched when dropped.
pub struct TestEnv {
	temp_dir: TempDir,
	original_env: IndexMap<String, Option<String>>,
}

impl TestEnv {
	/// Create a test environment with an empty temporary directory
	///
	/// # Examples
	///
	/// ```
	/// use strata_conf::testing::TestEnv;
	///
	/// let mut test_env = TestEnv::new().unwrap();
	/// test_env.set_var("STRATA_DOC_TEST_KEY", "value");
	/// assert_eq!(std::env::var("STRATA_DOC_TEST_KEY").unwrap(), "value");
	/// drop(test_env);
	/// assert!(std::env::var("STRATA_DOC_TEST_KEY").is_err());
	/// ```
	pub fn new() -> io::Result<Self> {
		Ok(Self {
			temp_dir: TempDir::new()?,
			original_env: IndexMap::new(),
		})
	}

	/// The temporary configuration directory
	pub fn path(&self) -> &Path {
		self.temp_dir.path()
	}

	fn remember(&mut self, key: &str) {
		if !self.original_env.contains_key(key) {
			self.original_env.insert(key.to_string(), env::var(key).ok());
		}
	}

	/// Set an environment variable until this value is dropped
	pub fn set_var(&mut self, key: impl Into<String>, value: impl Into<String>) {
		let key = key.into();
		self.remember(&key);

		// SAFETY: Setting environment variables is unsafe in multi-threaded programs.
		// TestEnv is designed for use in tests with #[serial] to ensure exclusive access.
		unsafe {
			env::set_var(&key, value.into());
		}
	}

	/// Remove an environment variable until this value is dropped
	pub fn remove_var(&mut self, key: impl Into<String>) {
		let key = key.into();
		self.remember(&key);

		// SAFETY: Removing environment variables is unsafe in multi-threaded programs.
		// TestEnv is designed for use in tests with #[serial] to ensure exclusive access.
		unsafe {
			env::remove_var(&key);
		}
	}

	/// Write a configuration file into the temporary directory
	///
	/// # Examples
	///
	/// ```
	/// use strata_conf::testing::TestEnv;
	///
	/// let test_env = TestEnv::new().unwrap();
	/// let path = test_env.create_config_file("global.properties", "cache.ttl=300").unwrap();
	/// assert!(path.exists());
	/// ```
	pub fn create_config_file(&self, filename: &str, content: &str) -> io::Result<PathBuf> {
		let config_path = self.temp_dir.path().join(filename);
		std::fs::write(&config_path, content)?;
		Ok(config_path)
	}

	/// Auto-load options reading files from the temporary directory
	pub fn auto_load_options(&self) -> AutoLoadOptions {
		AutoLoadOptions::new().with_config_dir(self.path())
	}

	/// A context with the default sources, auto-loaded from the temporary
	/// directory
	///
	/// # Examples
	///
	/// ```
	/// use strata_conf::KeyDescriptor;
	/// use strata_conf::testing::TestEnv;
	///
	/// let test_env = TestEnv::new().unwrap();
	/// test_env.create_config_file("common.yaml", "app:\n  name: demo\n").unwrap();
	///
	/// let config = test_env.load_config().unwrap();
	/// assert_eq!(config.get(&KeyDescriptor::new("app.name")).as_deref(), Some("demo"));
	/// ```
	pub fn load_config(&self) -> Result<Config, crate::SourceError> {
		let config = Config::new();
		config.auto_load_with(&self.auto_load_options())?;
		Ok(config)
	}
}

impl Drop for TestEnv {
	fn drop(&mut self) {
		for (key, original) in &self.original_env {
			// SAFETY: Restoring environment variables is unsafe in multi-threaded programs.
			// TestEnv is designed for use in tests with #[serial] to ensure exclusive access.
			unsafe {
				match original {
					Some(val) => env::set_var(key, val),
					None => env::remove_var(key),
				}
			}
		}
	}
}

/// Builder for a [`TestEnv`] with variables and files prepared up front
#[derive(Debug, Default)]
pub struct TestEnvBuilder {
	env_vars: IndexMap<String, String>,
	files: IndexMap<String, String>,
}

impl TestEnvBuilder {
	/// # Examples
	///
	/// ```
	/// use strata_conf::testing::TestEnvBuilder;
	///
	/// let test_env = TestEnvBuilder::new()
	///     .env("STRATA_DOC_BUILDER_ENV", "uat")
	///     .file("uat.properties", "api.timeout=60000")
	///     .build()
	///     .unwrap();
	///
	/// assert!(test_env.path().join("uat.properties").exists());
	/// ```
	pub fn new() -> Self {
		Self::default()
	}

	pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
		self.env_vars.insert(key.into(), value.into());
		self
	}

	/// Add a configuration file, relative to the temporary directory
	pub fn file(mut self, name: impl Into<String>, content: impl Into<String>) -> Self {
		self.files.insert(name.into(), content.into());
		self
	}

	pub fn build(self) -> io::Result<TestEnv> {
		let mut env = TestEnv::new()?;
		for (name, content) in &self.files {
			env.create_config_file(name, content)?;
		}
		for (key, value) in self.env_vars {
			env.set_var(key, value);
		}
		Ok(env)
	}
}

/// Assert the resolved value of a key
#[macro_export]
macro_rules! assert_config_value {
	($config:expr, $key:expr, $expected:expr) => {
		assert_eq!(
			$config.get(&$crate::KeyDescriptor::new($key)).as_deref(),
			Some($expected),
			"Configuration key {} does not match",
			$key
		);
	};
}

/// Assert which source provides the value of a key
#[macro_export]
macro_rules! assert_config_source {
	($config:expr, $key:expr, $source:expr) => {
		assert_eq!(
			$config
				.resolve(&$crate::KeyDescriptor::new($key))
				.source_name
				.as_deref(),
			Some($source),
			"Configuration key {} comes from an unexpected source",
			$key
		);
	};
}

#[cfg(test)]
mod tests {
	use super::*;
	use serial_test::serial;

	#[test]
	#[serial]
	fn test_env_isolation() {
		let mut env = TestEnv::new().unwrap();

		env.set_var("STRATA_TEST_VAR_ISOLATION", "test_value");
		assert_eq!(env::var("STRATA_TEST_VAR_ISOLATION").unwrap(), "test_value");

		drop(env);

		assert!(env::var("STRATA_TEST_VAR_ISOLATION").is_err());
	}

	#[test]
	#[serial]
	fn test_env_restoration() {
		// SAFETY: Setting environment variables is unsafe in multi-threaded programs.
		// This test uses #[serial] to ensure exclusive access to environment variables.
		unsafe {
			env::set_var("STRATA_TEST_VAR_RESTORE", "original");
		}

		{
			let mut env = TestEnv::new().unwrap();
			env.set_var("STRATA_TEST_VAR_RESTORE", "modified");
			env.remove_var("STRATA_TEST_VAR_RESTORE");
			assert!(env::var("STRATA_TEST_VAR_RESTORE").is_err());
		}

		assert_eq!(env::var("STRATA_TEST_VAR_RESTORE").unwrap(), "original");

		// SAFETY: Removing environment variables is unsafe in multi-threaded programs.
		// This test uses #[serial] to ensure exclusive access to environment variables.
		unsafe {
			env::remove_var("STRATA_TEST_VAR_RESTORE");
		}
	}

	#[test]
	#[serial]
	fn test_builder_and_load_config() {
		let env = TestEnvBuilder::new()
			.env("APP_ENV", "uat")
			.file("global.properties", "api.timeout=10000\ncache.ttl=300")
			.file("uat.properties", "api.timeout=60000")
			.build()
			.unwrap();

		let config = env.load_config().unwrap();

		assert_eq!(config.environment_name().as_deref(), Some("uat"));
		crate::assert_config_value!(config, "api.timeout", "60000");
		crate::assert_config_value!(config, "cache.ttl", "300");
		let global = format!("Properties({})", env.path().join("global.properties").display());
		crate::assert_config_source!(config, "cache.ttl", global.as_str());
	}
}

//! Configuration key descriptors
//!
//! A key carries its dotted name, an optional default and a sensitivity
//! flag. Anything implementing [`ConfigKey`] can be resolved; callers
//! usually declare keys with [`KeyDescriptor`], or implement the trait on
//! their own enum of application keys.

use super::validation::{
	NotEmptyValidator, PatternValidator, RangeValidator, RequiredValidator, Validator,
};
use std::fmt;
use std::sync::Arc;

/// Capability of something that names a configuration value
pub trait ConfigKey {
	/// Dotted key name, e.g. `database.pool.max-size`
	fn key(&self) -> &str;

	/// Value used when no source provides one
	fn default_value(&self) -> Option<&str> {
		None
	}

	/// Whether display and diagnostic surfaces must mask the value
	fn is_sensitive(&self) -> bool {
		false
	}

	/// Checks run by [`Config::validate`](crate::Config::validate)
	fn validators(&self) -> &[Arc<dyn Validator>] {
		&[]
	}
}

impl<T: ConfigKey + ?Sized> ConfigKey for &T {
	fn key(&self) -> &str {
		(**self).key()
	}

	fn default_value(&self) -> Option<&str> {
		(**self).default_value()
	}

	fn is_sensitive(&self) -> bool {
		(**self).is_sensitive()
	}

	fn validators(&self) -> &[Arc<dyn Validator>] {
		(**self).validators()
	}
}

/// Plain value implementation of [`ConfigKey`]
///
/// # Examples
///
/// ```
/// use strata_conf::{ConfigKey, KeyDescriptor};
///
/// let key = KeyDescriptor::new("database.password")
///     .with_default("")
///     .sensitive();
///
/// assert_eq!(key.key(), "database.password");
/// assert!(key.is_sensitive());
/// ```
#[derive(Clone)]
pub struct KeyDescriptor {
	name: String,
	default: Option<String>,
	sensitive: bool,
	validators: Vec<Arc<dyn Validator>>,
}

impl KeyDescriptor {
	/// Create a descriptor with no default that is not sensitive
	pub fn new(name: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			default: None,
			sensitive: false,
			validators: Vec::new(),
		}
	}

	/// Set the value used when no source has one
	pub fn with_default(mut self, default: impl Into<String>) -> Self {
		self.default = Some(default.into());
		self
	}

	/// Mark the value as sensitive
	pub fn sensitive(mut self) -> Self {
		self.sensitive = true;
		self
	}

	/// Attach an arbitrary validator
	pub fn with_validator(mut self, validator: impl Validator + 'static) -> Self {
		self.validators.push(Arc::new(validator));
		self
	}

	/// The key must resolve to a value
	pub fn required(self) -> Self {
		self.with_validator(RequiredValidator)
	}

	/// The resolved value must contain something other than whitespace
	pub fn not_empty(self) -> Self {
		self.with_validator(NotEmptyValidator)
	}

	/// The resolved value must match `pattern` as a whole
	///
	/// # Examples
	///
	/// ```
	/// use strata_conf::KeyDescriptor;
	///
	/// let key = KeyDescriptor::new("app.version")
	///     .pattern(r"\d+\.\d+\.\d+")
	///     .unwrap();
	/// ```
	pub fn pattern(self, pattern: &str) -> Result<Self, regex::Error> {
		Ok(self.with_validator(PatternValidator::new(pattern)?))
	}

	/// The resolved value must be a number within `[min, max]`
	pub fn range(self, min: f64, max: f64) -> Self {
		self.with_validator(RangeValidator::between(min, max))
	}
}

impl ConfigKey for KeyDescriptor {
	fn key(&self) -> &str {
		&self.name
	}

	fn default_value(&self) -> Option<&str> {
		self.default.as_deref()
	}

	fn is_sensitive(&self) -> bool {
		self.sensitive
	}

	fn validators(&self) -> &[Arc<dyn Validator>] {
		&self.validators
	}
}

impl fmt::Debug for KeyDescriptor {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let default = match (&self.default, self.sensitive) {
			(Some(_), true) => Some(super::error::MASK),
			(Some(value), false) => Some(value.as_str()),
			(None, _) => None,
		};
		f.debug_struct("KeyDescriptor")
			.field("name", &self.name)
			.field("default", &default)
			.field("sensitive", &self.sensitive)
			.field(
				"validators",
				&self
					.validators
					.iter()
					.map(|v| v.description())
					.collect::<Vec<_>>(),
			)
			.finish()
	}
}

impl fmt::Display for KeyDescriptor {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.name)
	}
}

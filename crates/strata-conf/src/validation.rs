//! Configuration validation framework
//!
//! Checks are attached to keys (see [`KeyDescriptor::required`](crate::KeyDescriptor::required)
//! and friends) or passed alongside them through [`ValidationRules`]. A
//! validation run evaluates every check of every key and collects all
//! violations; nothing is raised.

use super::key::ConfigKey;
use indexmap::IndexMap;
use regex::Regex;
use std::fmt;
use std::sync::Arc;

/// A single violation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
	pub key: String,
	pub message: String,
}

impl ValidationError {
	pub fn new(key: impl Into<String>, message: impl Into<String>) -> Self {
		Self {
			key: key.into(),
			message: message.into(),
		}
	}
}

impl fmt::Display for ValidationError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}: {}", self.key, self.message)
	}
}

/// Outcome of one validation run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationResult {
	errors: Vec<ValidationError>,
}

impl ValidationResult {
	pub fn is_valid(&self) -> bool {
		self.errors.is_empty()
	}

	/// Violations in key order, then check order
	pub fn errors(&self) -> &[ValidationError] {
		&self.errors
	}

	pub fn error_count(&self) -> usize {
		self.errors.len()
	}

	/// Violations reported for `key`
	pub fn errors_for<'a>(&'a self, key: &'a str) -> impl Iterator<Item = &'a ValidationError> {
		self.errors.iter().filter(move |e| e.key == key)
	}

	pub(crate) fn push(&mut self, error: ValidationError) {
		self.errors.push(error);
	}
}

impl fmt::Display for ValidationResult {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		if self.is_valid() {
			return f.write_str("Configuration is valid");
		}
		write!(f, "{} validation error(s):", self.errors.len())?;
		for error in &self.errors {
			write!(f, "\n  - {}", error)?;
		}
		Ok(())
	}
}

/// Trait for validation rules
///
/// `value` is the resolved value of the key, `None` when nothing (not even
/// a default) provided one.
pub trait Validator: Send + Sync {
	/// Validate the resolved value of `key`
	fn validate(&self, key: &str, value: Option<&str>) -> Result<(), ValidationError>;

	/// Get validator description
	fn description(&self) -> String;
}

/// The key must resolve to a value
#[derive(Debug, Clone, Copy, Default)]
pub struct RequiredValidator;

impl Validator for RequiredValidator {
	fn validate(&self, key: &str, value: Option<&str>) -> Result<(), ValidationError> {
		match value {
			Some(_) => Ok(()),
			None => Err(ValidationError::new(key, "Required value is missing")),
		}
	}

	fn description(&self) -> String {
		"Required".to_string()
	}
}

/// The value must be present and contain non-whitespace characters
#[derive(Debug, Clone, Copy, Default)]
pub struct NotEmptyValidator;

impl Validator for NotEmptyValidator {
	fn validate(&self, key: &str, value: Option<&str>) -> Result<(), ValidationError> {
		match value {
			Some(v) if !v.trim().is_empty() => Ok(()),
			_ => Err(ValidationError::new(key, "Value must not be empty")),
		}
	}

	fn description(&self) -> String {
		"Not empty".to_string()
	}
}

/// String pattern validator; the whole value must match
pub struct PatternValidator {
	source: String,
	pattern: Regex,
}

impl PatternValidator {
	/// Create a pattern validator with a regex pattern
	///
	/// # Examples
	///
	/// ```
	/// use strata_conf::validation::{PatternValidator, Validator};
	///
	/// let validator = PatternValidator::new(r"\d{3}-\d{4}").unwrap();
	/// assert!(validator.validate("phone", Some("555-1234")).is_ok());
	/// assert!(validator.validate("phone", Some("call 555-1234")).is_err());
	/// ```
	pub fn new(pattern: &str) -> Result<Self, regex::Error> {
		Ok(Self {
			source: pattern.to_string(),
			pattern: Regex::new(&format!("^(?:{})$", pattern))?,
		})
	}
}

impl Validator for PatternValidator {
	fn validate(&self, key: &str, value: Option<&str>) -> Result<(), ValidationError> {
		match value {
			Some(v) if !self.pattern.is_match(v) => Err(ValidationError::new(
				key,
				format!("Value does not match pattern: {}", self.source),
			)),
			_ => Ok(()),
		}
	}

	fn description(&self) -> String {
		format!("Pattern: {}", self.source)
	}
}

/// Range validator for numeric values, bounds inclusive
pub struct RangeValidator {
	min: Option<f64>,
	max: Option<f64>,
}

impl RangeValidator {
	/// Create a range validator with optional min and max
	pub fn new(min: Option<f64>, max: Option<f64>) -> Self {
		Self { min, max }
	}

	/// Values must be >= `min`
	pub fn min(min: f64) -> Self {
		Self::new(Some(min), None)
	}

	/// Values must be <= `max`
	pub fn max(max: f64) -> Self {
		Self::new(None, Some(max))
	}

	/// Create a validator for a range between min and max
	///
	/// # Examples
	///
	/// ```
	/// use strata_conf::validation::{RangeValidator, Validator};
	///
	/// let validator = RangeValidator::between(1.0, 10.0);
	/// assert!(validator.validate("retries", Some("10")).is_ok());
	/// assert!(validator.validate("retries", Some("11")).is_err());
	/// ```
	pub fn between(min: f64, max: f64) -> Self {
		Self::new(Some(min), Some(max))
	}
}

impl Validator for RangeValidator {
	fn validate(&self, key: &str, value: Option<&str>) -> Result<(), ValidationError> {
		let Some(raw) = value else {
			return Ok(());
		};
		let num = raw
			.trim()
			.parse::<f64>()
			.ok()
			.filter(|n| !n.is_nan())
			.ok_or_else(|| ValidationError::new(key, "Expected numeric value"))?;

		if let Some(min) = self.min
			&& num < min
		{
			return Err(ValidationError::new(
				key,
				format!("Value {} is less than minimum {}", num, min),
			));
		}

		if let Some(max) = self.max
			&& num > max
		{
			return Err(ValidationError::new(
				key,
				format!("Value {} is greater than maximum {}", num, max),
			));
		}

		Ok(())
	}

	fn description(&self) -> String {
		match (self.min, self.max) {
			(Some(min), Some(max)) => format!("Range: {} to {}", min, max),
			(Some(min), None) => format!("Minimum: {}", min),
			(None, Some(max)) => format!("Maximum: {}", max),
			(None, None) => "Range validator".to_string(),
		}
	}
}

/// Choice validator (enum-like)
pub struct ChoiceValidator {
	choices: Vec<String>,
}

impl ChoiceValidator {
	pub fn new<S: Into<String>>(choices: impl IntoIterator<Item = S>) -> Self {
		Self {
			choices: choices.into_iter().map(Into::into).collect(),
		}
	}
}

impl Validator for ChoiceValidator {
	fn validate(&self, key: &str, value: Option<&str>) -> Result<(), ValidationError> {
		match value {
			Some(v) if !self.choices.iter().any(|c| c == v) => Err(ValidationError::new(
				key,
				format!("Value '{}' is not in allowed choices: {:?}", v, self.choices),
			)),
			_ => Ok(()),
		}
	}

	fn description(&self) -> String {
		format!("Choices: {:?}", self.choices)
	}
}

/// Checks supplied next to the keys instead of on them
///
/// # Examples
///
/// ```
/// use strata_conf::validation::{RangeValidator, RequiredValidator, ValidationRules};
///
/// let rules = ValidationRules::new()
///     .rule("database.url", RequiredValidator)
///     .rule("database.pool.size", RangeValidator::between(1.0, 50.0));
/// ```
#[derive(Default, Clone)]
pub struct ValidationRules {
	rules: IndexMap<String, Vec<Arc<dyn Validator>>>,
}

impl ValidationRules {
	pub fn new() -> Self {
		Self::default()
	}

	/// Add a check for `key`
	pub fn rule(mut self, key: impl Into<String>, validator: impl Validator + 'static) -> Self {
		self.rules
			.entry(key.into())
			.or_default()
			.push(Arc::new(validator));
		self
	}

	/// Checks registered for `key`
	pub fn for_key(&self, key: &str) -> &[Arc<dyn Validator>] {
		self.rules.get(key).map(Vec::as_slice).unwrap_or(&[])
	}
}

/// Run the key's own checks followed by the extra `rules` for it
pub(crate) fn check_key<K: ConfigKey + ?Sized>(
	key: &K,
	value: Option<&str>,
	rules: Option<&ValidationRules>,
	result: &mut ValidationResult,
) {
	let extra = rules.map(|r| r.for_key(key.key())).unwrap_or(&[]);
	for validator in key.validators().iter().chain(extra) {
		if let Err(error) = validator.validate(key.key(), value) {
			result.push(error);
		}
	}
}

//! Integration tests for sensitive value masking
//!
//! Raw accessors return the real value; every display or diagnostic surface
//! substitutes the mask.

use rstest::*;
use strata_conf::prelude::*;

#[fixture]
fn config() -> Config {
	let config = Config::empty();
	config.add_source(
		MapSource::new("vault", 70)
			.with_value("database.password", "s3cr3t!")
			.with_value("database.url", "postgres://db")
			.with_value("api.pin", "12ab"),
	);
	config
}

fn password() -> KeyDescriptor {
	KeyDescriptor::new("database.password").sensitive()
}

/// Test: Raw get returns the secret, display helpers do not
/// Why: Masking is display-only
#[rstest]
fn test_raw_and_display_values(config: Config) {
	assert_eq!(config.get(&password()).as_deref(), Some("s3cr3t!"));
	assert_eq!(config.get_for_display(&password()).as_deref(), Some(MASK));
	assert_eq!(MASK, "***MASKED***");
}

/// Test: Source info masks the value but keeps the origin
#[rstest]
fn test_source_info_is_masked(config: Config) {
	let info = config.source_info(&password());

	assert!(info.sensitive);
	assert_eq!(info.value.as_deref(), Some(MASK));
	assert_eq!(info.source_name.as_deref(), Some("vault"));
	assert_eq!(info.to_string(), "database.password = ***MASKED*** [vault]");
}

/// Test: Sensitive defaults are masked too
#[rstest]
fn test_sensitive_default_is_masked(config: Config) {
	let key = KeyDescriptor::new("api.token").with_default("default-token").sensitive();

	let info = config.source_info(&key);

	assert!(info.from_default);
	assert_eq!(info.value.as_deref(), Some(MASK));
	assert!(!format!("{:?}", key).contains("default-token"));
}

/// Test: Absent sensitive keys report no value rather than the mask
#[rstest]
fn test_absent_sensitive_key(config: Config) {
	let key = KeyDescriptor::new("api.secret").sensitive();

	assert_eq!(config.get_for_display(&key), None);
	assert_eq!(config.source_info(&key).value, None);
}

/// Test: Display listing masks only sensitive keys
#[rstest]
fn test_display_listing(config: Config) {
	let keys = [
		KeyDescriptor::new("database.url"),
		password(),
		KeyDescriptor::new("missing"),
	];

	assert_eq!(
		config.get_all_for_display(&keys),
		"database.url = postgres://db\ndatabase.password = ***MASKED***\nmissing = <not set>"
	);
}

/// Test: Conversion errors never carry a sensitive value
#[rstest]
fn test_conversion_error_is_masked(config: Config) {
	let key = KeyDescriptor::new("api.pin").sensitive();

	let err = config.get_i32(&key).unwrap_err();

	assert_eq!(err.key(), "api.pin");
	assert!(!err.to_string().contains("12ab"));
	assert!(err.to_string().contains(MASK));
}

/// Test: Prefix queries are raw unless the masked variant is used
#[rstest]
fn test_prefix_masking_is_opt_in(config: Config) {
	let raw = config.get_by_prefix("database.");
	assert_eq!(raw["database.password"], "s3cr3t!");

	let masked = config.get_by_prefix_masked("database.", [password()]);
	assert_eq!(masked["database.password"], MASK);
	assert_eq!(masked["database.url"], "postgres://db");
}

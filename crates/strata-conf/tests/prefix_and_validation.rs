//! Integration tests for prefix queries and validation runs

use rstest::*;
use strata_conf::prelude::*;

#[fixture]
fn config() -> Config {
	let config = Config::empty();
	config.add_source(
		MapSource::new("global", 30)
			.with_value("database.url", "postgres://global")
			.with_value("database.pool.size", "10")
			.with_value("database_backup", "nightly")
			.with_value("app.version", "1.4.2")
			.with_value("app.name", ""),
	);
	config.add_source(
		MapSource::new("uat", 40)
			.with_value("database.url", "postgres://uat")
			.with_value("database.pool.timeout", "30s"),
	);
	config
}

/// Test: Prefix query returns exactly the keys under the prefix
#[rstest]
fn test_prefix_exact_key_set(config: Config) {
	let values = config.get_by_prefix("database.");

	assert_eq!(
		values.keys().map(String::as_str).collect::<Vec<_>>(),
		vec!["database.pool.size", "database.pool.timeout", "database.url"]
	);
	assert_eq!(values["database.url"], "postgres://uat");
}

/// Test: Prefix keys agree with point lookups
#[rstest]
fn test_prefix_matches_point_lookup(config: Config) {
	for (key, value) in config.get_by_prefix("") {
		assert_eq!(config.get(&KeyDescriptor::new(key.as_str())), Some(value));
	}
}

/// Test: Validation collects every violation across keys
#[rstest]
fn test_validation_collects_all_errors(config: Config) {
	let keys = [
		KeyDescriptor::new("database.url").required(),
		KeyDescriptor::new("database.password").required(),
		KeyDescriptor::new("app.name").not_empty(),
		KeyDescriptor::new("app.version").pattern(r"\d+\.\d+\.\d+").unwrap(),
		KeyDescriptor::new("database.pool.size").range(1.0, 5.0),
	];

	let result = config.validate(&keys);

	assert!(!result.is_valid());
	assert_eq!(result.error_count(), 3);
	assert_eq!(result.errors_for("database.password").count(), 1);
	assert_eq!(result.errors_for("app.name").count(), 1);
	assert_eq!(result.errors_for("database.pool.size").count(), 1);
	assert_eq!(result.errors_for("app.version").count(), 0);
}

/// Test: Defaults satisfy required checks
#[rstest]
fn test_default_satisfies_required(config: Config) {
	let keys = [KeyDescriptor::new("database.password").with_default("").required()];

	assert!(config.validate(&keys).is_valid());
}

/// Test: External rules are applied next to key checks
#[rstest]
fn test_validation_with_rules(config: Config) {
	let keys = [
		KeyDescriptor::new("database.url"),
		KeyDescriptor::new("browser").with_default("lynx"),
	];
	let rules = ValidationRules::new()
		.rule("database.url", PatternValidator::new(r"postgres://\w+").unwrap())
		.rule("browser", ChoiceValidator::new(["chrome", "firefox"]));

	let result = config.validate_with(&keys, &rules);

	assert_eq!(result.error_count(), 1);
	assert_eq!(result.errors()[0].key, "browser");
}

/// Test: Validating nothing is valid
#[rstest]
fn test_empty_validation(config: Config) {
	assert!(config.validate(Vec::<KeyDescriptor>::new()).is_valid());
}

//! Conversion of raw configuration strings into typed values

use std::time::Duration;

/// Types a resolved configuration string can be converted into
///
/// Conversion returns `None` for malformed input; the caller turns that
/// into [`ConfigError::TypeConversion`](crate::ConfigError::TypeConversion)
/// carrying the key.
pub trait FromConfigValue: Sized {
	/// Name used in conversion errors
	const TYPE_NAME: &'static str;

	fn from_config_value(raw: &str) -> Option<Self>;
}

impl FromConfigValue for String {
	const TYPE_NAME: &'static str = "string";

	fn from_config_value(raw: &str) -> Option<Self> {
		Some(raw.to_string())
	}
}

macro_rules! impl_from_str_value {
	($($ty:ty => $name:literal),* $(,)?) => {
		$(
			impl FromConfigValue for $ty {
				const TYPE_NAME: &'static str = $name;

				fn from_config_value(raw: &str) -> Option<Self> {
					raw.trim().parse::<$ty>().ok()
				}
			}
		)*
	};
}

impl_from_str_value!(
	i32 => "i32",
	i64 => "i64",
	u16 => "u16",
	u32 => "u32",
	u64 => "u64",
	f64 => "f64",
);

impl FromConfigValue for bool {
	const TYPE_NAME: &'static str = "bool";

	fn from_config_value(raw: &str) -> Option<Self> {
		parse_bool(raw)
	}
}

impl FromConfigValue for Vec<String> {
	const TYPE_NAME: &'static str = "list";

	fn from_config_value(raw: &str) -> Option<Self> {
		Some(parse_list(raw))
	}
}

impl FromConfigValue for Duration {
	const TYPE_NAME: &'static str = "duration";

	fn from_config_value(raw: &str) -> Option<Self> {
		parse_duration(raw)
	}
}

/// Strict boolean: only `true` and `false`, in any case
///
/// # Examples
///
/// ```
/// use strata_conf::convert::parse_bool;
///
/// assert_eq!(parse_bool("TRUE"), Some(true));
/// assert_eq!(parse_bool("False"), Some(false));
/// assert_eq!(parse_bool("yes"), None);
/// ```
pub fn parse_bool(raw: &str) -> Option<bool> {
	let raw = raw.trim();
	if raw.eq_ignore_ascii_case("true") {
		Some(true)
	} else if raw.eq_ignore_ascii_case("false") {
		Some(false)
	} else {
		None
	}
}

/// Lenient boolean: also accepts `yes/no`, `on/off` and `1/0`
pub fn parse_bool_lenient(raw: &str) -> Option<bool> {
	match raw.trim().to_ascii_lowercase().as_str() {
		"true" | "yes" | "on" | "1" => Some(true),
		"false" | "no" | "off" | "0" => Some(false),
		_ => None,
	}
}

/// Split on commas, trimming entries and dropping empty ones
///
/// # Examples
///
/// ```
/// use strata_conf::convert::parse_list;
///
/// assert_eq!(parse_list(" chrome, firefox,,edge "), vec!["chrome", "firefox", "edge"]);
/// ```
pub fn parse_list(raw: &str) -> Vec<String> {
	raw.split(',')
		.map(str::trim)
		.filter(|s| !s.is_empty())
		.map(str::to_string)
		.collect()
}

/// Parse `500`, `500ms`, `30s`, `5m`, `2h` or combinations such as `1h 30m`;
/// a bare number is milliseconds
///
/// Units are limited to `ms`, `s`, `m` and `h`, in any case.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use strata_conf::convert::parse_duration;
///
/// assert_eq!(parse_duration("1500"), Some(Duration::from_millis(1500)));
/// assert_eq!(parse_duration("30s"), Some(Duration::from_secs(30)));
/// assert_eq!(parse_duration("5 m"), Some(Duration::from_secs(300)));
/// assert_eq!(parse_duration("-1s"), None);
/// ```
pub fn parse_duration(raw: &str) -> Option<Duration> {
	let raw = raw.trim();
	if let Ok(millis) = raw.parse::<u64>() {
		return Some(Duration::from_millis(millis));
	}

	let normalized = raw.to_ascii_lowercase();
	let known_units = normalized
		.split(|c: char| c.is_ascii_digit() || c.is_whitespace())
		.filter(|unit| !unit.is_empty())
		.all(|unit| matches!(unit, "ms" | "s" | "m" | "h"));
	if !known_units {
		return None;
	}
	humantime::parse_duration(&normalized).ok()
}

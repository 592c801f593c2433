//! Priority-ordered resolution of a single key

use super::registry::SharedSource;

/// Outcome of resolving one key. Not cached: every call asks the sources
/// again, so changes to a source's data are visible immediately.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedValue {
	/// Resolved value, empty strings included
	pub value: Option<String>,
	/// Name of the source that provided the value; `None` when defaulted
	/// or not found
	pub source_name: Option<String>,
	/// Whether the key's default supplied the value
	pub from_default: bool,
}

impl ResolvedValue {
	pub(crate) fn not_found() -> Self {
		Self {
			value: None,
			source_name: None,
			from_default: false,
		}
	}

	/// Whether a source or the default produced a value
	pub fn found(&self) -> bool {
		self.value.is_some()
	}

	pub fn as_deref(&self) -> Option<&str> {
		self.value.as_deref()
	}
}

/// First source in `sources` (already in priority order) with a value
pub(crate) fn from_sources(sources: &[SharedSource], key: &str) -> Option<(String, String)> {
	sources.iter().find_map(|source| {
		source.get(key).map(|value| {
			tracing::trace!(key, source = source.name(), "Resolved configuration key");
			(value, source.name().to_string())
		})
	})
}

/// Resolve `key` against `sources`, falling back to `default`
pub(crate) fn resolve(sources: &[SharedSource], key: &str, default: Option<&str>) -> ResolvedValue {
	if let Some((value, source_name)) = from_sources(sources, key) {
		return ResolvedValue {
			value: Some(value),
			source_name: Some(source_name),
			from_default: false,
		};
	}

	match default {
		Some(default) => ResolvedValue {
			value: Some(default.to_string()),
			source_name: None,
			from_default: true,
		},
		None => ResolvedValue::not_found(),
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::sources::MapSource;
	use std::sync::Arc;

	fn sources() -> Vec<SharedSource> {
		vec![
			Arc::new(MapSource::new("high", 50).with_value("shared", "from-high")),
			Arc::new(
				MapSource::new("low", 30)
					.with_value("shared", "from-low")
					.with_value("only.low", "low-value")
					.with_value("blank", ""),
			),
		]
	}

	#[test]
	fn test_first_source_wins() {
		let resolved = resolve(&sources(), "shared", Some("default"));

		assert_eq!(resolved.as_deref(), Some("from-high"));
		assert_eq!(resolved.source_name.as_deref(), Some("high"));
		assert!(!resolved.from_default);
	}

	#[test]
	fn test_falls_through_to_lower_source() {
		let resolved = resolve(&sources(), "only.low", None);

		assert_eq!(resolved.source_name.as_deref(), Some("low"));
	}

	#[test]
	fn test_default_when_no_source() {
		let resolved = resolve(&sources(), "missing", Some("fallback"));

		assert!(resolved.found());
		assert!(resolved.from_default);
		assert_eq!(resolved.source_name, None);
		assert_eq!(resolved.as_deref(), Some("fallback"));
	}

	#[test]
	fn test_not_found() {
		let resolved = resolve(&sources(), "missing", None);

		assert!(!resolved.found());
		assert_eq!(resolved, ResolvedValue::not_found());
	}

	#[test]
	fn test_empty_string_does_not_fall_through() {
		let resolved = resolve(&sources(), "blank", Some("default"));

		assert_eq!(resolved.as_deref(), Some(""));
		assert!(!resolved.from_default);
	}
}

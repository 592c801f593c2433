//! Prelude module for convenient imports
//!
//! Import this module to get access to the most commonly used types and traits.

pub use super::autoload::AutoLoadOptions;
pub use super::config::Config;
pub use super::convert::FromConfigValue;
pub use super::diagnostics::SourceInfo;
pub use super::error::{ConfigError, ConfigResult, MASK, SourceError};
pub use super::formats::FileFormat;
pub use super::key::{ConfigKey, KeyDescriptor};
pub use super::registry::SharedSource;
pub use super::resolver::ResolvedValue;
pub use super::sources::{
	ConfigSource, EnvSource, FileSource, MapSource, ParameterSource, ProcessPropertySource,
	PropertyStore, priority,
};
pub use super::validation::{
	ChoiceValidator, NotEmptyValidator, PatternValidator, RangeValidator, RequiredValidator,
	ValidationError, ValidationResult, ValidationRules, Validator,
};

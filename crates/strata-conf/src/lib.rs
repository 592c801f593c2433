//! # Strata Configuration Engine
//!
//! Layered configuration resolution: values for declared keys come from an
//! ordered chain of prioritized sources, with per-key defaults as the last
//! fallback.
//!
//! ## Features
//!
//! - **Prioritized sources**: environment variables, process properties,
//!   run parameters, in-memory maps and configuration files
//! - **Typed access**: integers, floats, booleans, lists and durations with
//!   conversion errors naming the offending key
//! - **Masking**: sensitive keys never show their value in diagnostics,
//!   display helpers or error messages
//! - **Diagnostics**: which source produced a value
//! - **Prefix queries**: every known key under a namespace
//! - **Environment auto-loading**: global files plus an environment
//!   specific overlay, picked from `APP_ENV` / `ENVIRONMENT` / `ENV`
//! - **Validation**: required, non-empty, pattern, range and choice checks
//!
//! ## Quick Start
//!
//! ```rust
//! use strata_conf::prelude::*;
//!
//! let config = Config::empty();
//! config.add_source(MapSource::new("global", 30)
//!     .with_value("api.timeout", "10000")
//!     .with_value("db.password", "hunter2"));
//! config.add_source(MapSource::new("uat", 40).with_value("api.timeout", "60000"));
//!
//! let timeout = KeyDescriptor::new("api.timeout").with_default("5000");
//! let password = KeyDescriptor::new("db.password").sensitive();
//!
//! assert_eq!(config.get_i32(&timeout).unwrap(), 60000);
//! assert_eq!(config.get_for_display(&password).as_deref(), Some(MASK));
//! assert_eq!(config.source_info(&timeout).origin(), "uat");
//! ```
//!
//! ## Module Organization
//!
//! - [`config`]: the [`Config`] context with resolution and typed access
//! - [`sources`]: the [`ConfigSource`](sources::ConfigSource) trait and built-in sources
//! - [`registry`]: priority-ordered source registry
//! - [`key`]: key declarations
//! - [`autoload`]: environment detection and layered file loading
//! - [`validation`]: validators and validation results
//! - [`testing`]: helpers for tests touching the environment or files

pub mod autoload;
pub mod config;
pub mod convert;
pub mod diagnostics;
pub mod error;
pub mod formats;
pub mod key;
pub mod prelude;
mod prefix;
pub mod properties;
pub mod registry;
pub mod resolver;
pub mod sources;
pub mod testing;
pub mod validation;

pub use autoload::AutoLoadOptions;
pub use config::Config;
pub use diagnostics::SourceInfo;
pub use error::{ConfigError, ConfigResult, MASK, SourceError};
pub use key::{ConfigKey, KeyDescriptor};
pub use resolver::ResolvedValue;

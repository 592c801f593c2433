//! # Strata
//!
//! Layered, environment-aware configuration for Rust applications and test
//! suites.
//!
//! Values are resolved from an ordered chain of prioritized sources
//! (run parameters, environment variables, process properties, global and
//! environment-specific configuration files) with per-key defaults as the
//! final fallback.
//!
//! ## Feature Flags
//!
//! - `conf` (default) - the configuration resolution engine
//!
//! ## Quick Start
//!
//! ```rust
//! # #[cfg(feature = "conf")]
//! # {
//! use strata::conf::prelude::*;
//!
//! let config = Config::new();
//! config.set_property("browser", "firefox");
//!
//! let browser = KeyDescriptor::new("browser").with_default("chrome");
//! assert_eq!(config.get(&browser).as_deref(), Some("firefox"));
//! # }
//! ```

#[cfg(feature = "conf")]
pub mod conf;

#[cfg(feature = "conf")]
pub use conf::{Config, ConfigError, ConfigKey, KeyDescriptor, SourceError};

//! Configuration resolution engine.
//!
//! Re-exports [`strata_conf`]: sources, the resolution context, typed
//! access, diagnostics, validation and environment auto-loading.
//!
//! # Examples
//!
//! ```rust
//! use strata::conf::sources::MapSource;
//! use strata::conf::{Config, KeyDescriptor};
//!
//! let config = Config::empty();
//! config.add_source(MapSource::new("files", 30).with_value("cache.ttl", "300"));
//! assert_eq!(config.get_i32(&KeyDescriptor::new("cache.ttl")).unwrap(), 300);
//! ```

pub use strata_conf::*;

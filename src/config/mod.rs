// src/config/mod.rs

//! Route file loading and validation.
//!
//! - [`model`] is the TOML-backed data model and the validated [`ConfigFile`].
//! - [`loader`] reads a file from disk.
//! - [`validate`] checks it and converts it into domain [`Route`]s.
//! - [`duration`] parses `"30m"`-style durations.
//!
//! [`Route`]: crate::sync::Route

pub mod duration;
pub mod loader;
pub mod model;
pub mod validate;

pub use duration::parse_duration;
pub use loader::{default_config_path, load_and_validate, load_from_path};
pub use model::{
    BatchConfig, ConfigFile, ConfigSection, HookConfig, RawConfigFile, RouteConfig,
};

//! # Stagecraft Centralized Configuration
//!
//! This crate provides configuration management and limit constants for the
//! Stagecraft runtime, keeping tunable ceilings out of the code that
//! enforces them.
//!
//! ## Features
//!
//! - **Runtime Limits**: actor ceiling, deferral bound, payload caps
//! - **TOML Loading**: file-based configuration with environment-variable
//!   overrides under the `STAGECRAFT` prefix
//!
//! ## Usage
//!
//! ```rust,no_run
//! use config::RuntimeSettings;
//!
//! let settings = RuntimeSettings::load(None).unwrap();
//! assert!(settings.limits.max_actors > 0);
//! ```

pub mod runtime_config;

pub use runtime_config::{
    LimitSettings, RuntimeSettings, SyncSettings, DEFAULT_MAX_ACTORS, DEFAULT_MAX_DEFERRED_TICKS,
};

//! Runtime Configuration Module
//!
//! Provides configuration loading for the Stagecraft runtime. Supports
//! loading from TOML files with environment-variable overrides, and carries
//! the limit values the dispatch core enforces.

use anyhow::{bail, Context, Result};
use config_crate::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info};

/// Default actor ceiling. High enough for busy games, low enough that a
/// runaway cloning script is stopped before the peer id space is at risk.
pub const DEFAULT_MAX_ACTORS: usize = 1100;

/// Default deferral bound, in ticks. Roughly ten seconds at 60 Hz.
pub const DEFAULT_MAX_DEFERRED_TICKS: u32 = 600;

/// Default cap on a single packed message payload.
pub const DEFAULT_MAX_PAYLOAD_BYTES: usize = 64 * 1024;

/// Main runtime configuration structure.
#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
#[serde(default)]
pub struct RuntimeSettings {
    /// Hard limits enforced by the dispatch core.
    pub limits: LimitSettings,

    /// State-sync tuning.
    pub sync: SyncSettings,
}

/// Hard limits enforced by the dispatch core.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct LimitSettings {
    /// Actor-count ceiling. Every actor-creating operation fails hard at
    /// this limit; it is never silently truncated.
    pub max_actors: usize,

    /// Ticks a deferred message is re-queued before being dropped. A target
    /// that never becomes ready would otherwise pin its messages forever.
    pub max_deferred_ticks: u32,

    /// Largest packed payload accepted at enqueue.
    pub max_payload_bytes: usize,
}

impl Default for LimitSettings {
    fn default() -> Self {
        Self {
            max_actors: DEFAULT_MAX_ACTORS,
            max_deferred_ticks: DEFAULT_MAX_DEFERRED_TICKS,
            max_payload_bytes: DEFAULT_MAX_PAYLOAD_BYTES,
        }
    }
}

/// State-sync tuning.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct SyncSettings {
    /// Emit the "unchanged" roster frame when the actor list is stable
    /// instead of a full snapshot.
    pub roster_skip_when_unchanged: bool,
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            roster_skip_when_unchanged: true,
        }
    }
}

impl RuntimeSettings {
    /// Load configuration, layering an optional TOML file under
    /// `STAGECRAFT_`-prefixed environment overrides on top of the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder();

        if let Some(path) = path {
            info!("Loading runtime config: {:?}", path);
            builder = builder.add_source(File::from(path).required(true));
        }

        builder = builder.add_source(
            Environment::with_prefix("STAGECRAFT")
                .separator("__")
                .try_parsing(true),
        );

        let loaded: Self = builder
            .build()
            .context("Failed to build runtime configuration")?
            .try_deserialize()
            .context("Failed to deserialize runtime configuration")?;

        loaded.validate()?;
        debug!(limits = ?loaded.limits, "runtime configuration loaded");
        Ok(loaded)
    }

    /// Reject configurations the dispatch core cannot honor.
    pub fn validate(&self) -> Result<()> {
        if self.limits.max_actors == 0 {
            bail!("limits.max_actors must be at least 1");
        }
        if self.limits.max_deferred_ticks == 0 {
            bail!("limits.max_deferred_ticks must be at least 1");
        }
        if self.limits.max_payload_bytes == 0 {
            bail!("limits.max_payload_bytes must be at least 1");
        }
        Ok(())
    }
}

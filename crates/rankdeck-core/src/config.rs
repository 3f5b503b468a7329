//! Engine tuning parameters.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Tunable parameters for rating math and session lifecycle.
///
/// All fields have production defaults; a partial TOML file overrides only
/// the keys it names.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct EngineConfig {
    /// Rating assigned to a card the first time it is seen.
    #[serde(default = "default_initial_rating")]
    pub initial_rating: f64,

    /// Base K-factor for rating updates.
    #[serde(default = "default_k_factor")]
    pub k_factor: f64,

    /// Dampen K as a card accumulates games. When disabled the base
    /// K-factor applies to every game.
    #[serde(default = "default_rating_damping")]
    pub rating_damping: bool,

    /// Session time-to-live, in hours.
    #[serde(default = "default_ttl_hours")]
    pub ttl_hours: i64,

    /// Window in which a repeated vote for the same winner is treated as a
    /// duplicate, in seconds.
    #[serde(default = "default_vote_dedup_window_secs")]
    pub vote_dedup_window_secs: u64,

    /// Upper bound on remembered vote fingerprints.
    #[serde(default = "default_dedup_capacity")]
    pub dedup_capacity: usize,
}

fn default_initial_rating() -> f64 {
    1500.0
}

fn default_k_factor() -> f64 {
    32.0
}

fn default_rating_damping() -> bool {
    true
}

fn default_ttl_hours() -> i64 {
    24
}

fn default_vote_dedup_window_secs() -> u64 {
    5
}

fn default_dedup_capacity() -> usize {
    4096
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            initial_rating: default_initial_rating(),
            k_factor: default_k_factor(),
            rating_damping: default_rating_damping(),
            ttl_hours: default_ttl_hours(),
            vote_dedup_window_secs: default_vote_dedup_window_secs(),
            dedup_capacity: default_dedup_capacity(),
        }
    }
}

impl EngineConfig {
    /// Loads configuration from a TOML file, falling back to defaults for
    /// missing keys.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Session TTL as a chrono duration.
    pub fn session_ttl(&self) -> chrono::Duration {
        chrono::Duration::hours(self.ttl_hours)
    }

    /// Vote dedup window as a std duration.
    pub fn vote_dedup_window(&self) -> Duration {
        Duration::from_secs(self.vote_dedup_window_secs)
    }
}

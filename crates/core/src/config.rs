//! Tunables of the review engine.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::CoreError;
use crate::query::DEFAULT_NEAR_PLAYHEAD_WINDOW_MS;
use crate::review::DEFAULT_REQUIRED_APPROVERS;

/// Default capacity of the review event broadcast channel.
pub const DEFAULT_EVENT_BUS_CAPACITY: usize = 1024;

/// Default number of compare-and-swap attempts for one approval.
pub const DEFAULT_MAX_APPROVAL_RETRIES: u32 = 8;

/// Engine configuration.
///
/// Defaults suit an interactive reviewer; override via environment
/// variables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct ReviewConfig {
    /// Half-width of the window around the playhead in which comments count
    /// as current.
    #[validate(range(min = 1, max = 60_000))]
    pub near_playhead_window_ms: i64,
    /// Approvals required by sessions that do not set their own count.
    #[validate(range(min = 1, max = 100))]
    pub default_required_approvers: u32,
    #[validate(range(min = 1, max = 65_536))]
    pub event_bus_capacity: usize,
    #[validate(range(min = 1, max = 1_000))]
    pub max_approval_retries: u32,
}

impl Default for ReviewConfig {
    fn default() -> Self {
        Self {
            near_playhead_window_ms: DEFAULT_NEAR_PLAYHEAD_WINDOW_MS,
            default_required_approvers: DEFAULT_REQUIRED_APPROVERS,
            event_bus_capacity: DEFAULT_EVENT_BUS_CAPACITY,
            max_approval_retries: DEFAULT_MAX_APPROVAL_RETRIES,
        }
    }
}

impl ReviewConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                                | Default |
    /// |----------------------------------------|---------|
    /// | `FRAMENOTE_NEAR_PLAYHEAD_WINDOW_MS`    | `1000`  |
    /// | `FRAMENOTE_DEFAULT_REQUIRED_APPROVERS` | `2`     |
    /// | `FRAMENOTE_EVENT_BUS_CAPACITY`         | `1024`  |
    /// | `FRAMENOTE_MAX_APPROVAL_RETRIES`       | `8`     |
    pub fn from_env() -> Result<Self, CoreError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`ReviewConfig::from_env`] but reading from `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, CoreError> {
        let defaults = Self::default();
        let config = Self {
            near_playhead_window_ms: parse_var(
                &lookup,
                "FRAMENOTE_NEAR_PLAYHEAD_WINDOW_MS",
                defaults.near_playhead_window_ms,
            )?,
            default_required_approvers: parse_var(
                &lookup,
                "FRAMENOTE_DEFAULT_REQUIRED_APPROVERS",
                defaults.default_required_approvers,
            )?,
            event_bus_capacity: parse_var(
                &lookup,
                "FRAMENOTE_EVENT_BUS_CAPACITY",
                defaults.event_bus_capacity,
            )?,
            max_approval_retries: parse_var(
                &lookup,
                "FRAMENOTE_MAX_APPROVAL_RETRIES",
                defaults.max_approval_retries,
            )?,
        };
        config.check()?;
        Ok(config)
    }

    /// Run the range checks, reporting failures as [`CoreError::InvalidConfig`].
    pub fn check(&self) -> Result<(), CoreError> {
        self.validate()
            .map_err(|e| CoreError::InvalidConfig(e.to_string()))
    }
}

fn parse_var<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: T,
) -> Result<T, CoreError> {
    match lookup(key) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| CoreError::InvalidConfig(format!("{key} must be a number, got '{raw}'"))),
    }
}

//! Engine configuration.
//!
//! Both knobs default sensibly, so a bare environment yields a working
//! engine. No switch loosens authorization behavior: failure handling is
//! fail-closed and not configurable.

use std::time::Duration;

use crate::cache::PERMISSION_CACHE_TTL_SECS;
use crate::hierarchy::MAX_HIERARCHY_DEPTH;

/// Tunable parameters for [`crate::AuthorizationEngine`].
#[derive(Debug, Clone)]
pub struct AuthorizationConfig {
    /// How long a cached permission set stays fresh, in seconds.
    /// Zero disables reuse: every check reloads from storage.
    pub permission_cache_ttl_secs: u64,

    /// Deepest client-tree level accepted by hierarchy validation
    /// (root is level 0).
    pub max_hierarchy_depth: i32,
}

impl Default for AuthorizationConfig {
    fn default() -> Self {
        Self {
            permission_cache_ttl_secs: PERMISSION_CACHE_TTL_SECS,
            max_hierarchy_depth: MAX_HIERARCHY_DEPTH,
        }
    }
}

impl AuthorizationConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_reader(|key| std::env::var(key))
    }

    /// Load configuration from a custom variable reader.
    ///
    /// This allows tests to supply variables without mutating process-global
    /// environment state.
    pub fn from_reader<F>(reader: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Result<String, std::env::VarError>,
    {
        let permission_cache_ttl_secs = reader("GRIDMON_PERMISSION_CACHE_TTL_SECS")
            .unwrap_or_else(|_| PERMISSION_CACHE_TTL_SECS.to_string())
            .parse::<u64>()
            .map_err(|e| {
                ConfigError::InvalidValue("GRIDMON_PERMISSION_CACHE_TTL_SECS".into(), e.to_string())
            })?;

        let max_hierarchy_depth = reader("GRIDMON_MAX_HIERARCHY_DEPTH")
            .unwrap_or_else(|_| MAX_HIERARCHY_DEPTH.to_string())
            .parse::<i32>()
            .map_err(|e| {
                ConfigError::InvalidValue("GRIDMON_MAX_HIERARCHY_DEPTH".into(), e.to_string())
            })?;
        if max_hierarchy_depth < 1 {
            return Err(ConfigError::InvalidValue(
                "GRIDMON_MAX_HIERARCHY_DEPTH".into(),
                format!("must be at least 1, got {max_hierarchy_depth}"),
            ));
        }

        Ok(Self {
            permission_cache_ttl_secs,
            max_hierarchy_depth,
        })
    }

    /// The cache TTL as a [`Duration`].
    #[must_use]
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.permission_cache_ttl_secs)
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

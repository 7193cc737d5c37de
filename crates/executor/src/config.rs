//! Executor configuration
//!
//! Loaded from code via the `with_*` builder, from serialized documents via
//! serde, or from environment variables via [`ExecutorConfig::from_env`].

use std::env;

use serde::{Deserialize, Serialize};

/// Environment variable holding the concurrency ceiling
pub const ENV_MAX_CONCURRENT: &str = "FANOUT_MAX_CONCURRENT";
/// Environment variable selecting order-preserving delivery
pub const ENV_PRESERVE_ORDER: &str = "FANOUT_PRESERVE_ORDER";
/// Environment variable selecting the fast-fail policy
pub const ENV_FAST_FAIL: &str = "FANOUT_FAST_FAIL";

/// Configuration errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// The concurrency ceiling must be positive
    #[error("max_concurrent must be a positive integer, got {0}")]
    InvalidMaxConcurrent(usize),

    /// An environment variable could not be parsed
    #[error("invalid value for {key}: {value:?}")]
    InvalidEnvVar { key: String, value: String },
}

/// Bounded executor configuration
///
/// # Example
///
/// ```
/// use fanout_executor::ExecutorConfig;
///
/// let config = ExecutorConfig::default()
///     .with_max_concurrent(4)
///     .with_preserve_order(false);
///
/// assert_eq!(config.max_concurrent, Some(4));
/// assert!(config.fast_fail);
/// ```
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ExecutorConfig {
    /// Maximum number of tasks in flight at once (None = unbounded)
    pub max_concurrent: Option<usize>,

    /// Deliver outcomes in submission order (true) or completion order (false)
    pub preserve_order: bool,

    /// Abort the run on the first observed rejection
    pub fast_fail: bool,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            max_concurrent: None,
            preserve_order: true,
            fast_fail: true,
        }
    }
}

impl ExecutorConfig {
    /// Create a configuration with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Create configuration from environment variables
    ///
    /// Environment variables:
    /// - `FANOUT_MAX_CONCURRENT`: Concurrency ceiling (default: unbounded)
    /// - `FANOUT_PRESERVE_ORDER`: `true`/`1` or `false`/`0` (default: true)
    /// - `FANOUT_FAST_FAIL`: `true`/`1` or `false`/`0` (default: true)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Create configuration from an arbitrary key lookup
    pub fn from_lookup<L>(lookup: L) -> Result<Self, ConfigError>
    where
        L: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let max_concurrent = match lookup(ENV_MAX_CONCURRENT) {
            Some(raw) if !raw.trim().is_empty() => Some(
                raw.trim()
                    .parse::<usize>()
                    .map_err(|_| invalid(ENV_MAX_CONCURRENT, &raw))?,
            ),
            _ => defaults.max_concurrent,
        };

        let preserve_order = lookup(ENV_PRESERVE_ORDER)
            .map(|raw| parse_flag(ENV_PRESERVE_ORDER, &raw))
            .transpose()?
            .unwrap_or(defaults.preserve_order);

        let fast_fail = lookup(ENV_FAST_FAIL)
            .map(|raw| parse_flag(ENV_FAST_FAIL, &raw))
            .transpose()?
            .unwrap_or(defaults.fast_fail);

        let config = Self {
            max_concurrent,
            preserve_order,
            fast_fail,
        };
        config.validate()?;
        Ok(config)
    }

    /// Set the concurrency ceiling
    pub fn with_max_concurrent(mut self, max: usize) -> Self {
        self.max_concurrent = Some(max);
        self
    }

    /// Remove the concurrency ceiling
    pub fn unbounded(mut self) -> Self {
        self.max_concurrent = None;
        self
    }

    /// Select order-preserving or completion-order delivery
    pub fn with_preserve_order(mut self, preserve_order: bool) -> Self {
        self.preserve_order = preserve_order;
        self
    }

    /// Select the failure policy
    pub fn with_fast_fail(mut self, fast_fail: bool) -> Self {
        self.fast_fail = fast_fail;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        match self.max_concurrent {
            Some(0) => Err(ConfigError::InvalidMaxConcurrent(0)),
            _ => Ok(()),
        }
    }

    /// Effective number of slots for a run of `task_count` tasks
    pub(crate) fn slots_for(&self, task_count: usize) -> usize {
        self.max_concurrent.map_or(task_count, |max| max.min(task_count))
    }
}

fn parse_flag(key: &str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_lowercase().as_str() {
        "true" | "1" => Ok(true),
        "false" | "0" => Ok(false),
        _ => Err(invalid(key, raw)),
    }
}

fn invalid(key: &str, value: &str) -> ConfigError {
    ConfigError::InvalidEnvVar {
        key: key.to_string(),
        value: value.to_string(),
    }
}

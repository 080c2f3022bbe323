//! Container configuration.
//!
//! [`ContainerOptions`] can be built in code, read from `DICTOR_*` environment
//! variables, or (with the `config` feature) deserialized from JSON.

use std::env;

#[cfg(feature = "config")]
use serde::{Deserialize, Serialize};

use crate::error::{DiError, DiResult};
use crate::internal::MAX_DEPTH;

/// Default environment variable prefix.
pub const ENV_PREFIX: &str = "DICTOR";

/// Runtime options of a [`Container`](crate::Container).
///
/// # Examples
///
/// ```
/// use dictor::{Container, ContainerOptions};
///
/// let options = ContainerOptions::default()
///     .with_max_depth(64)
///     .with_cycle_detection(true);
///
/// let container = Container::builder().options(options).build();
/// assert_eq!(container.options().max_depth, 64);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "config", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "config", serde(default))]
pub struct ContainerOptions {
    /// Maximum nesting of resolutions on one thread.
    pub max_depth: usize,
    /// Fail re-entrant resolution of a type with [`DiError::Circular`].
    /// Memoized factories are checked for re-entry even when this is off.
    pub detect_cycles: bool,
}

impl Default for ContainerOptions {
    fn default() -> Self {
        Self {
            max_depth: MAX_DEPTH,
            detect_cycles: true,
        }
    }
}

impl ContainerOptions {
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_cycle_detection(mut self, enabled: bool) -> Self {
        self.detect_cycles = enabled;
        self
    }

    /// Defaults overridden by `DICTOR_MAX_DEPTH` and `DICTOR_DETECT_CYCLES`.
    pub fn from_env() -> DiResult<Self> {
        Self::from_env_with_prefix(ENV_PREFIX)
    }

    /// Defaults overridden by `{PREFIX}_MAX_DEPTH` and
    /// `{PREFIX}_DETECT_CYCLES`. Malformed values are an error, not ignored.
    pub fn from_env_with_prefix(prefix: &str) -> DiResult<Self> {
        let mut options = Self::default();
        let prefix = prefix.to_uppercase();

        if let Some(value) = env_var(&prefix, "MAX_DEPTH") {
            options.max_depth = value.trim().parse::<usize>().map_err(|e| {
                DiError::Config(format!("{}_MAX_DEPTH={:?}: {}", prefix, value, e))
            })?;
        }
        if let Some(value) = env_var(&prefix, "DETECT_CYCLES") {
            options.detect_cycles = parse_bool(&value).ok_or_else(|| {
                DiError::Config(format!("{}_DETECT_CYCLES={:?}: expected a boolean", prefix, value))
            })?;
        }
        if options.max_depth == 0 {
            return Err(DiError::Config(format!("{}_MAX_DEPTH must be at least 1", prefix)));
        }

        Ok(options)
    }

    /// Parses options from JSON; missing fields keep their defaults.
    ///
    /// ```
    /// use dictor::ContainerOptions;
    ///
    /// let options = ContainerOptions::from_json(r#"{ "max_depth": 32 }"#).unwrap();
    /// assert_eq!(options.max_depth, 32);
    /// assert!(options.detect_cycles);
    /// ```
    #[cfg(feature = "config")]
    pub fn from_json(json: &str) -> DiResult<Self> {
        serde_json::from_str(json).map_err(|e| DiError::Config(e.to_string()))
    }
}

fn env_var(prefix: &str, name: &str) -> Option<String> {
    env::var(format!("{}_{}", prefix, name)).ok()
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = ContainerOptions::default();
        assert_eq!(options.max_depth, 1024);
        assert!(options.detect_cycles);
    }

    #[test]
    fn test_parse_bool() {
        assert_eq!(parse_bool(" TRUE "), Some(true));
        assert_eq!(parse_bool("0"), Some(false));
        assert_eq!(parse_bool("maybe"), None);
    }

    #[test]
    fn test_environment_with_prefix() {
        // Prefix unique to this test so parallel tests do not interfere
        env::set_var("DICTOR_UNIT_MAX_DEPTH", "12");
        env::set_var("DICTOR_UNIT_DETECT_CYCLES", "off");

        let options = ContainerOptions::from_env_with_prefix("dictor_unit").unwrap();
        assert_eq!(options.max_depth, 12);
        assert!(!options.detect_cycles);

        env::set_var("DICTOR_UNIT_MAX_DEPTH", "deep");
        let err = ContainerOptions::from_env_with_prefix("DICTOR_UNIT").unwrap_err();
        assert!(matches!(err, DiError::Config(_)));

        env::remove_var("DICTOR_UNIT_MAX_DEPTH");
        env::remove_var("DICTOR_UNIT_DETECT_CYCLES");
    }

    #[cfg(feature = "config")]
    #[test]
    fn test_json_round_trip() {
        let options = ContainerOptions::default().with_max_depth(7);
        let json = serde_json::to_string(&options).unwrap();
        assert_eq!(ContainerOptions::from_json(&json).unwrap(), options);
        assert!(ContainerOptions::from_json("{ nope").is_err());
    }
}

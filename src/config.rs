//! Configuration types.

use std::path::PathBuf;
use std::time::Duration;

use crate::error::ConfigError;

/// Runtime configuration for the onboarding pipeline.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Path of the libSQL database file.
    pub db_path: PathBuf,
    /// Number of users repaired concurrently by the batch job (1 = sequential).
    pub repair_concurrency: usize,
    /// Classification requests allowed per user within `classify_rate_window`.
    pub classify_rate_limit: usize,
    /// Sliding window for the classification rate limit.
    pub classify_rate_window: Duration,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from("./data/onboarding.db"),
            repair_concurrency: 1,
            classify_rate_limit: 30,
            classify_rate_window: Duration::from_secs(60), // 1 minute
        }
    }
}

impl PipelineConfig {
    /// Build config from `ONBOARD_*` environment variables, falling back to
    /// defaults for anything unset.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build config from an arbitrary key lookup (used by `from_env` and tests).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let db_path = lookup("ONBOARD_DB_PATH")
            .filter(|s| !s.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or(defaults.db_path);

        let repair_concurrency = parse_var(&lookup, "ONBOARD_REPAIR_CONCURRENCY")?
            .unwrap_or(defaults.repair_concurrency);
        if repair_concurrency == 0 {
            return Err(ConfigError::InvalidValue {
                key: "ONBOARD_REPAIR_CONCURRENCY".to_string(),
                message: "must be at least 1".to_string(),
            });
        }

        let classify_rate_limit = parse_var(&lookup, "ONBOARD_CLASSIFY_RATE_LIMIT")?
            .unwrap_or(defaults.classify_rate_limit);

        let classify_rate_window =
            parse_var::<u64, _>(&lookup, "ONBOARD_CLASSIFY_RATE_WINDOW_SECS")?
                .map(Duration::from_secs)
                .unwrap_or(defaults.classify_rate_window);

        Ok(Self {
            db_path,
            repair_concurrency,
            classify_rate_limit,
            classify_rate_window,
        })
    }
}

fn parse_var<T, F>(lookup: &F, key: &str) -> Result<Option<T>, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) if !raw.trim().is_empty() => {
            raw.trim()
                .parse::<T>()
                .map(Some)
                .map_err(|e| ConfigError::InvalidValue {
                    key: key.to_string(),
                    message: format!("{raw:?}: {e}"),
                })
        }
        _ => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_unset() {
        let config = PipelineConfig::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config.db_path, PathBuf::from("./data/onboarding.db"));
        assert_eq!(config.repair_concurrency, 1);
        assert_eq!(config.classify_rate_limit, 30);
        assert_eq!(config.classify_rate_window, Duration::from_secs(60));
    }

    #[test]
    fn reads_overrides() {
        let config = PipelineConfig::from_lookup(lookup_from(&[
            ("ONBOARD_DB_PATH", "/tmp/x.db"),
            ("ONBOARD_REPAIR_CONCURRENCY", "4"),
            ("ONBOARD_CLASSIFY_RATE_LIMIT", "5"),
            ("ONBOARD_CLASSIFY_RATE_WINDOW_SECS", "10"),
        ]))
        .unwrap();
        assert_eq!(config.db_path, PathBuf::from("/tmp/x.db"));
        assert_eq!(config.repair_concurrency, 4);
        assert_eq!(config.classify_rate_limit, 5);
        assert_eq!(config.classify_rate_window, Duration::from_secs(10));
    }

    #[test]
    fn rejects_garbage_numbers() {
        let lookup = lookup_from(&[("ONBOARD_CLASSIFY_RATE_LIMIT", "lots")]);
        let err = PipelineConfig::from_lookup(lookup).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidValue { ref key, .. } if key == "ONBOARD_CLASSIFY_RATE_LIMIT"
        ));
    }

    #[test]
    fn rejects_zero_concurrency() {
        let err = PipelineConfig::from_lookup(lookup_from(&[("ONBOARD_REPAIR_CONCURRENCY", "0")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
    }
}

//! Process configuration read from `CRAGSUPPLY_*` environment variables.

use std::time::Duration;

use thiserror::Error;

use cragsupply_observability::LogFormat;

pub const LOG_FORMAT: &str = "CRAGSUPPLY_LOG_FORMAT";
pub const SEED_DEMO_DATA: &str = "CRAGSUPPLY_SEED_DEMO_DATA";
pub const LOCK_TIMEOUT_MS: &str = "CRAGSUPPLY_LOCK_TIMEOUT_MS";

const DEFAULT_LOCK_TIMEOUT_MS: u64 = 5_000;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("{key}: invalid value '{value}': {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

impl ConfigError {
    fn invalid(key: &'static str, value: &str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            key,
            value: value.to_string(),
            reason: reason.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub log_format: LogFormat,
    pub seed_demo_data: bool,
    /// `None` waits for warehouse locks indefinitely.
    pub lock_timeout: Option<Duration>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            log_format: LogFormat::Json,
            seed_demo_data: true,
            lock_timeout: Some(Duration::from_millis(DEFAULT_LOCK_TIMEOUT_MS)),
        }
    }
}

impl Settings {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build settings from an arbitrary key lookup. Unset or blank keys fall
    /// back to their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut settings = Settings::default();

        if let Some(raw) = get(LOG_FORMAT) {
            settings.log_format = raw
                .parse()
                .map_err(|e: cragsupply_observability::ParseLogFormatError| {
                    ConfigError::invalid(LOG_FORMAT, &raw, e.to_string())
                })?;
        }

        if let Some(raw) = get(SEED_DEMO_DATA) {
            settings.seed_demo_data = parse_bool(&raw)
                .ok_or_else(|| ConfigError::invalid(SEED_DEMO_DATA, &raw, "expected true or false"))?;
        }

        if let Some(raw) = get(LOCK_TIMEOUT_MS) {
            let ms: u64 = raw
                .trim()
                .parse()
                .map_err(|_| ConfigError::invalid(LOCK_TIMEOUT_MS, &raw, "expected milliseconds"))?;
            settings.lock_timeout = (ms > 0).then(|| Duration::from_millis(ms));
        }

        Ok(settings)
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn settings(pairs: &[(&str, &str)]) -> Result<Settings, ConfigError> {
        let env: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Settings::from_lookup(|key| env.get(key).cloned())
    }

    #[test]
    fn defaults_apply_when_unset() {
        assert_eq!(settings(&[]).unwrap(), Settings::default());
        assert_eq!(
            settings(&[]).unwrap().lock_timeout,
            Some(Duration::from_millis(5_000))
        );
    }

    #[test]
    fn reads_every_key() {
        let s = settings(&[
            (LOG_FORMAT, "pretty"),
            (SEED_DEMO_DATA, "false"),
            (LOCK_TIMEOUT_MS, "250"),
        ])
        .unwrap();
        assert_eq!(s.log_format, LogFormat::Pretty);
        assert!(!s.seed_demo_data);
        assert_eq!(s.lock_timeout, Some(Duration::from_millis(250)));
    }

    #[test]
    fn zero_timeout_waits_forever() {
        let s = settings(&[(LOCK_TIMEOUT_MS, "0")]).unwrap();
        assert_eq!(s.lock_timeout, None);
    }

    #[test]
    fn invalid_values_name_the_key() {
        let err = settings(&[(SEED_DEMO_DATA, "maybe")]).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: SEED_DEMO_DATA, .. }));

        let err = settings(&[(LOCK_TIMEOUT_MS, "-1")]).unwrap_err();
        assert!(err.to_string().starts_with("CRAGSUPPLY_LOCK_TIMEOUT_MS"));

        assert!(settings(&[(LOG_FORMAT, "xml")]).is_err());
    }
}

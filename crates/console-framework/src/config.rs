//! # Console Configuration
//!
//! Tunables for paging, search debounce and the readiness poll. Values come
//! from defaults, an optional JSON file named by `ADMIN_CONSOLE_CONFIG`, and
//! `ADMIN_CONSOLE_*` environment overrides, in that order.
//!
//! ```bash
//! ADMIN_CONSOLE_PAGE_SIZE=25 ADMIN_CONSOLE_POLL_ATTEMPTS=20 cargo run
//! ```

use crate::error::ConsoleError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::time::Duration;
use tracing::debug;

/// Environment variable naming an optional JSON config file.
pub const CONFIG_PATH_ENV: &str = "ADMIN_CONSOLE_CONFIG";

/// Poll cadence and ceiling used while waiting for a module to become ready.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReadinessPolicy {
    pub poll_interval_ms: u64,
    pub max_attempts: u32,
}

impl Default for ReadinessPolicy {
    fn default() -> Self {
        Self {
            poll_interval_ms: 100,
            max_attempts: 50,
        }
    }
}

impl ReadinessPolicy {
    pub fn new(poll_interval: Duration, max_attempts: u32) -> Self {
        Self {
            poll_interval_ms: poll_interval.as_millis() as u64,
            max_attempts,
        }
    }

    /// Never zero: a zero-period interval panics in tokio.
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(1))
    }

    /// Total time a waiter spends polling before the handle is failed.
    pub fn deadline(&self) -> Duration {
        self.poll_interval() * self.max_attempts
    }
}

/// Top-level configuration for the admin console.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsoleConfig {
    /// Records requested per page.
    pub page_size: u32,
    /// Width of the page-number window in the pagination controls.
    pub max_visible_pages: u32,
    /// Quiet window for search and filter inputs.
    pub search_debounce_ms: u64,
    pub readiness: ReadinessPolicy,
    /// Absolute base URL of the admin API. `None` selects the built-in fixture backend.
    pub api_base_url: Option<String>,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            page_size: 10,
            max_visible_pages: 5,
            search_debounce_ms: 300,
            readiness: ReadinessPolicy::default(),
            api_base_url: None,
        }
    }
}

impl ConsoleConfig {
    pub fn search_debounce(&self) -> Duration {
        Duration::from_millis(self.search_debounce_ms)
    }

    /// Loads the configuration from the optional file and the process environment.
    pub fn load() -> Result<Self, ConsoleError> {
        let mut config = match std::env::var(CONFIG_PATH_ENV) {
            Ok(path) => {
                let raw = std::fs::read_to_string(&path)
                    .map_err(|e| ConsoleError::Config(format!("{path}: {e}")))?;
                Self::from_json(&raw)?
            }
            Err(_) => Self::default(),
        };
        config.apply_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        debug!(?config, "Configuration loaded");
        Ok(config)
    }

    /// Parses a JSON document; missing fields keep their defaults.
    pub fn from_json(raw: &str) -> Result<Self, ConsoleError> {
        let config: Self =
            serde_json::from_str(raw).map_err(|e| ConsoleError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Applies `ADMIN_CONSOLE_*` overrides from `lookup`.
    ///
    /// Taking a lookup function keeps tests independent of the process environment.
    pub fn apply_overrides(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConsoleError> {
        if let Some(v) = lookup("ADMIN_CONSOLE_PAGE_SIZE") {
            self.page_size = parse_var("ADMIN_CONSOLE_PAGE_SIZE", &v)?;
        }
        if let Some(v) = lookup("ADMIN_CONSOLE_MAX_VISIBLE_PAGES") {
            self.max_visible_pages = parse_var("ADMIN_CONSOLE_MAX_VISIBLE_PAGES", &v)?;
        }
        if let Some(v) = lookup("ADMIN_CONSOLE_SEARCH_DEBOUNCE_MS") {
            self.search_debounce_ms = parse_var("ADMIN_CONSOLE_SEARCH_DEBOUNCE_MS", &v)?;
        }
        if let Some(v) = lookup("ADMIN_CONSOLE_POLL_INTERVAL_MS") {
            self.readiness.poll_interval_ms = parse_var("ADMIN_CONSOLE_POLL_INTERVAL_MS", &v)?;
        }
        if let Some(v) = lookup("ADMIN_CONSOLE_POLL_ATTEMPTS") {
            self.readiness.max_attempts = parse_var("ADMIN_CONSOLE_POLL_ATTEMPTS", &v)?;
        }
        if let Some(v) = lookup("ADMIN_CONSOLE_API_BASE") {
            self.api_base_url = Some(v).filter(|s| !s.trim().is_empty());
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConsoleError> {
        if self.page_size == 0 {
            return Err(ConsoleError::Config("page_size must be positive".into()));
        }
        if self.max_visible_pages == 0 {
            return Err(ConsoleError::Config("max_visible_pages must be positive".into()));
        }
        if self.readiness.poll_interval_ms == 0 {
            return Err(ConsoleError::Config("readiness.poll_interval_ms must be positive".into()));
        }
        if self.readiness.max_attempts == 0 {
            return Err(ConsoleError::Config("readiness.max_attempts must be positive".into()));
        }
        Ok(())
    }
}

fn parse_var<T: FromStr>(key: &str, value: &str) -> Result<T, ConsoleError>
where
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|e| ConsoleError::Config(format!("{key}={value}: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn json_fills_missing_fields_with_defaults() {
        let config = ConsoleConfig::from_json(r#"{"page_size": 25, "readiness": {"max_attempts": 3}}"#)
            .unwrap();
        assert_eq!(config.page_size, 25);
        assert_eq!(config.max_visible_pages, 5);
        assert_eq!(config.readiness.max_attempts, 3);
        assert_eq!(config.readiness.poll_interval_ms, 100);
    }

    #[test]
    fn overrides_are_applied_and_validated() {
        let vars: HashMap<&str, &str> = [
            ("ADMIN_CONSOLE_PAGE_SIZE", "20"),
            ("ADMIN_CONSOLE_POLL_INTERVAL_MS", "250"),
            ("ADMIN_CONSOLE_API_BASE", "http://localhost:8080/api/"),
        ]
        .into_iter()
        .collect();

        let mut config = ConsoleConfig::default();
        config
            .apply_overrides(|k| vars.get(k).map(|v| v.to_string()))
            .unwrap();
        assert_eq!(config.page_size, 20);
        assert_eq!(config.readiness.poll_interval(), Duration::from_millis(250));
        assert_eq!(config.api_base_url.as_deref(), Some("http://localhost:8080/api/"));
    }

    #[test]
    fn rejects_unparseable_and_zero_values() {
        let mut config = ConsoleConfig::default();
        let err = config
            .apply_overrides(|k| (k == "ADMIN_CONSOLE_PAGE_SIZE").then(|| "ten".to_string()))
            .unwrap_err();
        assert!(matches!(err, ConsoleError::Config(_)));

        assert!(ConsoleConfig::from_json(r#"{"page_size": 0}"#).is_err());
        assert!(matches!(
            ConsoleConfig::from_json(r#"{"readiness": {"poll_interval_ms": 0}}"#),
            Err(ConsoleError::Config(_))
        ));

        let mut config = ConsoleConfig::default();
        config
            .apply_overrides(|k| (k == "ADMIN_CONSOLE_POLL_INTERVAL_MS").then(|| "0".to_string()))
            .unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn deadline_is_interval_times_attempts() {
        let policy = ReadinessPolicy::new(Duration::from_millis(40), 5);
        assert_eq!(policy.deadline(), Duration::from_millis(200));
    }
}

//! Server configuration from environment variables
//!
//! | Variable | Default |
//! |---|---|
//! | `TIMELINE_DATA_DIR` | `./data` (relative paths resolve against the current dir) |
//! | `TIMELINE_HTTP_ADDR` | `127.0.0.1:3030` |
//! | `TIMELINE_PAGE_SIZE` | `500` |
//! | `TIMELINE_AUTOPLAY_STEP` | `0.5` |
//! | `TIMELINE_AUTOPLAY_PERIOD_MS` | `100` |
//! | `TIMELINE_LOG_LEVEL` | `info` |

use std::env;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use tracing::warn;

use crate::event_store::{EventStoreConfig, DEFAULT_PAGE_SIZE};
use crate::scrub::{ScrubConfig, AUTOPLAY_STEP};
use crate::session::{SessionConfig, AUTOPLAY_PERIOD};

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub data_dir: PathBuf,
    pub http_addr: SocketAddr,
    pub page_size: usize,
    pub autoplay_step: f64,
    pub autoplay_period: Duration,
    pub log_level: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        let current_dir = env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        Self {
            data_dir: current_dir.join("data"),
            http_addr: SocketAddr::from(([127, 0, 0, 1], 3030)),
            page_size: DEFAULT_PAGE_SIZE,
            autoplay_step: AUTOPLAY_STEP,
            autoplay_period: AUTOPLAY_PERIOD,
            log_level: "info".to_string(),
        }
    }
}

impl ServerConfig {
    /// Read the process environment
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from any key lookup; invalid values fall back to defaults
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let current_dir = env::current_dir().unwrap_or_else(|_| PathBuf::from("."));

        let data_dir = match lookup("TIMELINE_DATA_DIR") {
            Some(path) if Path::new(&path).is_absolute() => PathBuf::from(path),
            Some(path) => current_dir.join(path),
            None => defaults.data_dir,
        };

        let autoplay_step = parse_or("TIMELINE_AUTOPLAY_STEP", &lookup, defaults.autoplay_step);
        let autoplay_step = if autoplay_step.is_finite() && autoplay_step > 0.0 {
            autoplay_step
        } else {
            warn!(value = autoplay_step, "TIMELINE_AUTOPLAY_STEP must be positive, using default");
            defaults.autoplay_step
        };

        let period_ms = parse_or("TIMELINE_AUTOPLAY_PERIOD_MS", &lookup, 0u64);
        let autoplay_period = if period_ms > 0 {
            Duration::from_millis(period_ms)
        } else {
            defaults.autoplay_period
        };

        Self {
            data_dir,
            http_addr: parse_or("TIMELINE_HTTP_ADDR", &lookup, defaults.http_addr),
            page_size: parse_or("TIMELINE_PAGE_SIZE", &lookup, defaults.page_size),
            autoplay_step,
            autoplay_period,
            log_level: lookup("TIMELINE_LOG_LEVEL").unwrap_or(defaults.log_level),
        }
    }

    pub fn store_config(&self) -> EventStoreConfig {
        EventStoreConfig::new(&self.data_dir).with_page_size(self.page_size)
    }

    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            scrub: ScrubConfig::default().with_autoplay_step(self.autoplay_step),
            autoplay_period: self.autoplay_period,
        }
    }
}

fn parse_or<T>(key: &str, lookup: &impl Fn(&str) -> Option<String>, default: T) -> T
where
    T: FromStr,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!(key, value = %raw, "invalid value, using default");
            default
        }),
        None => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> ServerConfig {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ServerConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]);
        assert_eq!(config.http_addr.to_string(), "127.0.0.1:3030");
        assert_eq!(config.page_size, 500);
        assert_eq!(config.autoplay_step, 0.5);
        assert_eq!(config.autoplay_period, Duration::from_millis(100));
        assert_eq!(config.log_level, "info");
        assert!(config.data_dir.ends_with("data"));
    }

    #[test]
    fn test_overrides() {
        let config = config_from(&[
            ("TIMELINE_DATA_DIR", "/var/lib/timeline"),
            ("TIMELINE_HTTP_ADDR", "0.0.0.0:8080"),
            ("TIMELINE_PAGE_SIZE", "50"),
            ("TIMELINE_AUTOPLAY_STEP", "2.5"),
            ("TIMELINE_AUTOPLAY_PERIOD_MS", "40"),
            ("TIMELINE_LOG_LEVEL", "debug"),
        ]);
        assert_eq!(config.data_dir, PathBuf::from("/var/lib/timeline"));
        assert_eq!(config.http_addr.port(), 8080);
        assert_eq!(config.page_size, 50);
        assert_eq!(config.autoplay_step, 2.5);
        assert_eq!(config.autoplay_period, Duration::from_millis(40));
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.store_config().page_size, 50);
    }

    #[test]
    fn test_relative_data_dir_resolves_against_current_dir() {
        let config = config_from(&[("TIMELINE_DATA_DIR", "logs")]);
        assert!(config.data_dir.is_absolute());
        assert!(config.data_dir.ends_with("logs"));
    }

    #[test]
    fn test_invalid_values_fall_back() {
        let config = config_from(&[
            ("TIMELINE_HTTP_ADDR", "nowhere"),
            ("TIMELINE_PAGE_SIZE", "lots"),
            ("TIMELINE_AUTOPLAY_STEP", "-1"),
            ("TIMELINE_AUTOPLAY_PERIOD_MS", "0"),
        ]);
        assert_eq!(config.http_addr.to_string(), "127.0.0.1:3030");
        assert_eq!(config.page_size, 500);
        assert_eq!(config.autoplay_step, 0.5);
        assert_eq!(config.autoplay_period, Duration::from_millis(100));
    }
}

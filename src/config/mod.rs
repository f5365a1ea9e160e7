//! Application configuration loaded from environment.

use std::net::SocketAddr;
use std::time::Duration;

/// Application configuration loaded from `.env` and environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server bind address (e.g. `0.0.0.0:5002`).
    pub server_addr: SocketAddr,
    /// sqlx SQLite URL (e.g. `sqlite://gamesquad.sqlite`), or `memory` for a non-persistent store.
    pub database_url: String,
    /// Origin allowed by CORS. `*` allows any origin.
    pub cors_origin: String,
    /// Directory with the front-end bundle, served for unmatched routes.
    pub static_dir: String,
    /// Records older than this many days are pruned. `0` disables pruning.
    pub record_retention_days: u32,
    /// How often the retention task runs.
    pub retention_interval: Duration,
    /// WebSocket liveness checks.
    pub heartbeat: HeartbeatConfig,
    /// Log level: `error`, `warn`, `info`, `debug`, `trace`.
    pub log_level: String,
}

/// Server pings every `interval`; a peer silent for `timeout` is dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeartbeatConfig {
    pub interval: Duration,
    pub timeout: Duration,
}

impl Default for HeartbeatConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(5),
            timeout: Duration::from_secs(30),
        }
    }
}

impl Config {
    /// Load configuration from environment. Call `dotenvy::dotenv().ok()` before this.
    pub fn from_env() -> Result<Self, ConfigLoadError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from any key/value source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigLoadError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let server_addr = lookup("SERVER_ADDR").unwrap_or_else(|| "0.0.0.0:5002".to_string());
        let server_addr: SocketAddr = server_addr
            .parse()
            .map_err(|_| ConfigLoadError::InvalidServerAddr)?;

        let database_url =
            lookup("DATABASE_URL").unwrap_or_else(|| "sqlite://gamesquad.sqlite".to_string());
        let cors_origin =
            lookup("CORS_ORIGIN").unwrap_or_else(|| "http://localhost:3000".to_string());
        let static_dir = lookup("STATIC_DIR").unwrap_or_else(|| "static".to_string());

        let record_retention_days = match lookup("RECORD_RETENTION_DAYS") {
            Some(v) => v
                .parse()
                .map_err(|_| ConfigLoadError::InvalidNumber("RECORD_RETENTION_DAYS"))?,
            None => 30,
        };
        let retention_interval = positive_secs(&lookup, "RETENTION_INTERVAL_SECS", 3600)?;

        let heartbeat = HeartbeatConfig {
            interval: positive_secs(&lookup, "WS_PING_INTERVAL_SECS", 5)?,
            timeout: positive_secs(&lookup, "WS_CLIENT_TIMEOUT_SECS", 30)?,
        };
        if heartbeat.timeout <= heartbeat.interval {
            return Err(ConfigLoadError::HeartbeatTooShort);
        }

        let log_level = lookup("LOG_LEVEL").unwrap_or_else(|| "info".to_string());

        Ok(Self {
            server_addr,
            database_url,
            cors_origin,
            static_dir,
            record_retention_days,
            retention_interval,
            heartbeat,
            log_level,
        })
    }
}

fn positive_secs<F>(lookup: &F, key: &'static str, default: u64) -> Result<Duration, ConfigLoadError>
where
    F: Fn(&str) -> Option<String>,
{
    let Some(raw) = lookup(key) else {
        return Ok(Duration::from_secs(default));
    };
    match raw.parse::<u64>() {
        Ok(secs) if secs > 0 => Ok(Duration::from_secs(secs)),
        _ => Err(ConfigLoadError::InvalidNumber(key)),
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigLoadError {
    #[error("Invalid SERVER_ADDR")]
    InvalidServerAddr,
    #[error("Invalid {0}: expected a positive integer")]
    InvalidNumber(&'static str),
    #[error("WS_CLIENT_TIMEOUT_SECS must be longer than WS_PING_INTERVAL_SECS")]
    HeartbeatTooShort,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(pairs: &[(&str, &str)]) -> Result<Config, ConfigLoadError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_when_unset() {
        let config = load(&[]).unwrap();
        assert_eq!(config.server_addr.port(), 5002);
        assert_eq!(config.database_url, "sqlite://gamesquad.sqlite");
        assert_eq!(config.cors_origin, "http://localhost:3000");
        assert_eq!(config.record_retention_days, 30);
        assert_eq!(config.retention_interval, Duration::from_secs(3600));
        assert_eq!(config.heartbeat, HeartbeatConfig::default());
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn overrides_are_parsed() {
        let config = load(&[
            ("SERVER_ADDR", "127.0.0.1:8080"),
            ("RECORD_RETENTION_DAYS", "0"),
            ("RETENTION_INTERVAL_SECS", "60"),
            ("WS_PING_INTERVAL_SECS", "10"),
            ("WS_CLIENT_TIMEOUT_SECS", "45"),
        ])
        .unwrap();
        assert_eq!(config.server_addr.to_string(), "127.0.0.1:8080");
        assert_eq!(config.record_retention_days, 0);
        assert_eq!(config.retention_interval, Duration::from_secs(60));
        assert_eq!(config.heartbeat.interval, Duration::from_secs(10));
        assert_eq!(config.heartbeat.timeout, Duration::from_secs(45));
    }

    #[test]
    fn zero_retention_interval_is_rejected() {
        assert!(matches!(
            load(&[("RETENTION_INTERVAL_SECS", "0")]),
            Err(ConfigLoadError::InvalidNumber("RETENTION_INTERVAL_SECS"))
        ));
        assert!(matches!(
            load(&[("RETENTION_INTERVAL_SECS", "soon")]),
            Err(ConfigLoadError::InvalidNumber("RETENTION_INTERVAL_SECS"))
        ));
    }

    #[test]
    fn bad_values_are_rejected() {
        assert!(matches!(
            load(&[("SERVER_ADDR", "nowhere")]),
            Err(ConfigLoadError::InvalidServerAddr)
        ));
        assert!(matches!(
            load(&[("RECORD_RETENTION_DAYS", "-1")]),
            Err(ConfigLoadError::InvalidNumber("RECORD_RETENTION_DAYS"))
        ));
        assert!(matches!(
            load(&[("WS_PING_INTERVAL_SECS", "30"), ("WS_CLIENT_TIMEOUT_SECS", "30")]),
            Err(ConfigLoadError::HeartbeatTooShort)
        ));
    }
}

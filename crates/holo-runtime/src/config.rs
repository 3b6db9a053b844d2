//! Driver configuration from the environment

use std::net::SocketAddr;
use std::time::Duration;

use holo_core::{HoloError, HoloResult};
use holo_feed::{DEFAULT_BASE_URL, DEFAULT_POLL_INTERVAL, DEFAULT_REQUEST_TIMEOUT};

use crate::DirectorConfig;

pub const ENV_ORCHESTRATOR_URL: &str = "HOLO_ORCHESTRATOR_URL";
pub const ENV_POLL_INTERVAL: &str = "HOLO_POLL_INTERVAL";
pub const ENV_FRAME_INTERVAL: &str = "HOLO_FRAME_INTERVAL";
pub const ENV_SIGNALS_ADDR: &str = "HOLO_SIGNALS_ADDR";
pub const ENV_REQUEST_TIMEOUT: &str = "HOLO_REQUEST_TIMEOUT";
pub const ENV_LOG_JSON: &str = "HOLO_LOG_JSON";

/// ~60 frames per second
pub const DEFAULT_FRAME_INTERVAL: Duration = Duration::from_micros(16_667);

pub const DEFAULT_SIGNALS_ADDR: &str = "127.0.0.1:8090";

/// Async driver configuration
#[derive(Clone, Debug)]
pub struct DriverConfig {
    pub orchestrator_url: String,
    pub poll_interval: Duration,
    pub frame_interval: Duration,
    pub request_timeout: Duration,
    /// Where the signals endpoint listens
    pub signals_addr: SocketAddr,
    /// Capacity of the feed/completion channel
    pub channel_capacity: usize,
    pub director: DirectorConfig,
}

impl Default for DriverConfig {
    fn default() -> Self {
        DriverConfig {
            orchestrator_url: DEFAULT_BASE_URL.to_string(),
            poll_interval: DEFAULT_POLL_INTERVAL,
            frame_interval: DEFAULT_FRAME_INTERVAL,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            signals_addr: SocketAddr::from(([127, 0, 0, 1], 8090)),
            channel_capacity: 256,
            director: DirectorConfig::default(),
        }
    }
}

impl DriverConfig {
    /// Read overrides from the process environment
    pub fn from_env() -> HoloResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read overrides through `lookup`; unset keys keep their defaults
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> HoloResult<Self> {
        let mut config = DriverConfig::default();

        if let Some(url) = lookup(ENV_ORCHESTRATOR_URL) {
            if url.trim().is_empty() {
                return Err(HoloError::Config(format!("{ENV_ORCHESTRATOR_URL} is empty")));
            }
            config.orchestrator_url = url.trim().to_string();
        }
        if let Some(v) = lookup(ENV_POLL_INTERVAL) {
            config.poll_interval = parse_interval(ENV_POLL_INTERVAL, &v)?;
        }
        if let Some(v) = lookup(ENV_FRAME_INTERVAL) {
            config.frame_interval = parse_interval(ENV_FRAME_INTERVAL, &v)?;
        }
        if let Some(v) = lookup(ENV_REQUEST_TIMEOUT) {
            config.request_timeout = parse_interval(ENV_REQUEST_TIMEOUT, &v)?;
        }
        if let Some(v) = lookup(ENV_SIGNALS_ADDR) {
            config.signals_addr = v
                .trim()
                .parse()
                .map_err(|e| HoloError::Config(format!("{ENV_SIGNALS_ADDR}={v}: {e}")))?;
        }
        Ok(config)
    }
}

/// Is JSON log output requested?
pub fn log_json_from_env() -> bool {
    matches!(
        std::env::var(ENV_LOG_JSON).as_deref(),
        Ok("1") | Ok("true") | Ok("yes")
    )
}

fn parse_interval(key: &str, value: &str) -> HoloResult<Duration> {
    let d = humantime::parse_duration(value.trim())
        .map_err(|e| HoloError::Config(format!("{key}={value}: {e}")))?;
    if d.is_zero() {
        return Err(HoloError::Config(format!("{key} must be non-zero")));
    }
    Ok(d)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = DriverConfig::from_lookup(|_| None).unwrap();
        assert_eq!(config.orchestrator_url, "http://localhost:5000");
        assert_eq!(config.poll_interval, Duration::from_millis(50));
        assert_eq!(config.signals_addr.to_string(), DEFAULT_SIGNALS_ADDR);
    }

    #[test]
    fn test_overrides() {
        let config = DriverConfig::from_lookup(lookup(&[
            (ENV_ORCHESTRATOR_URL, "http://orchestrator:7000"),
            (ENV_POLL_INTERVAL, "200ms"),
            (ENV_FRAME_INTERVAL, "33ms"),
            (ENV_SIGNALS_ADDR, "0.0.0.0:9000"),
        ]))
        .unwrap();

        assert_eq!(config.orchestrator_url, "http://orchestrator:7000");
        assert_eq!(config.poll_interval, Duration::from_millis(200));
        assert_eq!(config.frame_interval, Duration::from_millis(33));
        assert_eq!(config.signals_addr.port(), 9000);
    }

    #[test]
    fn test_bad_values_rejected() {
        assert!(matches!(
            DriverConfig::from_lookup(lookup(&[(ENV_POLL_INTERVAL, "soon")])),
            Err(HoloError::Config(_))
        ));
        assert!(DriverConfig::from_lookup(lookup(&[(ENV_FRAME_INTERVAL, "0s")])).is_err());
        assert!(DriverConfig::from_lookup(lookup(&[(ENV_SIGNALS_ADDR, "nowhere")])).is_err());
    }
}

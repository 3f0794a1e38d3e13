use std::{str::FromStr, time::Duration};

use tracing::warn;

use crate::shared::eta::ASSUMED_AVERAGE_SPEED_KMH;

pub const API_URL_VAR: &str = "BUSTRACK_API_URL";
pub const POLL_INTERVAL_VAR: &str = "BUSTRACK_POLL_INTERVAL_MS";
pub const TOUCH_RELEASE_VAR: &str = "BUSTRACK_TOUCH_RELEASE_MS";
pub const ASSUMED_SPEED_VAR: &str = "BUSTRACK_ASSUMED_SPEED_KMH";
pub const REQUEST_TIMEOUT_VAR: &str = "BUSTRACK_REQUEST_TIMEOUT_MS";

const MIN_POLL_INTERVAL: Duration = Duration::from_millis(10);

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Base url of the backend serving `/api/v1/user/bus/{id}`.
    pub api_base_url: String,
    pub poll_interval: Duration,
    /// How long the host keeps scrolling disabled after the map reports a touch end.
    pub touch_release_delay: Duration,
    pub assumed_speed_kmh: f64,
    pub request_timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:3000".into(),
            poll_interval: Duration::from_secs(4),
            touch_release_delay: Duration::from_millis(100),
            assumed_speed_kmh: ASSUMED_AVERAGE_SPEED_KMH,
            request_timeout: Duration::from_secs(10),
        }
    }
}

impl Config {
    /// Defaults overridden by the `BUSTRACK_*` environment variables.
    pub fn from_env() -> Self {
        Self::default().with_overrides(|key| std::env::var(key).ok())
    }

    /// Applies overrides from `lookup`. Values that fail to parse are skipped.
    pub fn with_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(API_URL_VAR).filter(|url| !url.trim().is_empty()) {
            self.api_base_url = url.trim().trim_end_matches('/').to_string();
        }
        if let Some(ms) = parse_override::<u64, _>(&lookup, POLL_INTERVAL_VAR) {
            self = self.with_poll_interval(Duration::from_millis(ms));
        }
        if let Some(ms) = parse_override::<u64, _>(&lookup, TOUCH_RELEASE_VAR) {
            self.touch_release_delay = Duration::from_millis(ms);
        }
        if let Some(speed) = parse_override::<f64, _>(&lookup, ASSUMED_SPEED_VAR) {
            self.assumed_speed_kmh = speed;
        }
        if let Some(ms) = parse_override::<u64, _>(&lookup, REQUEST_TIMEOUT_VAR) {
            self.request_timeout = Duration::from_millis(ms);
        }
        self
    }

    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval.max(MIN_POLL_INTERVAL);
        self
    }

    pub fn with_touch_release_delay(mut self, delay: Duration) -> Self {
        self.touch_release_delay = delay;
        self
    }

    pub fn with_assumed_speed(mut self, speed_kmh: f64) -> Self {
        self.assumed_speed_kmh = speed_kmh;
        self
    }
}

fn parse_override<T, F>(lookup: &F, key: &str) -> Option<T>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    let raw = lookup(key)?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!("Ignoring {key}={raw:?}, value does not parse");
            None
        }
    }
}

#[test]
fn overrides_replace_defaults() {
    let config = Config::default().with_overrides(|key| match key {
        API_URL_VAR => Some("https://api.example.com/".into()),
        POLL_INTERVAL_VAR => Some("2500".into()),
        TOUCH_RELEASE_VAR => Some("250".into()),
        _ => None,
    });
    assert_eq!(config.api_base_url, "https://api.example.com");
    assert_eq!(config.poll_interval, Duration::from_millis(2500));
    assert_eq!(config.touch_release_delay, Duration::from_millis(250));
    assert_eq!(config.assumed_speed_kmh, ASSUMED_AVERAGE_SPEED_KMH);
}

#[test]
fn unparsable_overrides_are_ignored() {
    let config = Config::default().with_overrides(|key| match key {
        ASSUMED_SPEED_VAR => Some("fast".into()),
        POLL_INTERVAL_VAR => Some("0".into()),
        _ => None,
    });
    assert_eq!(config.assumed_speed_kmh, ASSUMED_AVERAGE_SPEED_KMH);
    assert_eq!(config.poll_interval, MIN_POLL_INTERVAL);
}

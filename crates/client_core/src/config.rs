use std::{collections::HashMap, fs, time::Duration};

use url::Url;

use crate::{
    clock::{clock_url, ReconnectPolicy, MIN_RECONNECT_DELAY},
    error::TransportError,
    store::DEFAULT_REQUEST_TIMEOUT,
};

pub const CLIENT_CONFIG_FILE: &str = "client.toml";
const DEFAULT_BASE_URL: &str = "http://localhost:3001";
const DEFAULT_CLOCK_PATH: &str = "/ws";
const DEFAULT_RECONNECT_INITIAL: Duration = Duration::from_millis(500);
const DEFAULT_RECONNECT_MAX: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientSettings {
    pub base_url: String,
    pub clock_path: String,
    pub request_timeout: Duration,
    pub reconnect: ReconnectPolicy,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.into(),
            clock_path: DEFAULT_CLOCK_PATH.into(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            reconnect: ReconnectPolicy::Never,
        }
    }
}

impl ClientSettings {
    pub fn clock_url(&self) -> Result<Url, TransportError> {
        clock_url(&self.base_url, &self.clock_path)
    }

    /// Turns on backoff reconnects, keeping configured delays if any.
    pub fn enable_reconnect(&mut self) {
        if self.reconnect == ReconnectPolicy::Never {
            self.reconnect = ReconnectPolicy::Backoff {
                initial: DEFAULT_RECONNECT_INITIAL,
                max: DEFAULT_RECONNECT_MAX,
            };
        }
    }
}

/// Defaults, then `client.toml`, then environment variables.
pub fn load_settings() -> ClientSettings {
    let mut settings = ClientSettings::default();

    if let Ok(raw) = fs::read_to_string(CLIENT_CONFIG_FILE) {
        apply_file_settings(&mut settings, &raw);
    }
    apply_env_overrides(&mut settings, |key| std::env::var(key).ok());

    settings.base_url = normalize_base_url(&settings.base_url);
    settings
}

pub fn apply_file_settings(settings: &mut ClientSettings, raw: &str) {
    let Ok(file_cfg) = toml::from_str::<HashMap<String, toml::Value>>(raw) else {
        tracing::warn!(file = CLIENT_CONFIG_FILE, "ignoring unparsable client settings");
        return;
    };
    let get = |key: &str| file_cfg.get(key).and_then(value_text);

    if let Some(v) = get("base_url") {
        settings.base_url = v;
    }
    if let Some(v) = get("clock_path") {
        settings.clock_path = v;
    }
    if let Some(timeout) = get("request_timeout_secs").and_then(|v| parse_timeout(&v)) {
        settings.request_timeout = timeout;
    }
    apply_reconnect(
        settings,
        get("reconnect_initial_ms"),
        get("reconnect_max_ms"),
    );
}

pub fn apply_env_overrides<F>(settings: &mut ClientSettings, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(v) = lookup("TASKSYNC_BASE_URL") {
        settings.base_url = v;
    }
    if let Some(v) = lookup("APP__BASE_URL") {
        settings.base_url = v;
    }
    if let Some(v) = lookup("APP__CLOCK_PATH") {
        settings.clock_path = v;
    }
    if let Some(timeout) = lookup("APP__REQUEST_TIMEOUT_SECS").and_then(|v| parse_timeout(&v)) {
        settings.request_timeout = timeout;
    }
    apply_reconnect(
        settings,
        lookup("APP__RECONNECT_INITIAL_MS"),
        lookup("APP__RECONNECT_MAX_MS"),
    );
}

fn apply_reconnect(settings: &mut ClientSettings, initial: Option<String>, max: Option<String>) {
    let initial = initial.and_then(|v| parse_delay(&v));
    let max = max.and_then(|v| parse_delay(&v));
    if initial.is_none() && max.is_none() {
        return;
    }

    let (current_initial, current_max) = match settings.reconnect {
        ReconnectPolicy::Backoff { initial, max } => (initial, max),
        ReconnectPolicy::Never => (DEFAULT_RECONNECT_INITIAL, DEFAULT_RECONNECT_MAX),
    };
    settings.reconnect = ReconnectPolicy::Backoff {
        initial: initial.unwrap_or(current_initial),
        max: max.unwrap_or(current_max),
    };
}

fn parse_delay(raw: &str) -> Option<Duration> {
    let ms = raw.trim().parse::<u64>().ok()?;
    Some(Duration::from_millis(ms).max(MIN_RECONNECT_DELAY))
}

/// A zero timeout is ignored.
fn parse_timeout(raw: &str) -> Option<Duration> {
    match raw.trim().parse::<u64>() {
        Ok(secs) if secs > 0 => Some(Duration::from_secs(secs)),
        _ => None,
    }
}

fn value_text(value: &toml::Value) -> Option<String> {
    match value {
        toml::Value::String(s) => Some(s.clone()),
        toml::Value::Integer(i) => Some(i.to_string()),
        _ => None,
    }
}

pub fn normalize_base_url(raw: &str) -> String {
    let raw = raw.trim().trim_end_matches('/');
    if raw.is_empty() {
        return DEFAULT_BASE_URL.to_string();
    }
    if raw.contains("://") {
        raw.to_string()
    } else {
        format!("http://{raw}")
    }
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;

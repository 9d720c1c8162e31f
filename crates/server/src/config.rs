use std::{collections::HashMap, fs, time::Duration};

pub const SERVER_CONFIG_FILE: &str = "server.toml";
const MIN_CLOCK_INTERVAL: Duration = Duration::from_millis(10);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub server_bind: String,
    pub clock_interval: Duration,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server_bind: "0.0.0.0:3001".into(),
            clock_interval: Duration::from_secs(1),
        }
    }
}

pub fn load_settings() -> Settings {
    let mut settings = Settings::default();

    if let Ok(raw) = fs::read_to_string(SERVER_CONFIG_FILE) {
        apply_file_settings(&mut settings, &raw);
    }
    apply_env_overrides(&mut settings, |key| std::env::var(key).ok());

    settings
}

pub fn apply_file_settings(settings: &mut Settings, raw: &str) {
    let Ok(file_cfg) = toml::from_str::<HashMap<String, toml::Value>>(raw) else {
        tracing::warn!(file = SERVER_CONFIG_FILE, "ignoring unparsable server settings");
        return;
    };

    if let Some(toml::Value::String(v)) = file_cfg.get("bind_addr") {
        settings.server_bind = v.clone();
    }
    match file_cfg.get("clock_interval_ms") {
        Some(toml::Value::Integer(ms)) => set_clock_interval(settings, &ms.to_string()),
        Some(toml::Value::String(ms)) => set_clock_interval(settings, ms),
        _ => {}
    }
}

pub fn apply_env_overrides<F>(settings: &mut Settings, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(v) = lookup("SERVER_BIND") {
        settings.server_bind = v;
    }
    if let Some(v) = lookup("APP__BIND_ADDR") {
        settings.server_bind = v;
    }
    if let Some(v) = lookup("APP__CLOCK_INTERVAL_MS") {
        set_clock_interval(settings, &v);
    }
}

fn set_clock_interval(settings: &mut Settings, raw: &str) {
    if let Ok(ms) = raw.trim().parse::<u64>() {
        settings.clock_interval = Duration::from_millis(ms).max(MIN_CLOCK_INTERVAL);
    }
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;

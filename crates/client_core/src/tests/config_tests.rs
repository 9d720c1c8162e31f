use super::*;

fn env(pairs: &'static [(&'static str, &'static str)]) -> impl Fn(&str) -> Option<String> {
    move |key| {
        pairs
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.to_string())
    }
}

#[test]
fn defaults_point_at_local_service() {
    let settings = ClientSettings::default();
    assert_eq!(settings.base_url, "http://localhost:3001");
    assert_eq!(settings.clock_path, "/ws");
    assert_eq!(settings.request_timeout, DEFAULT_REQUEST_TIMEOUT);
    assert_eq!(settings.reconnect, ReconnectPolicy::Never);
    assert_eq!(
        settings.clock_url().expect("clock url").as_str(),
        "ws://localhost:3001/ws"
    );
}

#[test]
fn file_settings_accept_strings_and_integers() {
    let mut settings = ClientSettings::default();
    apply_file_settings(
        &mut settings,
        r#"
            base_url = "https://tasks.example.com"
            clock_path = "/clock"
            request_timeout_secs = 3
            reconnect_initial_ms = "250"
        "#,
    );

    assert_eq!(settings.base_url, "https://tasks.example.com");
    assert_eq!(settings.clock_path, "/clock");
    assert_eq!(settings.request_timeout, Duration::from_secs(3));
    assert_eq!(
        settings.reconnect,
        ReconnectPolicy::Backoff {
            initial: Duration::from_millis(250),
            max: DEFAULT_RECONNECT_MAX,
        }
    );
    assert_eq!(
        settings.clock_url().expect("clock url").as_str(),
        "wss://tasks.example.com/clock"
    );
}

#[test]
fn unparsable_file_leaves_settings_alone() {
    let mut settings = ClientSettings::default();
    apply_file_settings(&mut settings, "base_url = [unterminated");
    assert_eq!(settings, ClientSettings::default());
}

#[test]
fn app_prefixed_env_wins_over_legacy_name() {
    let mut settings = ClientSettings::default();
    apply_env_overrides(
        &mut settings,
        env(&[
            ("TASKSYNC_BASE_URL", "http://legacy:3001"),
            ("APP__BASE_URL", "http://preferred:3001"),
            ("APP__REQUEST_TIMEOUT_SECS", "not-a-number"),
        ]),
    );
    assert_eq!(settings.base_url, "http://preferred:3001");
    assert_eq!(settings.request_timeout, DEFAULT_REQUEST_TIMEOUT);

    let mut settings = ClientSettings::default();
    apply_env_overrides(&mut settings, env(&[("TASKSYNC_BASE_URL", "http://legacy:3001")]));
    assert_eq!(settings.base_url, "http://legacy:3001");
}

#[test]
fn env_reconnect_delays_refine_file_values() {
    let mut settings = ClientSettings::default();
    apply_file_settings(&mut settings, "reconnect_initial_ms = 100\nreconnect_max_ms = 1000");
    apply_env_overrides(&mut settings, env(&[("APP__RECONNECT_MAX_MS", "5000")]));

    assert_eq!(
        settings.reconnect,
        ReconnectPolicy::Backoff {
            initial: Duration::from_millis(100),
            max: Duration::from_millis(5000),
        }
    );
}

#[test]
fn enable_reconnect_keeps_configured_delays() {
    let mut settings = ClientSettings::default();
    settings.enable_reconnect();
    assert_eq!(
        settings.reconnect,
        ReconnectPolicy::Backoff {
            initial: DEFAULT_RECONNECT_INITIAL,
            max: DEFAULT_RECONNECT_MAX,
        }
    );

    let custom = ReconnectPolicy::Backoff {
        initial: Duration::from_millis(5),
        max: Duration::from_millis(50),
    };
    settings.reconnect = custom;
    settings.enable_reconnect();
    assert_eq!(settings.reconnect, custom);
}

#[test]
fn base_urls_are_normalized() {
    assert_eq!(normalize_base_url("  http://localhost:3001/ "), "http://localhost:3001");
    assert_eq!(normalize_base_url("tasks.local:8080"), "http://tasks.local:8080");
    assert_eq!(normalize_base_url("https://tasks.example.com//"), "https://tasks.example.com");
    assert_eq!(normalize_base_url("   "), "http://localhost:3001");
}

#[test]
fn zero_request_timeout_is_ignored() {
    let mut settings = ClientSettings::default();
    apply_file_settings(&mut settings, "request_timeout_secs = 0");
    assert_eq!(settings.request_timeout, DEFAULT_REQUEST_TIMEOUT);

    apply_env_overrides(&mut settings, env(&[("APP__REQUEST_TIMEOUT_SECS", "0")]));
    assert_eq!(settings.request_timeout, DEFAULT_REQUEST_TIMEOUT);

    apply_env_overrides(&mut settings, env(&[("APP__REQUEST_TIMEOUT_SECS", "4")]));
    assert_eq!(settings.request_timeout, Duration::from_secs(4));
}

#[test]
fn zero_reconnect_delays_are_raised_to_the_floor() {
    let mut settings = ClientSettings::default();
    apply_file_settings(&mut settings, "reconnect_initial_ms = 0");
    assert_eq!(
        settings.reconnect,
        ReconnectPolicy::Backoff {
            initial: MIN_RECONNECT_DELAY,
            max: DEFAULT_RECONNECT_MAX,
        }
    );

    let mut settings = ClientSettings::default();
    apply_env_overrides(
        &mut settings,
        env(&[("APP__RECONNECT_INITIAL_MS", "0"), ("APP__RECONNECT_MAX_MS", "0")]),
    );
    assert_eq!(
        settings.reconnect,
        ReconnectPolicy::Backoff {
            initial: MIN_RECONNECT_DELAY,
            max: MIN_RECONNECT_DELAY,
        }
    );
}

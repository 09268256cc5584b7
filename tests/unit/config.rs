//! Unit tests for environment configuration

use sigmapips::config::{Config, DEFAULT_PORT, DEFAULT_PREFERENCES_TABLE};
use sigmapips::logging::LogFormat;
use sigmapips::Error;
use std::collections::HashMap;
use std::time::Duration;
use tokio_test::{assert_err, assert_ok};

fn base_env() -> HashMap<&'static str, String> {
    HashMap::from([
        ("TELEGRAM_BOT_TOKEN", "123:abc".to_string()),
        ("SUPABASE_URL", "https://db.example.supabase.co/".to_string()),
        ("SUPABASE_KEY", "service-key".to_string()),
        ("SUBSCRIBER_MATCHER_URL", "http://matcher:8000".to_string()),
        ("CALENDAR_SERVICE_URL", "http://calendar:8001/".to_string()),
    ])
}

fn load(env: &HashMap<&'static str, String>) -> sigmapips::Result<Config> {
    Config::from_lookup(|name| env.get(name).cloned())
}

#[test]
fn loads_required_values_with_defaults() {
    let config = assert_ok!(load(&base_env()));

    assert_eq!(config.bot_token, "123:abc");
    assert_eq!(config.supabase_url, "https://db.example.supabase.co");
    assert_eq!(config.calendar_url, "http://calendar:8001");
    assert_eq!(config.matcher_url, "http://matcher:8000");
    assert_eq!(config.preferences_table, DEFAULT_PREFERENCES_TABLE);
    assert_eq!(config.port, DEFAULT_PORT);
    assert_eq!(config.redis_url, "redis://redis:6379/");
    assert_eq!(config.http_timeout, Duration::from_secs(10));
    assert_eq!(config.poll_timeout_secs, 60);
    assert_eq!(config.restart_backoff, Duration::from_secs(5));
}

#[test]
fn each_missing_credential_is_reported_by_name() {
    for name in [
        "TELEGRAM_BOT_TOKEN",
        "SUPABASE_URL",
        "SUPABASE_KEY",
        "SUBSCRIBER_MATCHER_URL",
        "CALENDAR_SERVICE_URL",
    ] {
        let mut env = base_env();
        env.remove(name);
        let err = assert_err!(load(&env));
        assert!(matches!(err, Error::ConfigMissing(missing) if missing == name));
    }
}

#[test]
fn blank_value_counts_as_missing() {
    let mut env = base_env();
    env.insert("SUPABASE_KEY", "   ".to_string());
    let err = assert_err!(load(&env));
    assert!(matches!(err, Error::ConfigMissing("SUPABASE_KEY")));
}

#[test]
fn missing_credential_wins_over_invalid_optional() {
    let mut env = base_env();
    env.remove("TELEGRAM_BOT_TOKEN");
    env.insert("PORT", "not-a-port".to_string());
    let err = assert_err!(load(&env));
    assert!(matches!(err, Error::ConfigMissing("TELEGRAM_BOT_TOKEN")));
}

#[test]
fn invalid_optional_value_is_rejected() {
    let mut env = base_env();
    env.insert("PORT", "not-a-port".to_string());
    let err = assert_err!(load(&env));
    assert!(matches!(err, Error::ConfigInvalid { name: "PORT", .. }));
}

#[test]
fn redis_url_from_host_and_port() {
    let mut env = base_env();
    env.insert("REDIS_HOST", "cache.internal".to_string());
    env.insert("REDIS_PORT", "6380".to_string());
    let config = assert_ok!(load(&env));
    assert_eq!(config.redis_url, "redis://cache.internal:6380/");

    env.insert("REDIS_URL", "redis://override:1/0".to_string());
    let config = assert_ok!(load(&env));
    assert_eq!(config.redis_url, "redis://override:1/0");
}

#[test]
fn optional_overrides_are_applied() {
    let mut env = base_env();
    env.insert("PORT", "8080".to_string());
    env.insert("PREFERENCES_TABLE", "prefs_staging".to_string());
    env.insert("RESTART_BACKOFF_SECS", "1".to_string());
    let config = assert_ok!(load(&env));
    assert_eq!(config.port, 8080);
    assert_eq!(config.preferences_table, "prefs_staging");
    assert_eq!(config.restart_backoff, Duration::from_secs(1));
}

#[test]
fn debug_output_hides_secrets() {
    let config = assert_ok!(load(&base_env()));
    let rendered = format!("{:?}", config);
    assert!(!rendered.contains("123:abc"));
    assert!(!rendered.contains("service-key"));
    assert!(rendered.contains("matcher:8000"));
}

#[test]
fn log_format_follows_environment() {
    assert_eq!(LogFormat::for_environment("production"), LogFormat::Json);
    assert_eq!(LogFormat::for_environment("prod"), LogFormat::Json);
    assert_eq!(LogFormat::for_environment("development"), LogFormat::Pretty);
    assert_eq!(LogFormat::for_environment("staging"), LogFormat::Pretty);
}

//! Environment-driven service configuration

use crate::error::{Error, Result};
use std::env;
use std::time::Duration;

pub const DEFAULT_PORT: u16 = 5000;
pub const DEFAULT_PREFERENCES_TABLE: &str = "subscriber_preferences";

const REQUIRED_VARS: [&str; 5] = [
    "TELEGRAM_BOT_TOKEN",
    "SUPABASE_URL",
    "SUPABASE_KEY",
    "SUBSCRIBER_MATCHER_URL",
    "CALENDAR_SERVICE_URL",
];

#[derive(Clone)]
pub struct Config {
    pub bot_token: String,
    pub supabase_url: String,
    pub supabase_key: String,
    pub preferences_table: String,
    pub matcher_url: String,
    pub calendar_url: String,
    pub redis_url: String,
    pub port: u16,
    pub http_timeout: Duration,
    pub poll_timeout_secs: u32,
    pub restart_backoff: Duration,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("supabase_url", &self.supabase_url)
            .field("preferences_table", &self.preferences_table)
            .field("matcher_url", &self.matcher_url)
            .field("calendar_url", &self.calendar_url)
            .field("redis_url", &self.redis_url)
            .field("port", &self.port)
            .field("http_timeout", &self.http_timeout)
            .field("poll_timeout_secs", &self.poll_timeout_secs)
            .field("restart_backoff", &self.restart_backoff)
            .finish_non_exhaustive()
    }
}

impl Config {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// Every required variable is checked before anything else is parsed, so a
    /// missing credential is always the reported failure.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        for name in REQUIRED_VARS {
            if get(name).is_none() {
                return Err(Error::ConfigMissing(name));
            }
        }
        let required = |name: &'static str| get(name).ok_or(Error::ConfigMissing(name));

        let redis_url = match get("REDIS_URL") {
            Some(url) => url,
            None => {
                let host = get("REDIS_HOST").unwrap_or_else(|| "redis".to_string());
                let port = get("REDIS_PORT").unwrap_or_else(|| "6379".to_string());
                format!("redis://{}:{}/", host, port)
            }
        };

        Ok(Self {
            bot_token: required("TELEGRAM_BOT_TOKEN")?,
            supabase_url: trim_base_url(required("SUPABASE_URL")?),
            supabase_key: required("SUPABASE_KEY")?,
            preferences_table: get("PREFERENCES_TABLE")
                .unwrap_or_else(|| DEFAULT_PREFERENCES_TABLE.to_string()),
            matcher_url: trim_base_url(required("SUBSCRIBER_MATCHER_URL")?),
            calendar_url: trim_base_url(required("CALENDAR_SERVICE_URL")?),
            redis_url,
            port: parse_or("PORT", get("PORT"), DEFAULT_PORT)?,
            http_timeout: Duration::from_secs(parse_or("HTTP_TIMEOUT_SECS", get("HTTP_TIMEOUT_SECS"), 10)?),
            poll_timeout_secs: parse_or("POLL_TIMEOUT_SECS", get("POLL_TIMEOUT_SECS"), 60)?,
            restart_backoff: Duration::from_secs(parse_or(
                "RESTART_BACKOFF_SECS",
                get("RESTART_BACKOFF_SECS"),
                5,
            )?),
        })
    }
}

fn parse_or<T>(name: &'static str, raw: Option<String>, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match raw {
        Some(value) => value.parse().map_err(|e: T::Err| Error::ConfigInvalid {
            name,
            reason: e.to_string(),
        }),
        None => Ok(default),
    }
}

fn trim_base_url(url: String) -> String {
    url.trim_end_matches('/').to_string()
}

/// Deployment environment, used to pick the log format.
pub fn get_environment() -> String {
    env::var("APP_ENV").unwrap_or_else(|_| "development".to_string())
}

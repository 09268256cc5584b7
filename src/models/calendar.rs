//! Economic calendar events served by the calendar service

use super::de;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CalendarEvent {
    #[serde(deserialize_with = "de::string_or_number")]
    pub time: String,
    pub country: String,
    pub event: String,
    /// Severity, rendered as that many red markers.
    #[serde(default, deserialize_with = "impact_level")]
    pub impact: u8,
    #[serde(default, deserialize_with = "de::opt_string_or_number")]
    pub forecast: Option<String>,
    #[serde(default, deserialize_with = "de::opt_string_or_number")]
    pub previous: Option<String>,
}

/// Accepts a small integer or its string form. Anything else fails the whole
/// response so a changed upstream schema surfaces as a calendar error.
fn impact_level<'de, D>(deserializer: D) -> Result<u8, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Number(n) => n
            .as_u64()
            .and_then(|level| u8::try_from(level).ok())
            .ok_or_else(|| D::Error::custom(format!("impact out of range: {}", n))),
        Value::String(s) => s
            .trim()
            .parse::<u8>()
            .map_err(|_| D::Error::custom(format!("impact is not a level: {:?}", s))),
        other => Err(D::Error::custom(format!("impact is not a level: {}", other))),
    }
}

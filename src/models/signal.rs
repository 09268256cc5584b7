//! Inbound trading signals and fan-out results

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Number, Value};
use std::fmt;

/// Price-like signal field. Upstream alert senders emit both `"1.05"` and `1.05`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SignalValue {
    Text(String),
    Number(Number),
}

impl fmt::Display for SignalValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(s) => f.write_str(s),
            Self::Number(n) => write!(f, "{}", n),
        }
    }
}

impl From<&str> for SignalValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

/// A trading signal as posted to `/send`.
///
/// Unknown fields are kept in `extra` so the matcher receives the body it
/// was sent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Signal {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub symbol: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<SignalValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stop_loss: Option<SignalValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub take_profit: Option<SignalValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interval: Option<SignalValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ai_analysis: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Telegram chat identifier of a subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChatTarget(pub i64);

impl fmt::Display for ChatTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One entry of the matcher's `matched_subscribers` list.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MatchedSubscriber {
    #[serde(default, deserialize_with = "chat_target")]
    pub chat_id: Option<ChatTarget>,
    #[serde(default)]
    pub name: Option<String>,
}

impl MatchedSubscriber {
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("Unknown")
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MatchResponse {
    #[serde(default)]
    pub matched_subscribers: Vec<MatchedSubscriber>,
}

/// Outcome of one fan-out. `sent_count` only counts confirmed deliveries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DispatchReport {
    pub sent_count: usize,
    pub total_subscribers: usize,
}

fn chat_target<'de, D>(deserializer: D) -> Result<Option<ChatTarget>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Number(n)) => n.as_i64().map(ChatTarget),
        Some(Value::String(s)) => s.trim().parse().ok().map(ChatTarget),
        _ => None,
    })
}

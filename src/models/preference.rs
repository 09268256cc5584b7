//! Stored subscription preferences

use super::de;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Store-assigned preference identifier. Opaque to this service.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PreferenceId(#[serde(deserialize_with = "de::string_or_number")] pub String);

impl PreferenceId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PreferenceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One (user, instrument, timeframe) subscription row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Preference {
    pub id: PreferenceId,
    #[serde(deserialize_with = "de::string_or_number")]
    pub user_id: String,
    pub market: String,
    pub instrument: String,
    pub timeframe: String,
    #[serde(deserialize_with = "de::utc_timestamp")]
    pub created_at: DateTime<Utc>,
}

impl Preference {
    pub fn matches(&self, user_id: &str, instrument: &str, timeframe: &str) -> bool {
        self.user_id == user_id && self.instrument == instrument && self.timeframe == timeframe
    }
}

/// Insert payload; the store assigns the id.
#[derive(Debug, Clone, Serialize)]
pub struct NewPreference {
    pub user_id: String,
    pub market: String,
    pub instrument: String,
    pub timeframe: String,
    pub created_at: DateTime<Utc>,
}

impl NewPreference {
    pub fn new(user_id: &str, market: &str, instrument: &str, timeframe: &str) -> Self {
        Self {
            user_id: user_id.to_string(),
            market: market.to_string(),
            instrument: instrument.to_string(),
            timeframe: timeframe.to_string(),
            created_at: Utc::now(),
        }
    }
}

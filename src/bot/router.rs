//! Callback token codec and routing
//!
//! Tokens are `_`-delimited, positional and self-describing: nothing about a
//! conversation is kept server-side, so each button carries everything the
//! next step needs.
//!
//! | token                 | action                |
//! |-----------------------|-----------------------|
//! | `market_<m>`          | show instruments of m |
//! | `instrument_<i>`      | show timeframes for i |
//! | `timeframe_<t>_<i>`   | save (i, t)           |
//! | `delete_<id>`         | delete preference id  |
//! | `back`                | root menu             |
//! | `refresh_calendar`    | reload calendar view  |
//! | `view_prefs`          | preference list       |

use super::conversation::{Conversation, RenderedReply, UserContext, INVALID_REQUEST};
use crate::error::{Error, Result};
use crate::models::PreferenceId;
use std::sync::Arc;
use tracing::warn;

pub const DELIMITER: char = '_';

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodedAction {
    Market { market: String },
    Instrument { instrument: String },
    Timeframe { timeframe: String, instrument: String },
    Delete { id: PreferenceId },
    Back,
    RefreshCalendar,
    ViewPreferences,
}

impl DecodedAction {
    pub fn encode(&self) -> String {
        match self {
            Self::Market { market } => format!("market_{}", market),
            Self::Instrument { instrument } => format!("instrument_{}", instrument),
            Self::Timeframe {
                timeframe,
                instrument,
            } => format!("timeframe_{}_{}", timeframe, instrument),
            Self::Delete { id } => format!("delete_{}", id),
            Self::Back => "back".to_string(),
            Self::RefreshCalendar => "refresh_calendar".to_string(),
            Self::ViewPreferences => "view_prefs".to_string(),
        }
    }
}

fn is_field(value: &str) -> bool {
    !value.is_empty() && value.chars().all(|c| c.is_ascii_alphanumeric())
}

fn is_id(value: &str) -> bool {
    !value.is_empty() && value.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
}

/// Decode a token, checking the field count and alphabet for its step tag.
pub fn decode(token: &str) -> Result<DecodedAction> {
    let malformed = || Error::Malformed(token.to_string());
    let parts: Vec<&str> = token.split(DELIMITER).collect();

    let action = match parts.as_slice() {
        ["market", market] if is_field(market) => DecodedAction::Market {
            market: market.to_string(),
        },
        ["instrument", instrument] if is_field(instrument) => DecodedAction::Instrument {
            instrument: instrument.to_string(),
        },
        ["timeframe", timeframe, instrument] if is_field(timeframe) && is_field(instrument) => {
            DecodedAction::Timeframe {
                timeframe: timeframe.to_string(),
                instrument: instrument.to_string(),
            }
        }
        ["delete", id] if is_id(id) => DecodedAction::Delete {
            id: PreferenceId::new(*id),
        },
        ["back"] => DecodedAction::Back,
        ["refresh", "calendar"] => DecodedAction::RefreshCalendar,
        ["view", "prefs"] => DecodedAction::ViewPreferences,
        _ => return Err(malformed()),
    };
    Ok(action)
}

/// Single entry point for button presses.
pub struct CallbackRouter {
    conversation: Arc<Conversation>,
}

impl CallbackRouter {
    pub fn new(conversation: Arc<Conversation>) -> Self {
        Self { conversation }
    }

    pub async fn route(&self, token: &str, user: &UserContext) -> RenderedReply {
        match decode(token) {
            Ok(action) => self.conversation.dispatch(action, user).await,
            Err(e) => {
                warn!(user_id = %user.user_id, error = %e, "Rejected callback token");
                RenderedReply::notice(INVALID_REQUEST)
            }
        }
    }
}

//! Preference conversation state machine
//!
//! `RootMenu → MarketSelected → InstrumentSelected → TimeframeConfirmed`, plus
//! the delete, back, preference-list and calendar side flows. Every
//! transition is computed from the decoded token and the store's current
//! contents alone. Failures never escape: they become a notice and the
//! displayed message stays as it was.

use super::router::DecodedAction;
use super::views::{self, View};
use crate::catalog::MarketCatalog;
use crate::error::Error;
use crate::models::{ChatTarget, PreferenceId};
use crate::services::CalendarSource;
use crate::store::PreferenceStore;
use std::sync::Arc;
use tracing::{error, info, warn};

pub const INVALID_REQUEST: &str = "Invalid request";
pub const INVALID_INSTRUMENT: &str = "Invalid instrument";
pub const ALREADY_SUBSCRIBED: &str = "You already have this combination!";
pub const SAVE_FAILED: &str = "Failed to save preference";
pub const LIST_FAILED: &str = "❌ Could not load your preferences";
pub const DELETED: &str = "✅ Preference deleted!";
pub const DELETE_FAILED: &str = "❌ Could not delete preference";
pub const DELETE_ERROR: &str = "❌ Error occurred";
pub const CALENDAR_REFRESHED: &str = "Calendar refreshed!";
pub const CALENDAR_EMPTY: &str = "No calendar events found";
pub const CALENDAR_FAILED: &str = "❌ Error refreshing calendar";

pub const WELCOME_HEADING: &str = "🌟 Welcome to SigmaPips!\n\nSelect a market to get started:";
pub const ROOT_HEADING: &str = "🌟 Select a market:";
pub const EMPTIED_HEADING: &str = "🌟 No preferences left. Select a market to add new preferences:";
pub const NO_PREFERENCES_HEADING: &str = "🌟 No preferences yet. Select a market to get started:";

/// Who pressed the button. The chat id doubles as the user identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserContext {
    pub user_id: String,
    pub chat: ChatTarget,
}

impl UserContext {
    pub fn from_chat(chat: ChatTarget) -> Self {
        Self {
            user_id: chat.to_string(),
            chat,
        }
    }
}

/// What to do with the message the user interacted with.
///
/// `view` replaces the message content; `notice` is a short toast. A reply
/// with no view leaves the displayed state untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderedReply {
    pub view: Option<View>,
    pub notice: Option<String>,
}

impl RenderedReply {
    pub fn view(view: View) -> Self {
        Self {
            view: Some(view),
            notice: None,
        }
    }

    pub fn notice(text: &str) -> Self {
        Self {
            view: None,
            notice: Some(text.to_string()),
        }
    }

    pub fn with_notice(mut self, text: &str) -> Self {
        self.notice = Some(text.to_string());
        self
    }
}

pub struct Conversation {
    catalog: Arc<MarketCatalog>,
    store: Arc<dyn PreferenceStore>,
    calendar: Arc<dyn CalendarSource>,
}

impl Conversation {
    pub fn new(
        catalog: Arc<MarketCatalog>,
        store: Arc<dyn PreferenceStore>,
        calendar: Arc<dyn CalendarSource>,
    ) -> Self {
        Self {
            catalog,
            store,
            calendar,
        }
    }

    pub fn catalog(&self) -> &MarketCatalog {
        &self.catalog
    }

    /// One handler per token shape.
    pub async fn dispatch(&self, action: DecodedAction, user: &UserContext) -> RenderedReply {
        match action {
            DecodedAction::Market { market } => self.select_market(&market),
            DecodedAction::Instrument { instrument } => self.select_instrument(&instrument),
            DecodedAction::Timeframe {
                timeframe,
                instrument,
            } => self.select_timeframe(user, &timeframe, &instrument).await,
            DecodedAction::Delete { id } => self.delete_preference(user, &id).await,
            DecodedAction::Back => RenderedReply::view(self.root_menu(ROOT_HEADING)),
            DecodedAction::RefreshCalendar => self.calendar_view().await,
            DecodedAction::ViewPreferences => self.preferences_view(user).await,
        }
    }

    pub fn root_menu(&self, heading: &str) -> View {
        views::root_menu(&self.catalog, heading)
    }

    fn select_market(&self, market: &str) -> RenderedReply {
        match self.catalog.list_instruments(market) {
            Ok(instruments) => RenderedReply::view(views::instrument_menu(market, instruments)),
            Err(e) => {
                warn!(market, error = %e, "Market selection for unknown market");
                RenderedReply::notice(INVALID_REQUEST)
            }
        }
    }

    fn select_instrument(&self, instrument: &str) -> RenderedReply {
        RenderedReply::view(views::timeframe_menu(
            instrument,
            self.catalog.list_timeframes(),
        ))
    }

    async fn select_timeframe(
        &self,
        user: &UserContext,
        timeframe: &str,
        instrument: &str,
    ) -> RenderedReply {
        if !self.catalog.is_timeframe(timeframe) {
            warn!(timeframe, "Timeframe selection for unsupported timeframe");
            return RenderedReply::notice(INVALID_REQUEST);
        }
        let Some(market) = self.catalog.market_for(instrument) else {
            error!(instrument, "Could not determine market for instrument");
            return RenderedReply::notice(INVALID_INSTRUMENT);
        };

        info!(
            user_id = %user.user_id,
            market,
            instrument,
            timeframe,
            "Processing timeframe selection"
        );

        // Check-then-act: two simultaneous identical submissions can both pass
        // this check. The store's Conflict response is the only backstop.
        match self.store.exists(&user.user_id, instrument, timeframe).await {
            Ok(false) => {}
            Ok(true) => {
                info!(user_id = %user.user_id, instrument, timeframe, "Combination already exists");
                return RenderedReply::notice(ALREADY_SUBSCRIBED);
            }
            Err(e) => {
                error!(user_id = %user.user_id, error = %e, "Existence check failed, not saving");
                return RenderedReply::notice(SAVE_FAILED);
            }
        }

        match self
            .store
            .create(&user.user_id, market, instrument, timeframe)
            .await
        {
            Ok(_) => {}
            Err(Error::Conflict) => return RenderedReply::notice(ALREADY_SUBSCRIBED),
            Err(e) => {
                error!(user_id = %user.user_id, error = %e, "Failed to save preference");
                return RenderedReply::notice(SAVE_FAILED);
            }
        }

        match self.store.list_for_user(&user.user_id).await {
            Ok(preferences) => RenderedReply::view(views::preference_list(
                &views::saved_heading(instrument, timeframe),
                &preferences,
            )),
            Err(e) => {
                error!(user_id = %user.user_id, error = %e, "Saved preference but could not list");
                RenderedReply::notice("✅ Preference saved!")
            }
        }
    }

    async fn delete_preference(&self, user: &UserContext, id: &PreferenceId) -> RenderedReply {
        match self.store.delete(id, &user.user_id).await {
            Ok(true) => {}
            Ok(false) => {
                info!(user_id = %user.user_id, preference_id = %id, "Nothing deleted");
                return RenderedReply::notice(DELETE_FAILED);
            }
            Err(e) => {
                error!(user_id = %user.user_id, preference_id = %id, error = %e, "Error deleting preference");
                return RenderedReply::notice(DELETE_ERROR);
            }
        }

        match self.store.list_for_user(&user.user_id).await {
            Ok(preferences) if preferences.is_empty() => {
                RenderedReply::view(self.root_menu(EMPTIED_HEADING)).with_notice(DELETED)
            }
            Ok(preferences) => {
                RenderedReply::view(views::preference_list("", &preferences)).with_notice(DELETED)
            }
            Err(e) => {
                error!(user_id = %user.user_id, error = %e, "Deleted preference but could not list");
                RenderedReply::notice(DELETED)
            }
        }
    }

    /// Current list, or the root menu when the user has none.
    pub async fn preferences_view(&self, user: &UserContext) -> RenderedReply {
        match self.store.list_for_user(&user.user_id).await {
            Ok(preferences) if preferences.is_empty() => {
                RenderedReply::view(self.root_menu(NO_PREFERENCES_HEADING))
            }
            Ok(preferences) => RenderedReply::view(views::preference_list("", &preferences)),
            Err(e) => {
                error!(user_id = %user.user_id, error = %e, "Failed to list preferences");
                RenderedReply::notice(LIST_FAILED)
            }
        }
    }

    /// Calendar view with a refresh button that loops back here.
    pub async fn calendar_view(&self) -> RenderedReply {
        match self.calendar.latest_events().await {
            Ok(events) if events.is_empty() => RenderedReply::notice(CALENDAR_EMPTY),
            Ok(events) => RenderedReply::view(views::calendar(&events)).with_notice(CALENDAR_REFRESHED),
            Err(e) => {
                error!(error = %e, "Error refreshing calendar");
                RenderedReply::notice(CALENDAR_FAILED)
            }
        }
    }
}

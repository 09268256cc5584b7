//! Telegram Bot API binding via teloxide

use super::{parse_command, ChatTransport, InboundUpdate, Keyboard, UpdateKind};
use crate::error::{Error, Result};
use crate::models::ChatTarget;
use async_trait::async_trait;
use teloxide::prelude::*;
use teloxide::types::{
    ChatId, InlineKeyboardButton, InlineKeyboardMarkup, MessageId, ParseMode,
    Update, UpdateKind as TelegramUpdateKind,
};
use teloxide::{ApiError, RequestError};
use std::time::Duration;
use tracing::debug;

/// Headroom between the long-poll window and the HTTP client timeout.
pub const POLL_TIMEOUT_GRACE: Duration = Duration::from_secs(10);

pub struct TelegramTransport {
    bot: Bot,
}

/// HTTP timeout for a transport that long-polls for `poll_timeout_secs`.
///
/// Must exceed the poll window, otherwise every idle `getUpdates` is cut off
/// client-side before Telegram answers.
pub fn request_timeout(poll_timeout_secs: u32) -> Duration {
    Duration::from_secs(u64::from(poll_timeout_secs)) + POLL_TIMEOUT_GRACE
}

impl TelegramTransport {
    pub fn new(token: &str, poll_timeout_secs: u32) -> Result<Self> {
        let client = teloxide::net::default_reqwest_settings()
            .timeout(request_timeout(poll_timeout_secs))
            .build()
            .map_err(|e| Error::Transport(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self {
            bot: Bot::with_client(token, client),
        })
    }

    /// Same as [`TelegramTransport::new`] against a different Bot API server.
    pub fn with_api_url(token: &str, api_url: &str, poll_timeout_secs: u32) -> Result<Self> {
        let url = reqwest::Url::parse(api_url)
            .map_err(|e| Error::Transport(format!("invalid Bot API url {:?}: {}", api_url, e)))?;
        let transport = Self::new(token, poll_timeout_secs)?;
        Ok(Self {
            bot: transport.bot.set_api_url(url),
        })
    }
}

fn markup(keyboard: &Keyboard) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(keyboard.rows.iter().map(|row| {
        row.iter()
            .map(|b| InlineKeyboardButton::callback(b.label.clone(), b.token.clone()))
            .collect::<Vec<_>>()
    }))
}

fn normalize(update: Update) -> InboundUpdate {
    let update_id = i64::from(update.id.0);
    let kind = match update.kind {
        TelegramUpdateKind::Message(message) => match message.text().and_then(parse_command) {
            Some(command) => UpdateKind::Command {
                chat: ChatTarget(message.chat.id.0),
                command,
            },
            None => UpdateKind::Ignored,
        },
        TelegramUpdateKind::CallbackQuery(query) => {
            let id = query.id;
            match (query.data, query.message) {
                (Some(data), Some(message)) => UpdateKind::Callback {
                    id,
                    chat: ChatTarget(message.chat().id.0),
                    message_id: message.id().0,
                    data,
                },
                _ => UpdateKind::Ignored,
            }
        }
        _ => UpdateKind::Ignored,
    };
    InboundUpdate { update_id, kind }
}

fn transport_error(operation: &str, err: RequestError) -> Error {
    Error::Transport(format!("{} failed: {}", operation, err))
}

#[async_trait]
impl ChatTransport for TelegramTransport {
    async fn identify(&self) -> Result<String> {
        let me = self
            .bot
            .get_me()
            .await
            .map_err(|e| transport_error("getMe", e))?;
        Ok(me.user.username.clone().unwrap_or_else(|| "unknown".to_string()))
    }

    async fn fetch_updates(&self, offset: i64, timeout_secs: u32) -> Result<Vec<InboundUpdate>> {
        let mut request = self.bot.get_updates().timeout(timeout_secs);
        if offset > 0 {
            let offset = i32::try_from(offset)
                .map_err(|_| Error::Transport(format!("update offset {} out of range", offset)))?;
            request = request.offset(offset);
        }
        let updates = request
            .await
            .map_err(|e| transport_error("getUpdates", e))?;
        Ok(updates.into_iter().map(normalize).collect())
    }

    async fn send_message(
        &self,
        chat: ChatTarget,
        text: &str,
        keyboard: Option<&Keyboard>,
    ) -> Result<()> {
        let mut request = self
            .bot
            .send_message(ChatId(chat.0), text)
            .parse_mode(ParseMode::Html);
        if let Some(keyboard) = keyboard {
            request = request.reply_markup(markup(keyboard));
        }
        request
            .await
            .map_err(|e| transport_error("sendMessage", e))?;
        Ok(())
    }

    async fn edit_message(
        &self,
        chat: ChatTarget,
        message_id: i32,
        text: &str,
        keyboard: Option<&Keyboard>,
    ) -> Result<()> {
        let mut request = self
            .bot
            .edit_message_text(ChatId(chat.0), MessageId(message_id), text)
            .parse_mode(ParseMode::Html);
        if let Some(keyboard) = keyboard {
            request = request.reply_markup(markup(keyboard));
        }
        match request.await {
            Ok(_) => Ok(()),
            // Re-rendering identical content (e.g. a refresh with no new data).
            Err(RequestError::Api(ApiError::MessageNotModified)) => {
                debug!(chat = %chat, message_id, "Message content unchanged");
                Ok(())
            }
            Err(e) => Err(transport_error("editMessageText", e)),
        }
    }

    async fn answer_callback(&self, callback_id: &str, notice: Option<&str>) -> Result<()> {
        let mut request = self.bot.answer_callback_query(callback_id.to_string());
        if let Some(text) = notice {
            request = request.text(text);
        }
        request
            .await
            .map_err(|e| transport_error("answerCallbackQuery", e))?;
        Ok(())
    }
}

//! Chat transport boundary
//!
//! The conversation and fan-out code only speak these types; the Telegram
//! binding lives in [`telegram`], a recording double in [`mock`].

pub mod mock;
pub mod telegram;

use crate::error::Result;
use crate::models::ChatTarget;
use async_trait::async_trait;

pub use mock::MockChatTransport;
pub use telegram::TelegramTransport;

/// Inline button carrying a callback token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Button {
    pub label: String,
    pub token: String,
}

impl Button {
    pub fn new(label: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            token: token.into(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Keyboard {
    pub rows: Vec<Vec<Button>>,
}

impl Keyboard {
    pub fn new(rows: Vec<Vec<Button>>) -> Self {
        Self { rows }
    }

    pub fn buttons(&self) -> impl Iterator<Item = &Button> {
        self.rows.iter().flatten()
    }

    pub fn tokens(&self) -> Vec<&str> {
        self.buttons().map(|b| b.token.as_str()).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateKind {
    /// A `/command` sent in a chat. `command` has no leading slash or bot suffix.
    Command { chat: ChatTarget, command: String },
    /// A button press on one of our messages.
    Callback {
        id: String,
        chat: ChatTarget,
        message_id: i32,
        data: String,
    },
    Ignored,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundUpdate {
    pub update_id: i64,
    pub kind: UpdateKind,
}

#[async_trait]
pub trait ChatTransport: Send + Sync {
    /// Bot username, used to verify the credential on (re)start.
    async fn identify(&self) -> Result<String>;

    /// Long-poll for updates starting at `offset`.
    async fn fetch_updates(&self, offset: i64, timeout_secs: u32) -> Result<Vec<InboundUpdate>>;

    async fn send_message(
        &self,
        chat: ChatTarget,
        text: &str,
        keyboard: Option<&Keyboard>,
    ) -> Result<()>;

    async fn edit_message(
        &self,
        chat: ChatTarget,
        message_id: i32,
        text: &str,
        keyboard: Option<&Keyboard>,
    ) -> Result<()>;

    /// Acknowledge a button press, optionally with a short toast.
    async fn answer_callback(&self, callback_id: &str, notice: Option<&str>) -> Result<()>;
}

/// Extract the command name from `/name@bot args`. `None` for plain text.
pub fn parse_command(text: &str) -> Option<String> {
    let first = text.trim().split_whitespace().next()?;
    let name = first.strip_prefix('/')?;
    let name = name.split('@').next().unwrap_or(name);
    if name.is_empty() {
        None
    } else {
        Some(name.to_ascii_lowercase())
    }
}

/// Escape text interpolated into HTML-formatted messages.
pub fn html_escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

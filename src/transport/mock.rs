//! Recording chat transport for tests
//!
//! Plays back scripted update batches, records every outbound call and can
//! be told to fail delivery to specific chats.

use super::{ChatTransport, InboundUpdate, Keyboard};
use crate::error::{Error, Result};
use crate::models::ChatTarget;
use async_trait::async_trait;
use std::collections::{HashSet, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::RwLock;
use tokio::time::{sleep, Duration};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentMessage {
    pub chat: ChatTarget,
    pub text: String,
    pub keyboard: Option<Keyboard>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditedMessage {
    pub chat: ChatTarget,
    pub message_id: i32,
    pub text: String,
    pub keyboard: Option<Keyboard>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallbackAnswer {
    pub callback_id: String,
    pub notice: Option<String>,
}

#[derive(Default)]
pub struct MockChatTransport {
    script: RwLock<VecDeque<Result<Vec<InboundUpdate>>>>,
    offsets: RwLock<Vec<i64>>,
    sent: RwLock<Vec<SentMessage>>,
    edited: RwLock<Vec<EditedMessage>>,
    answers: RwLock<Vec<CallbackAnswer>>,
    failing_chats: RwLock<HashSet<ChatTarget>>,
    identify_failures: AtomicUsize,
    identify_calls: AtomicUsize,
}

impl MockChatTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue one `fetch_updates` result.
    pub async fn push_updates(&self, batch: Vec<InboundUpdate>) {
        self.script.write().await.push_back(Ok(batch));
    }

    /// Queue one failing `fetch_updates` call.
    pub async fn push_poll_failure(&self, reason: &str) {
        self.script
            .write()
            .await
            .push_back(Err(Error::Transport(reason.to_string())));
    }

    /// Make the next `count` calls to `identify` fail.
    pub fn fail_identify(&self, count: usize) {
        self.identify_failures.store(count, Ordering::SeqCst);
    }

    pub async fn fail_deliveries_to(&self, chat: ChatTarget) {
        self.failing_chats.write().await.insert(chat);
    }

    pub fn identify_calls(&self) -> usize {
        self.identify_calls.load(Ordering::SeqCst)
    }

    pub async fn requested_offsets(&self) -> Vec<i64> {
        self.offsets.read().await.clone()
    }

    pub async fn sent_messages(&self) -> Vec<SentMessage> {
        self.sent.read().await.clone()
    }

    pub async fn edited_messages(&self) -> Vec<EditedMessage> {
        self.edited.read().await.clone()
    }

    pub async fn callback_answers(&self) -> Vec<CallbackAnswer> {
        self.answers.read().await.clone()
    }

    async fn check_chat(&self, chat: ChatTarget) -> Result<()> {
        if self.failing_chats.read().await.contains(&chat) {
            Err(Error::Transport(format!("chat {} unreachable", chat)))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl ChatTransport for MockChatTransport {
    async fn identify(&self) -> Result<String> {
        self.identify_calls.fetch_add(1, Ordering::SeqCst);
        let remaining = self.identify_failures.load(Ordering::SeqCst);
        if remaining > 0 {
            self.identify_failures.store(remaining - 1, Ordering::SeqCst);
            return Err(Error::Transport("getMe rejected".to_string()));
        }
        Ok("mock_bot".to_string())
    }

    async fn fetch_updates(&self, offset: i64, _timeout_secs: u32) -> Result<Vec<InboundUpdate>> {
        self.offsets.write().await.push(offset);
        let next = self.script.write().await.pop_front();
        match next {
            Some(result) => result,
            None => {
                // Idle long-poll.
                sleep(Duration::from_millis(5)).await;
                Ok(Vec::new())
            }
        }
    }

    async fn send_message(
        &self,
        chat: ChatTarget,
        text: &str,
        keyboard: Option<&Keyboard>,
    ) -> Result<()> {
        self.check_chat(chat).await?;
        self.sent.write().await.push(SentMessage {
            chat,
            text: text.to_string(),
            keyboard: keyboard.cloned(),
        });
        Ok(())
    }

    async fn edit_message(
        &self,
        chat: ChatTarget,
        message_id: i32,
        text: &str,
        keyboard: Option<&Keyboard>,
    ) -> Result<()> {
        self.check_chat(chat).await?;
        self.edited.write().await.push(EditedMessage {
            chat,
            message_id,
            text: text.to_string(),
            keyboard: keyboard.cloned(),
        });
        Ok(())
    }

    async fn answer_callback(&self, callback_id: &str, notice: Option<&str>) -> Result<()> {
        self.answers.write().await.push(CallbackAnswer {
            callback_id: callback_id.to_string(),
            notice: notice.map(str::to_string),
        });
        Ok(())
    }
}

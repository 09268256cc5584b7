//! Turns inbound chat updates into conversation replies and transport calls

use super::conversation::{Conversation, RenderedReply, UserContext, WELCOME_HEADING};
use super::router::CallbackRouter;
use crate::error::Result;
use crate::models::ChatTarget;
use crate::transport::{ChatTransport, InboundUpdate, UpdateKind};
use std::sync::Arc;
use tracing::{debug, error};

pub struct UpdateHandler {
    conversation: Arc<Conversation>,
    router: CallbackRouter,
    transport: Arc<dyn ChatTransport>,
}

impl UpdateHandler {
    pub fn new(conversation: Arc<Conversation>, transport: Arc<dyn ChatTransport>) -> Self {
        Self {
            router: CallbackRouter::new(conversation.clone()),
            conversation,
            transport,
        }
    }

    pub async fn handle(&self, update: InboundUpdate) -> Result<()> {
        match update.kind {
            UpdateKind::Command { chat, command } => self.handle_command(chat, &command).await,
            UpdateKind::Callback {
                id,
                chat,
                message_id,
                data,
            } => self.handle_callback(&id, chat, message_id, &data).await,
            UpdateKind::Ignored => {
                debug!(update_id = update.update_id, "Ignoring update");
                Ok(())
            }
        }
    }

    async fn handle_command(&self, chat: ChatTarget, command: &str) -> Result<()> {
        let user = UserContext::from_chat(chat);
        let reply = match command {
            "start" => RenderedReply::view(self.conversation.root_menu(WELCOME_HEADING)),
            "preferences" => self.conversation.preferences_view(&user).await,
            "calendar" => self.conversation.calendar_view().await,
            other => {
                debug!(command = other, chat = %chat, "Unknown command");
                return Ok(());
            }
        };

        match reply.view {
            Some(view) => {
                self.transport
                    .send_message(chat, &view.text, Some(&view.keyboard))
                    .await
            }
            None => match reply.notice {
                Some(notice) => self.transport.send_message(chat, &notice, None).await,
                None => Ok(()),
            },
        }
    }

    /// Every callback is answered exactly once, even when the edit fails.
    async fn handle_callback(
        &self,
        callback_id: &str,
        chat: ChatTarget,
        message_id: i32,
        data: &str,
    ) -> Result<()> {
        let user = UserContext::from_chat(chat);
        let reply = self.router.route(data, &user).await;

        let edited = match &reply.view {
            Some(view) => {
                self.transport
                    .edit_message(chat, message_id, &view.text, Some(&view.keyboard))
                    .await
            }
            None => Ok(()),
        };

        let notice = match &edited {
            Ok(()) => reply.notice.as_deref(),
            Err(e) => {
                error!(chat = %chat, message_id, error = %e, "Failed to render reply");
                Some("❌ Error occurred")
            }
        };
        self.transport.answer_callback(callback_id, notice).await?;
        edited
    }
}

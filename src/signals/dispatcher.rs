//! Signal fan-out
//!
//! Resolve recipients through the matcher, then deliver one message to each
//! of them sequentially. A failed delivery is logged and skipped; the report
//! only counts deliveries the transport confirmed. Nothing is retried.

use super::format::format_signal;
use crate::error::Result;
use crate::models::{DispatchReport, Signal};
use crate::services::SubscriberMatcher;
use crate::transport::ChatTransport;
use std::sync::Arc;
use tracing::{error, info, warn};

pub struct SignalDispatcher {
    matcher: Arc<dyn SubscriberMatcher>,
    transport: Arc<dyn ChatTransport>,
}

impl SignalDispatcher {
    pub fn new(matcher: Arc<dyn SubscriberMatcher>, transport: Arc<dyn ChatTransport>) -> Self {
        Self { matcher, transport }
    }

    /// Fails only when the matcher does; delivery failures lower `sent_count`.
    pub async fn dispatch(&self, signal: &Signal) -> Result<DispatchReport> {
        let symbol = signal.symbol.as_deref().unwrap_or("unknown");
        let subscribers = self.matcher.match_subscribers(signal).await?;

        if subscribers.is_empty() {
            warn!(symbol, "No subscribers found for this signal");
            return Ok(DispatchReport {
                sent_count: 0,
                total_subscribers: 0,
            });
        }

        let message = format_signal(signal);
        let mut sent_count = 0;

        for subscriber in &subscribers {
            let Some(chat) = subscriber.chat_id else {
                warn!(name = subscriber.display_name(), "Subscriber has no chat id, skipping");
                continue;
            };

            match self.transport.send_message(chat, &message, None).await {
                Ok(()) => {
                    sent_count += 1;
                    info!(chat = %chat, name = subscriber.display_name(), "Signal delivered");
                }
                Err(e) => {
                    error!(chat = %chat, name = subscriber.display_name(), error = %e, "Signal delivery failed");
                }
            }
        }

        info!(
            symbol,
            sent = sent_count,
            total = subscribers.len(),
            "Signal dispatched to {}/{} subscribers",
            sent_count,
            subscribers.len()
        );

        Ok(DispatchReport {
            sent_count,
            total_subscribers: subscribers.len(),
        })
    }
}

//! Bot lifecycle supervisor
//!
//! Owns the long-poll receive loop. Any loop failure (credential check, poll
//! error) is followed by a fixed backoff and a restart, with no retry limit.
//! The update offset survives restarts so handled updates are not replayed.

use super::handler::UpdateHandler;
use crate::error::{Error, Result};
use crate::transport::ChatTransport;
use backon::{ConstantBuilder, Retryable};
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

#[derive(Debug, Clone, Copy)]
pub struct SupervisorConfig {
    pub restart_backoff: Duration,
    pub poll_timeout_secs: u32,
}

impl Default for SupervisorConfig {
    fn default() -> Self {
        Self {
            restart_backoff: Duration::from_secs(5),
            poll_timeout_secs: 60,
        }
    }
}

pub struct BotSupervisor {
    transport: Arc<dyn ChatTransport>,
    handler: UpdateHandler,
    config: SupervisorConfig,
    offset: AtomicI64,
    connected: Arc<AtomicBool>,
}

impl BotSupervisor {
    pub fn new(
        transport: Arc<dyn ChatTransport>,
        handler: UpdateHandler,
        config: SupervisorConfig,
        connected: Arc<AtomicBool>,
    ) -> Self {
        Self {
            transport,
            handler,
            config,
            offset: AtomicI64::new(0),
            connected,
        }
    }

    /// Next update id the loop will ask for.
    pub fn offset(&self) -> i64 {
        self.offset.load(Ordering::SeqCst)
    }

    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    /// Run until the process ends.
    pub async fn run(&self) -> Result<()> {
        let policy = ConstantBuilder::default()
            .with_delay(self.config.restart_backoff)
            .without_max_times();

        (|| self.receive_loop())
            .retry(policy)
            .notify(|err: &Error, delay: Duration| {
                self.connected.store(false, Ordering::SeqCst);
                error!(
                    error = %err,
                    retry_in_ms = delay.as_millis() as u64,
                    "Bot polling failed, restarting after backoff"
                );
            })
            .await
    }

    async fn receive_loop(&self) -> Result<()> {
        let username = self.transport.identify().await?;
        info!(bot = %username, offset = self.offset(), "Starting bot polling");
        self.connected.store(true, Ordering::SeqCst);

        loop {
            let updates = self
                .transport
                .fetch_updates(self.offset(), self.config.poll_timeout_secs)
                .await?;

            for update in updates {
                let update_id = update.update_id;
                if let Err(e) = self.handler.handle(update).await {
                    warn!(update_id, error = %e, "Failed to handle update");
                }
                // Advance past the update whatever the handler returned.
                self.offset.store(update_id + 1, Ordering::SeqCst);
            }
        }
    }
}

//! Process wiring: bot supervisor and HTTP server side by side

use crate::bot::{BotSupervisor, Conversation, SupervisorConfig, UpdateHandler};
use crate::cache::RedisCache;
use crate::catalog::MarketCatalog;
use crate::config::Config;
use crate::core::http::{start_server, AppState};
use crate::error::Result;
use crate::services::{CalendarSource, HttpCalendarSource, HttpSubscriberMatcher, SubscriberMatcher};
use crate::signals::SignalDispatcher;
use crate::store::{PreferenceStore, SupabasePreferenceStore};
use crate::transport::{ChatTransport, TelegramTransport};
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tracing::{error, info, warn};

const REDIS_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// External collaborators the runtime is assembled from.
pub struct ServiceDeps {
    pub transport: Arc<dyn ChatTransport>,
    pub store: Arc<dyn PreferenceStore>,
    pub matcher: Arc<dyn SubscriberMatcher>,
    pub calendar: Arc<dyn CalendarSource>,
    pub cache: Option<RedisCache>,
}

pub struct ServiceRuntime {
    state: AppState,
    supervisor: Arc<BotSupervisor>,
    port: u16,
}

impl ServiceRuntime {
    /// Build production clients from configuration.
    ///
    /// Redis is optional: an unreachable cache only shows up in `/health`.
    pub async fn from_config(config: &Config) -> Result<Self> {
        let store = SupabasePreferenceStore::new(
            &config.supabase_url,
            &config.supabase_key,
            &config.preferences_table,
            config.http_timeout,
        )?;
        let matcher = HttpSubscriberMatcher::new(&config.matcher_url, config.http_timeout)?;
        let calendar = HttpCalendarSource::new(&config.calendar_url, config.http_timeout)?;

        let cache = match tokio::time::timeout(
            REDIS_CONNECT_TIMEOUT,
            RedisCache::connect(&config.redis_url),
        )
        .await
        {
            Ok(Ok(cache)) => Some(cache),
            Ok(Err(e)) => {
                warn!(error = %e, "Redis unavailable, continuing without cache");
                None
            }
            Err(_) => {
                warn!("Redis connection timed out, continuing without cache");
                None
            }
        };

        let deps = ServiceDeps {
            transport: Arc::new(TelegramTransport::new(
                &config.bot_token,
                config.poll_timeout_secs,
            )?),
            store: Arc::new(store),
            matcher: Arc::new(matcher),
            calendar: Arc::new(calendar),
            cache,
        };

        let supervisor_config = SupervisorConfig {
            restart_backoff: config.restart_backoff,
            poll_timeout_secs: config.poll_timeout_secs,
        };

        Ok(Self::assemble(deps, supervisor_config, config.port))
    }

    pub fn assemble(deps: ServiceDeps, supervisor_config: SupervisorConfig, port: u16) -> Self {
        let bot_connected = Arc::new(AtomicBool::new(false));

        let conversation = Arc::new(Conversation::new(
            Arc::new(MarketCatalog::default()),
            deps.store.clone(),
            deps.calendar,
        ));
        let handler = UpdateHandler::new(conversation, deps.transport.clone());
        let supervisor = Arc::new(BotSupervisor::new(
            deps.transport.clone(),
            handler,
            supervisor_config,
            bot_connected.clone(),
        ));

        let state = AppState {
            dispatcher: Arc::new(SignalDispatcher::new(deps.matcher, deps.transport)),
            store: deps.store,
            cache: deps.cache,
            bot_connected,
        };

        Self {
            state,
            supervisor,
            port,
        }
    }

    pub fn state(&self) -> AppState {
        self.state.clone()
    }

    pub fn supervisor(&self) -> Arc<BotSupervisor> {
        self.supervisor.clone()
    }

    /// Run both halves until ctrl-c or until the HTTP server stops.
    pub async fn run(self) -> Result<()> {
        let supervisor = self.supervisor.clone();
        let bot_handle = tokio::spawn(async move {
            if let Err(e) = supervisor.run().await {
                error!(error = %e, "Bot supervisor stopped");
            }
        });

        let state = self.state.clone();
        let port = self.port;
        let server_handle = tokio::spawn(async move {
            if let Err(e) = start_server(state, port).await {
                error!(error = %e, "HTTP server error");
            }
        });

        info!(port = port, "Service started, waiting for shutdown signal...");
        tokio::select! {
            _ = signal::ctrl_c() => {
                info!("Shutting down...");
            }
            _ = server_handle => {
                error!("HTTP server stopped");
            }
        }

        bot_handle.abort();
        info!("Service stopped");
        Ok(())
    }
}

//! Subscriber matcher client

use crate::error::{Error, Result};
use crate::models::{MatchResponse, MatchedSubscriber, Signal};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use std::time::Duration;
use tracing::debug;

const SERVICE: &str = "subscriber matcher";

/// Resolves the subscribers whose stored preferences match a signal.
#[async_trait]
pub trait SubscriberMatcher: Send + Sync {
    async fn match_subscribers(&self, signal: &Signal) -> Result<Vec<MatchedSubscriber>>;
}

pub struct HttpSubscriberMatcher {
    client: Client,
    base_url: String,
}

impl HttpSubscriberMatcher {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::upstream(SERVICE, format!("failed to build HTTP client: {}", e)))?;
        Ok(Self::with_client(base_url, client))
    }

    pub fn with_client(base_url: &str, client: Client) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl SubscriberMatcher for HttpSubscriberMatcher {
    async fn match_subscribers(&self, signal: &Signal) -> Result<Vec<MatchedSubscriber>> {
        let response = self
            .client
            .post(format!("{}/match", self.base_url))
            .json(signal)
            .send()
            .await
            .map_err(|e| Error::upstream(SERVICE, e.to_string()))?;

        let status = response.status();
        if status != StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::upstream(
                SERVICE,
                format!("failed to get subscribers ({}): {}", status, body),
            ));
        }

        let matched: MatchResponse = response
            .json()
            .await
            .map_err(|e| Error::upstream(SERVICE, format!("unreadable response: {}", e)))?;
        debug!(
            count = matched.matched_subscribers.len(),
            "Matcher resolved {} subscribers",
            matched.matched_subscribers.len()
        );
        Ok(matched.matched_subscribers)
    }
}

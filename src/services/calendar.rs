//! Economic calendar client

use crate::error::{Error, Result};
use crate::models::CalendarEvent;
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

const SERVICE: &str = "calendar service";

#[async_trait]
pub trait CalendarSource: Send + Sync {
    /// Latest events in the order the service returns them.
    async fn latest_events(&self) -> Result<Vec<CalendarEvent>>;
}

pub struct HttpCalendarSource {
    client: Client,
    base_url: String,
}

impl HttpCalendarSource {
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
impl CalendarSource for HttpCalendarSource {
    async fn latest_events(&self) -> Result<Vec<CalendarEvent>> {
        let response = self
            .client
            .get(format!("{}/calendar", self.base_url))
            .send()
            .await
            .map_err(|e| Error::upstream(SERVICE, e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::upstream(
                SERVICE,
                format!("calendar service error ({}): {}", status, body),
            ));
        }

        response
            .json()
            .await
            .map_err(|e| Error::upstream(SERVICE, format!("unreadable response: {}", e)))
    }
}

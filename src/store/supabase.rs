//! Supabase (PostgREST) binding of the preference store

use super::PreferenceStore;
use crate::error::{Error, Result};
use crate::models::{NewPreference, Preference, PreferenceId};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info, warn};

pub struct SupabasePreferenceStore {
    client: Client,
    base_url: String,
    api_key: String,
    table: String,
}

impl SupabasePreferenceStore {
    pub fn new(base_url: &str, api_key: &str, table: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::StoreUnavailable(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self::with_client(base_url, api_key, table, client))
    }

    pub fn with_client(base_url: &str, api_key: &str, table: &str, client: Client) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            table: table.to_string(),
        }
    }

    fn table_url(&self) -> String {
        format!("{}/rest/v1/{}", self.base_url, self.table)
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header("apikey", &self.api_key)
            .header("Authorization", format!("Bearer {}", self.api_key))
    }

    async fn send(&self, operation: &'static str, request: RequestBuilder) -> Result<Response> {
        let response = self.authorized(request).send().await.map_err(|e| {
            warn!(operation, error = %e, "Preference store request failed");
            Error::StoreUnavailable(format!("{} request failed: {}", operation, e))
        })?;
        Ok(response)
    }

    async fn rows<T: for<'de> Deserialize<'de>>(
        &self,
        operation: &'static str,
        response: Response,
    ) -> Result<Vec<T>> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(operation, status = %status, body = %body, "Preference store returned an error status");
            return Err(Error::StoreUnavailable(format!(
                "{} returned {}: {}",
                operation, status, body
            )));
        }
        response.json::<Vec<T>>().await.map_err(|e| {
            Error::StoreUnavailable(format!("{} returned an unreadable body: {}", operation, e))
        })
    }
}

#[async_trait]
impl PreferenceStore for SupabasePreferenceStore {
    async fn exists(&self, user_id: &str, instrument: &str, timeframe: &str) -> Result<bool> {
        let request = self.client.get(self.table_url()).query(&[
            ("select", "id".to_string()),
            ("user_id", format!("eq.{}", user_id)),
            ("instrument", format!("eq.{}", instrument)),
            ("timeframe", format!("eq.{}", timeframe)),
            ("limit", "1".to_string()),
        ]);
        let response = self.send("exists", request).await?;
        let rows: Vec<Value> = self.rows("exists", response).await?;
        debug!(user_id, instrument, timeframe, found = !rows.is_empty(), "Checked for existing preference");
        Ok(!rows.is_empty())
    }

    async fn create(
        &self,
        user_id: &str,
        market: &str,
        instrument: &str,
        timeframe: &str,
    ) -> Result<Preference> {
        let payload = NewPreference::new(user_id, market, instrument, timeframe);
        let request = self
            .client
            .post(self.table_url())
            .header("Prefer", "return=representation")
            .json(&payload);
        let response = self.send("create", request).await?;

        if response.status() == StatusCode::CONFLICT {
            info!(user_id, instrument, timeframe, "Store rejected duplicate preference");
            return Err(Error::Conflict);
        }

        let mut rows: Vec<Preference> = self.rows("create", response).await?;
        if rows.is_empty() {
            return Err(Error::StoreUnavailable("create returned no row".to_string()));
        }
        let created = rows.swap_remove(0);
        info!(
            user_id,
            preference_id = %created.id,
            market,
            instrument,
            timeframe,
            "Preference saved"
        );
        Ok(created)
    }

    async fn list_for_user(&self, user_id: &str) -> Result<Vec<Preference>> {
        let request = self.client.get(self.table_url()).query(&[
            ("select", "*".to_string()),
            ("user_id", format!("eq.{}", user_id)),
            ("order", "created_at.asc,id.asc".to_string()),
        ]);
        let response = self.send("list", request).await?;
        self.rows("list", response).await
    }

    async fn delete(&self, id: &PreferenceId, user_id: &str) -> Result<bool> {
        let request = self
            .client
            .delete(self.table_url())
            .header("Prefer", "return=representation")
            .query(&[
                ("id", format!("eq.{}", id)),
                ("user_id", format!("eq.{}", user_id)),
            ]);
        let response = self.send("delete", request).await?;
        let rows: Vec<Value> = self.rows("delete", response).await?;
        info!(user_id, preference_id = %id, deleted = rows.len(), "Processed preference delete");
        Ok(!rows.is_empty())
    }

    async fn ping(&self) -> Result<()> {
        let request = self
            .client
            .get(self.table_url())
            .query(&[("select", "id"), ("limit", "1")]);
        let response = self.send("ping", request).await?;
        let _: Vec<Value> = self.rows("ping", response).await?;
        Ok(())
    }
}

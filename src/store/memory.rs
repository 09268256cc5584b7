//! In-process preference store for tests and local runs
//!
//! Mirrors the remote store's contract, including its lack of a uniqueness
//! constraint. Can be switched offline to exercise outage handling.

use super::PreferenceStore;
use crate::error::{Error, Result};
use crate::models::{NewPreference, Preference, PreferenceId};
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use tokio::sync::RwLock;

pub struct InMemoryPreferenceStore {
    rows: RwLock<Vec<Preference>>,
    next_id: AtomicU64,
    online: AtomicBool,
}

impl InMemoryPreferenceStore {
    pub fn new() -> Self {
        Self {
            rows: RwLock::new(Vec::new()),
            next_id: AtomicU64::new(1),
            online: AtomicBool::new(true),
        }
    }

    pub fn set_online(&self, online: bool) {
        self.online.store(online, Ordering::SeqCst);
    }

    /// Every row regardless of owner.
    pub async fn all(&self) -> Vec<Preference> {
        self.rows.read().await.clone()
    }

    fn check_online(&self) -> Result<()> {
        if self.online.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(Error::StoreUnavailable("store offline".to_string()))
        }
    }
}

impl Default for InMemoryPreferenceStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PreferenceStore for InMemoryPreferenceStore {
    async fn exists(&self, user_id: &str, instrument: &str, timeframe: &str) -> Result<bool> {
        self.check_online()?;
        let rows = self.rows.read().await;
        Ok(rows.iter().any(|p| p.matches(user_id, instrument, timeframe)))
    }

    async fn create(
        &self,
        user_id: &str,
        market: &str,
        instrument: &str,
        timeframe: &str,
    ) -> Result<Preference> {
        self.check_online()?;
        let new = NewPreference::new(user_id, market, instrument, timeframe);
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let preference = Preference {
            id: PreferenceId::new(id.to_string()),
            user_id: new.user_id,
            market: new.market,
            instrument: new.instrument,
            timeframe: new.timeframe,
            created_at: new.created_at,
        };
        self.rows.write().await.push(preference.clone());
        Ok(preference)
    }

    async fn list_for_user(&self, user_id: &str) -> Result<Vec<Preference>> {
        self.check_online()?;
        let rows = self.rows.read().await;
        Ok(rows.iter().filter(|p| p.user_id == user_id).cloned().collect())
    }

    async fn delete(&self, id: &PreferenceId, user_id: &str) -> Result<bool> {
        self.check_online()?;
        let mut rows = self.rows.write().await;
        let before = rows.len();
        rows.retain(|p| !(p.id == *id && p.user_id == user_id));
        Ok(rows.len() != before)
    }

    async fn ping(&self) -> Result<()> {
        self.check_online()
    }
}

//! Preference store client
//!
//! Every operation is a remote call and may fail with
//! [`Error::StoreUnavailable`](crate::error::Error::StoreUnavailable). The store
//! does not enforce (user, instrument, timeframe) uniqueness itself, so callers
//! check with [`PreferenceStore::exists`] before [`PreferenceStore::create`].

pub mod memory;
pub mod supabase;

use crate::error::Result;
use crate::models::{Preference, PreferenceId};
use async_trait::async_trait;

pub use memory::InMemoryPreferenceStore;
pub use supabase::SupabasePreferenceStore;

#[async_trait]
pub trait PreferenceStore: Send + Sync {
    /// True iff a row for (user, instrument, timeframe) exists.
    async fn exists(&self, user_id: &str, instrument: &str, timeframe: &str) -> Result<bool>;

    /// Insert a new row. May fail with `Conflict` when the store catches a
    /// duplicate the existence check missed.
    async fn create(
        &self,
        user_id: &str,
        market: &str,
        instrument: &str,
        timeframe: &str,
    ) -> Result<Preference>;

    /// All rows of one user in creation order.
    async fn list_for_user(&self, user_id: &str) -> Result<Vec<Preference>>;

    /// Delete `id` only if it belongs to `user_id`. Returns false when nothing
    /// was deleted, including when the row belongs to someone else.
    async fn delete(&self, id: &PreferenceId, user_id: &str) -> Result<bool>;

    /// Cheap connectivity probe for health reporting.
    async fn ping(&self) -> Result<()>;
}

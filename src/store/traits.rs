use crate::models::Listing;
use crate::store::error::StoreError;
use crate::store::types::{Credentials, Session};
use async_trait::async_trait;
use serde_json::{Map, Value};

/// Remote collection of listings plus its sign-in endpoint.
///
/// Calls are single request/response exchanges. Nothing is retried or
/// cached, and updates are last-writer-wins.
#[async_trait]
pub trait ListingStore: Send + Sync {
    /// Exchange credentials for a session
    async fn sign_in(&self, credentials: &Credentials) -> Result<Session, StoreError>;

    /// Every listing, newest first
    async fn list_all(&self, session: &Session) -> Result<Vec<Listing>, StoreError>;

    async fn get_by_id(&self, session: &Session, id: &str) -> Result<Listing, StoreError>;

    /// Persist a storage record; the store assigns id and timestamps
    async fn insert(&self, session: &Session, record: &Map<String, Value>) -> Result<Listing, StoreError>;

    /// Overwrite the given columns of an existing listing
    async fn update(&self, session: &Session, id: &str, record: &Map<String, Value>) -> Result<(), StoreError>;

    async fn delete_by_id(&self, session: &Session, id: &str) -> Result<(), StoreError>;

    /// Get the name of the backing store
    fn store_name(&self) -> &'static str;
}

use crate::domain::{NewRecord, RequestRecord, Result};
use async_trait::async_trait;

/// Port for the document store holding request history
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Whether writes are kept at all; callers skip persistence when false
    fn is_enabled(&self) -> bool {
        true
    }

    /// Persist a new record and return the identifier assigned to it
    async fn insert(&self, record: NewRecord) -> Result<String>;

    /// Replace the stored record carrying the same id
    ///
    /// Returns `ApiError::NotFound` when no such record exists.
    async fn update(&self, record: &RequestRecord) -> Result<()>;

    /// Most recent records first, at most `limit` of them
    async fn find_recent(&self, limit: usize) -> Result<Vec<RequestRecord>>;

    async fn find_by_id(&self, id: &str) -> Result<Option<RequestRecord>>;

    /// Returns whether a record was removed
    async fn delete_by_id(&self, id: &str) -> Result<bool>;

    /// Returns how many records were removed
    async fn delete_all(&self) -> Result<u64>;
}

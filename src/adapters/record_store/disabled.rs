use crate::domain::{ApiError, NewRecord, RequestRecord, Result};
use crate::ports::RecordStore;
use async_trait::async_trait;

/// Store used when history is switched off: proxying keeps working, nothing is kept
pub struct DisabledRecordStore;

impl DisabledRecordStore {
    fn unavailable<T>() -> Result<T> {
        Err(ApiError::Unavailable("history disabled".into()))
    }
}

#[async_trait]
impl RecordStore for DisabledRecordStore {
    fn is_enabled(&self) -> bool {
        false
    }

    async fn insert(&self, _: NewRecord) -> Result<String> {
        Self::unavailable()
    }

    async fn update(&self, _: &RequestRecord) -> Result<()> {
        Self::unavailable()
    }

    async fn find_recent(&self, _: usize) -> Result<Vec<RequestRecord>> {
        Self::unavailable()
    }

    async fn find_by_id(&self, _: &str) -> Result<Option<RequestRecord>> {
        Self::unavailable()
    }

    async fn delete_by_id(&self, _: &str) -> Result<bool> {
        Self::unavailable()
    }

    async fn delete_all(&self) -> Result<u64> {
        Self::unavailable()
    }
}

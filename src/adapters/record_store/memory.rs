use crate::domain::{ApiError, NewRecord, RequestRecord, Result};
use crate::ports::RecordStore;
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

/// In-process history store
///
/// Records are kept in insertion order. With a capacity set, the oldest
/// records are evicted once it is exceeded.
pub struct MemoryRecordStore {
    records: Arc<RwLock<Vec<RequestRecord>>>,
    capacity: Option<usize>,
}

impl MemoryRecordStore {
    pub fn new() -> Self {
        Self {
            records: Arc::new(RwLock::new(Vec::new())),
            capacity: None,
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            records: Arc::new(RwLock::new(Vec::new())),
            capacity: Some(capacity.max(1)),
        }
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    fn evict_oldest(records: &mut Vec<RequestRecord>, capacity: usize) {
        while records.len() > capacity {
            let oldest = records
                .iter()
                .enumerate()
                .min_by_key(|(_, r)| r.timestamp)
                .map(|(idx, _)| idx)
                .unwrap_or(0);
            let evicted = records.remove(oldest);
            log::debug!("Evicted record {} from history", evicted.id);
        }
    }
}

impl Default for MemoryRecordStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RecordStore for MemoryRecordStore {
    async fn insert(&self, record: NewRecord) -> Result<String> {
        let id = Uuid::new_v4().to_string();

        let mut records = self.records.write().await;
        records.push(record.into_record(id.clone()));
        if let Some(capacity) = self.capacity {
            Self::evict_oldest(&mut records, capacity);
        }

        Ok(id)
    }

    async fn update(&self, record: &RequestRecord) -> Result<()> {
        let mut records = self.records.write().await;

        match records.iter_mut().find(|r| r.id == record.id) {
            Some(existing) => {
                *existing = record.clone();
                Ok(())
            }
            None => Err(ApiError::NotFound(format!("record {} no longer exists", record.id))),
        }
    }

    async fn find_recent(&self, limit: usize) -> Result<Vec<RequestRecord>> {
        let records = self.records.read().await;

        // Later inserts win ties on timestamp
        let mut recent: Vec<RequestRecord> = records.iter().rev().cloned().collect();
        recent.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        recent.truncate(limit);

        Ok(recent)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<RequestRecord>> {
        let records = self.records.read().await;
        Ok(records.iter().find(|r| r.id == id).cloned())
    }

    async fn delete_by_id(&self, id: &str) -> Result<bool> {
        let mut records = self.records.write().await;
        let before = records.len();
        records.retain(|r| r.id != id);
        Ok(records.len() != before)
    }

    async fn delete_all(&self) -> Result<u64> {
        let mut records = self.records.write().await;
        let count = records.len() as u64;
        records.clear();
        Ok(count)
    }
}

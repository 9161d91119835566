use std::sync::Arc;

use super::{ApiError, RequestRecord, Result};
use crate::ports::{RecordStore, TrackingPort};

pub const DEFAULT_HISTORY_LIMIT: usize = 50;

const NOT_FOUND: &str = "Request not found";

/// Query and delete facade over the record store
#[derive(Clone)]
pub struct HistoryService {
    store: Arc<dyn RecordStore>,
    tracker: Arc<dyn TrackingPort>,
    default_limit: usize,
    max_limit: usize,
}

impl HistoryService {
    pub fn new(store: Arc<dyn RecordStore>, tracker: Arc<dyn TrackingPort>) -> Self {
        Self {
            store,
            tracker,
            default_limit: DEFAULT_HISTORY_LIMIT,
            max_limit: DEFAULT_HISTORY_LIMIT,
        }
    }

    /// `max_limit` caps whatever the caller asks for; `default_limit` applies when it asks for nothing.
    pub fn with_limits(mut self, default_limit: usize, max_limit: usize) -> Self {
        self.max_limit = max_limit.max(1);
        self.default_limit = default_limit.clamp(1, self.max_limit);
        self
    }

    /// Newest first, by creation time.
    pub async fn list(&self, limit: Option<usize>) -> Result<Vec<RequestRecord>> {
        let limit = limit.unwrap_or(self.default_limit).min(self.max_limit);
        self.store.find_recent(limit).await
    }

    pub async fn get(&self, id: &str) -> Result<RequestRecord> {
        self.store
            .find_by_id(id)
            .await?
            .ok_or_else(|| ApiError::NotFound(NOT_FOUND.into()))
    }

    pub async fn delete_one(&self, id: &str) -> Result<()> {
        if self.store.delete_by_id(id).await? {
            log::debug!("Deleted request {}", id);
            Ok(())
        } else {
            Err(ApiError::NotFound(NOT_FOUND.into()))
        }
    }

    pub async fn delete_all(&self) -> Result<u64> {
        let count = self.store.delete_all().await?;
        self.tracker.history_cleared(count);
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::{DisabledRecordStore, MemoryRecordStore};
    use crate::domain::{HttpMethod, NewRecord};
    use chrono::{Duration, Utc};
    use serde_json::Value;
    use std::collections::HashMap;

    struct MockTracker;

    impl TrackingPort for MockTracker {
        fn request_started(&self, _: &HttpMethod, _: &str, _: Option<&str>) {}
        fn request_completed(&self, _: &HttpMethod, _: &str, _: u16, _: u64) {}
        fn request_failed(&self, _: &HttpMethod, _: &str, _: &ApiError, _: u64) {}
        fn input_recovered(&self, _: &str, _: &str) {}
        fn persistence_failed(&self, _: &str, _: &ApiError) {}
        fn history_cleared(&self, _: u64) {}
    }

    async fn seeded(count: i64) -> (Arc<MemoryRecordStore>, HistoryService) {
        let store = Arc::new(MemoryRecordStore::new());
        let base = Utc::now();
        for i in 0..count {
            let record = NewRecord::pending(
                HttpMethod::Get,
                format!("http://example.test/{}", i),
                HashMap::new(),
                Value::Null,
                base + Duration::seconds(i),
            );
            store.insert(record).await.unwrap();
        }
        let service = HistoryService::new(store.clone(), Arc::new(MockTracker));
        (store, service)
    }

    #[tokio::test]
    async fn test_list_caps_at_fifty_newest_first() {
        let (_, history) = seeded(60).await;

        let records = history.list(None).await.unwrap();

        assert_eq!(records.len(), 50);
        assert_eq!(records[0].url, "http://example.test/59");
        assert_eq!(records[49].url, "http://example.test/10");
        assert!(records.windows(2).all(|w| w[0].timestamp >= w[1].timestamp));
    }

    #[tokio::test]
    async fn test_list_honours_smaller_limit_and_clamps_larger() {
        let (_, history) = seeded(60).await;

        assert_eq!(history.list(Some(5)).await.unwrap().len(), 5);
        assert_eq!(history.list(Some(500)).await.unwrap().len(), 50);

        let wide = history.clone().with_limits(10, 100);
        assert_eq!(wide.list(None).await.unwrap().len(), 10);
        assert_eq!(wide.list(Some(500)).await.unwrap().len(), 60);
    }

    #[tokio::test]
    async fn test_delete_all_then_list_is_empty() {
        let (_, history) = seeded(3).await;

        assert_eq!(history.delete_all().await.unwrap(), 3);
        assert!(history.list(None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_get_and_delete_unknown_id() {
        let (store, history) = seeded(1).await;
        let existing = store.find_recent(1).await.unwrap().remove(0);

        assert_eq!(history.get(&existing.id).await.unwrap(), existing);
        assert_eq!(
            history.get("nope").await.unwrap_err(),
            ApiError::NotFound("Request not found".into())
        );
        assert!(history.delete_one("nope").await.is_err());

        history.delete_one(&existing.id).await.unwrap();
        assert!(history.get(&existing.id).await.is_err());
    }

    #[tokio::test]
    async fn test_disabled_store_reports_unavailable() {
        let history = HistoryService::new(Arc::new(DisabledRecordStore), Arc::new(MockTracker));

        assert!(matches!(history.list(None).await, Err(ApiError::Unavailable(_))));
    }
}

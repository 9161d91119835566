use std::sync::Arc;

use crate::adapters::{DisabledRecordStore, HyperApiAdapter, MemoryRecordStore, ReqwestHttpClient};
use crate::config::AppConfig;
use crate::domain::{HistoryService, ProxyService, Result};
use crate::ports::{RecordStore, TrackingPort};

/// Wire the configured adapters into the services and the HTTP front.
pub fn build_adapter(config: &AppConfig, tracker: Arc<dyn TrackingPort>) -> Result<HyperApiAdapter> {
    let store: Arc<dyn RecordStore> = match (config.history.enabled, config.history.capacity) {
        (false, _) => Arc::new(DisabledRecordStore),
        (true, Some(capacity)) => Arc::new(MemoryRecordStore::with_capacity(capacity)),
        (true, None) => Arc::new(MemoryRecordStore::new()),
    };

    let http_client = Arc::new(ReqwestHttpClient::new(config.outbound.timeout())?);

    let proxy = ProxyService::new(http_client, store.clone(), tracker.clone())
        .with_policy(config.outbound.method_policy);
    let history = HistoryService::new(store, tracker)
        .with_limits(config.history.default_limit, config.history.max_limit);

    Ok(HyperApiAdapter::new(Arc::new(proxy), Arc::new(history))
        .with_http_logging(config.server.http_logging)
        .with_max_body_bytes(config.server.max_body_bytes))
}

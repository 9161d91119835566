pub mod http_client;
pub mod record_store;
pub mod tracking;

pub use http_client::HttpClientPort;
pub use record_store::RecordStore;
pub use tracking::TrackingPort;

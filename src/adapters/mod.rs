pub mod hyper_server;
pub mod record_store;
pub mod reqwest_client;
pub mod tracking;

pub use hyper_server::{serve, HyperApiAdapter};
pub use record_store::{DisabledRecordStore, MemoryRecordStore};
pub use reqwest_client::ReqwestHttpClient;
pub use tracking::TracingTracker;

pub mod errors;
pub mod history;
pub mod models;
pub mod proxy;

pub use errors::*;
pub use history::HistoryService;
pub use models::*;
pub use proxy::ProxyService;

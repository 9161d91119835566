use crate::domain::{OutboundRequest, OutboundResponse, Result};
use async_trait::async_trait;

/// Port for issuing the forwarded request against its target
#[async_trait]
pub trait HttpClientPort: Send + Sync {
    /// Send the request once; any `Err` is a transport-level failure.
    async fn execute(&self, request: &OutboundRequest) -> Result<OutboundResponse>;
}

use crate::domain::{ApiError, HttpMethod};

/// Port receiving observability events from the services
///
/// Implementations must not block; they are called inline on the request path.
pub trait TrackingPort: Send + Sync {
    /// A proxy call passed validation and is about to be dispatched
    fn request_started(&self, method: &HttpMethod, url: &str, record_id: Option<&str>);

    /// The target answered, whatever the status code
    fn request_completed(&self, method: &HttpMethod, url: &str, status: u16, time_ms: u64);

    /// The outbound call failed before any response was received
    fn request_failed(&self, method: &HttpMethod, url: &str, error: &ApiError, time_ms: u64);

    /// Malformed input or output was replaced by a fallback value
    fn input_recovered(&self, field: &str, reason: &str);

    /// A history write or read failed and was swallowed
    fn persistence_failed(&self, operation: &str, error: &ApiError);

    fn history_cleared(&self, count: u64);
}

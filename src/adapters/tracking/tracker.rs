use crate::domain::{ApiError, HttpMethod};
use crate::ports::TrackingPort;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::{error, info, warn};

/// Tracker emitting structured `tracing` events
///
/// Also counts proxy calls currently in flight so every event carries the
/// current load.
pub struct TracingTracker {
    in_flight: AtomicUsize,
}

impl TracingTracker {
    pub fn new() -> Self {
        Self {
            in_flight: AtomicUsize::new(0),
        }
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::Relaxed)
    }

    fn finish(&self) -> usize {
        self.in_flight
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |n| Some(n.saturating_sub(1)))
            .map(|prev| prev.saturating_sub(1))
            .unwrap_or(0)
    }
}

impl Default for TracingTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl TrackingPort for TracingTracker {
    fn request_started(&self, method: &HttpMethod, url: &str, record_id: Option<&str>) {
        let in_flight = self.in_flight.fetch_add(1, Ordering::Relaxed) + 1;
        info!(
            event = "api_request_started",
            %method,
            url,
            record_id = record_id.unwrap_or("-"),
            in_flight,
            "Making outgoing request"
        );
    }

    fn request_completed(&self, method: &HttpMethod, url: &str, status: u16, time_ms: u64) {
        let in_flight = self.finish();
        info!(
            event = "api_request_completed",
            %method,
            url,
            status,
            time_ms,
            in_flight,
            "Received response"
        );
    }

    fn request_failed(&self, method: &HttpMethod, url: &str, error: &ApiError, time_ms: u64) {
        let in_flight = self.finish();
        error!(
            event = "api_request_failed",
            %method,
            url,
            %error,
            time_ms,
            in_flight,
            "Request failed"
        );
    }

    fn input_recovered(&self, field: &str, reason: &str) {
        warn!(field, reason, "Recovered malformed input");
    }

    fn persistence_failed(&self, operation: &str, error: &ApiError) {
        error!(event = "database_operation_failed", operation, %error, "History write failed");
    }

    fn history_cleared(&self, count: u64) {
        info!(count, "Cleared request history");
    }
}

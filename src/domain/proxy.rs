use chrono::Utc;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Instant;

use super::{
    ApiError, Headers, HttpMethod, MethodPolicy, NewRecord, OutboundRequest, OutboundResponse, ProxyDescription,
    ProxyFailure, ProxyOutcome, ProxyResult, RecordStatus, RecordedResponse, Result,
};
use crate::ports::{HttpClientPort, RecordStore, TrackingPort};

const UNKNOWN_CONTENT_TYPE: &str = "unknown";

/// Request body after normalization.
#[derive(Debug, Clone, PartialEq)]
enum NormalizedBody {
    Empty,
    Json(Value),
    Raw(String),
}

impl NormalizedBody {
    fn to_value(&self) -> Value {
        match self {
            NormalizedBody::Empty => Value::Null,
            NormalizedBody::Json(v) => v.clone(),
            NormalizedBody::Raw(s) => Value::String(s.clone()),
        }
    }

    fn to_text(&self) -> Option<String> {
        match self {
            NormalizedBody::Empty => None,
            NormalizedBody::Json(v) => Some(v.to_string()),
            NormalizedBody::Raw(s) => Some(s.clone()),
        }
    }
}

/// Forwards client-described requests and records every attempt.
///
/// History writes are best effort: a failing store never changes what the
/// caller gets back, which is decided by the outbound call alone.
#[derive(Clone)]
pub struct ProxyService {
    http_client: Arc<dyn HttpClientPort>,
    store: Arc<dyn RecordStore>,
    tracker: Arc<dyn TrackingPort>,
    policy: MethodPolicy,
}

impl ProxyService {
    pub fn new(
        http_client: Arc<dyn HttpClientPort>,
        store: Arc<dyn RecordStore>,
        tracker: Arc<dyn TrackingPort>,
    ) -> Self {
        Self {
            http_client,
            store,
            tracker,
            policy: MethodPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: MethodPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Forward one request.
    ///
    /// `Err` means the description was rejected before anything was sent or
    /// stored. Transport failures come back as `ProxyResult::Failed`. Timing
    /// starts on entry, before any normalization.
    pub async fn proxy(&self, description: ProxyDescription) -> Result<ProxyResult> {
        let started = Instant::now();

        let method = description.method.as_deref().map(str::trim).unwrap_or_default();
        let url = description.url.as_deref().map(str::trim).unwrap_or_default();
        if method.is_empty() || url.is_empty() {
            return Err(ApiError::InvalidRequest("URL and method are required".into()));
        }
        let method = HttpMethod::parse(method);
        self.policy.check(&method)?;
        let url = url.to_string();

        let headers = self.normalize_headers(&description.headers);
        let body = self.normalize_body(description.body);

        let draft = NewRecord::pending(method.clone(), url.clone(), headers.clone(), body.to_value(), Utc::now());
        let pending_id = if self.store.is_enabled() {
            match self.store.insert(draft.clone()).await {
                Ok(id) => Some(id),
                Err(e) => {
                    self.tracker.persistence_failed("insert", &e);
                    None
                }
            }
        } else {
            None
        };

        self.tracker.request_started(&method, &url, pending_id.as_deref());

        let outbound_body = if method.allows_body() { body.to_text() } else { None };
        let request = OutboundRequest::new(method.clone(), url.clone())
            .with_headers(headers)
            .with_body(outbound_body);

        match self.http_client.execute(&request).await {
            Ok(response) => {
                let content_type = response.content_type().unwrap_or(UNKNOWN_CONTENT_TYPE).to_string();
                let data = self.classify_body(&response);
                let time_ms = elapsed_ms(started);

                let recorded = RecordedResponse::new(response.status, response.headers.clone(), data.clone());
                let record_id = self.finalize(pending_id, draft, RecordStatus::Completed, recorded).await;
                self.tracker.request_completed(&method, &url, response.status, time_ms);

                Ok(ProxyResult::Completed(ProxyOutcome {
                    status: response.status,
                    time_ms,
                    data,
                    headers: response.headers,
                    content_type,
                    record_id,
                }))
            }
            Err(e) => {
                let time_ms = elapsed_ms(started);
                let message = e.to_string();

                let recorded = RecordedResponse::new(500, Headers::new(), json!({ "error": message }));
                let record_id = self.finalize(pending_id, draft, RecordStatus::Failed, recorded).await;
                self.tracker.request_failed(&method, &url, &e, time_ms);

                Ok(ProxyResult::Failed(ProxyFailure {
                    error: message,
                    details: Some(format!("{:?}", e)),
                    kind: ProxyFailure::KIND,
                    time_ms,
                    record_id,
                }))
            }
        }
    }

    /// Write the outcome onto the pending record, or insert it now if the
    /// pending insert never made it to the store.
    ///
    /// Returns the id of the stored record, `None` when nothing is stored
    /// under it, including a pending record deleted while in flight.
    async fn finalize(
        &self,
        pending_id: Option<String>,
        draft: NewRecord,
        status: RecordStatus,
        response: RecordedResponse,
    ) -> Option<String> {
        if !self.store.is_enabled() {
            return None;
        }
        let resolved = draft.resolve(status, response, Utc::now());

        match pending_id {
            Some(id) => {
                let record = resolved.into_record(id.clone());
                match self.store.update(&record).await {
                    Ok(()) => Some(id),
                    Err(ApiError::NotFound(_)) => {
                        log::debug!("Record {} was deleted before the call finished", id);
                        None
                    }
                    Err(e) => {
                        self.tracker.persistence_failed("update", &e);
                        Some(id)
                    }
                }
            }
            None => match self.store.insert(resolved).await {
                Ok(id) => Some(id),
                Err(e) => {
                    self.tracker.persistence_failed("insert", &e);
                    None
                }
            },
        }
    }

    fn normalize_headers(&self, raw: &Value) -> Headers {
        let parsed;
        let value = match raw {
            Value::Null => return Headers::new(),
            Value::String(s) if s.trim().is_empty() => return Headers::new(),
            Value::String(s) => match serde_json::from_str::<Value>(s) {
                Ok(v) => {
                    parsed = v;
                    &parsed
                }
                Err(e) => {
                    self.tracker.input_recovered("headers", &format!("invalid JSON: {}", e));
                    return Headers::new();
                }
            },
            other => other,
        };

        let map = match value.as_object() {
            Some(map) => map,
            None => {
                self.tracker.input_recovered("headers", "not a JSON object");
                return Headers::new();
            }
        };

        map.iter()
            .filter_map(|(name, v)| match v {
                Value::String(s) => Some((name.clone(), s.clone())),
                Value::Number(n) => Some((name.clone(), n.to_string())),
                Value::Bool(b) => Some((name.clone(), b.to_string())),
                _ => {
                    log::debug!("Dropping non-scalar header {}", name);
                    None
                }
            })
            .collect()
    }

    fn normalize_body(&self, raw: Value) -> NormalizedBody {
        match raw {
            Value::Null => NormalizedBody::Empty,
            Value::String(s) if s.trim().is_empty() => NormalizedBody::Empty,
            Value::String(s) => match serde_json::from_str::<Value>(&s) {
                Ok(Value::Null) => NormalizedBody::Empty,
                Ok(v) => NormalizedBody::Json(v),
                Err(_) => {
                    self.tracker.input_recovered("body", "not JSON, sent as text");
                    NormalizedBody::Raw(s)
                }
            },
            other => NormalizedBody::Json(other),
        }
    }

    /// JSON when the target says so and the payload parses, raw text otherwise.
    fn classify_body(&self, response: &OutboundResponse) -> Value {
        let is_json = response
            .content_type()
            .map(|ct| ct.to_ascii_lowercase().contains("application/json"))
            .unwrap_or(false);

        if is_json {
            match serde_json::from_slice::<Value>(&response.body) {
                Ok(v) => return v,
                Err(e) => self
                    .tracker
                    .input_recovered("response", &format!("invalid JSON from target: {}", e)),
            }
        }

        Value::String(String::from_utf8_lossy(&response.body).into_owned())
    }
}

fn elapsed_ms(started: Instant) -> u64 {
    started.elapsed().as_millis() as u64
}

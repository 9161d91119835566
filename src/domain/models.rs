use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;

use super::{ApiError, Result};

pub type Headers = HashMap<String, String>;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
    Other(String),
}

impl HttpMethod {
    pub fn as_str(&self) -> &str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Other(s) => s.as_str(),
        }
    }

    pub fn parse(s: &str) -> Self {
        match s.trim().to_uppercase().as_str() {
            "GET" => HttpMethod::Get,
            "POST" => HttpMethod::Post,
            "PUT" => HttpMethod::Put,
            "DELETE" => HttpMethod::Delete,
            other => HttpMethod::Other(other.to_string()),
        }
    }

    /// One of the four verbs the history schema has always known about.
    pub fn is_standard(&self) -> bool {
        !matches!(self, HttpMethod::Other(_))
    }

    pub fn allows_body(&self) -> bool {
        *self != HttpMethod::Get
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for HttpMethod {
    fn from(s: String) -> Self {
        HttpMethod::parse(&s)
    }
}

impl From<HttpMethod> for String {
    fn from(method: HttpMethod) -> Self {
        method.as_str().to_string()
    }
}

/// Which verbs the proxy agrees to forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MethodPolicy {
    /// Only GET, POST, PUT and DELETE.
    Strict,
    /// Any verb; the outbound client decides whether it is a valid token.
    #[default]
    Permissive,
}

impl MethodPolicy {
    pub fn check(&self, method: &HttpMethod) -> Result<()> {
        match self {
            MethodPolicy::Strict if !method.is_standard() => {
                Err(ApiError::UnsupportedMethod(method.as_str().to_string()))
            }
            _ => Ok(()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordStatus {
    Pending,
    Completed,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordedResponse {
    pub status_code: Option<u16>,
    #[serde(default)]
    pub headers: Headers,
    #[serde(default)]
    pub body: Value,
}

impl RecordedResponse {
    pub fn new(status_code: u16, headers: Headers, body: Value) -> Self {
        Self {
            status_code: Some(status_code),
            headers,
            body,
        }
    }

    /// Placeholder stored while the outbound call is in flight.
    pub fn pending() -> Self {
        Self {
            status_code: None,
            headers: Headers::new(),
            body: Value::Null,
        }
    }
}

/// Everything a record carries before the store hands out an id.
#[derive(Debug, Clone, PartialEq)]
pub struct NewRecord {
    pub method: HttpMethod,
    pub url: String,
    pub headers: Headers,
    pub body: Value,
    pub response: RecordedResponse,
    pub status: RecordStatus,
    pub timestamp: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl NewRecord {
    pub fn pending(method: HttpMethod, url: String, headers: Headers, body: Value, timestamp: DateTime<Utc>) -> Self {
        Self {
            method,
            url,
            headers,
            body,
            response: RecordedResponse::pending(),
            status: RecordStatus::Pending,
            timestamp,
            completed_at: None,
        }
    }

    pub fn resolve(mut self, status: RecordStatus, response: RecordedResponse, at: DateTime<Utc>) -> Self {
        self.status = status;
        self.response = response;
        self.completed_at = Some(at);
        self
    }

    pub fn into_record(self, id: String) -> RequestRecord {
        RequestRecord {
            id,
            method: self.method,
            url: self.url,
            headers: self.headers,
            body: self.body,
            response: self.response,
            status: self.status,
            timestamp: self.timestamp,
            completed_at: self.completed_at,
        }
    }
}

/// One proxy attempt and its outcome, as kept in history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestRecord {
    pub id: String,
    pub method: HttpMethod,
    pub url: String,
    #[serde(default)]
    pub headers: Headers,
    #[serde(default)]
    pub body: Value,
    pub response: RecordedResponse,
    pub status: RecordStatus,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

/// A client-supplied description of the request to forward.
///
/// `headers` may arrive as an object or as a JSON document in a string;
/// `body` may be any JSON value, a string holding JSON, or free text.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProxyDescription {
    #[serde(default)]
    pub method: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub headers: Value,
    #[serde(default)]
    pub body: Value,
}

impl ProxyDescription {
    pub fn new(method: &str, url: &str) -> Self {
        Self {
            method: Some(method.to_string()),
            url: Some(url.to_string()),
            headers: Value::Null,
            body: Value::Null,
        }
    }

    pub fn with_headers(mut self, headers: Value) -> Self {
        self.headers = headers;
        self
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.body = body;
        self
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ProxyOutcome {
    pub status: u16,
    #[serde(rename = "time")]
    pub time_ms: u64,
    pub data: Value,
    pub headers: Headers,
    #[serde(rename = "contentType")]
    pub content_type: String,
    #[serde(rename = "id", skip_serializing_if = "Option::is_none")]
    pub record_id: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProxyFailure {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(rename = "type")]
    pub kind: &'static str,
    #[serde(rename = "time")]
    pub time_ms: u64,
    #[serde(rename = "id", skip_serializing_if = "Option::is_none")]
    pub record_id: Option<String>,
}

impl ProxyFailure {
    pub const KIND: &'static str = "request_error";

    /// HTTP status reported to the caller for a transport failure.
    pub fn status_code(&self) -> u16 {
        500
    }
}

#[derive(Debug, Clone)]
pub enum ProxyResult {
    Completed(ProxyOutcome),
    Failed(ProxyFailure),
}

impl ProxyResult {
    pub fn record_id(&self) -> Option<&str> {
        match self {
            ProxyResult::Completed(outcome) => outcome.record_id.as_deref(),
            ProxyResult::Failed(failure) => failure.record_id.as_deref(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct OutboundRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: Headers,
    pub body: Option<String>,
}

impl OutboundRequest {
    pub fn new(method: HttpMethod, url: String) -> Self {
        Self {
            method,
            url,
            headers: Headers::new(),
            body: None,
        }
    }

    pub fn with_headers(mut self, headers: Headers) -> Self {
        self.headers = headers;
        self
    }

    pub fn with_body(mut self, body: Option<String>) -> Self {
        self.body = body;
        self
    }
}

#[derive(Debug, Clone)]
pub struct OutboundResponse {
    pub status: u16,
    pub headers: Headers,
    pub body: Vec<u8>,
}

impl OutboundResponse {
    pub fn new(status: u16) -> Self {
        Self {
            status,
            headers: Headers::new(),
            body: Vec::new(),
        }
    }

    pub fn with_headers(mut self, headers: Headers) -> Self {
        self.headers = headers;
        self
    }

    pub fn with_body(mut self, body: Vec<u8>) -> Self {
        self.body = body;
        self
    }

    pub fn content_type(&self) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case("content-type"))
            .map(|(_, v)| v.as_str())
    }
}

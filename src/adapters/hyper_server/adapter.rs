use http_body_util::{combinators::BoxBody, BodyExt, Full, LengthLimitError, Limited};
use hyper::body::Bytes;
use hyper::header::{HeaderValue, CONTENT_TYPE};
use hyper::{Request, Response, StatusCode};
use serde::Serialize;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info};

use super::routes::{query_limit, Route};
use crate::domain::{ApiError, HistoryService, ProxyDescription, ProxyResult, ProxyService};

pub type Body = BoxBody<Bytes, hyper::Error>;

const DEFAULT_MAX_BODY_BYTES: usize = 1024 * 1024;

/// Translates HTTP requests into service calls and results back into JSON.
pub struct HyperApiAdapter {
    proxy: Arc<ProxyService>,
    history: Arc<HistoryService>,
    http_logging: bool,
    max_body_bytes: usize,
}

impl HyperApiAdapter {
    pub fn new(proxy: Arc<ProxyService>, history: Arc<HistoryService>) -> Self {
        Self {
            proxy,
            history,
            http_logging: false,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }

    pub fn with_http_logging(mut self, enabled: bool) -> Self {
        self.http_logging = enabled;
        self
    }

    pub fn with_max_body_bytes(mut self, max_body_bytes: usize) -> Self {
        self.max_body_bytes = max_body_bytes;
        self
    }

    pub async fn handle<B>(&self, req: Request<B>) -> Response<Body>
    where
        B: hyper::body::Body + Send,
        B::Data: Send,
        B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        if !self.http_logging {
            return self.dispatch(req).await;
        }

        let started = Instant::now();
        let method = req.method().clone();
        let path = req.uri().path().to_string();
        info!(%method, path = %path, "Incoming HTTP request");

        let response = self.dispatch(req).await;

        info!(
            %method,
            path = %path,
            status = response.status().as_u16(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Outgoing HTTP response"
        );
        response
    }

    async fn dispatch<B>(&self, req: Request<B>) -> Response<Body>
    where
        B: hyper::body::Body + Send,
        B::Data: Send,
        B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        match Route::resolve(req.method(), req.uri().path()) {
            Route::Proxy => self.handle_proxy(req).await,
            Route::ListHistory => {
                let limit = query_limit(req.uri().query());
                match self.history.list(limit).await {
                    Ok(records) => json_response(StatusCode::OK, &records),
                    Err(e) => error_response(&e),
                }
            }
            Route::ClearHistory => match self.history.delete_all().await {
                Ok(count) => json_response(StatusCode::OK, &json!({ "success": true, "deleted": count })),
                Err(e) => error_response(&e),
            },
            Route::GetRecord(id) => match self.history.get(&id).await {
                Ok(record) => json_response(StatusCode::OK, &record),
                Err(e) => error_response(&e),
            },
            Route::DeleteRecord(id) => match self.history.delete_one(&id).await {
                Ok(()) => json_response(StatusCode::OK, &json!({ "success": true })),
                Err(e) => error_response(&e),
            },
            Route::Version => json_response(
                StatusCode::OK,
                &json!({ "version": crate::VERSION, "build": crate::BUILD_VERSION }),
            ),
            Route::Health => json_response(StatusCode::OK, &json!({ "status": "ok" })),
            Route::MethodNotAllowed => {
                json_response(StatusCode::METHOD_NOT_ALLOWED, &json!({ "error": "method not allowed" }))
            }
            Route::NotFound => json_response(StatusCode::NOT_FOUND, &json!({ "error": "not found" })),
        }
    }

    async fn handle_proxy<B>(&self, req: Request<B>) -> Response<Body>
    where
        B: hyper::body::Body + Send,
        B::Data: Send,
        B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        let is_form = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|ct| ct.to_ascii_lowercase().starts_with("application/x-www-form-urlencoded"))
            .unwrap_or(false);

        let bytes = match Limited::new(req.into_body(), self.max_body_bytes).collect().await {
            Ok(collected) => collected.to_bytes(),
            Err(e) if e.is::<LengthLimitError>() => {
                return error_response(&ApiError::PayloadTooLarge(self.max_body_bytes));
            }
            Err(e) => {
                return error_response(&ApiError::InvalidRequest(format!("Failed to read request body: {}", e)));
            }
        };

        let description = if is_form {
            description_from_form(&bytes)
        } else {
            match serde_json::from_slice::<ProxyDescription>(&bytes) {
                Ok(description) => description,
                Err(e) => return error_response(&ApiError::InvalidRequest(format!("Invalid JSON body: {}", e))),
            }
        };

        match self.proxy.proxy(description).await {
            Ok(ProxyResult::Completed(outcome)) => json_response(StatusCode::OK, &outcome),
            Ok(ProxyResult::Failed(failure)) => {
                let status =
                    StatusCode::from_u16(failure.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
                json_response(status, &failure)
            }
            Err(e) => error_response(&e),
        }
    }
}

/// HTML forms post `headers` and `body` as raw strings; the service parses them.
fn description_from_form(bytes: &[u8]) -> ProxyDescription {
    let mut description = ProxyDescription::default();

    for (key, value) in url::form_urlencoded::parse(bytes) {
        match key.as_ref() {
            "method" => description.method = Some(value.into_owned()),
            "url" => description.url = Some(value.into_owned()),
            "headers" => description.headers = Value::String(value.into_owned()),
            "body" => description.body = Value::String(value.into_owned()),
            _ => {}
        }
    }

    description
}

fn full(bytes: impl Into<Bytes>) -> Body {
    Full::new(bytes.into()).map_err(|never| match never {}).boxed()
}

fn json_response<T: Serialize>(status: StatusCode, value: &T) -> Response<Body> {
    match serde_json::to_vec(value) {
        Ok(payload) => {
            let mut response = Response::new(full(payload));
            *response.status_mut() = status;
            response
                .headers_mut()
                .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
            response
        }
        Err(e) => {
            error!("Failed to serialize response: {}", e);
            let mut response = Response::new(full(Bytes::new()));
            *response.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
            response
        }
    }
}

fn error_response(err: &ApiError) -> Response<Body> {
    let status = match err {
        ApiError::InvalidRequest(_) | ApiError::UnsupportedMethod(_) => StatusCode::BAD_REQUEST,
        ApiError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
        ApiError::NotFound(_) => StatusCode::NOT_FOUND,
        ApiError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        ApiError::Timeout => StatusCode::GATEWAY_TIMEOUT,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    if status.is_server_error() {
        error!("Request handling failed: {}", err);
    }
    json_response(status, &json!({ "error": err.to_string() }))
}

use async_trait::async_trait;
use std::time::Duration;
use url::Url;

use crate::domain::{ApiError, Headers, OutboundRequest, OutboundResponse, Result};
use crate::ports::HttpClientPort;

pub struct ReqwestHttpClient {
    client: reqwest::Client,
}

impl ReqwestHttpClient {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ApiError::ConnectionFailed(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { client })
    }
}

#[async_trait]
impl HttpClientPort for ReqwestHttpClient {
    async fn execute(&self, request: &OutboundRequest) -> Result<OutboundResponse> {
        let target = parse_target(&request.url)?;
        let method = reqwest::Method::from_bytes(request.method.as_str().as_bytes())
            .map_err(|e| ApiError::InvalidRequest(format!("Invalid method {}: {}", request.method, e)))?;

        let mut builder = self
            .client
            .request(method, target)
            .headers(build_headers(&request.headers));
        if let Some(body) = &request.body {
            builder = builder.body(body.clone());
        }

        let http_response = builder.send().await.map_err(map_send_error)?;

        let status = http_response.status().as_u16();
        let headers = collect_headers(http_response.headers());

        let body = http_response
            .bytes()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ApiError::Timeout
                } else {
                    ApiError::ConnectionFailed(format!("Failed to read response body: {}", e))
                }
            })?
            .to_vec();

        Ok(OutboundResponse::new(status).with_headers(headers).with_body(body))
    }
}

fn parse_target(raw: &str) -> Result<Url> {
    let url = Url::parse(raw).map_err(|e| ApiError::InvalidUri(format!("{}: {}", raw, e)))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(ApiError::InvalidUri(format!("unsupported scheme {}", other))),
    }
}

fn map_send_error(e: reqwest::Error) -> ApiError {
    if e.is_timeout() {
        ApiError::Timeout
    } else {
        ApiError::ConnectionFailed(format!("HTTP request failed: {}", e))
    }
}

fn build_headers(headers: &Headers) -> reqwest::header::HeaderMap {
    let mut header_map = reqwest::header::HeaderMap::new();

    for (key, value) in headers {
        if let (Ok(name), Ok(val)) = (
            key.parse::<reqwest::header::HeaderName>(),
            value.parse::<reqwest::header::HeaderValue>(),
        ) {
            header_map.insert(name, val);
        } else {
            log::debug!("Skipping invalid header {}", key);
        }
    }

    header_map
}

/// Repeated header names are folded into one comma-separated value.
fn collect_headers(map: &reqwest::header::HeaderMap) -> Headers {
    let mut headers = Headers::new();

    for (name, value) in map {
        if let Ok(value) = value.to_str() {
            headers
                .entry(name.to_string())
                .and_modify(|existing| {
                    existing.push_str(", ");
                    existing.push_str(value);
                })
                .or_insert_with(|| value.to_string());
        }
    }

    headers
}

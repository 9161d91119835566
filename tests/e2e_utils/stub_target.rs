#![cfg(test)]
#![allow(dead_code)]

use http_body_util::{BodyExt, Full};
use hyper::body::{Bytes, Incoming};
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Request, Response};
use hyper_util::rt::TokioIo;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// Minimal target server with a handful of canned endpoints
pub struct StubTarget {
    addr: SocketAddr,
    _handle: JoinHandle<()>,
}

impl StubTarget {
    pub async fn start() -> Result<Self, Box<dyn std::error::Error>> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;

        let handle = tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                tokio::spawn(async move {
                    let _ = http1::Builder::new()
                        .serve_connection(TokioIo::new(stream), service_fn(respond))
                        .await;
                });
            }
        });

        Ok(Self { addr, _handle: handle })
    }

    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

async fn respond(req: Request<Incoming>) -> Result<Response<Full<Bytes>>, hyper::Error> {
    let method = req.method().to_string();
    let path = req.uri().path().to_string();
    let body = req.into_body().collect().await?.to_bytes();

    let (status, content_type, payload) = match path.as_str() {
        "/ok" => (200, "application/json", r#"{"ok":true}"#.to_string()),
        "/bad-json" => (200, "application/json", "{not json".to_string()),
        "/missing" => (404, "text/plain", "no such thing".to_string()),
        "/echo" => {
            let echoed = serde_json::json!({
                "method": method,
                "has_body": !body.is_empty(),
                "body": String::from_utf8_lossy(&body),
            });
            (200, "application/json", echoed.to_string())
        }
        _ => (500, "text/plain", "unexpected path".to_string()),
    };

    let mut response = Response::new(Full::new(Bytes::from(payload)));
    *response.status_mut() = hyper::StatusCode::from_u16(status).unwrap();
    response
        .headers_mut()
        .insert("content-type", hyper::header::HeaderValue::from_static(content_type));
    Ok(response)
}

/// A URL whose port had a listener a moment ago and now refuses connections
pub async fn refused_url(path: &str) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("Should bind ephemeral port");
    let addr = listener.local_addr().expect("Should know local address");
    drop(listener);
    format!("http://{}{}", addr, path)
}

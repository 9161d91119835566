#![cfg(test)]
#![allow(dead_code)]

use serde_json::Value;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use apitester::adapters::{serve, TracingTracker};
use apitester::app::build_adapter;
use apitester::config::AppConfig;

pub struct TestApiServer {
    addr: SocketAddr,
    client: reqwest::Client,
    _server_handle: JoinHandle<()>,
}

impl TestApiServer {
    pub async fn start() -> Result<Self, Box<dyn std::error::Error>> {
        let mut config = AppConfig::default();
        config.outbound.timeout_secs = 5;
        Self::start_with(config).await
    }

    pub async fn start_with(config: AppConfig) -> Result<Self, Box<dyn std::error::Error>> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;

        let adapter = Arc::new(build_adapter(&config, Arc::new(TracingTracker::new()))?);
        let server_handle = tokio::spawn(serve(listener, adapter));

        Ok(Self {
            addr,
            client: reqwest::Client::new(),
            _server_handle: server_handle,
        })
    }

    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    /// POST a proxy description, returning our status code and JSON reply
    pub async fn proxy(&self, description: Value) -> (u16, Value) {
        let response = self
            .client
            .post(self.url("/api/test"))
            .header("content-type", "application/json")
            .body(description.to_string())
            .send()
            .await
            .expect("API server should answer");
        Self::decode(response).await
    }

    pub async fn get(&self, path: &str) -> (u16, Value) {
        let response = self
            .client
            .get(self.url(path))
            .send()
            .await
            .expect("API server should answer");
        Self::decode(response).await
    }

    pub async fn delete(&self, path: &str) -> (u16, Value) {
        let response = self
            .client
            .delete(self.url(path))
            .send()
            .await
            .expect("API server should answer");
        Self::decode(response).await
    }

    async fn decode(response: reqwest::Response) -> (u16, Value) {
        let status = response.status().as_u16();
        let text = response.text().await.expect("Should read response body");
        let json = serde_json::from_str(&text).unwrap_or_else(|e| panic!("Invalid JSON {:?}: {}", text, e));
        (status, json)
    }
}

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::domain::history::DEFAULT_HISTORY_LIMIT;
use crate::domain::MethodPolicy;

pub const APP_NAME: &str = "apitester";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub outbound: OutboundConfig,
    pub history: HistoryConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: String,
    /// Log every incoming API request and its response status
    pub http_logging: bool,
    pub max_body_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:3000".into(),
            http_logging: false,
            max_body_bytes: 1024 * 1024,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutboundConfig {
    pub timeout_secs: u64,
    pub method_policy: MethodPolicy,
}

impl OutboundConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }
}

impl Default for OutboundConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            method_policy: MethodPolicy::Permissive,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    /// When false, requests are still forwarded but nothing is recorded
    pub enabled: bool,
    /// Oldest records are dropped beyond this many; `None` keeps everything
    pub capacity: Option<usize>,
    pub default_limit: usize,
    pub max_limit: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            capacity: Some(1000),
            default_limit: DEFAULT_HISTORY_LIMIT,
            max_limit: DEFAULT_HISTORY_LIMIT,
        }
    }
}

impl AppConfig {
    /// Load from `path` when given, otherwise from the per-user config location.
    /// A missing file is created with defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, confy::ConfyError> {
        match path {
            Some(path) => confy::load_path(path),
            None => confy::load(APP_NAME, "config"),
        }
    }
}

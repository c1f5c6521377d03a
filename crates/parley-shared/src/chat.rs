//! Wire types for the chat HTTP API.

use serde::{Deserialize, Serialize};

/// Body of `POST /chat`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub message: String,
}

/// Which tier produced a reply
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseSource {
    Dataset,
    LocalModel,
    HostedModel,
    Fallback,
}

impl ResponseSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResponseSource::Dataset => "dataset",
            ResponseSource::LocalModel => "local_model",
            ResponseSource::HostedModel => "hosted_model",
            ResponseSource::Fallback => "fallback",
        }
    }
}

impl std::fmt::Display for ResponseSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reply envelope returned for every chat request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatResponse {
    pub response: String,
    pub source: ResponseSource,
}

impl ChatResponse {
    pub fn new(response: impl Into<String>, source: ResponseSource) -> Self {
        Self {
            response: response.into(),
            source,
        }
    }
}

/// Body of `GET /datasets`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetListing {
    pub files: Vec<String>,
    pub count: usize,
}

impl DatasetListing {
    pub fn new(files: Vec<String>) -> Self {
        let count = files.len();
        Self { files, count }
    }
}

/// Body of `GET /health`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
}

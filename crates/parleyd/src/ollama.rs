//! Local-network generation tier backed by Ollama's `/api/generate`.

use crate::config::LocalConfig;
use crate::tiers::{GenerationTier, TierError};
use anyhow::Result;
use async_trait::async_trait;
use parley_shared::chat::ResponseSource;
use std::time::Duration;

/// Non-streaming Ollama client
pub struct OllamaTier {
    client: reqwest::Client,
    endpoint: String,
    model: String,
    timeout_secs: u64,
}

impl OllamaTier {
    pub fn new(config: &LocalConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            model: config.model.clone(),
            timeout_secs: config.timeout_secs,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl GenerationTier for OllamaTier {
    fn source(&self) -> ResponseSource {
        ResponseSource::LocalModel
    }

    async fn generate(&self, prompt: &str) -> Result<String, TierError> {
        let body = serde_json::json!({
            "model": self.model,
            "prompt": prompt,
            "stream": false
        });

        let response = self
            .client
            .post(&self.endpoint)
            .json(&body)
            .send()
            .await
            .map_err(|e| TierError::from_reqwest(e, self.timeout_secs))?;

        if !response.status().is_success() {
            return Err(TierError::Status(response.status().as_u16()));
        }

        let json: serde_json::Value = response
            .json()
            .await
            .map_err(|e| TierError::InvalidJson(e.to_string()))?;

        json.get("response")
            .and_then(|r| r.as_str())
            .map(str::to_string)
            .ok_or(TierError::MissingField("response"))
    }
}

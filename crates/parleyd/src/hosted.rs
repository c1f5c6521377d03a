//! Hosted inference tier (Hugging Face style text generation).
//!
//! Providers disagree on the response body. [`extract_generated_text`]
//! accepts, in order:
//! 1. `[{"generated_text": "..."}]`
//! 2. `{"generated_text": "..."}`
//! 3. `"..."`
//! 4. `{"error": ...}`, reported as [`TierError::Provider`]

use crate::config::HostedConfig;
use crate::tiers::{GenerationTier, TierError};
use anyhow::Result;
use async_trait::async_trait;
use parley_shared::chat::ResponseSource;
use serde_json::Value;
use std::time::Duration;

const GENERATED_TEXT: &str = "generated_text";

pub struct HostedTier {
    client: reqwest::Client,
    endpoint: String,
    token: Option<String>,
    token_env: String,
    max_new_tokens: u32,
    timeout_secs: u64,
}

impl HostedTier {
    /// Build from config, reading the bearer token from the environment now
    pub fn new(config: &HostedConfig) -> Result<Self> {
        Self::with_token(config, config.token())
    }

    pub fn with_token(config: &HostedConfig, token: Option<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            token,
            token_env: config.token_env.clone(),
            max_new_tokens: config.max_new_tokens,
            timeout_secs: config.timeout_secs,
        })
    }

    pub fn has_token(&self) -> bool {
        self.token.is_some()
    }
}

/// Pull the generated text out of a hosted provider's response body
pub fn extract_generated_text(payload: &Value) -> Result<String, TierError> {
    if let Some(text) = payload
        .as_array()
        .and_then(|items| items.first())
        .and_then(|first| first.get(GENERATED_TEXT))
        .and_then(Value::as_str)
    {
        return Ok(text.to_string());
    }

    if let Some(text) = payload.get(GENERATED_TEXT).and_then(Value::as_str) {
        return Ok(text.to_string());
    }

    if let Some(text) = payload.as_str() {
        return Ok(text.to_string());
    }

    if let Some(err) = payload.get("error") {
        let indicator = match err {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        return Err(TierError::Provider(indicator));
    }

    Err(TierError::UnexpectedShape)
}

#[async_trait]
impl GenerationTier for HostedTier {
    fn source(&self) -> ResponseSource {
        ResponseSource::HostedModel
    }

    async fn generate(&self, prompt: &str) -> Result<String, TierError> {
        let token = self
            .token
            .as_deref()
            .ok_or_else(|| TierError::MissingCredential(self.token_env.clone()))?;

        let body = serde_json::json!({
            "inputs": prompt,
            "parameters": { "max_new_tokens": self.max_new_tokens }
        });

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(token)
            .json(&body)
            .send()
            .await
            .map_err(|e| TierError::from_reqwest(e, self.timeout_secs))?;

        let status = response.status();
        let payload: Value = match response.json().await {
            Ok(v) => v,
            Err(_) if !status.is_success() => return Err(TierError::Status(status.as_u16())),
            Err(e) => return Err(TierError::InvalidJson(e.to_string())),
        };

        if !status.is_success() {
            // Loading models answer 503 with an `error` body worth logging
            return match extract_generated_text(&payload) {
                Err(e @ TierError::Provider(_)) => Err(e),
                _ => Err(TierError::Status(status.as_u16())),
            };
        }

        extract_generated_text(&payload)
    }
}

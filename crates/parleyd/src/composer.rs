//! Response composer: dataset, then generation tiers, then the fallback line.
//!
//! `respond` never fails. Each call reloads the dataset from disk, so edits
//! to the dataset directory apply to the next request without a restart.

use crate::config::Config;
use crate::hosted::HostedTier;
use crate::ollama::OllamaTier;
use crate::tiers::{first_reply, GenerationTier};
use anyhow::Result;
use parley_shared::chat::{ChatResponse, ResponseSource};
use parley_shared::dataset::{load_dataset, DatasetEntry};
use parley_shared::matcher::{best_match, MatchPolicy};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

pub struct Responder {
    dataset_dir: PathBuf,
    policy: MatchPolicy,
    tiers: Vec<Box<dyn GenerationTier>>,
    fallback: String,
}

impl Responder {
    pub fn new(
        dataset_dir: impl Into<PathBuf>,
        policy: MatchPolicy,
        tiers: Vec<Box<dyn GenerationTier>>,
        fallback: impl Into<String>,
    ) -> Self {
        Self {
            dataset_dir: dataset_dir.into(),
            policy,
            tiers,
            fallback: fallback.into(),
        }
    }

    /// Build the configured tier chain: local model first, then hosted
    pub fn from_config(config: &Config) -> Result<Self> {
        let mut tiers: Vec<Box<dyn GenerationTier>> = Vec::new();

        if config.local.enabled {
            let tier = OllamaTier::new(&config.local)?;
            info!("Local tier: {} ({})", config.local.endpoint, tier.model());
            tiers.push(Box::new(tier));
        }

        if config.hosted.enabled {
            let tier = HostedTier::new(&config.hosted)?;
            if tier.has_token() {
                info!("Hosted tier: {}", config.hosted.endpoint);
            } else {
                warn!(
                    "Hosted tier has no credential (${} unset), it will be skipped",
                    config.hosted.token_env
                );
            }
            tiers.push(Box::new(tier));
        }

        Ok(Self::new(
            config.dataset.dir.clone(),
            config.matcher.match_policy(),
            tiers,
            config.fallback.message.clone(),
        ))
    }

    pub fn dataset_dir(&self) -> &Path {
        &self.dataset_dir
    }

    /// Answer one message
    pub async fn respond(&self, message: &str) -> ChatResponse {
        let message = message.trim();

        let entries = self.reload_dataset().await;
        if let Some(hit) = best_match(message, &entries, self.policy) {
            info!("Dataset hit (overlap {})", hit.score);
            return ChatResponse::new(hit.entry.response, ResponseSource::Dataset);
        }

        if let Some((source, text)) = first_reply(&self.tiers, message).await {
            info!("Answered by {}", source);
            return ChatResponse::new(text, source);
        }

        info!("All tiers empty, using fallback");
        ChatResponse::new(self.fallback.clone(), ResponseSource::Fallback)
    }

    async fn reload_dataset(&self) -> Vec<DatasetEntry> {
        let dir = self.dataset_dir.clone();
        match tokio::task::spawn_blocking(move || load_dataset(&dir)).await {
            Ok(entries) => entries,
            Err(e) => {
                warn!("Dataset load task failed: {}", e);
                Vec::new()
            }
        }
    }
}

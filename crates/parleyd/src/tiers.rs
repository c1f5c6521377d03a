//! Generation tier abstraction.
//!
//! A tier wraps one remote text-generation service. Tiers report failures as
//! [`TierError`] internally, but the chain only ever sees `Option<String>`:
//! every error, and every blank reply, becomes `None` so a request can always
//! move on to the next tier.

use async_trait::async_trait;
use parley_shared::chat::ResponseSource;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tracing::{debug, warn};

/// Reasons a tier produced no output
#[derive(Debug, Clone, thiserror::Error)]
pub enum TierError {
    #[error("no credential in ${0}")]
    MissingCredential(String),

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("request timeout after {0} seconds")]
    Timeout(u64),

    #[error("HTTP status {0}")]
    Status(u16),

    #[error("invalid JSON response: {0}")]
    InvalidJson(String),

    #[error("response has no `{0}` field")]
    MissingField(&'static str),

    #[error("provider reported error: {0}")]
    Provider(String),

    #[error("unexpected response shape")]
    UnexpectedShape,

    #[error("empty response")]
    Empty,
}

impl TierError {
    /// Map a reqwest failure, keeping timeouts distinct
    pub fn from_reqwest(err: reqwest::Error, timeout_secs: u64) -> Self {
        if err.is_timeout() {
            TierError::Timeout(timeout_secs)
        } else {
            TierError::Http(err.to_string())
        }
    }
}

/// One stage of the fallback chain
#[async_trait]
pub trait GenerationTier: Send + Sync {
    /// Provenance tag attached to replies from this tier
    fn source(&self) -> ResponseSource;

    /// Call the backing service
    async fn generate(&self, prompt: &str) -> Result<String, TierError>;

    /// Call the backing service, collapsing failures and blank output to `None`
    async fn reply(&self, prompt: &str) -> Option<String> {
        match self.generate(prompt).await {
            Ok(text) if !text.trim().is_empty() => Some(text),
            Ok(_) => {
                debug!("{} returned empty output", self.source());
                None
            }
            Err(e @ (TierError::MissingCredential(_) | TierError::Provider(_))) => {
                warn!("{} unavailable: {}", self.source(), e);
                None
            }
            Err(e) => {
                debug!("{} failed: {}", self.source(), e);
                None
            }
        }
    }
}

/// Try each tier in order; the first non-empty reply wins.
///
/// Later tiers are not called once one has answered.
pub async fn first_reply(
    tiers: &[Box<dyn GenerationTier>],
    prompt: &str,
) -> Option<(ResponseSource, String)> {
    for tier in tiers {
        if let Some(text) = tier.reply(prompt).await {
            return Some((tier.source(), text));
        }
    }
    None
}

/// Scripted tier for tests. Clones share responses and the call counter.
#[derive(Clone)]
pub struct FakeTier {
    source: ResponseSource,
    responses: Arc<Mutex<Vec<Result<String, TierError>>>>,
    call_count: Arc<AtomicUsize>,
}

impl FakeTier {
    /// Create a fake tier with pre-defined responses, popped in order.
    /// The last one repeats.
    pub fn new(source: ResponseSource, responses: Vec<Result<String, TierError>>) -> Self {
        Self {
            source,
            responses: Arc::new(Mutex::new(responses)),
            call_count: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn always_ok(source: ResponseSource, text: &str) -> Self {
        Self::new(source, vec![Ok(text.to_string())])
    }

    pub fn always_error(source: ResponseSource, error: TierError) -> Self {
        Self::new(source, vec![Err(error)])
    }

    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl GenerationTier for FakeTier {
    fn source(&self) -> ResponseSource {
        self.source
    }

    async fn generate(&self, _prompt: &str) -> Result<String, TierError> {
        self.call_count.fetch_add(1, Ordering::SeqCst);

        let mut responses = self
            .responses
            .lock()
            .map_err(|_| TierError::Http("fake tier poisoned".to_string()))?;
        match responses.len() {
            0 => Err(TierError::Empty),
            1 => responses[0].clone(),
            _ => responses.remove(0),
        }
    }
}

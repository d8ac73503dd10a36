use crate::config::GenerationConfig;
use crate::error::GenerationError;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Timeout for the reachability check used by health reporting.
const REACHABILITY_TIMEOUT: Duration = Duration::from_secs(3);

#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    response: Option<String>,
    #[serde(default)]
    eval_count: Option<u64>,
    #[serde(default)]
    eval_duration: Option<u64>,
}

/// Client for the Ollama completion API (`POST /api/generate`).
#[derive(Debug, Clone)]
pub struct GenerationClient {
    client: Client,
    base_url: String,
    model: String,
}

impl GenerationClient {
    pub fn new(config: &GenerationConfig) -> Result<Self, GenerationError> {
        let timeout = if config.timeout_secs > 0 {
            Duration::from_secs(config.timeout_secs)
        } else {
            Duration::from_secs(600)
        };

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| GenerationError::Config(format!("failed to create HTTP client: {e}")))?;

        let base_url = config.host.trim_end_matches('/').to_string();

        info!(
            model = %config.model,
            base_url = %base_url,
            timeout_secs = timeout.as_secs(),
            "generation client initialized"
        );

        Ok(Self {
            client,
            base_url,
            model: config.model.clone(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Sends a single non-streaming completion request.
    ///
    /// Returns the trimmed `response` field, or an empty string when the
    /// server omits it.
    pub async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        let url = format!("{}/api/generate", self.base_url);
        let body = GenerateRequest {
            model: &self.model,
            prompt,
            stream: false,
        };

        debug!(
            model = %self.model,
            prompt_chars = prompt.chars().count(),
            "invoking generation API"
        );

        let resp = self.client.post(&url).json(&body).send().await?;

        let status = resp.status();
        if !status.is_success() {
            let error_text = resp.text().await.unwrap_or_default();
            warn!(status = %status, error = %error_text, "generation API error");
            return Err(GenerationError::Status {
                status,
                body: error_text,
            });
        }

        let parsed: GenerateResponse = resp.json().await?;

        if let (Some(eval_count), Some(eval_duration)) = (parsed.eval_count, parsed.eval_duration)
        {
            let tok_per_sec = if eval_duration > 0 {
                (eval_count as f64 / eval_duration as f64) * 1_000_000_000.0
            } else {
                0.0
            };
            debug!(
                eval_tokens = eval_count,
                tok_per_sec = format!("{tok_per_sec:.1}"),
                "generation usage"
            );
        }

        let reply = parsed.response.unwrap_or_default().trim().to_string();
        info!(reply_chars = reply.chars().count(), model = %self.model, "generation reply received");
        Ok(reply)
    }

    /// Checks that the server answers `GET /api/tags` within a few seconds.
    pub async fn check_reachable(&self) -> Result<(), GenerationError> {
        let url = format!("{}/api/tags", self.base_url);
        let resp = self
            .client
            .get(&url)
            .timeout(REACHABILITY_TIMEOUT)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(GenerationError::Status { status, body });
        }
        Ok(())
    }
}

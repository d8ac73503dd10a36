use serde::Deserialize;

fn default_host() -> String {
    "http://localhost:11434".to_string()
}

fn default_model() -> String {
    "llama3:8b".to_string()
}

fn default_timeout_secs() -> u64 {
    600
}

/// Connection settings for the Ollama generation server.
#[derive(Debug, Clone, Deserialize)]
pub struct GenerationConfig {
    /// Base URL of the server, e.g. `http://localhost:11434`.
    #[serde(default = "default_host")]
    pub host: String,
    /// Model tag passed with every request.
    #[serde(default = "default_model")]
    pub model: String,
    /// Request timeout for generation calls. Default: 600 (10 minutes).
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            model: default_model(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

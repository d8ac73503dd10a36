/// Errors raised by the generation client.
#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    /// The HTTP client could not be constructed.
    #[error("invalid generation client configuration: {0}")]
    Config(String),

    /// The server could not be reached or the request timed out.
    #[error("generation request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The server answered with a non-success status.
    #[error("generation server returned {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },
}

//! Error types for the persona catalog, history handling and prompt building.

/// Errors raised when looking up or loading the role/skill catalog.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    /// No role with the given id exists.
    #[error("role not found: {0}")]
    RoleNotFound(String),

    /// No skill with the given id exists.
    #[error("skill not found: {0}")]
    SkillNotFound(String),

    /// The catalog file could not be read.
    #[error("failed to read catalog file: {0}")]
    Read(#[from] std::io::Error),

    /// The catalog file is not valid TOML for the catalog shape.
    #[error("failed to parse catalog file: {0}")]
    Parse(#[from] toml::de::Error),

    /// The catalog parsed but is internally inconsistent.
    #[error("invalid catalog: {0}")]
    Invalid(String),
}

/// Errors raised while turning caller-supplied history into messages.
///
/// Every variant is a client-input problem; a single bad entry rejects the
/// whole history.
#[derive(Debug, thiserror::Error)]
pub enum HistoryError {
    #[error("history must be valid JSON")]
    InvalidJson(#[source] serde_json::Error),

    #[error("history must be a JSON array")]
    NotAnArray,

    #[error("history entry is malformed: {0}")]
    MalformedEntry(#[source] serde_json::Error),
}

/// Errors raised before a prompt is built.
#[derive(Debug, thiserror::Error)]
pub enum PromptError {
    /// The skill needs free text from the caller and none was given.
    #[error("skill {skill_id} requires additional user input")]
    MissingUserInput { skill_id: String },
}

use thiserror::Error;

/// Operational errors. These abort a run (or a request) and never end up
/// inside an `ExecutionResults`.
#[derive(Debug, Error)]
pub enum FlowError {
    // Engine errors
    #[error("workflow has no start node")]
    NoStartNode,

    #[error("no handler registered for node type \"{0}\"")]
    UnregisteredNodeType(String),

    #[error("edge target node \"{0}\" not found")]
    DanglingEdge(String),

    #[error("execution exceeded maximum of {0} steps (possible cycle)")]
    MaxStepsExceeded(usize),

    // Capability errors
    #[error("Weather lookup failed: {0}")]
    Weather(String),

    // Config errors
    #[error("Config error: {0}")]
    Config(String),

    #[error("Config file not found: {0}")]
    ConfigNotFound(String),

    // Storage errors
    #[error("Database error: {0}")]
    Database(String),

    // Gateway errors
    #[error("Gateway error: {0}")]
    Gateway(String),

    // I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // JSON errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, FlowError>;

/// Step-level errors raised by node handlers.
///
/// The engine records these as an `error` step and finishes the run with
/// status `failed`; they are data, not a failure of `execute`.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum NodeError {
    #[error("missing required field: {0}")]
    MissingField(String),

    #[error("field {0} must be a non-empty string")]
    BlankField(String),

    #[error("city \"{0}\" not found in available options")]
    CityNotFound(String),

    #[error("invalid coordinates for city \"{0}\"")]
    InvalidCoordinates(String),

    #[error("weather API error: {0}")]
    Lookup(String),

    #[error("{0} variable not set")]
    MissingVariable(String),

    #[error("{0} is not a number")]
    NotNumeric(String),

    #[error("invalid node metadata \"{key}\": {reason}")]
    Metadata { key: String, reason: String },
}

impl NodeError {
    pub fn metadata(key: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Metadata {
            key: key.into(),
            reason: reason.into(),
        }
    }

    /// True for the form-validation family (absent or blank input field).
    pub fn is_field_error(&self) -> bool {
        matches!(self, Self::MissingField(_) | Self::BlankField(_))
    }
}

pub type NodeResult<T> = std::result::Result<T, NodeError>;

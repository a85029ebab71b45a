//! # Error Types Module
//!
//! This module defines the error types used by the recipe editor and the
//! blend API client. Editor errors are local and recoverable: they are
//! reported to the user and never abort the session.

/// Errors raised by [`crate::editor::RecipeEditor`] operations
#[derive(Debug, Clone, PartialEq)]
pub enum RecipeError {
    /// Percentages do not sum to 100 within tolerance
    RatioMismatch { total: f64 },
    /// No line has both an ingredient and a numeric percentage
    EmptyRecipe,
    /// A line's percentage lies outside `[0, 100]`
    PercentageOutOfRange { index: usize, value: f64 },
    /// Attempt to remove the last remaining line
    MinimumLineGuard,
    /// The external API call failed; carries the error text verbatim
    SubmitTransport(String),
    /// Line index does not exist
    LineIndexOutOfRange { index: usize, len: usize },
    /// A submission is already in flight
    SubmitInProgress,
    /// The recipe was already submitted successfully
    AlreadySubmitted,
}

impl std::fmt::Display for RecipeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RecipeError::RatioMismatch { total } => {
                write!(f, "Ratio mismatch: percentages sum to {total}, expected 100")
            }
            RecipeError::EmptyRecipe => write!(f, "Empty recipe: need at least one valid ingredient"),
            RecipeError::PercentageOutOfRange { index, value } => {
                write!(f, "Line {} has percentage {value}, expected 0 to 100", index + 1)
            }
            RecipeError::MinimumLineGuard => write!(f, "At least one ingredient required"),
            RecipeError::SubmitTransport(msg) => write!(f, "Submit failed: {msg}"),
            RecipeError::LineIndexOutOfRange { index, len } => {
                write!(f, "Line index {index} out of range (recipe has {len} lines)")
            }
            RecipeError::SubmitInProgress => write!(f, "A submission is already in progress"),
            RecipeError::AlreadySubmitted => write!(f, "Recipe was already submitted"),
        }
    }
}

impl std::error::Error for RecipeError {}

impl From<ApiError> for RecipeError {
    fn from(err: ApiError) -> Self {
        RecipeError::SubmitTransport(err.to_string())
    }
}

/// Errors raised by [`crate::api_client::BlendApi`] implementations
#[derive(Debug, Clone, PartialEq)]
pub enum ApiError {
    /// Connection, TLS or timeout failure
    Transport(String),
    /// Server answered with a non-success status
    Status { status: u16, body: String },
    /// Response body could not be decoded
    Decode(String),
    /// Request could not be built (bad base URL, etc.)
    InvalidRequest(String),
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApiError::Transport(msg) => write!(f, "Transport error: {msg}"),
            ApiError::Status { status, body } if body.is_empty() => {
                write!(f, "Server returned status {status}")
            }
            ApiError::Status { status, body } => write!(f, "Server returned status {status}: {body}"),
            ApiError::Decode(msg) => write!(f, "Decode error: {msg}"),
            ApiError::InvalidRequest(msg) => write!(f, "Invalid request: {msg}"),
        }
    }
}

impl std::error::Error for ApiError {}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ApiError::Decode(err.to_string())
        } else if err.is_builder() {
            ApiError::InvalidRequest(err.to_string())
        } else {
            ApiError::Transport(err.to_string())
        }
    }
}

/// Errors raised while loading [`crate::config::AppConfig`]
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// A variable is present but cannot be parsed
    InvalidValue { key: String, value: String },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::InvalidValue { key, value } => {
                write!(f, "Invalid value for {key}: {value:?}")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/*!
 * Error types for the subtrans pipeline.
 *
 * Each pipeline stage has its own error enum, built with thiserror. The
 * orchestrator wraps them in `AppError`, which also knows which stage failed.
 */

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur when working with provider APIs
#[derive(Error, Debug)]
pub enum ProviderError {
    /// Error when making an API request fails
    #[error("API request failed: {0}")]
    RequestFailed(String),

    /// Error when parsing an API response fails
    #[error("Failed to parse API response: {0}")]
    ParseError(String),

    /// Error returned by the API itself
    #[error("API responded with error: {status_code} - {message}")]
    ApiError {
        /// HTTP status code
        status_code: u16,
        /// Error message from the API
        message: String
    },

    /// Error establishing or maintaining a connection
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// Error related to rate limiting
    #[error("Rate limit exceeded: {0}")]
    RateLimitExceeded(String),

    /// Error with authentication
    #[error("Authentication error: {0}")]
    AuthenticationError(String),
}

impl ProviderError {
    /// Classify a non-success HTTP status into the matching variant
    pub fn from_status(status_code: u16, message: String) -> Self {
        match status_code {
            401 | 403 => Self::AuthenticationError(message),
            429 => Self::RateLimitExceeded(message),
            _ => Self::ApiError { status_code, message },
        }
    }

    /// Whether retrying the same request could succeed
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::ConnectionError(_) | Self::RequestFailed(_) | Self::RateLimitExceeded(_) => true,
            Self::ApiError { status_code, .. } => *status_code >= 500,
            Self::ParseError(_) | Self::AuthenticationError(_) => false,
        }
    }
}

impl From<reqwest::Error> for ProviderError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_connect() || error.is_timeout() {
            Self::ConnectionError(error.to_string())
        } else if error.is_decode() {
            Self::ParseError(error.to_string())
        } else {
            Self::RequestFailed(error.to_string())
        }
    }
}

/// Errors about input document contents
#[derive(Error, Debug)]
pub enum SubtitleError {
    /// A timestamp that is not `HH:MM:SS,mmm`
    #[error("Invalid timestamp: {0}")]
    InvalidTimestamp(String),

    /// The document produced no cues and the caller asked to abort on that
    #[error("No caption cues found in {}", .0.display())]
    NoCues(PathBuf),

    /// A plain-text document had nothing to translate and the caller asked to abort on that
    #[error("No text found in {}", .0.display())]
    NoText(PathBuf),
}

/// Errors that can occur during translation
#[derive(Error, Debug)]
pub enum TranslationError {
    /// The capability failed on one cue; translation stopped there
    #[error("Translation failed at cue {index}: {source}")]
    CueFailed {
        /// 1-based position of the failing cue
        index: usize,
        /// Underlying failure
        #[source]
        source: ProviderError,
    },

    /// The capability failed on one paragraph of a plain-text document
    #[error("Translation failed at paragraph {index}: {source}")]
    ParagraphFailed {
        /// 1-based position of the failing paragraph
        index: usize,
        /// Underlying failure
        #[source]
        source: ProviderError,
    },
}

impl TranslationError {
    /// 1-based index of the cue that failed, if the failure was tied to one
    pub fn cue_index(&self) -> Option<usize> {
        match self {
            Self::CueFailed { index, .. } => Some(*index),
            Self::ParagraphFailed { .. } => None,
        }
    }
}

/// Errors raised by the external media muxer
#[derive(Error, Debug)]
pub enum MuxingError {
    /// An input handed to the muxer does not exist
    #[error("Muxing input does not exist: {}", .0.display())]
    MissingInput(PathBuf),

    /// The muxer executable could not be started
    #[error("Failed to launch {program}: {message}")]
    Launch {
        program: String,
        message: String,
    },

    /// The muxer ran and reported failure
    #[error("{program} exited with {status}: {message}")]
    Failed {
        program: String,
        status: String,
        message: String,
    },

    /// The muxer did not finish in time
    #[error("{program} timed out after {secs} seconds")]
    TimedOut {
        program: String,
        secs: u64,
    },
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// Invalid or unreadable configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Error from subtitle processing
    #[error("Subtitle error: {0}")]
    Subtitle(#[from] SubtitleError),

    /// Error from translation
    #[error("Translation error: {0}")]
    Translation(#[from] TranslationError),

    /// Error from the media muxer
    #[error("Muxing error: {0}")]
    Muxing(#[from] MuxingError),

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl AppError {
    /// Name of the pipeline stage the error belongs to
    pub fn stage(&self) -> &'static str {
        match self {
            Self::File(_) => "io",
            Self::Config(_) => "config",
            Self::Subtitle(_) => "parse",
            Self::Translation(_) => "translate",
            Self::Muxing(_) => "mux",
            Self::Unknown(_) => "pipeline",
        }
    }
}

// Utility functions for error conversion
impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::Unknown(format!("{:#}", error))
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::File(error.to_string())
    }
}

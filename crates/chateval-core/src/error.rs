//! Error types for ChatEval

use thiserror::Error;

use crate::replay::TurnMode;

/// Result type alias for ChatEval operations
pub type ChatEvalResult<T> = Result<T, ChatEvalError>;

/// Main error type for ChatEval
#[derive(Error, Debug, Clone)]
pub enum ChatEvalError {
    /// Configuration related errors (missing batch paths, bad grouping mode)
    #[error("Configuration error: {0}")]
    Config(String),

    /// A transcript line without the delimiters its grouping mode needs
    #[error("Malformed transcript line {line} ({mode}): {reason}")]
    MalformedTranscript {
        line: usize,
        mode: TurnMode,
        reason: String,
    },

    /// The conversational agent failed during act/observe
    #[error("Agent error: {agent}: {message}")]
    Agent { agent: String, message: String },

    /// The persona corpus could not produce a persona
    #[error("Persona error: {0}")]
    Persona(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(String),

    /// HTTP request errors
    #[error("HTTP error: {0}")]
    Http(String),

    /// The run was cancelled before it finished
    #[error("Conversation was cancelled")]
    Cancelled,
}

impl ChatEvalError {
    /// Create a new configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a new malformed transcript error
    pub fn malformed(line: usize, mode: TurnMode, reason: impl Into<String>) -> Self {
        Self::MalformedTranscript {
            line,
            mode,
            reason: reason.into(),
        }
    }

    /// Create a new agent error
    pub fn agent(agent: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Agent {
            agent: agent.into(),
            message: message.into(),
        }
    }

    /// Create a new persona error
    pub fn persona(message: impl Into<String>) -> Self {
        Self::Persona(message.into())
    }

    /// Create an IO error that names what was being done
    pub fn io(context: impl std::fmt::Display, error: std::io::Error) -> Self {
        Self::Io(format!("{}: {}", context, error))
    }

    /// Create a new HTTP error
    pub fn http(message: impl Into<String>) -> Self {
        Self::Http(message.into())
    }

    /// Whether this error came from cooperative cancellation
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

impl From<std::io::Error> for ChatEvalError {
    fn from(error: std::io::Error) -> Self {
        Self::Io(error.to_string())
    }
}

impl From<serde_json::Error> for ChatEvalError {
    fn from(error: serde_json::Error) -> Self {
        Self::Json(error.to_string())
    }
}

impl From<reqwest::Error> for ChatEvalError {
    fn from(error: reqwest::Error) -> Self {
        Self::Http(error.to_string())
    }
}

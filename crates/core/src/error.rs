//! Error types for the reporter domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each bounded context has its own error enum; [`Error`] ties them together.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// The top-level error type for all reporter operations.
#[derive(Debug, Error)]
pub enum Error {
    // --- Budget errors (raised before anything is sent) ---
    #[error("Budget error: {0}")]
    Budget(#[from] BudgetError),

    // --- Provider / transport errors ---
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    // --- Context assembly errors ---
    #[error("Context error: {0}")]
    Context(#[from] ContextError),

    // --- Configuration errors ---
    #[error("Configuration error: {message}")]
    Config { message: String },

    // --- Serialization ---
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // --- Generic ---
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Whether the failure happened before any request was submitted
    /// because the context does not fit the configured token limits.
    pub fn is_budget(&self) -> bool {
        matches!(self, Self::Budget(_))
    }
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

// --- Bounded context errors ---

/// Which of the two token ceilings was violated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BudgetKind {
    /// The measured input alone exceeds the input-token limit.
    Input,
    /// Nothing is left of the total budget for reasoning and output.
    Total,
}

impl fmt::Display for BudgetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Input => f.write_str("input"),
            Self::Total => f.write_str("total"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BudgetError {
    #[error("{kind} token budget exceeded: measured {measured} input tokens against a limit of {limit}")]
    Exceeded {
        kind: BudgetKind,
        measured: usize,
        limit: usize,
    },

    #[error("Invalid budget: {0}")]
    Invalid(String),
}

impl BudgetError {
    /// The violated ceiling, if this is an `Exceeded` error.
    pub fn kind(&self) -> Option<BudgetKind> {
        match self {
            Self::Exceeded { kind, .. } => Some(*kind),
            Self::Invalid(_) => None,
        }
    }
}

/// An optional request parameter the service is known to reject for some models.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectedParameter {
    Temperature,
    ReasoningEffort,
}

impl RejectedParameter {
    /// Recognize a parameter rejection from the service's error message.
    ///
    /// Temperature is checked first; the first matching condition wins.
    pub fn from_message(message: &str) -> Option<Self> {
        if message.contains("Unsupported parameter: 'temperature'") {
            return Some(Self::Temperature);
        }
        if message.contains("Unrecognized request argument: reasoning")
            || message.contains("Unsupported parameter: 'reasoning")
        {
            return Some(Self::ReasoningEffort);
        }
        None
    }

    /// Wire name of the parameter.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Temperature => "temperature",
            Self::ReasoningEffort => "reasoning",
        }
    }
}

impl fmt::Display for RejectedParameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    #[error("Request rejected: unsupported parameter '{parameter}' ({message})")]
    ParameterRejected {
        parameter: RejectedParameter,
        message: String,
    },

    #[error("API request failed: {message} (status: {status_code})")]
    ApiError { status_code: u16, message: String },

    #[error("Rate limited by provider, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("Invalid response payload: {0}")]
    InvalidResponse(String),

    #[error("Network error: {0}")]
    Network(String),
}

impl ProviderError {
    /// The rejected parameter, if this error is a recoverable parameter rejection.
    pub fn rejected_parameter(&self) -> Option<RejectedParameter> {
        match self {
            Self::ParameterRejected { parameter, .. } => Some(*parameter),
            _ => None,
        }
    }
}

#[derive(Debug, Error)]
pub enum ContextError {
    #[error("Root directory does not exist or is not a directory: {0}")]
    InvalidRoot(PathBuf),

    #[error("Invalid glob pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },

    #[error("Failed to walk {path}: {reason}")]
    Walk { path: PathBuf, reason: String },

    #[error("No instruction file found in {0}")]
    MissingInstructions(PathBuf),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn budget_error_displays_kind_and_numbers() {
        let err = Error::Budget(BudgetError::Exceeded {
            kind: BudgetKind::Input,
            measured: 150,
            limit: 100,
        });
        let text = err.to_string();
        assert!(text.contains("input"));
        assert!(text.contains("150"));
        assert!(text.contains("100"));
        assert!(err.is_budget());
    }

    #[test]
    fn temperature_rejection_is_recognized() {
        let msg = "Unsupported parameter: 'temperature' is not supported with this model.";
        assert_eq!(
            RejectedParameter::from_message(msg),
            Some(RejectedParameter::Temperature)
        );
    }

    #[test]
    fn reasoning_rejection_is_recognized_in_both_phrasings() {
        assert_eq!(
            RejectedParameter::from_message("Unrecognized request argument: reasoning"),
            Some(RejectedParameter::ReasoningEffort)
        );
        assert_eq!(
            RejectedParameter::from_message("Unsupported parameter: 'reasoning.effort'"),
            Some(RejectedParameter::ReasoningEffort)
        );
    }

    #[test]
    fn temperature_wins_when_both_are_mentioned() {
        let msg = "Unsupported parameter: 'temperature'; Unrecognized request argument: reasoning";
        assert_eq!(
            RejectedParameter::from_message(msg),
            Some(RejectedParameter::Temperature)
        );
    }

    #[test]
    fn unrelated_message_is_not_a_rejection() {
        assert_eq!(RejectedParameter::from_message("model overloaded"), None);
    }

    #[test]
    fn provider_error_displays_correctly() {
        let err = Error::Provider(ProviderError::ApiError {
            status_code: 500,
            message: "Internal Server Error".into(),
        });
        assert!(err.to_string().contains("500"));
        assert!(!err.is_budget());
    }
}

//! Response status, raw payloads and the terminal completion result.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Lifecycle status reported by the completion service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseStatus {
    Queued,
    InProgress,
    Incomplete,
    RequiresAction,
    Completed,
    Failed,
    Cancelled,
    Errored,
    /// Missing or unrecognized status. Treated as terminal for polling.
    Unknown,
}

impl ResponseStatus {
    /// Classify a raw status string, case-insensitively.
    pub fn parse(raw: Option<&str>) -> Self {
        let Some(raw) = raw else {
            return Self::Unknown;
        };
        match raw.trim().to_ascii_lowercase().as_str() {
            "queued" => Self::Queued,
            "in_progress" => Self::InProgress,
            "incomplete" => Self::Incomplete,
            "requires_action" => Self::RequiresAction,
            "completed" => Self::Completed,
            "failed" => Self::Failed,
            "cancelled" => Self::Cancelled,
            "errored" => Self::Errored,
            _ => Self::Unknown,
        }
    }

    /// The service is still working on the response.
    pub fn is_non_terminal(&self) -> bool {
        matches!(
            self,
            Self::Queued | Self::InProgress | Self::Incomplete | Self::RequiresAction
        )
    }

    /// One of the four known final states.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Completed | Self::Failed | Self::Cancelled | Self::Errored
        )
    }

    /// Whether polling must stop on this status (terminal or unknown).
    pub fn stops_polling(&self) -> bool {
        !self.is_non_terminal()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Queued => "queued",
            Self::InProgress => "in_progress",
            Self::Incomplete => "incomplete",
            Self::RequiresAction => "requires_action",
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::Cancelled => "cancelled",
            Self::Errored => "errored",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for ResponseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Token usage reported by the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Usage {
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub total_tokens: u64,
}

/// A raw response body as returned by create or retrieve.
///
/// The shape is not guaranteed to be uniform across providers or model
/// versions, so the JSON is kept as-is and inspected on demand.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResponsePayload(pub Value);

impl ResponsePayload {
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    /// The response identifier, if present and non-empty.
    pub fn id(&self) -> Option<&str> {
        self.0
            .get("id")
            .and_then(Value::as_str)
            .filter(|id| !id.is_empty())
    }

    /// The classified status field.
    pub fn status(&self) -> ResponseStatus {
        ResponseStatus::parse(self.0.get("status").and_then(Value::as_str))
    }

    /// Token usage, if the payload reports it.
    pub fn usage(&self) -> Option<Usage> {
        let usage = self.0.get("usage")?;
        let field = |name: &str| usage.get(name).and_then(Value::as_u64);
        let input_tokens = field("input_tokens").or_else(|| field("prompt_tokens"))?;
        let output_tokens = field("output_tokens")
            .or_else(|| field("completion_tokens"))
            .unwrap_or(0);
        let total_tokens = field("total_tokens").unwrap_or(input_tokens.saturating_add(output_tokens));
        Some(Usage {
            input_tokens,
            output_tokens,
            total_tokens,
        })
    }
}

impl From<Value> for ResponsePayload {
    fn from(value: Value) -> Self {
        Self(value)
    }
}

/// The single terminal artifact produced for every submitted request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionResult {
    pub id: Option<String>,
    pub status: ResponseStatus,
    /// Normalized output text. May be empty even when `status` is completed.
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<Usage>,
}

impl CompletionResult {
    /// The service reports success but no text could be extracted.
    ///
    /// This is a valid outcome, not an error; callers decide what it means.
    pub fn is_empty_completion(&self) -> bool {
        self.status == ResponseStatus::Completed && self.text.trim().is_empty()
    }

    pub fn has_text(&self) -> bool {
        !self.text.trim().is_empty()
    }
}

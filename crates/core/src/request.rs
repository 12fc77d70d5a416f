//! The provider-agnostic request descriptor.
//!
//! Optional fields are `None` unless the target model accepts them *and* the
//! caller asked for them. Absence means "not requested", never "default".

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Reasoning effort requested from reasoning-capable models.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReasoningEffort {
    Low,
    Medium,
    High,
}

/// Output verbosity requested from models that support it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verbosity {
    Low,
    Medium,
    High,
}

macro_rules! level_enum_impls {
    ($ty:ident) => {
        impl $ty {
            pub fn as_str(&self) -> &'static str {
                match self {
                    Self::Low => "low",
                    Self::Medium => "medium",
                    Self::High => "high",
                }
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $ty {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim().to_ascii_lowercase().as_str() {
                    "low" => Ok(Self::Low),
                    "medium" => Ok(Self::Medium),
                    "high" => Ok(Self::High),
                    other => Err(format!(
                        "invalid {} '{}': expected low, medium or high",
                        stringify!($ty),
                        other
                    )),
                }
            }
        }
    };
}

level_enum_impls!(ReasoningEffort);
level_enum_impls!(Verbosity);

/// A fully resolved request, ready to be sent by a transport.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestDescriptor {
    /// Target model identifier (e.g. "gpt-5", "gpt-4o").
    pub model: String,

    /// System-level instructions for the model.
    pub instructions: String,

    /// The assembled prompt.
    pub input: String,

    /// Continuation handle from an earlier response.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_response_id: Option<String>,

    /// Output cap after reconciliation with the remaining token budget.
    pub max_output_tokens: usize,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reasoning_effort: Option<ReasoningEffort>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verbosity: Option<Verbosity>,
}

impl RequestDescriptor {
    /// Names of the optional parameters present in this request, in wire order.
    pub fn optional_parameters(&self) -> Vec<&'static str> {
        let mut names = Vec::new();
        if self.previous_response_id.is_some() {
            names.push("previous_response_id");
        }
        if self.temperature.is_some() {
            names.push("temperature");
        }
        if self.reasoning_effort.is_some() {
            names.push("reasoning");
        }
        if self.verbosity.is_some() {
            names.push("text");
        }
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn levels_parse_case_insensitively() {
        assert_eq!("HIGH".parse::<ReasoningEffort>(), Ok(ReasoningEffort::High));
        assert_eq!(" low ".parse::<Verbosity>(), Ok(Verbosity::Low));
        assert!("extreme".parse::<ReasoningEffort>().is_err());
    }

    #[test]
    fn optional_parameters_lists_only_present_fields() {
        let req = RequestDescriptor {
            model: "gpt-5".into(),
            instructions: "do it".into(),
            input: "prompt".into(),
            previous_response_id: None,
            max_output_tokens: 10,
            temperature: None,
            reasoning_effort: Some(ReasoningEffort::High),
            verbosity: Some(Verbosity::Medium),
        };
        assert_eq!(req.optional_parameters(), vec!["reasoning", "text"]);
    }

    #[test]
    fn absent_fields_are_not_serialized() {
        let req = RequestDescriptor {
            model: "gpt-4o".into(),
            instructions: String::new(),
            input: String::new(),
            previous_response_id: None,
            max_output_tokens: 1,
            temperature: None,
            reasoning_effort: None,
            verbosity: None,
        };
        let json = serde_json::to_value(&req).unwrap();
        assert!(json.get("temperature").is_none());
        assert!(json.get("reasoning_effort").is_none());
    }
}

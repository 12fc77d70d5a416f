//! Plain-text extraction from response payloads.
//!
//! Three shapes are recognized, tried in priority order; a later stage runs
//! only when every earlier one produced empty text:
//!
//! 1. a top-level `output_text` string
//! 2. `output[*].content[*]` items carrying text parts
//! 3. legacy `choices[0].message.content`
//!
//! Extraction never fails; an unrecognized payload yields `""`.

use reporter_core::ResponsePayload;
use serde_json::Value;

/// Part types whose `text` field carries output.
const TEXT_PART_TYPES: [&str; 3] = ["output_text", "input_text", "text"];

/// A recognized payload shape, borrowed from the payload.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ResponseShape<'a> {
    OutputText(&'a str),
    OutputItems(&'a [Value]),
    LegacyChoices(&'a [Value]),
}

impl<'a> ResponseShape<'a> {
    /// Every shape present in `payload`, in priority order.
    pub fn detect(payload: &'a Value) -> Vec<Self> {
        let mut shapes = Vec::with_capacity(3);
        if let Some(text) = payload.get("output_text").and_then(Value::as_str) {
            shapes.push(Self::OutputText(text));
        }
        if let Some(items) = payload.get("output").and_then(Value::as_array) {
            shapes.push(Self::OutputItems(items));
        }
        if let Some(choices) = payload.get("choices").and_then(Value::as_array) {
            shapes.push(Self::LegacyChoices(choices));
        }
        shapes
    }

    /// Text carried by this shape; may be empty.
    pub fn text(&self) -> String {
        match self {
            Self::OutputText(text) => text.trim().trim_matches('`').to_string(),
            Self::OutputItems(items) => items
                .iter()
                .filter_map(|item| item.get("content").and_then(Value::as_array))
                .flatten()
                .map(part_text)
                .collect::<String>()
                .trim()
                .to_string(),
            Self::LegacyChoices(choices) => choices
                .first()
                .and_then(|choice| choice.pointer("/message/content"))
                .and_then(Value::as_str)
                .map(|text| text.trim().to_string())
                .unwrap_or_default(),
        }
    }
}

/// Text of one content part: a typed text part (string or `{value}`), or a
/// bare `content` string. Anything else contributes nothing.
fn part_text(part: &Value) -> &str {
    let typed = part
        .get("type")
        .and_then(Value::as_str)
        .is_some_and(|t| TEXT_PART_TYPES.contains(&t));

    if typed {
        match part.get("text") {
            Some(Value::String(text)) => return text,
            Some(Value::Object(obj)) => {
                if let Some(value) = obj.get("value").and_then(Value::as_str) {
                    return value;
                }
            }
            _ => {}
        }
    }

    part.get("content").and_then(Value::as_str).unwrap_or("")
}

/// Extract the output text from a payload.
pub fn extract_text(payload: &ResponsePayload) -> String {
    ResponseShape::detect(payload.as_value())
        .iter()
        .map(ResponseShape::text)
        .find(|text| !text.is_empty())
        .unwrap_or_default()
}

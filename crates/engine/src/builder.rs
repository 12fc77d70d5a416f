//! Request composition.
//!
//! Optional parameters are gated by [`capabilities_for`]; a parameter the
//! model does not accept is left off and reported in
//! [`BuiltRequest::dropped`] instead of failing the build.

use crate::capabilities::capabilities_for;
use reporter_core::{ReasoningEffort, RequestDescriptor, Verbosity};

/// Inputs for one request, borrowed from the caller.
#[derive(Debug, Clone, Copy)]
pub struct RequestParams<'a> {
    pub model: &'a str,
    pub instructions: &'a str,
    pub prompt: &'a str,
    pub bounded_max_output_tokens: usize,
    pub previous_response_id: Option<&'a str>,
    pub temperature: Option<f32>,
    pub reasoning_effort: Option<ReasoningEffort>,
    pub verbosity: Option<Verbosity>,
}

/// A descriptor plus the wire names of parameters that were requested but
/// left off because the model does not accept them.
#[derive(Debug, Clone, PartialEq)]
pub struct BuiltRequest {
    pub descriptor: RequestDescriptor,
    pub dropped: Vec<&'static str>,
}

/// Build the request descriptor. Pure; never fails.
pub fn build_request(params: RequestParams<'_>) -> BuiltRequest {
    let caps = capabilities_for(params.model);
    let mut dropped = Vec::new();

    let temperature = gate(params.temperature, caps.supports_temperature, "temperature", &mut dropped);
    let reasoning_effort = gate(
        params.reasoning_effort,
        caps.supports_reasoning_effort,
        "reasoning",
        &mut dropped,
    );
    let verbosity = gate(params.verbosity, caps.supports_verbosity, "text", &mut dropped);

    let previous_response_id = params
        .previous_response_id
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(String::from);

    BuiltRequest {
        descriptor: RequestDescriptor {
            model: params.model.to_string(),
            instructions: params.instructions.to_string(),
            input: params.prompt.to_string(),
            previous_response_id,
            max_output_tokens: params.bounded_max_output_tokens,
            temperature,
            reasoning_effort,
            verbosity,
        },
        dropped,
    }
}

fn gate<T>(value: Option<T>, supported: bool, name: &'static str, dropped: &mut Vec<&'static str>) -> Option<T> {
    match value {
        Some(v) if supported => Some(v),
        Some(_) => {
            dropped.push(name);
            None
        }
        None => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(model: &str) -> RequestParams<'_> {
        RequestParams {
            model,
            instructions: "be brief",
            prompt: "hello",
            bounded_max_output_tokens: 2048,
            previous_response_id: None,
            temperature: Some(0.2),
            reasoning_effort: Some(ReasoningEffort::High),
            verbosity: Some(Verbosity::Low),
        }
    }

    #[test]
    fn chat_model_drops_reasoning_and_verbosity() {
        let built = build_request(params("gpt-4o"));
        assert_eq!(built.descriptor.temperature, Some(0.2));
        assert_eq!(built.descriptor.reasoning_effort, None);
        assert_eq!(built.descriptor.verbosity, None);
        assert_eq!(built.dropped, vec!["reasoning", "text"]);
    }

    #[test]
    fn reasoning_model_drops_temperature() {
        let built = build_request(params("gpt-5"));
        assert_eq!(built.descriptor.temperature, None);
        assert_eq!(built.descriptor.reasoning_effort, Some(ReasoningEffort::High));
        assert_eq!(built.descriptor.verbosity, Some(Verbosity::Low));
        assert_eq!(built.dropped, vec!["temperature"]);
    }

    #[test]
    fn unset_parameters_are_not_reported_as_dropped() {
        let mut p = params("gpt-4o");
        p.reasoning_effort = None;
        p.verbosity = None;
        assert!(build_request(p).dropped.is_empty());
    }

    #[test]
    fn core_fields_are_copied() {
        let mut p = params("o3-mini");
        p.previous_response_id = Some("resp_prev");
        let d = build_request(p).descriptor;
        assert_eq!(d.model, "o3-mini");
        assert_eq!(d.instructions, "be brief");
        assert_eq!(d.input, "hello");
        assert_eq!(d.max_output_tokens, 2048);
        assert_eq!(d.previous_response_id.as_deref(), Some("resp_prev"));
    }

    #[test]
    fn blank_previous_response_id_is_omitted() {
        let mut p = params("gpt-5");
        p.previous_response_id = Some("  ");
        assert_eq!(build_request(p).descriptor.previous_response_id, None);
    }
}

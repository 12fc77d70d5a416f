//! Which optional request parameters a model accepts.
//!
//! Families are matched by identifier prefix, longest prefix first, so a
//! more specific family entry overrides a broader one. Identifiers may carry
//! a `vendor/` prefix, which is ignored. Matching is case-insensitive.

use serde::Serialize;

/// Optional parameters a model accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ModelCapabilities {
    pub supports_temperature: bool,
    pub supports_reasoning_effort: bool,
    pub supports_verbosity: bool,
}

impl ModelCapabilities {
    /// What an unrecognized chat model gets: temperature only.
    pub const fn standard() -> Self {
        Self {
            supports_temperature: true,
            supports_reasoning_effort: false,
            supports_verbosity: false,
        }
    }
}

struct FamilyRule {
    prefix: &'static str,
    reasoning_first: bool,
    verbosity: bool,
}

/// Reasoning-first families. Everything else is a standard chat model.
const FAMILIES: &[FamilyRule] = &[
    FamilyRule { prefix: "gpt-5", reasoning_first: true, verbosity: true },
    FamilyRule { prefix: "o1", reasoning_first: true, verbosity: false },
    FamilyRule { prefix: "o3", reasoning_first: true, verbosity: false },
    FamilyRule { prefix: "o4", reasoning_first: true, verbosity: false },
];

/// Identifiers containing these markers opt into the matching parameter.
const REASONING_MARKER: &str = "reasoning";
const VERBOSITY_MARKER: &str = "verbosity";

/// Look up capabilities for a model identifier. Pure and total.
///
/// Reasoning-first models accept a reasoning effort but reject temperature.
pub fn capabilities_for(model: &str) -> ModelCapabilities {
    let normalized = model.trim().to_ascii_lowercase();
    let name = normalized
        .rsplit_once('/')
        .map_or(normalized.as_str(), |(_, name)| name);

    let family = FAMILIES
        .iter()
        .filter(|rule| name.starts_with(rule.prefix))
        .max_by_key(|rule| rule.prefix.len());

    let reasoning_first =
        family.is_some_and(|rule| rule.reasoning_first) || name.contains(REASONING_MARKER);
    let verbosity = family.is_some_and(|rule| rule.verbosity) || name.contains(VERBOSITY_MARKER);

    ModelCapabilities {
        supports_temperature: !reasoning_first,
        supports_reasoning_effort: reasoning_first,
        supports_verbosity: verbosity,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gpt5_family_is_reasoning_first_with_verbosity() {
        for model in ["gpt-5", "gpt-5-mini", "GPT-5-2025-08-07"] {
            let caps = capabilities_for(model);
            assert!(caps.supports_reasoning_effort, "{model}");
            assert!(caps.supports_verbosity, "{model}");
            assert!(!caps.supports_temperature, "{model}");
        }
    }

    #[test]
    fn o_series_takes_reasoning_but_not_verbosity() {
        for model in ["o1", "o1-preview", "o3-mini", "o4-mini"] {
            let caps = capabilities_for(model);
            assert!(caps.supports_reasoning_effort, "{model}");
            assert!(!caps.supports_verbosity, "{model}");
            assert!(!caps.supports_temperature, "{model}");
        }
    }

    #[test]
    fn chat_models_take_temperature_only() {
        assert_eq!(capabilities_for("gpt-4o"), ModelCapabilities::standard());
        assert_eq!(capabilities_for("gpt-4.1-mini"), ModelCapabilities::standard());
    }

    #[test]
    fn unknown_model_is_standard() {
        assert_eq!(capabilities_for("totally-new-model"), ModelCapabilities::standard());
        assert_eq!(capabilities_for(""), ModelCapabilities::standard());
    }

    #[test]
    fn vendor_prefix_is_ignored() {
        assert_eq!(capabilities_for("openai/gpt-5"), capabilities_for("gpt-5"));
        assert_eq!(capabilities_for("openai/gpt-4o"), ModelCapabilities::standard());
    }

    #[test]
    fn markers_in_identifier_enable_parameters() {
        let caps = capabilities_for("acme-reasoning-large");
        assert!(caps.supports_reasoning_effort);
        assert!(!caps.supports_temperature);

        let caps = capabilities_for("acme-verbosity-chat");
        assert!(caps.supports_verbosity);
        assert!(caps.supports_temperature);
    }

    #[test]
    fn family_needs_a_prefix_match() {
        // "o1" inside the name does not make it an o-series model
        assert_eq!(capabilities_for("foo1"), ModelCapabilities::standard());
    }
}

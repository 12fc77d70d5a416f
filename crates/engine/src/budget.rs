//! Token accounting and budget enforcement.
//!
//! Counts come from the model's BPE encoding (`tiktoken-rs`) by default, or
//! from a `tokenizer.json` when one is configured. Measurement never fails:
//! when no encoding is known for the model, or loading it errors, the count
//! falls back to a deterministic heuristic of one token per four characters,
//! rounded up, with a floor of one.

use reporter_core::error::{BudgetError, BudgetKind};
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tiktoken_rs::CoreBPE;
use tracing::{debug, info, warn};

/// Heuristic token count: `max(1, ceil(chars / 4))`.
pub fn heuristic_tokens(text: &str) -> usize {
    text.chars().count().div_ceil(4).max(1)
}

/// A source of token counts.
pub trait TokenCounter: Send + Sync {
    fn name(&self) -> &str;

    /// Count tokens for `model`, or `None` when this counter cannot.
    fn count(&self, text: &str, model: &str) -> Option<usize>;
}

/// The character-based fallback, usable as an explicit counter.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeuristicCounter;

impl TokenCounter for HeuristicCounter {
    fn name(&self) -> &str {
        "heuristic"
    }

    fn count(&self, text: &str, _model: &str) -> Option<usize> {
        Some(heuristic_tokens(text))
    }
}

/// Families that use `o200k_base` but may be missing from the model table
/// shipped with `tiktoken-rs`.
const O200K_FAMILIES: &[&str] = &["gpt-5", "gpt-4.1", "gpt-4.5", "o4"];

/// Model-aware BPE counts for OpenAI models.
///
/// Encodings are loaded on first use and cached per model. Models with no
/// known encoding count as `None`.
#[derive(Default)]
pub struct TiktokenCounter {
    encodings: Mutex<HashMap<String, Option<Arc<CoreBPE>>>>,
}

impl TiktokenCounter {
    pub fn new() -> Self {
        Self::default()
    }

    fn encoding(&self, model: &str) -> Option<Arc<CoreBPE>> {
        let normalized = model.trim().to_ascii_lowercase();
        let name = normalized
            .rsplit_once('/')
            .map_or(normalized.as_str(), |(_, name)| name);

        let mut encodings = self.encodings.lock().ok()?;
        if let Some(cached) = encodings.get(name) {
            return cached.clone();
        }
        let loaded = load_encoding(name).map(Arc::new);
        encodings.insert(name.to_string(), loaded.clone());
        loaded
    }
}

fn load_encoding(name: &str) -> Option<CoreBPE> {
    match tiktoken_rs::get_bpe_from_model(name) {
        Ok(bpe) => Some(bpe),
        Err(_) if O200K_FAMILIES.iter().any(|family| name.starts_with(family)) => {
            tiktoken_rs::o200k_base().ok()
        }
        Err(e) => {
            debug!(model = name, error = %e, "No BPE encoding for model");
            None
        }
    }
}

impl TokenCounter for TiktokenCounter {
    fn name(&self) -> &str {
        "tiktoken"
    }

    fn count(&self, text: &str, model: &str) -> Option<usize> {
        self.encoding(model)
            .map(|bpe| bpe.encode_with_special_tokens(text).len())
    }
}

/// Measures text with an optional tokenizer and the heuristic fallback.
#[derive(Clone)]
pub struct TokenMeter {
    counter: Option<Arc<dyn TokenCounter>>,
}

impl Default for TokenMeter {
    fn default() -> Self {
        Self::tiktoken()
    }
}

impl TokenMeter {
    /// A meter that only uses the heuristic.
    pub fn heuristic() -> Self {
        Self { counter: None }
    }

    /// A meter backed by the model's BPE encoding.
    pub fn tiktoken() -> Self {
        Self::with_counter(Arc::new(TiktokenCounter::new()))
    }

    pub fn with_counter(counter: Arc<dyn TokenCounter>) -> Self {
        Self {
            counter: Some(counter),
        }
    }

    /// Build a meter from an optional `tokenizer.json` override.
    ///
    /// Without one, or when the file cannot be loaded or the `hf-tokenizer`
    /// feature is disabled, the BPE meter is used.
    pub fn from_tokenizer_file(path: Option<&Path>) -> Self {
        let Some(path) = path else {
            return Self::tiktoken();
        };
        #[cfg(feature = "hf-tokenizer")]
        {
            match hf::HfTokenCounter::from_file(path) {
                Ok(counter) => return Self::with_counter(Arc::new(counter)),
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Failed to load tokenizer, using tiktoken");
                }
            }
        }
        #[cfg(not(feature = "hf-tokenizer"))]
        warn!(
            path = %path.display(),
            "Tokenizer support not compiled in (enable the hf-tokenizer feature), using tiktoken"
        );
        Self::tiktoken()
    }

    /// Name of the counter in use.
    pub fn counter_name(&self) -> &str {
        self.counter.as_ref().map_or("heuristic", |c| c.name())
    }

    /// Token count of `text` for `model`. Never fails.
    pub fn measure(&self, text: &str, model: &str) -> usize {
        if let Some(counter) = &self.counter {
            if let Some(tokens) = counter.count(text, model) {
                return tokens;
            }
            debug!(counter = counter.name(), model, "Tokenizer unavailable for model, using heuristic");
        }
        heuristic_tokens(text)
    }
}

impl std::fmt::Debug for TokenMeter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenMeter")
            .field("counter", &self.counter_name())
            .finish()
    }
}

#[cfg(feature = "hf-tokenizer")]
mod hf {
    use super::TokenCounter;
    use std::path::Path;
    use tokenizers::Tokenizer;

    /// Exact counts from a Hugging Face `tokenizer.json`.
    pub struct HfTokenCounter {
        tokenizer: Tokenizer,
    }

    impl HfTokenCounter {
        pub fn from_file(path: &Path) -> Result<Self, String> {
            let tokenizer = Tokenizer::from_file(path).map_err(|e| e.to_string())?;
            Ok(Self { tokenizer })
        }
    }

    impl TokenCounter for HfTokenCounter {
        fn name(&self) -> &str {
            "tokenizer.json"
        }

        fn count(&self, text: &str, _model: &str) -> Option<usize> {
            self.tokenizer.encode(text, false).ok().map(|enc| enc.len())
        }
    }
}

// ── Budget ────────────────────────────────────────────────────────────────

/// Token limits for one invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PromptBudget {
    input_token_limit: usize,
    total_token_budget: usize,
    requested_max_output_tokens: usize,
}

impl PromptBudget {
    /// Both ceilings must be positive.
    pub fn new(
        input_token_limit: usize,
        total_token_budget: usize,
        requested_max_output_tokens: usize,
    ) -> Result<Self, BudgetError> {
        if input_token_limit == 0 {
            return Err(BudgetError::Invalid("input token limit must be > 0".into()));
        }
        if total_token_budget == 0 {
            return Err(BudgetError::Invalid("total token budget must be > 0".into()));
        }
        Ok(Self {
            input_token_limit,
            total_token_budget,
            requested_max_output_tokens,
        })
    }

    pub fn input_token_limit(&self) -> usize {
        self.input_token_limit
    }

    pub fn total_token_budget(&self) -> usize {
        self.total_token_budget
    }

    pub fn requested_max_output_tokens(&self) -> usize {
        self.requested_max_output_tokens
    }

    /// Enforce both ceilings against a measured input size.
    ///
    /// The input check runs first so an oversized input is reported as such
    /// rather than as an exhausted total budget.
    pub fn enforce(&self, measured_input_tokens: usize) -> Result<BudgetReport, BudgetError> {
        if measured_input_tokens > self.input_token_limit {
            return Err(BudgetError::Exceeded {
                kind: BudgetKind::Input,
                measured: measured_input_tokens,
                limit: self.input_token_limit,
            });
        }

        if measured_input_tokens >= self.total_token_budget {
            return Err(BudgetError::Exceeded {
                kind: BudgetKind::Total,
                measured: measured_input_tokens,
                limit: self.total_token_budget,
            });
        }
        let remaining_budget = self.total_token_budget - measured_input_tokens;

        let bounded_max_output_tokens = self.requested_max_output_tokens.min(remaining_budget).max(1);

        Ok(BudgetReport {
            measured_input_tokens,
            remaining_budget,
            requested_max_output_tokens: self.requested_max_output_tokens,
            bounded_max_output_tokens,
        })
    }
}

/// Outcome of a successful budget check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BudgetReport {
    pub measured_input_tokens: usize,
    /// Total budget left for reasoning and output, always > 0.
    pub remaining_budget: usize,
    pub requested_max_output_tokens: usize,
    /// The output cap that goes on the wire.
    pub bounded_max_output_tokens: usize,
}

impl BudgetReport {
    /// Whether the caller's output request had to be lowered.
    pub fn is_capped(&self) -> bool {
        self.bounded_max_output_tokens < self.requested_max_output_tokens
    }
}

// ── Governor ──────────────────────────────────────────────────────────────

/// Measures a prompt and checks it against a [`PromptBudget`].
#[derive(Debug, Clone, Default)]
pub struct TokenGovernor {
    meter: TokenMeter,
}

impl TokenGovernor {
    pub fn new(meter: TokenMeter) -> Self {
        Self { meter }
    }

    pub fn meter(&self) -> &TokenMeter {
        &self.meter
    }

    /// Token count of the text that is actually sent: instructions, a
    /// newline, then the prompt.
    pub fn measure_input(&self, instructions: &str, prompt: &str, model: &str) -> usize {
        let mut text = String::with_capacity(instructions.len() + 1 + prompt.len());
        text.push_str(instructions);
        text.push('\n');
        text.push_str(prompt);
        self.meter.measure(&text, model)
    }

    /// Measure and enforce. Fails fast, before anything is submitted.
    pub fn check(
        &self,
        instructions: &str,
        prompt: &str,
        model: &str,
        budget: &PromptBudget,
    ) -> Result<BudgetReport, BudgetError> {
        let measured = self.measure_input(instructions, prompt, model);
        info!(
            input = measured,
            limit = budget.input_token_limit(),
            total_budget = budget.total_token_budget(),
            counter = self.meter.counter_name(),
            "Token limits"
        );

        let report = budget.enforce(measured)?;
        if report.is_capped() {
            info!(
                requested = report.requested_max_output_tokens,
                bounded = report.bounded_max_output_tokens,
                total_budget = budget.total_token_budget(),
                "Capping max_output_tokens to honor the total token budget"
            );
        }
        Ok(report)
    }
}

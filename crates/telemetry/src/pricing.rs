//! Built-in pricing table for OpenAI models.
//!
//! Prices are in USD per 1 million tokens. Models missing from the table
//! are priced at [`DEFAULT_PRICING`].

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Per-million-token pricing for a model.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ModelPricing {
    /// Price per 1M input tokens in USD.
    pub input_per_m: f64,
    /// Price per 1M output tokens in USD.
    pub output_per_m: f64,
}

impl ModelPricing {
    pub const fn new(input_per_m: f64, output_per_m: f64) -> Self {
        Self {
            input_per_m,
            output_per_m,
        }
    }

    /// Compute cost for the given token counts.
    pub fn cost(&self, input_tokens: u64, output_tokens: u64) -> f64 {
        (input_tokens as f64 * self.input_per_m + output_tokens as f64 * self.output_per_m)
            / 1_000_000.0
    }
}

/// Rate used for models missing from the table.
pub const DEFAULT_PRICING: ModelPricing = ModelPricing::new(5.0, 15.0);

/// Built-in pricing keyed by model family.
#[derive(Debug, Clone)]
pub struct PricingTable {
    prices: HashMap<&'static str, ModelPricing>,
}

impl PricingTable {
    /// Create a pricing table with built-in model prices.
    pub fn with_defaults() -> Self {
        let prices = HashMap::from([
            // ── Reasoning-first ────────────────────────────────────────
            ("gpt-5", ModelPricing::new(1.25, 10.0)),
            ("gpt-5-mini", ModelPricing::new(0.25, 2.0)),
            ("gpt-5-nano", ModelPricing::new(0.05, 0.4)),
            ("o1", ModelPricing::new(15.0, 60.0)),
            ("o1-mini", ModelPricing::new(1.1, 4.4)),
            ("o3", ModelPricing::new(2.0, 8.0)),
            ("o3-mini", ModelPricing::new(1.1, 4.4)),
            ("o4-mini", ModelPricing::new(1.1, 4.4)),
            // ── Chat ───────────────────────────────────────────────────
            ("gpt-4o", ModelPricing::new(2.5, 10.0)),
            ("gpt-4o-mini", ModelPricing::new(0.15, 0.6)),
            ("gpt-4.1", ModelPricing::new(2.0, 8.0)),
            ("gpt-4.1-mini", ModelPricing::new(0.4, 1.6)),
            ("gpt-4.1-nano", ModelPricing::new(0.1, 0.4)),
            ("gpt-4-turbo", ModelPricing::new(10.0, 30.0)),
        ]);
        Self { prices }
    }

    /// Look up pricing for a model, tolerating a `vendor/` prefix and dated
    /// suffixes (`gpt-4o-mini-2024-07-18` matches `gpt-4o-mini`).
    ///
    /// The longest matching key wins. Returns `None` if nothing matches.
    pub fn lookup(&self, model: &str) -> Option<(String, ModelPricing)> {
        let lower = model.trim().to_lowercase();
        let bare = lower.rsplit('/').next().unwrap_or(&lower);

        self.prices
            .iter()
            .filter(|(key, _)| bare.starts_with(*key))
            .max_by_key(|(key, _)| key.len())
            .map(|(key, p)| (key.to_string(), *p))
    }
}

impl Default for PricingTable {
    fn default() -> Self {
        Self::with_defaults()
    }
}

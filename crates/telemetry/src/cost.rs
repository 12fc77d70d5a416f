//! Cost estimates for a single request.

use crate::pricing::{DEFAULT_PRICING, PricingTable};
use reporter_core::Usage;
use serde::Serialize;
use std::fmt;

/// Where the token counts behind an estimate came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CostBasis {
    /// Measured input plus the full output cap, before submission.
    Projected,
    /// Usage reported by the service.
    Reported,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CostEstimate {
    pub model: String,
    /// Table entry used, or `None` when the default rate applied.
    pub priced_as: Option<String>,
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub cost_usd: f64,
    pub basis: CostBasis,
}

impl CostEstimate {
    /// Upper-bound cost before submission: every allowed output token is billed.
    pub fn projected(table: &PricingTable, model: &str, input_tokens: u64, max_output_tokens: u64) -> Self {
        Self::compute(table, model, input_tokens, max_output_tokens, CostBasis::Projected)
    }

    /// Cost from the usage the service reported.
    pub fn from_usage(table: &PricingTable, model: &str, usage: &Usage) -> Self {
        Self::compute(
            table,
            model,
            usage.input_tokens,
            usage.output_tokens,
            CostBasis::Reported,
        )
    }

    fn compute(table: &PricingTable, model: &str, input_tokens: u64, output_tokens: u64, basis: CostBasis) -> Self {
        let (priced_as, pricing) = match table.lookup(model) {
            Some((key, pricing)) => (Some(key), pricing),
            None => {
                tracing::debug!(model, "No pricing for model, using default rate");
                (None, DEFAULT_PRICING)
            }
        };
        Self {
            model: model.to_string(),
            priced_as,
            input_tokens,
            output_tokens,
            cost_usd: pricing.cost(input_tokens, output_tokens),
            basis,
        }
    }
}

impl fmt::Display for CostEstimate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "${:.4} ({} in / {} out",
            self.cost_usd, self.input_tokens, self.output_tokens
        )?;
        if self.priced_as.is_none() {
            f.write_str(", default rate")?;
        }
        f.write_str(")")
    }
}

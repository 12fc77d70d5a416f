//! Cost estimation for reporter.
//!
//! A built-in pricing table maps model identifiers to per-million-token
//! prices. Unknown models are priced at a default rate so an estimate is
//! always available before a request is sent.

pub mod cost;
pub mod pricing;

pub use cost::{CostBasis, CostEstimate};
pub use pricing::{DEFAULT_PRICING, ModelPricing, PricingTable};

//! `reporter capabilities`: Show what a model accepts and what it costs.

use super::CommandResult;
use reporter_engine::capabilities_for;
use reporter_telemetry::{DEFAULT_PRICING, PricingTable};

pub fn run(model: &str, json: bool) -> CommandResult {
    let caps = capabilities_for(model);
    let table = PricingTable::with_defaults();
    let priced = table.lookup(model);

    if json {
        let (priced_as, pricing) = match &priced {
            Some((key, p)) => (Some(key.as_str()), *p),
            None => (None, DEFAULT_PRICING),
        };
        let out = serde_json::json!({
            "model": model,
            "capabilities": caps,
            "priced_as": priced_as,
            "pricing": pricing,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    let mark = |supported: bool| if supported { "✅" } else { "—" };

    println!("🔎 {model}");
    println!("─────────────────────────────────────");
    println!("  temperature:       {}", mark(caps.supports_temperature));
    println!("  reasoning.effort:  {}", mark(caps.supports_reasoning_effort));
    println!("  text.verbosity:    {}", mark(caps.supports_verbosity));
    println!();
    match priced {
        Some((key, p)) => println!(
            "  Pricing ({key}):  ${:.3} in / ${:.3} out per 1M tokens",
            p.input_per_m, p.output_per_m
        ),
        None => println!(
            "  Pricing:  not listed, estimated at ${:.3} in / ${:.3} out per 1M tokens",
            DEFAULT_PRICING.input_per_m, DEFAULT_PRICING.output_per_m
        ),
    }

    Ok(())
}

//! `reporter estimate`: Token and cost estimate without calling the API.

use super::{CommandResult, PromptArgs, assemble};
use clap::Args;
use reporter_engine::{capabilities_for, prepare};
use reporter_telemetry::{CostEstimate, PricingTable};
use std::path::Path;

#[derive(Debug, Clone, Args)]
pub struct EstimateArgs {
    #[command(flatten)]
    pub prompt: PromptArgs,

    /// Print as JSON
    #[arg(long)]
    pub json: bool,
}

pub fn run(args: EstimateArgs, config_path: Option<&Path>) -> CommandResult {
    let assembled = assemble(&args.prompt, config_path)?;
    let request = assembled.completion_request()?;
    let governor = assembled.governor();
    let measured = governor.measure_input(&request.instructions, &request.prompt, &request.model);
    let stats = &assembled.stats;

    // Budget violations are reported, then returned so the exit code reflects them
    let prepared = prepare(&governor, &request);

    if args.json {
        let mut out = serde_json::json!({
            "model": request.model,
            "counter": governor.meter().counter_name(),
            "input_tokens": measured,
            "input_token_limit": request.budget.input_token_limit(),
            "total_token_budget": request.budget.total_token_budget(),
            "files_included": stats.files_included,
            "files_truncated": stats.files_truncated,
            "files_dropped": stats.files_dropped,
            "capabilities": capabilities_for(&request.model),
        });
        match &prepared {
            Ok(p) => {
                let cost = CostEstimate::projected(
                    &PricingTable::with_defaults(),
                    &request.model,
                    p.report.measured_input_tokens as u64,
                    p.report.bounded_max_output_tokens as u64,
                );
                out["max_output_tokens"] = serde_json::json!(p.report.bounded_max_output_tokens);
                out["dropped_parameters"] = serde_json::json!(p.built.dropped);
                out["max_cost"] = serde_json::to_value(&cost)?;
            }
            Err(e) => out["error"] = serde_json::json!(e.to_string()),
        }
        println!("{}", serde_json::to_string_pretty(&out)?);
        prepared?;
        return Ok(());
    }

    println!("📏 Token Estimate ({})", governor.meter().counter_name());
    println!("─────────────────────────────────────");
    println!("  Model:          {}", request.model);
    println!(
        "  Files:          {} included, {} truncated, {} binary, {} dropped",
        stats.files_included, stats.files_truncated, stats.binary_files, stats.files_dropped
    );
    println!(
        "  Input tokens:   {measured} / {} limit",
        request.budget.input_token_limit()
    );
    println!("  Total budget:   {}", request.budget.total_token_budget());

    let prepared = match prepared {
        Ok(p) => p,
        Err(e) => {
            println!("  ⛔ {e}");
            return Err(e.into());
        }
    };

    let report = &prepared.report;
    if report.is_capped() {
        println!(
            "  Output cap:     {} (requested {}, capped by budget)",
            report.bounded_max_output_tokens, report.requested_max_output_tokens
        );
    } else {
        println!("  Output cap:     {}", report.bounded_max_output_tokens);
    }
    if !prepared.built.dropped.is_empty() {
        println!("  Left off:       {}", prepared.built.dropped.join(", "));
    }

    let cost = CostEstimate::projected(
        &PricingTable::with_defaults(),
        &request.model,
        report.measured_input_tokens as u64,
        report.bounded_max_output_tokens as u64,
    );
    println!("  Max cost:       {cost}");
    println!("\n  ✅ Fits the token limits");

    Ok(())
}

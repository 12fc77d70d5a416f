//! One invocation, end to end: budget check, request build, submit and poll.
//!
//! The budget check and build are exposed separately as [`prepare`] so
//! callers can inspect a request without sending anything.

use crate::budget::{BudgetReport, PromptBudget, TokenGovernor};
use crate::builder::{BuiltRequest, RequestParams, build_request};
use crate::engine::CompletionEngine;
use reporter_core::{CompletionResult, ReasoningEffort, Result, Verbosity};
use tracing::info;

/// Per-invocation inputs. Nothing here outlives the call.
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    pub model: String,
    pub instructions: String,
    pub prompt: String,
    pub budget: PromptBudget,
    pub previous_response_id: Option<String>,
    pub temperature: Option<f32>,
    pub reasoning_effort: Option<ReasoningEffort>,
    pub verbosity: Option<Verbosity>,
}

/// A request that passed the budget check, ready to submit.
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedRequest {
    pub report: BudgetReport,
    pub built: BuiltRequest,
}

/// The settled result together with how it was produced.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionOutcome {
    pub result: CompletionResult,
    pub report: BudgetReport,
    /// Wire names of parameters left off for this model.
    pub dropped: Vec<&'static str>,
}

/// Enforce the budget and build the descriptor. No network traffic, so
/// this can run before any transport exists.
pub fn prepare(governor: &TokenGovernor, request: &CompletionRequest) -> Result<PreparedRequest> {
    let report = governor.check(
        &request.instructions,
        &request.prompt,
        &request.model,
        &request.budget,
    )?;

    let built = build_request(RequestParams {
        model: &request.model,
        instructions: &request.instructions,
        prompt: &request.prompt,
        bounded_max_output_tokens: report.bounded_max_output_tokens,
        previous_response_id: request.previous_response_id.as_deref(),
        temperature: request.temperature,
        reasoning_effort: request.reasoning_effort,
        verbosity: request.verbosity,
    });

    for parameter in &built.dropped {
        info!(model = %request.model, parameter, "Model does not accept parameter, leaving it off");
    }

    Ok(PreparedRequest { report, built })
}

pub struct Pipeline {
    governor: TokenGovernor,
    engine: CompletionEngine,
}

impl Pipeline {
    pub fn new(governor: TokenGovernor, engine: CompletionEngine) -> Self {
        Self { governor, engine }
    }

    pub fn governor(&self) -> &TokenGovernor {
        &self.governor
    }

    pub fn prepare(&self, request: &CompletionRequest) -> Result<PreparedRequest> {
        prepare(&self.governor, request)
    }

    /// Submit an already prepared request and poll until it settles.
    pub async fn submit(&self, prepared: PreparedRequest) -> Result<CompletionOutcome> {
        let PreparedRequest { report, built } = prepared;
        let result = self.engine.run(built.descriptor).await?;
        Ok(CompletionOutcome {
            result,
            report,
            dropped: built.dropped,
        })
    }

    /// Run the full lifecycle. A budget violation fails before any
    /// transport call is made.
    pub async fn complete(&self, request: CompletionRequest) -> Result<CompletionOutcome> {
        let prepared = self.prepare(&request)?;
        self.submit(prepared).await
    }
}

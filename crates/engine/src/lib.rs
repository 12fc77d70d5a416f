//! The request lifecycle engine.
//!
//! A single completion goes through four stages:
//!
//! 1. **Budget**: measure `instructions + "\n" + prompt` and enforce the
//!    input-token limit, then the total budget; derive the bounded output cap
//! 2. **Build**: compose a [`RequestDescriptor`](reporter_core::RequestDescriptor)
//!    whose optional parameters follow the model's capabilities
//! 3. **Submit & poll**: send once (with one parameter-rejection retry), then
//!    poll on a fixed interval until a terminal status or the deadline
//! 4. **Normalize**: extract plain text from whichever payload shape came back
//!
//! Nothing is shared between invocations; every call builds a fresh budget
//! and descriptor.

pub mod budget;
pub mod builder;
pub mod capabilities;
pub mod clock;
pub mod engine;
pub mod normalize;
pub mod pipeline;

pub use budget::{
    BudgetReport, HeuristicCounter, PromptBudget, TiktokenCounter, TokenCounter, TokenGovernor, TokenMeter,
};
pub use builder::{BuiltRequest, RequestParams, build_request};
pub use capabilities::{ModelCapabilities, capabilities_for};
pub use clock::{Clock, ManualClock, TokioClock};
pub use engine::{CompletionEngine, PollPolicy};
pub use normalize::{ResponseShape, extract_text};
pub use pipeline::{CompletionOutcome, CompletionRequest, Pipeline, PreparedRequest, prepare};

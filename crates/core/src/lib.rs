//! # Reporter Core
//!
//! Domain types, traits, and error definitions for the reporter completion
//! engine. This crate has **no transport or I/O dependencies**: it defines the
//! model that the context, engine and provider crates implement against.
//!
//! ## Design Philosophy
//!
//! The remote completion service is reached only through the
//! [`ResponsesTransport`] trait defined here. Implementations live in
//! `reporter-providers`. This enables:
//! - Swapping the HTTP backend via configuration
//! - Deterministic tests with scripted transports
//! - A clean dependency graph (all crates depend inward on core)

pub mod context;
pub mod error;
pub mod request;
pub mod response;
pub mod transport;

// Re-export key types at crate root for ergonomics
pub use context::TextBlock;
pub use error::{
    BudgetError, BudgetKind, ContextError, Error, ProviderError, RejectedParameter, Result,
};
pub use request::{ReasoningEffort, RequestDescriptor, Verbosity};
pub use response::{CompletionResult, ResponsePayload, ResponseStatus, Usage};
pub use transport::ResponsesTransport;

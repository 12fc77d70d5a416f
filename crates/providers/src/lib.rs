//! Transport implementations for reporter.
//!
//! All transports implement the `reporter_core::ResponsesTransport` trait:
//! one call to create a response, one to retrieve it by id.

pub mod openai_responses;

pub use openai_responses::OpenAiResponsesTransport;

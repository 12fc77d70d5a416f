//! Transport trait: the abstraction over the remote completion service.
//!
//! A transport knows how to create a response from a [`RequestDescriptor`]
//! and how to retrieve a response by id. It does not poll, retry or
//! normalize; that is the engine's job.
//!
//! Implementations: HTTP Responses API (`reporter-providers`), scripted
//! transports in tests.

use async_trait::async_trait;

use crate::error::ProviderError;
use crate::request::RequestDescriptor;
use crate::response::ResponsePayload;

#[async_trait]
pub trait ResponsesTransport: Send + Sync {
    /// A human-readable name for this transport (e.g., "openai").
    fn name(&self) -> &str;

    /// Submit a request.
    ///
    /// A rejection of a known optional parameter must be reported as
    /// [`ProviderError::ParameterRejected`] so the engine can recover.
    async fn create(
        &self,
        request: &RequestDescriptor,
    ) -> std::result::Result<ResponsePayload, ProviderError>;

    /// Fetch the current state of a previously created response.
    async fn retrieve(&self, response_id: &str)
    -> std::result::Result<ResponsePayload, ProviderError>;
}

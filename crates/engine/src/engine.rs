//! Submit-and-poll lifecycle for a single request.
//!
//! ```text
//! submit ──(rejected optional param, present)──▶ submit again without it
//!   │
//!   ▼
//! Submitted ──(has id and (non-terminal or no text))──▶ Polling ──▶ Terminal
//!   │                                                     │  ▲
//!   └──────────────────(otherwise)────────────────────────┼──┘ (status stops polling
//!                                                         │     or deadline reached)
//!                                                         └─ retrieve, then sleep
//! ```
//!
//! The first retrieve happens immediately after submission; the interval
//! sleep follows each non-terminal retrieve. When the deadline passes the
//! last observed response is returned as-is rather than raised as an error.

use crate::clock::{Clock, TokioClock};
use crate::normalize::extract_text;
use reporter_core::error::{ProviderError, RejectedParameter};
use reporter_core::{CompletionResult, RequestDescriptor, ResponsePayload, ResponseStatus, ResponsesTransport};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Poll interval and overall deadline, measured from submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    pub interval: Duration,
    pub timeout: Duration,
}

impl PollPolicy {
    pub fn from_secs(interval_secs: u64, timeout_secs: u64) -> Self {
        Self {
            interval: Duration::from_secs(interval_secs),
            timeout: Duration::from_secs(timeout_secs),
        }
    }
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self::from_secs(55, 2160)
    }
}

enum State {
    Submitted(ResponsePayload),
    Polling {
        id: String,
        last: ResponsePayload,
        deadline: Duration,
        polls: u32,
    },
    Terminal(ResponsePayload),
}

/// Drives one request from submission to a [`CompletionResult`].
pub struct CompletionEngine {
    transport: Arc<dyn ResponsesTransport>,
    clock: Arc<dyn Clock>,
    policy: PollPolicy,
}

impl CompletionEngine {
    pub fn new(transport: Arc<dyn ResponsesTransport>) -> Self {
        Self {
            transport,
            clock: Arc::new(TokioClock::new()),
            policy: PollPolicy::default(),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_policy(mut self, policy: PollPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> PollPolicy {
        self.policy
    }

    pub fn transport_name(&self) -> &str {
        self.transport.name()
    }

    /// Submit `request` and poll until it settles.
    ///
    /// Only transport failures are errors. Terminal failure statuses and a
    /// reached deadline are reported through the result's status.
    pub async fn run(&self, request: RequestDescriptor) -> Result<CompletionResult, ProviderError> {
        let mut state = State::Submitted(self.submit(request).await?);
        loop {
            state = match state {
                State::Submitted(payload) => self.after_submit(payload),
                State::Polling {
                    id,
                    last,
                    deadline,
                    polls,
                } => self.poll(id, last, deadline, polls).await?,
                State::Terminal(payload) => return Ok(finish(payload)),
            };
        }
    }

    /// Create the response, retrying once if the service rejects an optional
    /// parameter that this request actually carries.
    async fn submit(&self, mut request: RequestDescriptor) -> Result<ResponsePayload, ProviderError> {
        info!(
            transport = self.transport.name(),
            model = %request.model,
            max_output_tokens = request.max_output_tokens,
            params = ?request.optional_parameters(),
            "Submitting request"
        );

        match self.transport.create(&request).await {
            Ok(payload) => Ok(payload),
            Err(err) => match strip_rejected_parameter(&mut request, &err) {
                Some(parameter) => {
                    warn!(
                        model = %request.model,
                        parameter = %parameter,
                        "Model rejected parameter, retrying once without it"
                    );
                    self.transport.create(&request).await
                }
                None => Err(err),
            },
        }
    }

    fn after_submit(&self, payload: ResponsePayload) -> State {
        let status = payload.status();
        let needs_polling = status.is_non_terminal() || extract_text(&payload).is_empty();

        match payload.id().map(String::from) {
            Some(id) if needs_polling => {
                info!(
                    id = %id,
                    status = %status,
                    interval_secs = self.policy.interval.as_secs(),
                    timeout_secs = self.policy.timeout.as_secs(),
                    "Polling for completion"
                );
                State::Polling {
                    id,
                    last: payload,
                    deadline: self.clock.now().saturating_add(self.policy.timeout),
                    polls: 0,
                }
            }
            _ => State::Terminal(payload),
        }
    }

    async fn poll(
        &self,
        id: String,
        last: ResponsePayload,
        deadline: Duration,
        polls: u32,
    ) -> Result<State, ProviderError> {
        if self.clock.now() >= deadline {
            warn!(
                id = %id,
                polls,
                status = %last.status(),
                "Polling deadline reached, returning last observed response"
            );
            return Ok(State::Terminal(last));
        }

        let payload = self.transport.retrieve(&id).await?;
        let polls = polls + 1;
        let status = payload.status();
        debug!(id = %id, poll = polls, status = %status, "Polled response");

        if status.stops_polling() {
            if status == ResponseStatus::Unknown {
                warn!(id = %id, "Unrecognized response status, stopping polling");
            }
            return Ok(State::Terminal(payload));
        }

        self.clock.sleep(self.policy.interval).await;
        Ok(State::Polling {
            id,
            last: payload,
            deadline,
            polls,
        })
    }
}

/// Remove the parameter named by `error` from `request`.
///
/// Returns `None` when the error is not a parameter rejection or the named
/// parameter is absent, in which case a retry would change nothing.
pub(crate) fn strip_rejected_parameter(
    request: &mut RequestDescriptor,
    error: &ProviderError,
) -> Option<RejectedParameter> {
    let parameter = error.rejected_parameter()?;
    let removed = match parameter {
        RejectedParameter::Temperature => request.temperature.take().is_some(),
        RejectedParameter::ReasoningEffort => request.reasoning_effort.take().is_some(),
    };
    removed.then_some(parameter)
}

fn finish(payload: ResponsePayload) -> CompletionResult {
    let result = CompletionResult {
        id: payload.id().map(String::from),
        status: payload.status(),
        text: extract_text(&payload),
        usage: payload.usage(),
    };
    info!(
        id = result.id.as_deref().unwrap_or("-"),
        status = %result.status,
        chars = result.text.len(),
        "Response settled"
    );
    result
}

//! A scripted transport for driving the engine without a network.

#![allow(dead_code)]

use async_trait::async_trait;
use reporter_core::error::ProviderError;
use reporter_core::{RequestDescriptor, ResponsePayload, ResponsesTransport};
use serde_json::{Value, json};
use std::collections::VecDeque;
use std::sync::Mutex;

/// Replays queued create and retrieve outcomes and records every call.
/// When the retrieve script runs out, the last retrieve outcome repeats.
pub struct ScriptedTransport {
    creates: Mutex<VecDeque<Result<ResponsePayload, ProviderError>>>,
    retrieves: Mutex<VecDeque<Result<ResponsePayload, ProviderError>>>,
    last_retrieve: Mutex<Option<Result<ResponsePayload, ProviderError>>>,
    sent: Mutex<Vec<RequestDescriptor>>,
    retrieve_count: Mutex<usize>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self {
            creates: Mutex::new(VecDeque::new()),
            retrieves: Mutex::new(VecDeque::new()),
            last_retrieve: Mutex::new(None),
            sent: Mutex::new(Vec::new()),
            retrieve_count: Mutex::new(0),
        }
    }

    pub fn on_create(self, outcome: Result<Value, ProviderError>) -> Self {
        self.creates
            .lock()
            .unwrap()
            .push_back(outcome.map(ResponsePayload::new));
        self
    }

    pub fn on_retrieve(self, outcome: Result<Value, ProviderError>) -> Self {
        self.retrieves
            .lock()
            .unwrap()
            .push_back(outcome.map(ResponsePayload::new));
        self
    }

    pub fn create_calls(&self) -> usize {
        self.sent.lock().unwrap().len()
    }

    pub fn retrieve_calls(&self) -> usize {
        *self.retrieve_count.lock().unwrap()
    }

    /// Every descriptor passed to `create`, in order.
    pub fn sent(&self) -> Vec<RequestDescriptor> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl ResponsesTransport for ScriptedTransport {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn create(&self, request: &RequestDescriptor) -> Result<ResponsePayload, ProviderError> {
        self.sent.lock().unwrap().push(request.clone());
        self.creates
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(ProviderError::Network("create script exhausted".into())))
    }

    async fn retrieve(&self, _response_id: &str) -> Result<ResponsePayload, ProviderError> {
        *self.retrieve_count.lock().unwrap() += 1;
        let next = self.retrieves.lock().unwrap().pop_front();
        let mut last = self.last_retrieve.lock().unwrap();
        match next {
            Some(outcome) => {
                *last = Some(outcome.clone());
                outcome
            }
            None => last
                .clone()
                .unwrap_or_else(|| Err(ProviderError::Network("retrieve script exhausted".into()))),
        }
    }
}

pub fn response(id: &str, status: &str) -> Value {
    json!({ "id": id, "status": status })
}

pub fn completed(id: &str, text: &str) -> Value {
    json!({
        "id": id,
        "status": "completed",
        "output_text": text,
        "usage": { "input_tokens": 10, "output_tokens": 5, "total_tokens": 15 }
    })
}

pub fn rejection(parameter: reporter_core::RejectedParameter) -> ProviderError {
    let message = match parameter {
        reporter_core::RejectedParameter::Temperature => {
            "Unsupported parameter: 'temperature' is not supported with this model."
        }
        reporter_core::RejectedParameter::ReasoningEffort => "Unrecognized request argument: reasoning",
    };
    ProviderError::ParameterRejected {
        parameter,
        message: message.into(),
    }
}

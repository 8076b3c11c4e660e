// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Channel doubles for coordinator and client tests.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;

use crate::errors::ChannelError;
use crate::proto::{ErrorDetail, FailureKind, Reply, RequestBody};
use crate::traits::ServiceChannel;

/// Answers calls from a queue of scripted outcomes and records every call.
///
/// Once the queue is empty the fallback reply (if any) is returned on every
/// call; without one the call fails as unreachable.
pub struct ScriptedChannel {
    service: String,
    script: Mutex<VecDeque<Result<Reply, ChannelError>>>,
    fallback: Mutex<Option<Reply>>,
    calls: Mutex<Vec<(String, RequestBody)>>,
}

impl ScriptedChannel {
    pub fn new(service: &str) -> Self {
        Self {
            service: service.to_string(),
            script: Mutex::new(VecDeque::new()),
            fallback: Mutex::new(None),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn always(service: &str, reply: Reply) -> Self {
        let channel = Self::new(service);
        *channel.fallback.lock().unwrap() = Some(reply);
        channel
    }

    pub fn push_reply(&self, reply: Reply) {
        self.script.lock().unwrap().push_back(Ok(reply));
    }

    /// Queue a remote failure of the given kind.
    pub fn push_failure(&self, kind: FailureKind, message: &str) {
        let detail = ErrorDetail {
            kind: kind as i32,
            message: message.to_string(),
        };
        let error = ChannelError::remote(&self.service, "scripted", detail);
        self.script.lock().unwrap().push_back(Err(error));
    }

    pub fn push_error(&self, error: ChannelError) {
        self.script.lock().unwrap().push_back(Err(error));
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn operations(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(|(operation, _)| operation.clone())
            .collect()
    }

    pub fn bodies(&self) -> Vec<RequestBody> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(|(_, body)| body.clone())
            .collect()
    }

    /// Text of every `speak` request received.
    pub fn spoken(&self) -> Vec<String> {
        self.bodies()
            .into_iter()
            .filter_map(|body| match body {
                RequestBody::Speak(request) => Some(request.text),
                _ => None,
            })
            .collect()
    }
}

#[async_trait]
impl ServiceChannel for ScriptedChannel {
    fn service_name(&self) -> &str {
        &self.service
    }

    async fn send(&self, operation: &str, body: RequestBody) -> Result<Reply, ChannelError> {
        self.calls
            .lock()
            .unwrap()
            .push((operation.to_string(), body));

        if let Some(outcome) = self.script.lock().unwrap().pop_front() {
            return outcome;
        }
        match self.fallback.lock().unwrap().clone() {
            Some(reply) => Ok(reply),
            None => Err(ChannelError::Unreachable {
                service: self.service.clone(),
                reason: "script exhausted".to_string(),
            }),
        }
    }
}

/// Accepts calls and never answers them.
pub struct HangingChannel {
    service: String,
}

impl HangingChannel {
    pub fn new(service: &str) -> Self {
        Self {
            service: service.to_string(),
        }
    }
}

#[async_trait]
impl ServiceChannel for HangingChannel {
    fn service_name(&self) -> &str {
        &self.service
    }

    async fn send(&self, _operation: &str, _body: RequestBody) -> Result<Reply, ChannelError> {
        std::future::pending().await
    }
}

// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use futures_util::FutureExt;
use serde::Deserialize;
use std::any::Any;
use std::collections::HashMap;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use crate::errors::{RegistrationError, ServiceError};
use crate::observability::messages::service::{DispatchFailed, HandlerReplaced, OperationRegistered};
use crate::observability::messages::StructuredLog;
use crate::proto::{Reply, RequestBody};
use crate::traits::OperationHandler;

/// What `register` does when an operation name is already bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicatePolicy {
    /// The new handler replaces the old one (logged at `warn`).
    #[default]
    LastWins,
    /// The new registration is refused with [`RegistrationError::DuplicateOperation`].
    Reject,
}

/// Operation-name to handler table for one service instance.
///
/// The registry is the remote-side half of a service channel: inbound
/// requests are looked up by operation name and handed to the matching
/// handler. Every failure, including a handler panic, comes back as a
/// [`ServiceError`] for the transport to send to the caller.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use sono_triage::service::ServiceRegistry;
/// use sono_triage::stages::announcer::{AnnouncerHandler, TranscriptSynthesizer};
///
/// let mut registry = ServiceRegistry::new("voice-tts");
/// registry
///     .register("speak", Arc::new(AnnouncerHandler::new(Arc::new(TranscriptSynthesizer))))
///     .unwrap();
///
/// assert!(registry.contains("speak"));
/// assert_eq!(registry.operations(), vec!["speak"]);
/// ```
pub struct ServiceRegistry {
    service: String,
    policy: DuplicatePolicy,
    handlers: HashMap<String, Arc<dyn OperationHandler>>,
}

impl ServiceRegistry {
    pub fn new(service: impl Into<String>) -> Self {
        Self::with_policy(service, DuplicatePolicy::default())
    }

    pub fn with_policy(service: impl Into<String>, policy: DuplicatePolicy) -> Self {
        Self {
            service: service.into(),
            policy,
            handlers: HashMap::new(),
        }
    }

    pub fn service_name(&self) -> &str {
        &self.service
    }

    /// Bind `handler` to `operation`.
    pub fn register(
        &mut self,
        operation: &str,
        handler: Arc<dyn OperationHandler>,
    ) -> Result<(), RegistrationError> {
        if let Some(previous) = self.handlers.get(operation) {
            match self.policy {
                DuplicatePolicy::Reject => {
                    return Err(RegistrationError::DuplicateOperation {
                        service: self.service.clone(),
                        operation: operation.to_string(),
                    });
                }
                DuplicatePolicy::LastWins => HandlerReplaced {
                    service: &self.service,
                    operation,
                    previous: previous.name(),
                    replacement: handler.name(),
                }
                .log(),
            }
        }

        OperationRegistered {
            service: &self.service,
            operation,
            handler: handler.name(),
        }
        .log();

        self.handlers.insert(operation.to_string(), handler);
        Ok(())
    }

    pub fn contains(&self, operation: &str) -> bool {
        self.handlers.contains_key(operation)
    }

    /// Registered operation names, sorted.
    pub fn operations(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.handlers.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Route one request to its handler.
    ///
    /// A request without a body is malformed. A panicking handler is
    /// contained here and reported as [`ServiceError::HandlerPanicked`].
    pub async fn dispatch(
        &self,
        operation: &str,
        body: Option<RequestBody>,
    ) -> Result<Reply, ServiceError> {
        let result = self.dispatch_inner(operation, body).await;

        if let Err(error) = &result {
            DispatchFailed {
                service: &self.service,
                operation,
                error,
            }
            .log();
        }

        result
    }

    async fn dispatch_inner(
        &self,
        operation: &str,
        body: Option<RequestBody>,
    ) -> Result<Reply, ServiceError> {
        let handler = self
            .handlers
            .get(operation)
            .cloned()
            .ok_or_else(|| ServiceError::UnknownOperation {
                service: self.service.clone(),
                operation: operation.to_string(),
            })?;

        let body = body.ok_or_else(|| ServiceError::malformed("body", "is required"))?;

        match AssertUnwindSafe(handler.handle(body)).catch_unwind().await {
            Ok(result) => result,
            Err(panic) => Err(ServiceError::HandlerPanicked {
                operation: operation.to_string(),
                message: panic_message(panic.as_ref()),
            }),
        }
    }
}

impl std::fmt::Debug for ServiceRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceRegistry")
            .field("service", &self.service)
            .field("policy", &self.policy)
            .field("operations", &self.operations())
            .finish()
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proto::{speak_reply, SpeakReply, SpeakRequest};
    use async_trait::async_trait;

    struct Fixed(&'static str, &'static str);

    #[async_trait]
    impl OperationHandler for Fixed {
        async fn handle(&self, _body: RequestBody) -> Result<Reply, ServiceError> {
            Ok(Reply::Speech(SpeakReply {
                outcome: Some(speak_reply::Outcome::Audio(self.1.as_bytes().to_vec())),
            }))
        }

        fn name(&self) -> &'static str {
            self.0
        }
    }

    struct Failing;

    #[async_trait]
    impl OperationHandler for Failing {
        async fn handle(&self, _body: RequestBody) -> Result<Reply, ServiceError> {
            Err(ServiceError::UpstreamUnavailable("synthesis backend down".to_string()))
        }

        fn name(&self) -> &'static str {
            "failing"
        }
    }

    struct Panicking;

    #[async_trait]
    impl OperationHandler for Panicking {
        async fn handle(&self, _body: RequestBody) -> Result<Reply, ServiceError> {
            panic!("handler blew up");
        }

        fn name(&self) -> &'static str {
            "panicking"
        }
    }

    fn speak_body() -> Option<RequestBody> {
        Some(RequestBody::Speak(SpeakRequest {
            text: "hello".to_string(),
        }))
    }

    #[tokio::test]
    async fn unknown_operation_is_a_failure_not_a_crash() {
        let registry = ServiceRegistry::new("voice-tts");

        let err = registry.dispatch("sing", speak_body()).await.unwrap_err();

        assert_eq!(
            err,
            ServiceError::UnknownOperation {
                service: "voice-tts".to_string(),
                operation: "sing".to_string(),
            }
        );
    }

    #[tokio::test]
    async fn last_registration_wins_by_default() {
        let mut registry = ServiceRegistry::new("voice-tts");
        registry.register("speak", Arc::new(Fixed("first", "one"))).unwrap();
        registry.register("speak", Arc::new(Fixed("second", "two"))).unwrap();

        let reply = registry.dispatch("speak", speak_body()).await.unwrap();

        assert_eq!(
            reply,
            Reply::Speech(SpeakReply {
                outcome: Some(speak_reply::Outcome::Audio(b"two".to_vec())),
            })
        );
        assert_eq!(registry.operations(), vec!["speak"]);
    }

    #[test]
    fn strict_policy_rejects_duplicates() {
        let mut registry = ServiceRegistry::with_policy("voice-tts", DuplicatePolicy::Reject);
        registry.register("speak", Arc::new(Fixed("first", "one"))).unwrap();

        let err = registry
            .register("speak", Arc::new(Fixed("second", "two")))
            .unwrap_err();

        assert_eq!(
            err,
            RegistrationError::DuplicateOperation {
                service: "voice-tts".to_string(),
                operation: "speak".to_string(),
            }
        );
    }

    #[tokio::test]
    async fn handler_failure_is_returned_to_caller() {
        let mut registry = ServiceRegistry::new("voice-tts");
        registry.register("speak", Arc::new(Failing)).unwrap();

        let err = registry.dispatch("speak", speak_body()).await.unwrap_err();

        assert!(matches!(err, ServiceError::UpstreamUnavailable(_)));
    }

    #[tokio::test]
    async fn handler_panic_is_contained() {
        let mut registry = ServiceRegistry::new("voice-tts");
        registry.register("speak", Arc::new(Panicking)).unwrap();
        registry.register("echo", Arc::new(Fixed("echo", "still alive"))).unwrap();

        let err = registry.dispatch("speak", speak_body()).await.unwrap_err();
        assert_eq!(
            err,
            ServiceError::HandlerPanicked {
                operation: "speak".to_string(),
                message: "handler blew up".to_string(),
            }
        );

        // The registry keeps serving after the panic.
        assert!(registry.dispatch("echo", speak_body()).await.is_ok());
    }

    #[tokio::test]
    async fn missing_body_is_malformed() {
        let mut registry = ServiceRegistry::new("voice-tts");
        registry.register("speak", Arc::new(Fixed("fixed", "x"))).unwrap();

        let err = registry.dispatch("speak", None).await.unwrap_err();

        assert!(matches!(err, ServiceError::MalformedRequest { field: "body", .. }));
    }
}

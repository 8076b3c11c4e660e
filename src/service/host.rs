// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Serving loop for one service instance.
//!
//! A [`ServiceHost`] owns a [`ServiceRegistry`] and runs it on a single
//! dispatch task fed by a bounded queue. Every transport (in-process or TCP)
//! submits requests through a cloneable [`ServiceHandle`], so however many
//! connections a service has, its handlers still run one at a time.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

use crate::config::consts::DEFAULT_QUEUE_DEPTH;
use crate::errors::ServiceError;
use crate::observability::messages::service::{AbandonedRequestSkipped, ServiceStarted};
use crate::observability::messages::StructuredLog;
use crate::proto::{Reply, RequestBody};
use crate::service::ServiceRegistry;
use crate::transport::LocalChannel;

struct DispatchJob {
    operation: String,
    body: Option<RequestBody>,
    reply: oneshot::Sender<Result<Reply, ServiceError>>,
}

pub struct ServiceHost {
    registry: ServiceRegistry,
    queue_depth: usize,
}

impl ServiceHost {
    pub fn new(registry: ServiceRegistry) -> Self {
        Self {
            registry,
            queue_depth: DEFAULT_QUEUE_DEPTH,
        }
    }

    /// Number of requests that may wait for the dispatcher before callers block.
    pub fn with_queue_depth(mut self, queue_depth: usize) -> Self {
        self.queue_depth = queue_depth.max(1);
        self
    }

    /// Spawn the dispatch task. Must be called from within a Tokio runtime.
    ///
    /// The task runs until every [`ServiceHandle`] (and every channel built
    /// from one) has been dropped.
    pub fn start(self) -> ServiceHandle {
        let (sender, receiver) = mpsc::channel(self.queue_depth);
        let service: Arc<str> = Arc::from(self.registry.service_name());

        ServiceStarted {
            service: &service,
            operations: &self.registry.operations(),
        }
        .log();

        let task = tokio::spawn(dispatch_loop(self.registry, receiver));

        ServiceHandle {
            service,
            sender,
            task: Arc::new(task),
        }
    }
}

async fn dispatch_loop(registry: ServiceRegistry, mut receiver: mpsc::Receiver<DispatchJob>) {
    while let Some(job) = receiver.recv().await {
        // Running it anyway could still have side effects, such as advancing
        // a frame cursor for a frame nobody receives.
        if job.reply.is_closed() {
            AbandonedRequestSkipped {
                service: registry.service_name(),
                operation: &job.operation,
            }
            .log();
            continue;
        }

        let result = registry.dispatch(&job.operation, job.body).await;
        // The caller may have timed out and gone away; nothing to do then.
        let _ = job.reply.send(result);
    }
}

/// Cloneable entry point into a running service.
#[derive(Clone)]
pub struct ServiceHandle {
    service: Arc<str>,
    sender: mpsc::Sender<DispatchJob>,
    task: Arc<JoinHandle<()>>,
}

impl ServiceHandle {
    pub fn service_name(&self) -> &str {
        &self.service
    }

    /// Submit one request and wait for its dispatch result.
    pub async fn call(
        &self,
        operation: &str,
        body: Option<RequestBody>,
    ) -> Result<Reply, ServiceError> {
        let (reply, response) = oneshot::channel();
        let job = DispatchJob {
            operation: operation.to_string(),
            body,
            reply,
        };

        if self.sender.send(job).await.is_err() {
            return Err(self.shutting_down());
        }

        response.await.map_err(|_| self.shutting_down())?
    }

    /// In-process channel to this service with a bounded wait per call.
    pub fn local_channel(&self, call_timeout: Duration) -> LocalChannel {
        LocalChannel::new(self.clone(), call_timeout)
    }

    /// Stop the dispatch task. Pending and future calls fail with
    /// [`ServiceError::ShuttingDown`].
    pub fn abort(&self) {
        self.task.abort();
    }

    fn shutting_down(&self) -> ServiceError {
        ServiceError::ShuttingDown {
            service: self.service.to_string(),
        }
    }
}

impl std::fmt::Debug for ServiceHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceHandle")
            .field("service", &self.service)
            .field("finished", &self.task.is_finished())
            .finish()
    }
}

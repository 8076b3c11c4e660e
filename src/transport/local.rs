// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;
use std::time::Duration;

use crate::errors::{ChannelError, ServiceError};
use crate::proto::{Reply, RequestBody};
use crate::service::ServiceHandle;
use crate::traits::ServiceChannel;

/// Channel to a service hosted in the same process.
///
/// Payloads are moved, never serialized. Failures are mapped exactly as the
/// TCP transport maps them, so callers cannot tell the two apart.
pub struct LocalChannel {
    handle: ServiceHandle,
    call_timeout: Duration,
}

impl LocalChannel {
    pub fn new(handle: ServiceHandle, call_timeout: Duration) -> Self {
        Self {
            handle,
            call_timeout,
        }
    }
}

#[async_trait]
impl ServiceChannel for LocalChannel {
    fn service_name(&self) -> &str {
        self.handle.service_name()
    }

    async fn send(&self, operation: &str, body: RequestBody) -> Result<Reply, ChannelError> {
        let call = self.handle.call(operation, Some(body));

        match tokio::time::timeout(self.call_timeout, call).await {
            Ok(Ok(reply)) => Ok(reply),
            Ok(Err(ServiceError::ShuttingDown { .. })) => Err(ChannelError::Unreachable {
                service: self.service_name().to_string(),
                reason: "service is shutting down".to_string(),
            }),
            Ok(Err(error)) => Err(ChannelError::remote(
                self.service_name(),
                operation,
                error.to_error_detail(),
            )),
            Err(_) => Err(ChannelError::TimedOut {
                service: self.service_name().to_string(),
                operation: operation.to_string(),
                timeout: self.call_timeout,
            }),
        }
    }
}

// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! TCP transport: [`TcpChannel`] on the caller side, [`serve`] on the service side.
//!
//! One connection carries one call at a time. A call that fails or times out
//! drops its connection, so a late reply can never be read as the answer to
//! the next call; the next call dials again.

use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::Mutex;
use tokio_util::codec::{Framed, LengthDelimitedCodec};

use crate::errors::{ChannelError, ServiceError};
use crate::observability::messages::service::{ConnectionClosed, ListenerStarted};
use crate::observability::messages::StructuredLog;
use crate::proto::{Reply, RequestBody, StageRequest, StageResponse};
use crate::service::ServiceHandle;
use crate::traits::ServiceChannel;
use crate::transport::wire;

type Connection = Framed<TcpStream, LengthDelimitedCodec>;

pub struct TcpChannel {
    service: String,
    address: String,
    call_timeout: Duration,
    max_frame_bytes: usize,
    next_request_id: AtomicU64,
    connection: Mutex<Option<Connection>>,
}

impl TcpChannel {
    /// Create a channel; no connection is made until the first call.
    pub fn new(
        service: impl Into<String>,
        address: impl Into<String>,
        call_timeout: Duration,
        max_frame_bytes: usize,
    ) -> Self {
        Self {
            service: service.into(),
            address: address.into(),
            call_timeout,
            max_frame_bytes,
            next_request_id: AtomicU64::new(1),
            connection: Mutex::new(None),
        }
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    fn unreachable(&self, reason: impl ToString) -> ChannelError {
        ChannelError::Unreachable {
            service: self.service.clone(),
            reason: reason.to_string(),
        }
    }

    async fn exchange(
        &self,
        slot: &mut Option<Connection>,
        request: StageRequest,
    ) -> Result<StageResponse, ChannelError> {
        if slot.is_none() {
            let stream = TcpStream::connect(&self.address)
                .await
                .map_err(|e| self.unreachable(format!("connect to {}: {}", self.address, e)))?;
            let _ = stream.set_nodelay(true);
            *slot = Some(Framed::new(stream, wire::codec(self.max_frame_bytes)));
        }
        let Some(connection) = slot.as_mut() else {
            return Err(self.unreachable("connection unavailable"));
        };

        connection
            .send(wire::encode_request(&request))
            .await
            .map_err(|e| self.unreachable(e))?;

        let frame = match connection.next().await {
            Some(Ok(frame)) => frame,
            Some(Err(e)) => return Err(self.unreachable(e)),
            None => return Err(self.unreachable("connection closed by peer")),
        };

        let response = wire::decode_response(&frame).map_err(|e| ChannelError::MalformedReply {
            service: self.service.clone(),
            operation: request.operation.clone(),
            reason: e.to_string(),
        })?;

        if response.request_id != request.request_id {
            return Err(ChannelError::MalformedReply {
                service: self.service.clone(),
                operation: request.operation,
                reason: format!(
                    "reply for request {} arrived for request {}",
                    response.request_id, request.request_id
                ),
            });
        }

        Ok(response)
    }
}

#[async_trait]
impl ServiceChannel for TcpChannel {
    fn service_name(&self) -> &str {
        &self.service
    }

    async fn send(&self, operation: &str, body: RequestBody) -> Result<Reply, ChannelError> {
        let request = StageRequest {
            request_id: self.next_request_id.fetch_add(1, Ordering::Relaxed),
            operation: operation.to_string(),
            body: Some(body),
        };

        let mut slot = self.connection.lock().await;
        let outcome = tokio::time::timeout(self.call_timeout, self.exchange(&mut slot, request)).await;

        match outcome {
            Ok(Ok(response)) => wire::reply_from_response(&self.service, operation, response),
            Ok(Err(error)) => {
                *slot = None;
                Err(error)
            }
            Err(_) => {
                *slot = None;
                Err(ChannelError::TimedOut {
                    service: self.service.clone(),
                    operation: operation.to_string(),
                    timeout: self.call_timeout,
                })
            }
        }
    }
}

/// Accept connections forever, feeding every request to `handle`.
///
/// Only a failure to read the listener's own address is returned; accept
/// errors are logged and retried.
pub async fn serve(
    handle: ServiceHandle,
    listener: TcpListener,
    max_frame_bytes: usize,
) -> std::io::Result<()> {
    let address = listener.local_addr()?.to_string();
    ListenerStarted {
        service: handle.service_name(),
        address: &address,
    }
    .log();

    loop {
        match listener.accept().await {
            Ok((stream, peer)) => {
                let _ = stream.set_nodelay(true);
                tokio::spawn(serve_connection(handle.clone(), stream, peer, max_frame_bytes));
            }
            Err(error) => {
                tracing::warn!(service = handle.service_name(), %error, "accept failed");
                tokio::time::sleep(Duration::from_millis(100)).await;
            }
        }
    }
}

async fn serve_connection(
    handle: ServiceHandle,
    stream: TcpStream,
    peer: SocketAddr,
    max_frame_bytes: usize,
) {
    let peer = peer.to_string();
    let mut connection = Framed::new(stream, wire::codec(max_frame_bytes));

    let reason = loop {
        let frame = match connection.next().await {
            Some(Ok(frame)) => frame,
            Some(Err(error)) => break error.to_string(),
            None => break "peer hung up".to_string(),
        };

        let response = match wire::decode_request(&frame) {
            Ok(request) => {
                let result = handle.call(&request.operation, request.body).await;
                wire::response_for(request.request_id, result)
            }
            Err(error) => wire::response_for(0, Err(ServiceError::malformed("frame", error.to_string()))),
        };

        if let Err(error) = connection.send(wire::encode_response(&response)).await {
            break error.to_string();
        }
    };

    ConnectionClosed {
        service: handle.service_name(),
        peer: &peer,
        reason: &reason,
    }
    .log();
}

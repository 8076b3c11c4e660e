use async_trait::async_trait;

use crate::errors::ChannelError;
use crate::proto::{Reply, RequestBody};

/// Point-to-point request/response link to one named remote service.
///
/// A call is a single logical round trip: the caller suspends until exactly
/// one reply or one failure arrives for that call. Implementations never
/// retry and must bound the wait, converting a silent peer into
/// [`ChannelError::TimedOut`].
#[async_trait]
pub trait ServiceChannel: Send + Sync {
    /// Name of the service on the other end of this channel.
    fn service_name(&self) -> &str;

    /// Send `operation` with `body` and await its reply.
    async fn send(&self, operation: &str, body: RequestBody) -> Result<Reply, ChannelError>;
}

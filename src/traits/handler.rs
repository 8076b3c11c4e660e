use async_trait::async_trait;

use crate::errors::ServiceError;
use crate::proto::{Reply, RequestBody};

/// Service-side implementation of one named operation.
///
/// Handlers are registered with a [`ServiceRegistry`](crate::service::ServiceRegistry)
/// and invoked one at a time per service instance.
#[async_trait]
pub trait OperationHandler: Send + Sync {
    async fn handle(&self, body: RequestBody) -> Result<Reply, ServiceError>;

    fn name(&self) -> &'static str;
}

pub mod channel;
pub mod handler;

pub use channel::ServiceChannel;
pub use handler::OperationHandler;

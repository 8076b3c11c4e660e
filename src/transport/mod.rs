// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Service channel transports.
//!
//! * [`LocalChannel`] - in-process, talks to a [`ServiceHandle`](crate::service::ServiceHandle) directly
//! * [`TcpChannel`] - length-delimited protobuf frames over TCP, served by [`tcp::serve`]
//!
//! Both implement [`ServiceChannel`](crate::traits::ServiceChannel) and bound
//! every call with the configured timeout.

mod local;
pub mod tcp;
pub mod wire;

pub use local::LocalChannel;
pub use tcp::TcpChannel;

// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub mod config;     // config + runtime wiring
pub mod engine;     // coordinator
pub mod errors;     // error handling
pub mod observability;
pub mod proto;      // wire messages
pub mod service;    // registry + dispatch host
pub mod stages;     // stage contracts, handlers, clients
pub mod traits;     // unified abstractions
pub mod transport;  // local + tcp channels

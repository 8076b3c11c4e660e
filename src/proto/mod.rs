// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

// Module declaration for the stage protocol messages
#[path = "stage.v1.rs"]
pub mod stage_v1;

mod reply;

// Re-export the types for easier access
pub use reply::Reply;
pub use stage_v1::stage_request::Body as RequestBody;
pub use stage_v1::*;

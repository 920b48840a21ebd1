// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Record stores fed by interceptor events

mod console;
mod network;
mod record;

pub use console::LogStore;
pub use network::{NetworkStore, StoreConfig};
pub use record::{
    Direction, HttpRecord, LogRecord, NetworkRecord, SocketMessage, WebSocketRecord,
};

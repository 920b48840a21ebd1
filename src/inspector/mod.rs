// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Inspectors wiring interceptors to record stores

mod config;
mod console;
mod network;

pub use config::InspectorConfig;
pub use console::ConsoleInspector;
pub use network::NetworkInspector;

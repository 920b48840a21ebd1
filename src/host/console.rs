// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Host console

use serde::{Deserialize, Serialize};

use crate::value::JsValue;

/// The ten console functions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ConsoleLevel {
    Error,
    Info,
    Log,
    Warn,
    Trace,
    Debug,
    Table,
    Group,
    GroupCollapsed,
    GroupEnd,
}

impl ConsoleLevel {
    pub const ALL: [ConsoleLevel; 10] = [
        ConsoleLevel::Error,
        ConsoleLevel::Info,
        ConsoleLevel::Log,
        ConsoleLevel::Warn,
        ConsoleLevel::Trace,
        ConsoleLevel::Debug,
        ConsoleLevel::Table,
        ConsoleLevel::Group,
        ConsoleLevel::GroupCollapsed,
        ConsoleLevel::GroupEnd,
    ];

    /// Console function name
    pub fn as_str(&self) -> &'static str {
        match self {
            ConsoleLevel::Error => "error",
            ConsoleLevel::Info => "info",
            ConsoleLevel::Log => "log",
            ConsoleLevel::Warn => "warn",
            ConsoleLevel::Trace => "trace",
            ConsoleLevel::Debug => "debug",
            ConsoleLevel::Table => "table",
            ConsoleLevel::Group => "group",
            ConsoleLevel::GroupCollapsed => "groupCollapsed",
            ConsoleLevel::GroupEnd => "groupEnd",
        }
    }
}

impl std::fmt::Display for ConsoleLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Host console object
pub trait Console: Send + Sync {
    /// Invoke the console function for `level`
    fn call(&self, level: ConsoleLevel, args: &[JsValue]);

    fn log(&self, args: &[JsValue]) {
        self.call(ConsoleLevel::Log, args)
    }

    fn info(&self, args: &[JsValue]) {
        self.call(ConsoleLevel::Info, args)
    }

    fn warn(&self, args: &[JsValue]) {
        self.call(ConsoleLevel::Warn, args)
    }

    fn error(&self, args: &[JsValue]) {
        self.call(ConsoleLevel::Error, args)
    }

    fn debug(&self, args: &[JsValue]) {
        self.call(ConsoleLevel::Debug, args)
    }
}

/// Console that writes through `tracing`
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingConsole;

impl Console for TracingConsole {
    fn call(&self, level: ConsoleLevel, args: &[JsValue]) {
        let message = args
            .iter()
            .map(|v| v.to_string_value())
            .collect::<Vec<_>>()
            .join(" ");

        match level {
            ConsoleLevel::Error => tracing::error!(target: "xenon::console", "{}", message),
            ConsoleLevel::Warn => tracing::warn!(target: "xenon::console", "{}", message),
            ConsoleLevel::Info => tracing::info!(target: "xenon::console", "{}", message),
            ConsoleLevel::Debug => tracing::debug!(target: "xenon::console", "{}", message),
            ConsoleLevel::Trace => tracing::trace!(target: "xenon::console", "{}", message),
            other => tracing::info!(target: "xenon::console", level = other.as_str(), "{}", message),
        }
    }
}

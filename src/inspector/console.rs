// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Console inspector

use std::sync::Arc;

use super::config::InspectorConfig;
use crate::error::Result;
use crate::host::HostRuntime;
use crate::interceptor::{ConsoleInterceptor, Interceptor};
use crate::store::{LogRecord, LogStore};

/// Captures console calls into a [`LogStore`]
pub struct ConsoleInspector {
    config: InspectorConfig,
    interceptor: Arc<ConsoleInterceptor>,
    store: Arc<LogStore>,
}

impl ConsoleInspector {
    /// Inspector over the process-wide console interceptor
    pub fn new(config: InspectorConfig) -> Self {
        Self::from_parts(config, ConsoleInterceptor::instance())
    }

    /// Inspector with its own interceptor bound to `host`
    pub fn with_host(host: Arc<HostRuntime>, config: InspectorConfig) -> Self {
        Self::from_parts(config, Arc::new(ConsoleInterceptor::new(host)))
    }

    fn from_parts(config: InspectorConfig, interceptor: Arc<ConsoleInterceptor>) -> Self {
        let store = Arc::new(LogStore::new(config.max_records));
        let inspector = Self {
            config,
            interceptor,
            store,
        };
        if inspector.config.auto_enabled {
            inspector.enable_interception();
        }
        inspector
    }

    pub fn enable_interception(&self) {
        let store = Arc::clone(&self.store);
        self.interceptor
            .set_callback(Arc::new(move |level, args| {
                store.push(level, args);
            }))
            .enable_interception();
    }

    pub fn disable_interception(&self) {
        self.interceptor.disable_interception();
    }

    pub fn is_interceptor_enabled(&self) -> bool {
        self.interceptor.is_interceptor_enabled()
    }

    pub fn clear_all(&self) {
        self.store.clear();
    }

    pub fn logs(&self) -> Vec<LogRecord> {
        self.store.records()
    }

    pub fn store(&self) -> &Arc<LogStore> {
        &self.store
    }

    pub fn to_json(&self) -> Result<String> {
        self.store.to_json()
    }
}

impl Drop for ConsoleInspector {
    fn drop(&mut self) {
        if self.config.auto_enabled {
            self.disable_interception();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::testing::{RecordingConsole, ScriptedXhrBackend};
    use crate::host::ConsoleLevel;
    use crate::value::JsValue;

    fn host_with(console: Arc<RecordingConsole>) -> Arc<HostRuntime> {
        HostRuntime::builder()
            .xhr_backend(Arc::new(ScriptedXhrBackend::default()))
            .console(console)
            .build()
    }

    #[test]
    fn test_captures_and_forwards() {
        let native = Arc::new(RecordingConsole::default());
        let host = host_with(native.clone());
        let inspector = ConsoleInspector::with_host(host.clone(), InspectorConfig::default());
        inspector.enable_interception();

        host.log(ConsoleLevel::Error, &[JsValue::from("boom"), JsValue::from(1)]);
        host.log(ConsoleLevel::GroupEnd, &[]);

        let logs = inspector.logs();
        assert_eq!(logs.len(), 2);
        assert_eq!(logs[0].message(), "ERROR: boom, 1");
        assert_eq!(logs[1].level, ConsoleLevel::GroupEnd);
        assert_eq!(native.calls().len(), 2);
    }

    #[test]
    fn test_disabled_inspector_records_nothing() {
        let native = Arc::new(RecordingConsole::default());
        let host = host_with(native.clone());
        let inspector = ConsoleInspector::with_host(host.clone(), InspectorConfig::default());
        inspector.enable_interception();
        inspector.disable_interception();

        host.log(ConsoleLevel::Log, &[JsValue::from("quiet")]);
        assert!(inspector.logs().is_empty());
        assert_eq!(native.calls().len(), 1);
    }

    #[test]
    fn test_auto_enabled_restores_on_drop() {
        let native = Arc::new(RecordingConsole::default());
        let host = host_with(native.clone());
        let original = host.console();
        {
            let inspector =
                ConsoleInspector::with_host(host.clone(), InspectorConfig::new().auto_enabled(true));
            assert!(inspector.is_interceptor_enabled());
            host.log(ConsoleLevel::Info, &[]);
            assert_eq!(inspector.logs().len(), 1);
        }
        assert!(host.console_slot().is(&original));
    }
}

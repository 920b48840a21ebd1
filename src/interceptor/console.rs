// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Console interceptor

use std::sync::Arc;

use lazy_static::lazy_static;

use super::base::{Interceptor, InterceptorState};
use crate::host::{Console, ConsoleLevel, HostRuntime};
use crate::value::JsValue;

lazy_static! {
    static ref INSTANCE: Arc<ConsoleInterceptor> =
        Arc::new(ConsoleInterceptor::new(HostRuntime::global()));
}

/// `callback(level, args)`
pub type ConsoleCallback = Arc<dyn Fn(ConsoleLevel, &[JsValue]) + Send + Sync>;

/// Handler registry of the console interceptor
#[derive(Clone, Default)]
pub struct ConsoleHandlers {
    pub callback: Option<ConsoleCallback>,
}

/// Intercepts all ten console functions
pub struct ConsoleInterceptor {
    host: Arc<HostRuntime>,
    original: Arc<dyn Console>,
    replacement: Arc<dyn Console>,
    state: Arc<InterceptorState<ConsoleHandlers>>,
}

impl ConsoleInterceptor {
    /// Bind to `host`, capturing its current console as the original
    pub fn new(host: Arc<HostRuntime>) -> Self {
        let original = host.console_slot().get();
        let state = Arc::new(InterceptorState::new("console"));
        let replacement: Arc<dyn Console> = Arc::new(InterceptedConsole {
            original: Arc::clone(&original),
            state: Arc::clone(&state),
        });

        Self {
            host,
            original,
            replacement,
            state,
        }
    }

    /// Process-wide interceptor bound to [`HostRuntime::global`]
    pub fn instance() -> Arc<ConsoleInterceptor> {
        Arc::clone(&INSTANCE)
    }

    /// Console captured at construction
    pub fn original(&self) -> &Arc<dyn Console> {
        &self.original
    }

    pub fn set_callback(&self, callback: ConsoleCallback) -> &Self {
        self.state.update(|h| h.callback = Some(callback));
        self
    }
}

impl Interceptor for ConsoleInterceptor {
    fn enable_interception(&self) {
        self.state.enable_with(|| {
            self.host
                .console_slot()
                .patch(self.state.owner(), Arc::clone(&self.replacement))
        });
    }

    fn disable_interception(&self) {
        self.state.disable_with(|| {
            self.host
                .console_slot()
                .restore(self.state.owner(), Arc::clone(&self.original));
        });
    }

    fn is_interceptor_enabled(&self) -> bool {
        self.state.is_enabled()
    }
}

struct InterceptedConsole {
    original: Arc<dyn Console>,
    state: Arc<InterceptorState<ConsoleHandlers>>,
}

impl Console for InterceptedConsole {
    fn call(&self, level: ConsoleLevel, args: &[JsValue]) {
        self.state.emit("console", |h| {
            if let Some(cb) = &h.callback {
                cb(level, args);
            }
        });

        self.original.call(level, args)
    }
}

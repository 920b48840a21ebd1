// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Host runtime model
//!
//! The host owns one patchable slot per process-wide primitive: the
//! request-object prototype, the fetch function, the native WebSocket
//! module and the console. Host code always goes through the slot, so an
//! interceptor replacing the slot's contents sees every call.

mod clock;
mod console;
mod fetch;
mod headers;
mod slot;
mod websocket;
mod xhr;

#[cfg(test)]
pub(crate) mod testing;

use std::sync::Arc;

use lazy_static::lazy_static;

pub use clock::{Clock, ManualClock, SystemClock};
pub use console::{Console, ConsoleLevel, TracingConsole};
pub use fetch::{Fetch, FetchInput, FetchRequest, FetchResponse, RequestInit, ResponseType, XhrFetch};
pub use headers::{Headers, HeadersInit};
pub use slot::{Patchable, PatchOwner};
pub use websocket::{
    EventListener, MessageKind, NativeEventEmitter, NativeWebSocket, Subscription,
    UnavailableWebSocket, WebSocketChannel, WebSocketEvent, WebSocketOptions,
};
pub use xhr::{NativeXhr, ReadyState, ReadyStateListener, XhrBackend, XhrPrototype, XmlHttpRequest};

use crate::error::Result;
use crate::http::HttpClient;
use crate::value::JsValue;

lazy_static! {
    static ref GLOBAL_HOST: Arc<HostRuntime> = HostRuntime::builder().build();
}

/// The host's process-wide primitives
pub struct HostRuntime {
    clock: Arc<dyn Clock>,
    xhr: Arc<Patchable<dyn XhrPrototype>>,
    fetch: Patchable<dyn Fetch>,
    websocket: Patchable<dyn NativeWebSocket>,
    websocket_events: NativeEventEmitter,
    console: Patchable<dyn Console>,
}

impl HostRuntime {
    /// Start building a host
    pub fn builder() -> HostRuntimeBuilder {
        HostRuntimeBuilder::default()
    }

    /// Process-wide host, built with defaults on first use
    pub fn global() -> Arc<HostRuntime> {
        Arc::clone(&GLOBAL_HOST)
    }

    /// Current time in epoch milliseconds
    pub fn now_millis(&self) -> i64 {
        self.clock.now_millis()
    }

    pub fn clock(&self) -> Arc<dyn Clock> {
        Arc::clone(&self.clock)
    }

    // --- request object ---

    /// Prototype slot shared by every request object of this host
    pub fn xhr_prototype(&self) -> &Arc<Patchable<dyn XhrPrototype>> {
        &self.xhr
    }

    /// `new XMLHttpRequest()`
    pub fn new_xhr(&self) -> Arc<XmlHttpRequest> {
        XmlHttpRequest::new(Arc::clone(&self.xhr))
    }

    // --- fetch ---

    pub fn fetch_slot(&self) -> &Patchable<dyn Fetch> {
        &self.fetch
    }

    /// `fetch(input, init)` through whatever currently sits in the slot
    pub async fn fetch(&self, input: impl Into<FetchInput>, init: RequestInit) -> Result<FetchResponse> {
        let fetch = self.fetch.get();
        fetch.fetch(input.into(), init).await
    }

    // --- WebSocket ---

    pub fn websocket_slot(&self) -> &Patchable<dyn NativeWebSocket> {
        &self.websocket
    }

    /// Current native WebSocket module
    pub fn websocket(&self) -> Arc<dyn NativeWebSocket> {
        self.websocket.get()
    }

    /// Emitter the native module reports asynchronous events on
    pub fn websocket_events(&self) -> &NativeEventEmitter {
        &self.websocket_events
    }

    // --- console ---

    pub fn console_slot(&self) -> &Patchable<dyn Console> {
        &self.console
    }

    /// Current console object
    pub fn console(&self) -> Arc<dyn Console> {
        self.console.get()
    }

    /// `console[level](...args)`
    pub fn log(&self, level: ConsoleLevel, args: &[JsValue]) {
        self.console.get().call(level, args)
    }
}

/// Builder for [`HostRuntime`]
#[derive(Default)]
pub struct HostRuntimeBuilder {
    clock: Option<Arc<dyn Clock>>,
    xhr_backend: Option<Arc<dyn XhrBackend>>,
    fetch: Option<Arc<dyn Fetch>>,
    websocket: Option<Arc<dyn NativeWebSocket>>,
    websocket_events: Option<NativeEventEmitter>,
    console: Option<Arc<dyn Console>>,
}

impl HostRuntimeBuilder {
    /// Clock used for timestamps (default: system clock)
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Network backend of the native request object (default: reqwest)
    pub fn xhr_backend(mut self, backend: Arc<dyn XhrBackend>) -> Self {
        self.xhr_backend = Some(backend);
        self
    }

    /// Native fetch (default: fetch built on the request object)
    pub fn fetch(mut self, fetch: Arc<dyn Fetch>) -> Self {
        self.fetch = Some(fetch);
        self
    }

    /// Native WebSocket module (default: none available)
    pub fn websocket(mut self, module: Arc<dyn NativeWebSocket>) -> Self {
        self.websocket = Some(module);
        self
    }

    /// Emitter shared with the native WebSocket module
    pub fn websocket_events(mut self, events: NativeEventEmitter) -> Self {
        self.websocket_events = Some(events);
        self
    }

    /// Native console (default: tracing)
    pub fn console(mut self, console: Arc<dyn Console>) -> Self {
        self.console = Some(console);
        self
    }

    pub fn build(self) -> Arc<HostRuntime> {
        let clock = self.clock.unwrap_or_else(|| Arc::new(SystemClock));

        let backend = self
            .xhr_backend
            .unwrap_or_else(|| Arc::new(HttpClient::default()));
        let native_xhr: Arc<dyn XhrPrototype> = Arc::new(NativeXhr::new(backend));
        let xhr = Arc::new(Patchable::new("XMLHttpRequest.prototype", native_xhr));

        let fetch = self
            .fetch
            .unwrap_or_else(|| Arc::new(XhrFetch::new(Arc::clone(&xhr))));

        let websocket_events = self.websocket_events.unwrap_or_default();
        let websocket = self
            .websocket
            .unwrap_or_else(|| Arc::new(UnavailableWebSocket::new(websocket_events.clone())));

        let console = self.console.unwrap_or_else(|| Arc::new(TracingConsole));

        Arc::new(HostRuntime {
            clock,
            xhr,
            fetch: Patchable::new("fetch", fetch),
            websocket: Patchable::new("WebSocketModule", websocket),
            websocket_events,
            console: Patchable::new("console", console),
        })
    }
}

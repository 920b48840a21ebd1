// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! WebSocket interceptor
//!
//! Outbound calls (`connect`, `send`, `sendBinary`, `close`) are seen by
//! wrapping the native module. Inbound activity is seen by subscribing to
//! the module's event emitter. Both sides are keyed by the transport's
//! socket id.

use std::sync::Arc;

use base64::Engine;
use dashmap::DashMap;
use lazy_static::lazy_static;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use super::base::{Interceptor, InterceptorState};
use crate::host::{
    Clock, HostRuntime, MessageKind, NativeEventEmitter, NativeWebSocket, Subscription,
    WebSocketChannel, WebSocketEvent, WebSocketOptions,
};

lazy_static! {
    static ref INSTANCE: Arc<WebSocketInterceptor> =
        Arc::new(WebSocketInterceptor::new(HostRuntime::global()));
}

/// Failure reported by the transport
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServerError {
    pub message: Option<String>,
}

/// Close reported by the transport
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServerClose {
    pub code: Option<u16>,
    pub reason: Option<String>,
}

/// `connect(start_time, url, protocols, options, socket_id)`
pub type ConnectCallback =
    Arc<dyn Fn(i64, &str, Option<&[String]>, Option<&WebSocketOptions>, u64) + Send + Sync>;
/// `send(data, socket_id)`, binary frames already rendered
pub type SocketSendCallback = Arc<dyn Fn(&str, u64) + Send + Sync>;
/// `close(code, reason, socket_id)`
pub type SocketCloseCallback = Arc<dyn Fn(u16, &str, u64) + Send + Sync>;
/// `on_open(socket_id, duration)`; duration is `None` when no connect was seen
pub type OnOpenCallback = Arc<dyn Fn(u64, Option<i64>) + Send + Sync>;
/// `on_message(socket_id, payload)`
pub type OnMessageCallback = Arc<dyn Fn(u64, &str) + Send + Sync>;
/// `on_error(socket_id, error)`
pub type OnErrorCallback = Arc<dyn Fn(u64, &ServerError) + Send + Sync>;
/// `on_close(socket_id, close)`
pub type OnCloseCallback = Arc<dyn Fn(u64, &ServerClose) + Send + Sync>;

/// Handler registry of the WebSocket interceptor
#[derive(Clone, Default)]
pub struct WebSocketHandlers {
    pub connect: Option<ConnectCallback>,
    pub send: Option<SocketSendCallback>,
    pub close: Option<SocketCloseCallback>,
    pub on_open: Option<OnOpenCallback>,
    pub on_message: Option<OnMessageCallback>,
    pub on_error: Option<OnErrorCallback>,
    pub on_close: Option<OnCloseCallback>,
}

/// Render a base64 binary frame for display
pub fn array_buffer_to_string(data: Option<&str>) -> String {
    let data = match data {
        Some(data) if !data.is_empty() => data,
        _ => return "(no input)".to_string(),
    };

    let bytes = match base64::engine::general_purpose::STANDARD.decode(data) {
        Ok(bytes) => bytes,
        Err(e) => return format!("(invalid data: {})", e),
    };

    if bytes.is_empty() {
        return "(empty array)".to_string();
    }

    let values = bytes
        .iter()
        .map(|b| b.to_string())
        .collect::<Vec<_>>()
        .join(", ");
    format!("ArrayBuffer {{ length: {}, values: [{}] }}", bytes.len(), values)
}

/// Intercepts the host's native WebSocket module
pub struct WebSocketInterceptor {
    host: Arc<HostRuntime>,
    original: Arc<dyn NativeWebSocket>,
    replacement: Arc<dyn NativeWebSocket>,
    state: Arc<InterceptorState<WebSocketHandlers>>,
    /// Connect time per socket id, consumed by the open event
    start_times: Arc<DashMap<u64, i64>>,
    subscriptions: Mutex<Vec<Subscription>>,
}

impl WebSocketInterceptor {
    /// Bind to `host`, capturing its current module as the original
    pub fn new(host: Arc<HostRuntime>) -> Self {
        let original = host.websocket_slot().get();
        let state = Arc::new(InterceptorState::new("websocket"));
        let start_times = Arc::new(DashMap::new());
        let replacement: Arc<dyn NativeWebSocket> = Arc::new(InterceptedWebSocket {
            original: Arc::clone(&original),
            state: Arc::clone(&state),
            clock: host.clock(),
            start_times: Arc::clone(&start_times),
        });

        Self {
            host,
            original,
            replacement,
            state,
            start_times,
            subscriptions: Mutex::new(Vec::new()),
        }
    }

    /// Process-wide interceptor bound to [`HostRuntime::global`]
    pub fn instance() -> Arc<WebSocketInterceptor> {
        Arc::clone(&INSTANCE)
    }

    /// Module captured at construction
    pub fn original(&self) -> &Arc<dyn NativeWebSocket> {
        &self.original
    }

    pub fn set_connect_callback(&self, callback: ConnectCallback) -> &Self {
        self.state.update(|h| h.connect = Some(callback));
        self
    }

    pub fn set_send_callback(&self, callback: SocketSendCallback) -> &Self {
        self.state.update(|h| h.send = Some(callback));
        self
    }

    pub fn set_close_callback(&self, callback: SocketCloseCallback) -> &Self {
        self.state.update(|h| h.close = Some(callback));
        self
    }

    pub fn set_on_open_callback(&self, callback: OnOpenCallback) -> &Self {
        self.state.update(|h| h.on_open = Some(callback));
        self
    }

    pub fn set_on_message_callback(&self, callback: OnMessageCallback) -> &Self {
        self.state.update(|h| h.on_message = Some(callback));
        self
    }

    pub fn set_on_error_callback(&self, callback: OnErrorCallback) -> &Self {
        self.state.update(|h| h.on_error = Some(callback));
        self
    }

    pub fn set_on_close_callback(&self, callback: OnCloseCallback) -> &Self {
        self.state.update(|h| h.on_close = Some(callback));
        self
    }

    fn register_events(&self, emitter: &NativeEventEmitter) {
        let mut subscriptions = self.subscriptions.lock();

        for channel in WebSocketChannel::ALL {
            let state = Arc::clone(&self.state);
            let start_times = Arc::clone(&self.start_times);
            let clock = self.host.clock();

            let subscription = emitter.add_listener(
                channel,
                Arc::new(move |event| {
                    handle_event(&state, &start_times, clock.as_ref(), event)
                }),
            );
            subscriptions.push(subscription);
        }
    }

    fn unregister_events(&self) {
        for subscription in self.subscriptions.lock().drain(..) {
            subscription.remove();
        }
        self.start_times.clear();
    }
}

fn handle_event(
    state: &InterceptorState<WebSocketHandlers>,
    start_times: &DashMap<u64, i64>,
    clock: &dyn Clock,
    event: &WebSocketEvent,
) {
    let Some(socket_id) = event.socket_id() else {
        tracing::trace!(channel = event.channel().as_str(), "dropped: event without socket id");
        return;
    };

    match event {
        WebSocketEvent::Open { .. } => {
            let duration = start_times
                .remove(&socket_id)
                .map(|(_, start)| clock.now_millis() - start);
            state.emit("on_open", |h| {
                if let Some(cb) = &h.on_open {
                    cb(socket_id, duration);
                }
            });
        }
        WebSocketEvent::Message { data, kind, .. } => {
            let payload = match kind {
                MessageKind::Binary => array_buffer_to_string(Some(data)),
                MessageKind::Text => data.clone(),
            };
            state.emit("on_message", |h| {
                if let Some(cb) = &h.on_message {
                    cb(socket_id, &payload);
                }
            });
        }
        WebSocketEvent::Failed { message, .. } => {
            let error = ServerError {
                message: message.clone(),
            };
            state.emit("on_error", |h| {
                if let Some(cb) = &h.on_error {
                    cb(socket_id, &error);
                }
            });
        }
        WebSocketEvent::Closed { code, reason, .. } => {
            let close = ServerClose {
                code: *code,
                reason: reason.clone(),
            };
            state.emit("on_close", |h| {
                if let Some(cb) = &h.on_close {
                    cb(socket_id, &close);
                }
            });
        }
    }
}

impl Interceptor for WebSocketInterceptor {
    fn enable_interception(&self) {
        self.state.enable_with(|| {
            let patched = self
                .host
                .websocket_slot()
                .patch(self.state.owner(), Arc::clone(&self.replacement));
            if patched {
                self.register_events(self.host.websocket_events());
            }
            patched
        });
    }

    fn disable_interception(&self) {
        self.state.disable_with(|| {
            self.host
                .websocket_slot()
                .restore(self.state.owner(), Arc::clone(&self.original));
            self.unregister_events();
        });
    }

    fn is_interceptor_enabled(&self) -> bool {
        self.state.is_enabled()
    }
}

/// Module installed while interception is enabled
struct InterceptedWebSocket {
    original: Arc<dyn NativeWebSocket>,
    state: Arc<InterceptorState<WebSocketHandlers>>,
    clock: Arc<dyn Clock>,
    start_times: Arc<DashMap<u64, i64>>,
}

impl NativeWebSocket for InterceptedWebSocket {
    fn connect(
        &self,
        url: &str,
        protocols: Option<&[String]>,
        options: Option<&WebSocketOptions>,
        socket_id: u64,
    ) {
        let start_time = self.clock.now_millis();
        if self.state.is_enabled() {
            self.start_times.insert(socket_id, start_time);
        }
        self.state.emit("connect", |h| {
            if let Some(cb) = &h.connect {
                cb(start_time, url, protocols, options, socket_id);
            }
        });

        self.original.connect(url, protocols, options, socket_id)
    }

    fn send(&self, message: &str, socket_id: u64) {
        self.state.emit("send", |h| {
            if let Some(cb) = &h.send {
                cb(message, socket_id);
            }
        });

        self.original.send(message, socket_id)
    }

    fn send_binary(&self, base64: &str, socket_id: u64) {
        self.state.emit("send", |h| {
            if let Some(cb) = &h.send {
                cb(&array_buffer_to_string(Some(base64)), socket_id);
            }
        });

        self.original.send_binary(base64, socket_id)
    }

    fn close(&self, code: u16, reason: &str, socket_id: u64) {
        self.state.emit("close", |h| {
            if let Some(cb) = &h.close {
                cb(code, reason, socket_id);
            }
        });

        self.original.close(code, reason, socket_id)
    }
}

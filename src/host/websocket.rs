// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Native WebSocket module and its event emitter
//!
//! The module exposes four entry points keyed by a socket id the caller
//! allocates. Everything that happens afterwards (open, messages, failure,
//! close) arrives asynchronously on the [`NativeEventEmitter`].

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::value::JsValue;

/// Native WebSocket module entry points
pub trait NativeWebSocket: Send + Sync {
    fn connect(
        &self,
        url: &str,
        protocols: Option<&[String]>,
        options: Option<&WebSocketOptions>,
        socket_id: u64,
    );

    fn send(&self, message: &str, socket_id: u64);

    /// Send a binary frame given as base64
    fn send_binary(&self, base64: &str, socket_id: u64);

    fn close(&self, code: u16, reason: &str, socket_id: u64);
}

/// Connection options passed to `connect`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WebSocketOptions {
    pub headers: BTreeMap<String, String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, JsValue>,
}

/// Event channels of the native module
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WebSocketChannel {
    Open,
    Message,
    Closed,
    Failed,
}

impl WebSocketChannel {
    pub const ALL: [WebSocketChannel; 4] = [
        WebSocketChannel::Open,
        WebSocketChannel::Message,
        WebSocketChannel::Closed,
        WebSocketChannel::Failed,
    ];

    /// Native event name
    pub fn as_str(&self) -> &'static str {
        match self {
            WebSocketChannel::Open => "websocketOpen",
            WebSocketChannel::Message => "websocketMessage",
            WebSocketChannel::Closed => "websocketClosed",
            WebSocketChannel::Failed => "websocketFailed",
        }
    }
}

/// Frame encoding of a received message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    Text,
    /// Payload is base64
    Binary,
}

/// Event emitted by the native module.
///
/// The socket id is optional because the native side may omit it.
#[derive(Debug, Clone, PartialEq)]
pub enum WebSocketEvent {
    Open {
        id: Option<u64>,
        protocol: Option<String>,
    },
    Message {
        id: Option<u64>,
        data: String,
        kind: MessageKind,
    },
    Closed {
        id: Option<u64>,
        code: Option<u16>,
        reason: Option<String>,
    },
    Failed {
        id: Option<u64>,
        message: Option<String>,
    },
}

impl WebSocketEvent {
    pub fn channel(&self) -> WebSocketChannel {
        match self {
            WebSocketEvent::Open { .. } => WebSocketChannel::Open,
            WebSocketEvent::Message { .. } => WebSocketChannel::Message,
            WebSocketEvent::Closed { .. } => WebSocketChannel::Closed,
            WebSocketEvent::Failed { .. } => WebSocketChannel::Failed,
        }
    }

    pub fn socket_id(&self) -> Option<u64> {
        match self {
            WebSocketEvent::Open { id, .. }
            | WebSocketEvent::Message { id, .. }
            | WebSocketEvent::Closed { id, .. }
            | WebSocketEvent::Failed { id, .. } => *id,
        }
    }
}

/// Listener for one event channel
pub type EventListener = Arc<dyn Fn(&WebSocketEvent) + Send + Sync>;

struct ListenerEntry {
    token: u64,
    channel: WebSocketChannel,
    listener: EventListener,
}

#[derive(Default)]
struct EmitterInner {
    next_token: AtomicU64,
    listeners: RwLock<Vec<ListenerEntry>>,
}

/// Event emitter of the native module. Clones share listeners.
#[derive(Clone, Default)]
pub struct NativeEventEmitter {
    inner: Arc<EmitterInner>,
}

impl NativeEventEmitter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe to one channel
    pub fn add_listener(&self, channel: WebSocketChannel, listener: EventListener) -> Subscription {
        let token = self.inner.next_token.fetch_add(1, Ordering::Relaxed);
        self.inner.listeners.write().push(ListenerEntry {
            token,
            channel,
            listener,
        });

        Subscription {
            token,
            emitter: Arc::downgrade(&self.inner),
        }
    }

    /// Deliver an event to every listener of its channel
    pub fn emit(&self, event: &WebSocketEvent) {
        let channel = event.channel();
        let listeners: Vec<EventListener> = self
            .inner
            .listeners
            .read()
            .iter()
            .filter(|entry| entry.channel == channel)
            .map(|entry| Arc::clone(&entry.listener))
            .collect();

        for listener in listeners {
            listener(event);
        }
    }

    /// Number of listeners on a channel
    pub fn listener_count(&self, channel: WebSocketChannel) -> usize {
        self.inner
            .listeners
            .read()
            .iter()
            .filter(|entry| entry.channel == channel)
            .count()
    }
}

/// Handle returned by [`NativeEventEmitter::add_listener`]
pub struct Subscription {
    token: u64,
    emitter: Weak<EmitterInner>,
}

impl Subscription {
    /// Unsubscribe
    pub fn remove(self) {
        if let Some(inner) = self.emitter.upgrade() {
            inner.listeners.write().retain(|entry| entry.token != self.token);
        }
    }
}

/// Module used when the host bundles no socket transport.
///
/// Every connect attempt is reported as failed on the emitter.
pub struct UnavailableWebSocket {
    events: NativeEventEmitter,
}

impl UnavailableWebSocket {
    pub fn new(events: NativeEventEmitter) -> Self {
        Self { events }
    }
}

impl NativeWebSocket for UnavailableWebSocket {
    fn connect(
        &self,
        url: &str,
        _protocols: Option<&[String]>,
        _options: Option<&WebSocketOptions>,
        socket_id: u64,
    ) {
        tracing::debug!(url = %url, socket_id, "no native WebSocket transport");
        self.events.emit(&WebSocketEvent::Failed {
            id: Some(socket_id),
            message: Some("no native WebSocket transport available".to_string()),
        });
    }

    fn send(&self, _message: &str, socket_id: u64) {
        tracing::debug!(socket_id, "send on unavailable WebSocket ignored");
    }

    fn send_binary(&self, _base64: &str, socket_id: u64) {
        tracing::debug!(socket_id, "sendBinary on unavailable WebSocket ignored");
    }

    fn close(&self, _code: u16, _reason: &str, socket_id: u64) {
        tracing::debug!(socket_id, "close on unavailable WebSocket ignored");
    }
}

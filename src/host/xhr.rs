// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Request-object transport (XMLHttpRequest)
//!
//! A request object dispatches `open`, `setRequestHeader` and `send`
//! through the prototype slot it was created against, so whatever sits in
//! the slot at call time handles the call. Completion is reported back by a
//! backend through [`XmlHttpRequest::receive_headers`],
//! [`XmlHttpRequest::receive_body`] and [`XmlHttpRequest::fail`], each of
//! which fires the ready-state listeners.

use std::sync::Arc;

use bytes::Bytes;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use super::headers::Headers;
use super::slot::Patchable;
use crate::error::{Error, Result};
use crate::value::JsValue;

/// Ready state of a request object
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub enum ReadyState {
    #[default]
    Unsent,
    Opened,
    HeadersReceived,
    Loading,
    Done,
}

/// Listener fired on ready-state changes
pub type ReadyStateListener = Arc<dyn Fn(&XmlHttpRequest) + Send + Sync>;

/// The three prototype methods a request object dispatches through
pub trait XhrPrototype: Send + Sync {
    /// `open(method, url)`
    fn open(&self, xhr: &Arc<XmlHttpRequest>, method: &str, url: &str) -> Result<()>;

    /// `setRequestHeader(name, value)`
    fn set_request_header(&self, xhr: &Arc<XmlHttpRequest>, name: &str, value: &str) -> Result<()>;

    /// `send(body)`
    fn send(&self, xhr: &Arc<XmlHttpRequest>, body: Option<JsValue>) -> Result<()>;
}

/// Performs the network part of a sent request object
pub trait XhrBackend: Send + Sync {
    /// Start the request. Completion is reported on the object itself.
    fn dispatch(&self, xhr: Arc<XmlHttpRequest>);
}

#[derive(Debug, Default)]
struct XhrState {
    interception_id: Option<String>,
    internal: bool,
    ready_state: ReadyState,
    method: String,
    url: String,
    request_headers: Headers,
    body: Option<JsValue>,
    timeout_ms: u64,
    response_type: String,
    status: u16,
    response_headers: Headers,
    response_url: String,
    response: Option<JsValue>,
    error: Option<String>,
}

/// A request object
pub struct XmlHttpRequest {
    prototype: Arc<Patchable<dyn XhrPrototype>>,
    state: RwLock<XhrState>,
    listeners: RwLock<Vec<ReadyStateListener>>,
}

impl XmlHttpRequest {
    /// Create a request object bound to a prototype slot
    pub fn new(prototype: Arc<Patchable<dyn XhrPrototype>>) -> Arc<Self> {
        Arc::new(Self {
            prototype,
            state: RwLock::new(XhrState::default()),
            listeners: RwLock::new(Vec::new()),
        })
    }

    /// Host-facing `open`
    pub fn open(self: &Arc<Self>, method: &str, url: &str) -> Result<()> {
        self.prototype.get().open(self, method, url)
    }

    /// Host-facing `setRequestHeader`
    pub fn set_request_header(self: &Arc<Self>, name: &str, value: &str) -> Result<()> {
        self.prototype.get().set_request_header(self, name, value)
    }

    /// Host-facing `send`
    pub fn send(self: &Arc<Self>, body: Option<JsValue>) -> Result<()> {
        self.prototype.get().send(self, body)
    }

    /// Register a ready-state listener
    pub fn add_ready_state_listener(&self, listener: ReadyStateListener) {
        self.listeners.write().push(listener);
    }

    // --- interception bookkeeping ---

    /// Correlation id assigned by an interceptor at `open`
    pub fn interception_id(&self) -> Option<String> {
        self.state.read().interception_id.clone()
    }

    /// Assign a correlation id; clears any internal flag from a previous use
    pub fn set_interception_id(&self, id: impl Into<String>) {
        let mut state = self.state.write();
        state.interception_id = Some(id.into());
        state.internal = false;
    }

    /// Flag the object as driven internally by another transport
    pub fn mark_internal(&self) {
        self.state.write().internal = true;
    }

    /// Whether the object is driven internally by another transport
    pub fn is_internal(&self) -> bool {
        self.state.read().internal
    }

    // --- readable state ---

    pub fn ready_state(&self) -> ReadyState {
        self.state.read().ready_state
    }

    pub fn method(&self) -> String {
        self.state.read().method.clone()
    }

    pub fn url(&self) -> String {
        self.state.read().url.clone()
    }

    pub fn request_headers(&self) -> Headers {
        self.state.read().request_headers.clone()
    }

    pub fn request_body(&self) -> Option<JsValue> {
        self.state.read().body.clone()
    }

    pub fn status(&self) -> u16 {
        self.state.read().status
    }

    /// Timeout in milliseconds, `0` for none
    pub fn timeout(&self) -> u64 {
        self.state.read().timeout_ms
    }

    pub fn set_timeout(&self, timeout_ms: u64) {
        self.state.write().timeout_ms = timeout_ms;
    }

    /// `""`, `"text"`, `"json"`, `"arraybuffer"` or `"blob"`
    pub fn response_type(&self) -> String {
        self.state.read().response_type.clone()
    }

    pub fn set_response_type(&self, response_type: impl Into<String>) {
        self.state.write().response_type = response_type.into();
    }

    pub fn response_url(&self) -> String {
        self.state.read().response_url.clone()
    }

    pub fn response(&self) -> Option<JsValue> {
        self.state.read().response.clone()
    }

    /// Transport error, set when the request failed without a response
    pub fn error(&self) -> Option<String> {
        self.state.read().error.clone()
    }

    pub fn get_response_header(&self, name: &str) -> Option<String> {
        let state = self.state.read();
        if state.ready_state < ReadyState::HeadersReceived {
            return None;
        }
        state.response_headers.get(name)
    }

    /// Raw response header block
    pub fn get_all_response_headers(&self) -> String {
        let state = self.state.read();
        if state.ready_state < ReadyState::HeadersReceived {
            return String::new();
        }
        state.response_headers.to_raw_block()
    }

    // --- native behavior, used by the native prototype and backends ---

    /// Native `open`: reset the object and record method and URL
    pub fn native_open(&self, method: &str, url: &str) -> Result<()> {
        url::Url::parse(url)?;

        let mut state = self.state.write();
        state.ready_state = ReadyState::Opened;
        state.method = method.to_uppercase();
        state.url = url.to_string();
        state.request_headers = Headers::new();
        state.body = None;
        state.status = 0;
        state.response_headers = Headers::new();
        state.response_url = String::new();
        state.response = None;
        state.error = None;
        Ok(())
    }

    /// Native `setRequestHeader`
    pub fn native_set_request_header(&self, name: &str, value: &str) -> Result<()> {
        let mut state = self.state.write();
        if state.ready_state != ReadyState::Opened {
            return Err(Error::InvalidState(
                "setRequestHeader called before open".to_string(),
            ));
        }
        if name.is_empty() || name.contains([':', '\r', '\n']) {
            return Err(Error::invalid_header(name, "not a valid header name"));
        }
        state.request_headers.append(name, value);
        Ok(())
    }

    /// Native `send`: record the body
    pub fn native_send(&self, body: Option<JsValue>) -> Result<()> {
        let mut state = self.state.write();
        if state.ready_state != ReadyState::Opened {
            return Err(Error::InvalidState("send called before open".to_string()));
        }
        state.body = body;
        Ok(())
    }

    /// Backend: status line and headers arrived
    pub fn receive_headers(&self, status: u16, headers: Headers, response_url: impl Into<String>) {
        {
            let mut state = self.state.write();
            state.status = status;
            state.response_headers = headers;
            state.response_url = response_url.into();
            state.ready_state = ReadyState::HeadersReceived;
        }
        self.fire_ready_state_change();
    }

    /// Backend: body arrived, request complete
    pub fn receive_body(&self, body: Bytes) {
        {
            let mut state = self.state.write();
            let response = match state.response_type.as_str() {
                "arraybuffer" | "blob" => JsValue::Bytes(body),
                "json" => serde_json::from_slice::<serde_json::Value>(&body)
                    .map(JsValue::from)
                    .unwrap_or(JsValue::Null),
                _ => JsValue::String(String::from_utf8_lossy(&body).into_owned()),
            };
            state.response = Some(response);
            state.ready_state = ReadyState::Done;
        }
        self.fire_ready_state_change();
    }

    /// Backend: request failed without a response
    pub fn fail(&self, error: impl Into<String>) {
        {
            let mut state = self.state.write();
            state.status = 0;
            state.error = Some(error.into());
            state.ready_state = ReadyState::Done;
        }
        self.fire_ready_state_change();
    }

    fn fire_ready_state_change(&self) {
        let listeners = self.listeners.read().clone();
        for listener in listeners {
            listener(self);
        }
    }
}

impl std::fmt::Debug for XmlHttpRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.read();
        f.debug_struct("XmlHttpRequest")
            .field("interception_id", &state.interception_id)
            .field("ready_state", &state.ready_state)
            .field("method", &state.method)
            .field("url", &state.url)
            .field("status", &state.status)
            .finish()
    }
}

/// The host's own request-object prototype
pub struct NativeXhr {
    backend: Arc<dyn XhrBackend>,
}

impl NativeXhr {
    pub fn new(backend: Arc<dyn XhrBackend>) -> Self {
        Self { backend }
    }
}

impl XhrPrototype for NativeXhr {
    fn open(&self, xhr: &Arc<XmlHttpRequest>, method: &str, url: &str) -> Result<()> {
        xhr.native_open(method, url)
    }

    fn set_request_header(&self, xhr: &Arc<XmlHttpRequest>, name: &str, value: &str) -> Result<()> {
        xhr.native_set_request_header(name, value)
    }

    fn send(&self, xhr: &Arc<XmlHttpRequest>, body: Option<JsValue>) -> Result<()> {
        xhr.native_send(body)?;
        self.backend.dispatch(Arc::clone(xhr));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::host::testing::ScriptedXhrBackend;

    fn native_slot(backend: Arc<ScriptedXhrBackend>) -> Arc<Patchable<dyn XhrPrototype>> {
        let native: Arc<dyn XhrPrototype> = Arc::new(NativeXhr::new(backend));
        Arc::new(Patchable::new("xhr", native))
    }

    #[test]
    fn test_native_lifecycle() {
        let backend = Arc::new(ScriptedXhrBackend::default());
        let xhr = XmlHttpRequest::new(native_slot(Arc::clone(&backend)));

        xhr.open("get", "https://api.test/x").unwrap();
        xhr.set_request_header("accept", "text/plain").unwrap();
        xhr.send(None).unwrap();

        assert_eq!(xhr.method(), "GET");
        assert_eq!(xhr.ready_state(), ReadyState::Opened);
        assert_eq!(backend.pending(), 1);

        let mut headers = Headers::new();
        headers.append("Content-Type", "text/plain");
        xhr.receive_headers(200, headers, "https://api.test/x");
        assert_eq!(xhr.get_all_response_headers(), "Content-Type: text/plain\r\n");

        xhr.receive_body(Bytes::from_static(b"ok"));
        assert_eq!(xhr.ready_state(), ReadyState::Done);
        assert_eq!(xhr.response(), Some(JsValue::from("ok")));
    }

    #[test]
    fn test_send_before_open_is_rejected() {
        let backend = Arc::new(ScriptedXhrBackend::default());
        let xhr = XmlHttpRequest::new(native_slot(Arc::clone(&backend)));

        assert!(matches!(xhr.send(None), Err(Error::InvalidState(_))));
        assert_eq!(backend.pending(), 0);
    }

    #[test]
    fn test_listeners_fire_per_transition() {
        let backend = Arc::new(ScriptedXhrBackend::default());
        let xhr = XmlHttpRequest::new(native_slot(backend));
        let fired = Arc::new(AtomicUsize::new(0));

        let counter = Arc::clone(&fired);
        xhr.add_ready_state_listener(Arc::new(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        }));

        xhr.open("GET", "https://api.test/x").unwrap();
        xhr.send(None).unwrap();
        xhr.receive_headers(204, Headers::new(), "");
        xhr.fail("connection reset");

        assert_eq!(fired.load(Ordering::SeqCst), 2);
        assert_eq!(xhr.error().as_deref(), Some("connection reset"));
        assert_eq!(xhr.status(), 0);
    }

    #[test]
    fn test_json_response_type() {
        let backend = Arc::new(ScriptedXhrBackend::default());
        let xhr = XmlHttpRequest::new(native_slot(backend));
        xhr.set_response_type("json");
        xhr.open("GET", "https://api.test/x").unwrap();
        xhr.send(None).unwrap();
        xhr.receive_body(Bytes::from_static(b"{\"n\":1}"));

        assert_eq!(
            xhr.response(),
            Some(JsValue::from(serde_json::json!({ "n": 1 })))
        );
    }
}

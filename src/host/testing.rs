// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Scripted host primitives for tests

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use parking_lot::Mutex;
use tokio::sync::Notify;

use super::console::{Console, ConsoleLevel};
use super::fetch::{Fetch, FetchInput, FetchResponse, RequestInit, ResponseType};
use super::headers::Headers;
use super::websocket::{NativeWebSocket, WebSocketOptions};
use super::xhr::{XhrBackend, XmlHttpRequest};
use crate::error::Result;
use crate::value::JsValue;

/// Backend that queues dispatched request objects for the test to answer
#[derive(Default)]
pub struct ScriptedXhrBackend {
    queue: Mutex<VecDeque<Arc<XmlHttpRequest>>>,
    notify: Notify,
}

impl ScriptedXhrBackend {
    /// Number of dispatched, unanswered requests
    pub fn pending(&self) -> usize {
        self.queue.lock().len()
    }

    pub fn next_request(&self) -> Option<Arc<XmlHttpRequest>> {
        self.queue.lock().pop_front()
    }

    /// Wait until a request is dispatched
    pub async fn wait_for_request(&self) -> Arc<XmlHttpRequest> {
        loop {
            let notified = self.notify.notified();
            if let Some(xhr) = self.next_request() {
                return xhr;
            }
            notified.await;
        }
    }
}

impl XhrBackend for ScriptedXhrBackend {
    fn dispatch(&self, xhr: Arc<XmlHttpRequest>) {
        self.queue.lock().push_back(xhr);
        self.notify.notify_one();
    }
}

/// Console that records calls
#[derive(Default)]
pub struct RecordingConsole {
    calls: Mutex<Vec<(ConsoleLevel, Vec<JsValue>)>>,
}

impl RecordingConsole {
    pub fn calls(&self) -> Vec<(ConsoleLevel, Vec<JsValue>)> {
        self.calls.lock().clone()
    }
}

impl Console for RecordingConsole {
    fn call(&self, level: ConsoleLevel, args: &[JsValue]) {
        self.calls.lock().push((level, args.to_vec()));
    }
}

/// A call received by [`RecordingWebSocket`]
#[derive(Debug, Clone, PartialEq)]
pub enum SocketCall {
    Connect {
        url: String,
        protocols: Option<Vec<String>>,
        options: Option<WebSocketOptions>,
        socket_id: u64,
    },
    Send {
        message: String,
        socket_id: u64,
    },
    SendBinary {
        base64: String,
        socket_id: u64,
    },
    Close {
        code: u16,
        reason: String,
        socket_id: u64,
    },
}

/// Native socket module that records calls
#[derive(Default)]
pub struct RecordingWebSocket {
    calls: Mutex<Vec<SocketCall>>,
}

impl RecordingWebSocket {
    pub fn calls(&self) -> Vec<SocketCall> {
        self.calls.lock().clone()
    }
}

impl NativeWebSocket for RecordingWebSocket {
    fn connect(
        &self,
        url: &str,
        protocols: Option<&[String]>,
        options: Option<&WebSocketOptions>,
        socket_id: u64,
    ) {
        self.calls.lock().push(SocketCall::Connect {
            url: url.to_string(),
            protocols: protocols.map(|p| p.to_vec()),
            options: options.cloned(),
            socket_id,
        });
    }

    fn send(&self, message: &str, socket_id: u64) {
        self.calls.lock().push(SocketCall::Send {
            message: message.to_string(),
            socket_id,
        });
    }

    fn send_binary(&self, base64: &str, socket_id: u64) {
        self.calls.lock().push(SocketCall::SendBinary {
            base64: base64.to_string(),
            socket_id,
        });
    }

    fn close(&self, code: u16, reason: &str, socket_id: u64) {
        self.calls.lock().push(SocketCall::Close {
            code,
            reason: reason.to_string(),
            socket_id,
        });
    }
}

/// Fetch that answers every call with one canned response and records
/// the headers it was given
pub struct StaticFetch {
    status: u16,
    headers: Headers,
    body: Bytes,
    seen: Mutex<Vec<(String, Headers)>>,
}

impl StaticFetch {
    pub fn new(status: u16, headers: Headers, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            headers,
            body: body.into(),
            seen: Mutex::new(Vec::new()),
        }
    }

    /// URL and headers of every call, in order
    pub fn seen(&self) -> Vec<(String, Headers)> {
        self.seen.lock().clone()
    }
}

#[async_trait]
impl Fetch for StaticFetch {
    async fn fetch(&self, input: FetchInput, init: RequestInit) -> Result<FetchResponse> {
        let url = input.url();
        let headers = match init.headers {
            Some(headers) => headers.into_headers(),
            None => input.headers().cloned().unwrap_or_default(),
        };
        self.seen.lock().push((url.clone(), headers));

        Ok(FetchResponse {
            status: self.status,
            headers: self.headers.clone(),
            url,
            response_type: ResponseType::Cors,
            redirected: false,
            body: self.body.clone(),
        })
    }
}

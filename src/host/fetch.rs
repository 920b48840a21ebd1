// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Fetch-style transport

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use futures::channel::oneshot;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use super::headers::{Headers, HeadersInit};
use super::slot::Patchable;
use super::xhr::{ReadyState, XhrPrototype, XmlHttpRequest};
use crate::error::{Error, Result};
use crate::value::JsValue;

/// Fetch-style call: `fetch(input, init)`
#[async_trait]
pub trait Fetch: Send + Sync {
    async fn fetch(&self, input: FetchInput, init: RequestInit) -> Result<FetchResponse>;
}

/// A prepared request passed as fetch input
#[derive(Debug, Clone, Default)]
pub struct FetchRequest {
    pub url: String,
    pub method: Option<String>,
    pub headers: Headers,
    pub body: Option<JsValue>,
}

impl FetchRequest {
    /// Merge the two fetch arguments into one request.
    ///
    /// `init` wins over a request-object input; the method defaults to `GET`.
    pub fn from_call(input: FetchInput, init: RequestInit) -> Self {
        let url = input.url();
        let method = init
            .method
            .or_else(|| input.method().map(String::from))
            .unwrap_or_else(|| "GET".to_string());
        let (input_headers, input_body) = match input {
            FetchInput::Request(r) => (r.headers, r.body),
            _ => (Headers::new(), None),
        };

        Self {
            url,
            method: Some(method),
            headers: init
                .headers
                .map(HeadersInit::into_headers)
                .unwrap_or(input_headers),
            body: init.body.or(input_body),
        }
    }

    /// Method, `GET` when undeclared
    pub fn method_or_default(&self) -> &str {
        self.method.as_deref().unwrap_or("GET")
    }
}

/// First argument of a fetch call
#[derive(Debug, Clone)]
pub enum FetchInput {
    /// URL string
    Str(String),
    /// Parsed URL
    Url(url::Url),
    /// Request object
    Request(FetchRequest),
}

impl FetchInput {
    /// Target URL regardless of input shape
    pub fn url(&self) -> String {
        match self {
            FetchInput::Str(s) => s.clone(),
            FetchInput::Url(u) => u.as_str().to_string(),
            FetchInput::Request(r) => r.url.clone(),
        }
    }

    /// Method declared by a request object input
    pub fn method(&self) -> Option<&str> {
        match self {
            FetchInput::Request(r) => r.method.as_deref(),
            _ => None,
        }
    }

    /// Headers declared by a request object input
    pub fn headers(&self) -> Option<&Headers> {
        match self {
            FetchInput::Request(r) => Some(&r.headers),
            _ => None,
        }
    }
}

impl From<&str> for FetchInput {
    fn from(s: &str) -> Self {
        FetchInput::Str(s.to_string())
    }
}

impl From<String> for FetchInput {
    fn from(s: String) -> Self {
        FetchInput::Str(s)
    }
}

impl From<url::Url> for FetchInput {
    fn from(u: url::Url) -> Self {
        FetchInput::Url(u)
    }
}

impl From<FetchRequest> for FetchInput {
    fn from(r: FetchRequest) -> Self {
        FetchInput::Request(r)
    }
}

/// Second argument of a fetch call
#[derive(Debug, Clone, Default)]
pub struct RequestInit {
    pub method: Option<String>,
    pub headers: Option<HeadersInit>,
    pub body: Option<JsValue>,
}

impl RequestInit {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn method(mut self, method: impl Into<String>) -> Self {
        self.method = Some(method.into());
        self
    }

    pub fn headers(mut self, headers: impl Into<HeadersInit>) -> Self {
        self.headers = Some(headers.into());
        self
    }

    pub fn body(mut self, body: impl Into<JsValue>) -> Self {
        self.body = Some(body.into());
        self
    }
}

/// Fetch response type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseType {
    #[default]
    Basic,
    Cors,
    Default,
    Error,
    Opaque,
    OpaqueRedirect,
}

impl ResponseType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResponseType::Basic => "basic",
            ResponseType::Cors => "cors",
            ResponseType::Default => "default",
            ResponseType::Error => "error",
            ResponseType::Opaque => "opaque",
            ResponseType::OpaqueRedirect => "opaqueredirect",
        }
    }
}

/// Fetch response. Cloning is cheap; the body is shared.
#[derive(Debug, Clone)]
pub struct FetchResponse {
    pub status: u16,
    pub headers: Headers,
    /// Final URL after redirects
    pub url: String,
    pub response_type: ResponseType,
    pub redirected: bool,
    pub body: Bytes,
}

impl FetchResponse {
    /// Status in the 2xx range
    pub fn ok(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Body as UTF-8 text
    pub fn text(&self) -> Result<String> {
        String::from_utf8(self.body.to_vec()).map_err(|e| Error::Other(e.to_string()))
    }

    /// Body parsed as JSON
    pub fn json(&self) -> Result<serde_json::Value> {
        serde_json::from_slice(&self.body).map_err(Error::from)
    }
}

/// Fetch implemented on top of the request-object transport.
///
/// Every call creates a request object against the host's prototype slot,
/// so an intercepted prototype sees these requests too.
pub struct XhrFetch {
    prototype: Arc<Patchable<dyn XhrPrototype>>,
}

impl XhrFetch {
    pub fn new(prototype: Arc<Patchable<dyn XhrPrototype>>) -> Self {
        Self { prototype }
    }
}

#[async_trait]
impl Fetch for XhrFetch {
    async fn fetch(&self, input: FetchInput, init: RequestInit) -> Result<FetchResponse> {
        let request = FetchRequest::from_call(input, init);
        let url = request.url.clone();

        let xhr = XmlHttpRequest::new(Arc::clone(&self.prototype));
        xhr.set_response_type("arraybuffer");

        let (tx, rx) = oneshot::channel::<()>();
        let tx = Mutex::new(Some(tx));
        xhr.add_ready_state_listener(Arc::new(move |xhr| {
            if xhr.ready_state() == ReadyState::Done {
                if let Some(tx) = tx.lock().take() {
                    let _ = tx.send(());
                }
            }
        }));

        xhr.open(request.method_or_default(), &url)?;
        for (name, value) in request.headers.iter() {
            xhr.set_request_header(name, value)?;
        }
        xhr.send(request.body)?;

        rx.await
            .map_err(|_| Error::network("request object dropped before completion"))?;

        if let Some(error) = xhr.error() {
            return Err(Error::Network(error));
        }

        let body = match xhr.response() {
            Some(JsValue::Bytes(bytes)) => bytes,
            Some(JsValue::String(text)) => Bytes::from(text),
            _ => Bytes::new(),
        };
        let final_url = xhr.response_url();
        let final_url = if final_url.is_empty() { url.clone() } else { final_url };

        Ok(FetchResponse {
            status: xhr.status(),
            headers: Headers::parse_raw_block(&xhr.get_all_response_headers()),
            redirected: final_url != url,
            url: final_url,
            response_type: ResponseType::Basic,
            body,
        })
    }
}

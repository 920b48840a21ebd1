// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Event shape shared by the request-object and fetch interceptors

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::base::Interceptor;
use crate::host::Headers;
use crate::http::headers::{CONTENT_LENGTH, CONTENT_TYPE};
use crate::value::JsValue;

/// Reserved request header fetch injects so the request-object interceptor
/// can recognize requests it drives internally
pub const NETWORK_REQUEST_HEADER: &str = "x-xenon-network-type";

/// Transport an operation was observed on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NetworkType {
    Xhr,
    Fetch,
    Ws,
}

impl NetworkType {
    pub fn as_str(&self) -> &'static str {
        match self {
            NetworkType::Xhr => "xhr",
            NetworkType::Fetch => "fetch",
            NetworkType::Ws => "ws",
        }
    }
}

impl std::fmt::Display for NetworkType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Normalized response headers
#[derive(Debug, Clone, PartialEq)]
pub struct HeadersReceived {
    /// Media type without parameters
    pub content_type: Option<String>,
    /// Declared `Content-Length`
    pub size: Option<u64>,
    pub headers: Headers,
}

/// Completion of an HTTP operation
#[derive(Debug, Clone, PartialEq)]
pub struct HttpResponse {
    pub status: u16,
    /// Timeout in milliseconds, always `0` for fetch
    pub timeout: u64,
    /// Milliseconds between send and completion
    pub duration: i64,
    pub body: Option<JsValue>,
    /// Final URL, empty when unknown
    pub url: String,
    pub response_type: String,
}

/// `open(id, kind, method, url)`
pub type OpenCallback = Arc<dyn Fn(&str, NetworkType, &str, &str) + Send + Sync>;
/// `request_header(id, name, value)`
pub type RequestHeaderCallback = Arc<dyn Fn(&str, &str, &str) + Send + Sync>;
/// `send(id, start_time, body)`
pub type SendCallback = Arc<dyn Fn(&str, i64, Option<&JsValue>) + Send + Sync>;
/// `header_received(id, headers)`
pub type HeaderReceivedCallback = Arc<dyn Fn(&str, &HeadersReceived) + Send + Sync>;
/// `response(id, response)`
pub type ResponseCallback = Arc<dyn Fn(&str, &HttpResponse) + Send + Sync>;
/// `discard(id, kind)`: the operation is a duplicate of one reported as `kind`
pub type DiscardCallback = Arc<dyn Fn(&str, NetworkType) + Send + Sync>;

/// Handler registry of an HTTP interceptor
#[derive(Clone, Default)]
pub struct HttpHandlers {
    pub open: Option<OpenCallback>,
    pub request_header: Option<RequestHeaderCallback>,
    pub send: Option<SendCallback>,
    pub header_received: Option<HeaderReceivedCallback>,
    pub response: Option<ResponseCallback>,
    pub discard: Option<DiscardCallback>,
}

/// Callback registration shared by the HTTP interceptors
pub trait HttpInterceptor: Interceptor {
    /// Apply `f` to the handler registry
    fn update_handlers(&self, f: &mut dyn FnMut(&mut HttpHandlers));

    fn set_open_callback(&self, callback: OpenCallback) -> &Self
    where
        Self: Sized,
    {
        let mut callback = Some(callback);
        self.update_handlers(&mut |h| h.open = callback.take());
        self
    }

    fn set_request_header_callback(&self, callback: RequestHeaderCallback) -> &Self
    where
        Self: Sized,
    {
        let mut callback = Some(callback);
        self.update_handlers(&mut |h| h.request_header = callback.take());
        self
    }

    fn set_send_callback(&self, callback: SendCallback) -> &Self
    where
        Self: Sized,
    {
        let mut callback = Some(callback);
        self.update_handlers(&mut |h| h.send = callback.take());
        self
    }

    fn set_header_received_callback(&self, callback: HeaderReceivedCallback) -> &Self
    where
        Self: Sized,
    {
        let mut callback = Some(callback);
        self.update_handlers(&mut |h| h.header_received = callback.take());
        self
    }

    fn set_response_callback(&self, callback: ResponseCallback) -> &Self
    where
        Self: Sized,
    {
        let mut callback = Some(callback);
        self.update_handlers(&mut |h| h.response = callback.take());
        self
    }

    fn set_discard_callback(&self, callback: DiscardCallback) -> &Self
    where
        Self: Sized,
    {
        let mut callback = Some(callback);
        self.update_handlers(&mut |h| h.discard = callback.take());
        self
    }
}

/// Media type of a `Content-Type` value, parameters stripped
pub fn parse_content_type(value: Option<&str>) -> Option<String> {
    let media_type = value?.split(';').next()?.trim();
    if media_type.is_empty() {
        None
    } else {
        Some(media_type.to_string())
    }
}

/// Leading integer of a `Content-Length` value
pub fn parse_content_length(value: Option<&str>) -> Option<u64> {
    let value = value?.trim_start();
    let digits: String = value.chars().take_while(|c| c.is_ascii_digit()).collect();
    digits.parse().ok()
}

/// Whether a request header is the fetch marker
pub fn is_network_marker(name: &str, value: &str) -> bool {
    name.trim().eq_ignore_ascii_case(NETWORK_REQUEST_HEADER)
        && value.trim().eq_ignore_ascii_case(NetworkType::Fetch.as_str())
}

pub(crate) fn headers_received(headers: Headers) -> HeadersReceived {
    HeadersReceived {
        content_type: parse_content_type(headers.get(CONTENT_TYPE).as_deref()),
        size: parse_content_length(headers.get(CONTENT_LENGTH).as_deref()),
        headers,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_content_type() {
        assert_eq!(
            parse_content_type(Some("application/json; charset=utf-8")).as_deref(),
            Some("application/json")
        );
        assert_eq!(parse_content_type(Some("text/plain")).as_deref(), Some("text/plain"));
        assert_eq!(parse_content_type(Some("")), None);
        assert_eq!(parse_content_type(None), None);
    }

    #[test]
    fn test_parse_content_length() {
        assert_eq!(parse_content_length(Some("1024")), Some(1024));
        assert_eq!(parse_content_length(Some(" 12abc")), Some(12));
        assert_eq!(parse_content_length(Some("abc")), None);
        assert_eq!(parse_content_length(None), None);
    }

    #[test]
    fn test_marker_detection() {
        assert!(is_network_marker("x-xenon-network-type", "fetch"));
        assert!(is_network_marker("X-Xenon-Network-Type", " FETCH "));
        assert!(!is_network_marker("x-xenon-network-type", "xhr"));
        assert!(!is_network_marker("x-other", "fetch"));
    }

    #[test]
    fn test_headers_received_normalization() {
        let mut headers = Headers::new();
        headers.append("content-type", "text/html; charset=utf-8");
        headers.append("content-length", "42");

        let received = headers_received(headers);
        assert_eq!(received.content_type.as_deref(), Some("text/html"));
        assert_eq!(received.size, Some(42));
        assert_eq!(received.headers.len(), 2);
    }
}

// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Assembled records

use serde::{Deserialize, Serialize, Serializer};

use crate::correlation::{
    convert_to_curl, create_http_header_line, create_socket_data_line, format_log_message,
    format_request_duration, format_request_method, format_request_status_code,
};
use crate::host::{ConsoleLevel, Headers, WebSocketOptions};
use crate::interceptor::{is_network_marker, NetworkType, ServerClose, ServerError};
use crate::value::JsValue;

/// One XHR or fetch operation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HttpRecord {
    #[serde(rename = "type")]
    pub kind: NetworkType,
    pub method: String,
    pub url: String,
    /// Ordered; a repeated name overwrites the earlier value in place
    #[serde(serialize_with = "serialize_visible_headers")]
    pub request_headers: Headers,
    pub body: Option<JsValue>,
    pub start_time: Option<i64>,
    pub response_content_type: Option<String>,
    pub response_size: Option<u64>,
    pub response_headers: Option<Headers>,
    pub status: Option<u16>,
    pub timeout: Option<u64>,
    pub end_time: Option<i64>,
    pub duration: Option<i64>,
    pub response: Option<JsValue>,
    pub response_type: Option<String>,
}

impl HttpRecord {
    pub fn new(kind: NetworkType, method: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            kind,
            method: method.into(),
            url: url.into(),
            request_headers: Headers::new(),
            body: None,
            start_time: None,
            response_content_type: None,
            response_size: None,
            response_headers: None,
            status: None,
            timeout: None,
            end_time: None,
            duration: None,
            response: None,
            response_type: None,
        }
    }

    /// Request headers without the reserved fetch marker
    pub fn visible_request_headers(&self) -> Vec<(String, String)> {
        self.request_headers
            .iter()
            .filter(|(name, value)| !is_network_marker(name, value))
            .map(|(name, value)| (name.to_string(), value.to_string()))
            .collect()
    }

    /// Visible request headers as `name: value` lines
    pub fn request_headers_text(&self) -> String {
        self.visible_request_headers()
            .iter()
            .map(|(name, value)| create_http_header_line(name, value))
            .collect()
    }

    /// Response headers as `name: value` lines
    pub fn response_headers_text(&self) -> String {
        self.response_headers
            .iter()
            .flat_map(|headers| headers.iter())
            .map(|(name, value)| create_http_header_line(name, value))
            .collect()
    }

    /// Whether the response has not arrived yet
    pub fn is_pending(&self) -> bool {
        self.status.is_none()
    }

    /// Display form of the method
    pub fn display_method(&self) -> String {
        format_request_method(Some(&self.method).filter(|m| !m.is_empty()).map(|m| m.as_str()))
    }

    pub fn display_status(&self) -> String {
        format_request_status_code(self.status)
    }

    pub fn display_duration(&self) -> String {
        format_request_duration(self.duration)
    }

    /// Replay command for this request
    pub fn to_curl(&self) -> String {
        convert_to_curl(
            &self.display_method(),
            &self.url,
            &self.visible_request_headers(),
            self.body.as_ref(),
        )
    }
}

fn serialize_visible_headers<S: Serializer>(
    headers: &Headers,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    headers
        .iter()
        .filter(|(name, value)| !is_network_marker(name, value))
        .map(|(name, value)| (name.to_string(), value.to_string()))
        .collect::<Headers>()
        .serialize(serializer)
}

/// Direction of a socket message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Sent,
    Received,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Sent => "Sent",
            Direction::Received => "Received",
        }
    }
}

/// One entry of a socket's message log
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SocketMessage {
    pub direction: Direction,
    pub payload: String,
}

/// One WebSocket connection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebSocketRecord {
    #[serde(rename = "type")]
    pub kind: NetworkType,
    pub url: String,
    pub protocols: Option<Vec<String>>,
    pub options: Option<WebSocketOptions>,
    pub start_time: i64,
    pub open_duration: Option<i64>,
    pub end_time: Option<i64>,
    /// Append-only, in arrival order
    pub messages: Vec<SocketMessage>,
    /// Close code passed to `close`
    pub status: Option<u16>,
    pub close_reason: Option<String>,
    pub server_error: Option<ServerError>,
    pub server_close: Option<ServerClose>,
}

impl WebSocketRecord {
    pub fn new(
        url: impl Into<String>,
        protocols: Option<Vec<String>>,
        options: Option<WebSocketOptions>,
        start_time: i64,
    ) -> Self {
        Self {
            kind: NetworkType::Ws,
            url: url.into(),
            protocols,
            options,
            start_time,
            open_duration: None,
            end_time: None,
            messages: Vec::new(),
            status: None,
            close_reason: None,
            server_error: None,
            server_close: None,
        }
    }

    /// Message log as `Sent: ...` / `Received: ...` lines
    pub fn transcript(&self) -> String {
        self.messages
            .iter()
            .map(|m| create_socket_data_line(m.direction.as_str(), &m.payload))
            .collect()
    }

    /// Whether neither side has closed the connection
    pub fn is_open(&self) -> bool {
        self.end_time.is_none()
    }
}

/// A network record of either kind
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NetworkRecord {
    Http(HttpRecord),
    WebSocket(WebSocketRecord),
}

impl NetworkRecord {
    pub fn kind(&self) -> NetworkType {
        match self {
            NetworkRecord::Http(r) => r.kind,
            NetworkRecord::WebSocket(r) => r.kind,
        }
    }

    pub fn url(&self) -> &str {
        match self {
            NetworkRecord::Http(r) => &r.url,
            NetworkRecord::WebSocket(r) => &r.url,
        }
    }

    pub fn as_http(&self) -> Option<&HttpRecord> {
        match self {
            NetworkRecord::Http(r) => Some(r),
            _ => None,
        }
    }

    pub fn as_websocket(&self) -> Option<&WebSocketRecord> {
        match self {
            NetworkRecord::WebSocket(r) => Some(r),
            _ => None,
        }
    }
}

/// One console call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogRecord {
    pub index: u64,
    #[serde(rename = "type")]
    pub level: ConsoleLevel,
    pub values: Vec<JsValue>,
}

impl LogRecord {
    /// `LEVEL: v1, v2` summary
    pub fn message(&self) -> String {
        format_log_message(self.level.as_str(), &self.values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interceptor::NETWORK_REQUEST_HEADER;

    fn record_with_marker() -> HttpRecord {
        let mut record = HttpRecord::new(NetworkType::Fetch, "POST", "https://api.test/items");
        record.request_headers.set("content-type", "application/json");
        record.request_headers.set(NETWORK_REQUEST_HEADER, "fetch");
        record.body = Some(JsValue::from("{\"a\":1}"));
        record
    }

    #[test]
    fn test_marker_is_hidden() {
        let record = record_with_marker();
        assert_eq!(
            record.visible_request_headers(),
            vec![("content-type".to_string(), "application/json".to_string())]
        );
        assert_eq!(record.request_headers_text(), "content-type: application/json\n");
    }

    #[test]
    fn test_curl_excludes_marker() {
        let curl = record_with_marker().to_curl();
        assert_eq!(
            curl,
            "curl -X POST \"https://api.test/items\" -H \"content-type: application/json\" -d '{\"a\":1}'"
        );
        assert!(!curl.contains(NETWORK_REQUEST_HEADER));
    }

    #[test]
    fn test_json_excludes_marker() {
        let json = serde_json::to_value(record_with_marker()).unwrap();
        assert_eq!(
            json["requestHeaders"],
            serde_json::json!([["content-type", "application/json"]])
        );
    }

    #[test]
    fn test_display_helpers() {
        let mut record = HttpRecord::new(NetworkType::Xhr, "", "https://api.test/x");
        assert_eq!(record.display_method(), "GET");
        assert_eq!(record.display_status(), "pending");
        assert_eq!(record.display_duration(), "pending");
        assert!(record.is_pending());

        record.status = Some(404);
        record.duration = Some(12);
        assert_eq!(record.display_status(), "404");
        assert_eq!(record.display_duration(), "12ms");
    }

    #[test]
    fn test_socket_transcript() {
        let mut record = WebSocketRecord::new("wss://echo.test", None, None, 0);
        record.messages.push(SocketMessage {
            direction: Direction::Sent,
            payload: "ping".to_string(),
        });
        record.messages.push(SocketMessage {
            direction: Direction::Received,
            payload: "pong".to_string(),
        });
        assert_eq!(record.transcript(), "Sent: ping\nReceived: pong\n");
        assert!(record.is_open());
    }

    #[test]
    fn test_record_json_shape() {
        let record = NetworkRecord::Http(HttpRecord::new(NetworkType::Xhr, "GET", "https://api.test/x"));
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["type"], "xhr");
        assert_eq!(json["method"], "GET");
        assert_eq!(json["requestHeaders"], serde_json::json!([]));
    }
}

// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Text formatting shared by records and the CLI

use crate::value::JsValue;

/// Default character limit for rendered values
pub const DEFAULT_CHAR_LIMIT: usize = 5000;

/// Truncate a string to `limit` characters, appending a marker when cut
pub fn limit_char(value: &str, limit: usize) -> String {
    match value.char_indices().nth(limit) {
        Some((byte_index, _)) => format!(
            "{}\n---LIMITED TO {} CHARACTERS---",
            &value[..byte_index],
            limit
        ),
        None => value.to_string(),
    }
}

/// Render a host value and truncate it.
///
/// Strings are used verbatim; everything else is rendered as JSON.
pub fn limit_value(value: &JsValue, limit: usize) -> String {
    match value {
        JsValue::String(s) => limit_char(s, limit),
        JsValue::Undefined => limit_char("\"\"", limit),
        other => limit_char(&other.to_json().to_string(), limit),
    }
}

/// `key: value\n` with the value truncated
pub fn key_value_to_string(key: &str, value: &str) -> String {
    format!("{}: {}\n", key, limit_char(value, DEFAULT_CHAR_LIMIT))
}

/// `name: value\n` header line, untruncated
pub fn create_http_header_line(name: &str, value: &str) -> String {
    format!("{}: {}\n", name, value)
}

/// One line of a socket transcript, e.g. `Sent: hello\n`
pub fn create_socket_data_line(direction: &str, data: &str) -> String {
    format!("{}: {}\n", direction, data)
}

/// Requests without an explicit method are GETs
pub fn format_request_method(method: Option<&str>) -> String {
    method.unwrap_or("GET").to_string()
}

/// `120ms`, or `pending` while no duration is known
pub fn format_request_duration(duration: Option<i64>) -> String {
    match duration {
        Some(ms) if ms != 0 => format!("{}ms", ms),
        _ => "pending".to_string(),
    }
}

/// Status code, or `pending` while no response arrived
pub fn format_request_status_code(status: Option<u16>) -> String {
    status
        .map(|s| s.to_string())
        .unwrap_or_else(|| "pending".to_string())
}

/// `LEVEL: v1, v2, ...` summary of a console call
pub fn format_log_message(level: &str, values: &[JsValue]) -> String {
    let message = values
        .iter()
        .map(|v| limit_value(v, DEFAULT_CHAR_LIMIT))
        .collect::<Vec<_>>()
        .join(", ");

    format!("{}: {}", level.to_uppercase(), message)
}

/// Render a request as a cURL command line
pub fn convert_to_curl(
    method: &str,
    url: &str,
    headers: &[(String, String)],
    body: Option<&JsValue>,
) -> String {
    let mut curl = format!("curl -X {} \"{}\"", method.to_uppercase(), url);

    for (key, value) in headers {
        curl.push_str(&format!(" -H \"{}: {}\"", key, value));
    }

    if let Some(body) = body.filter(|b| b.is_truthy()) {
        let body = match body {
            JsValue::String(s) => s.clone(),
            other => other.to_json().to_string(),
        };
        curl.push_str(&format!(" -d '{}'", body));
    }

    curl
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_limit_char() {
        assert_eq!(limit_char("short", 10), "short");
        assert_eq!(
            limit_char("abcdef", 3),
            "abc\n---LIMITED TO 3 CHARACTERS---"
        );
        // multi-byte characters are counted, not bytes
        assert_eq!(limit_char("ääää", 4), "ääää");
    }

    #[test]
    fn test_format_log_message() {
        let values = vec![JsValue::from("hello"), JsValue::from(42), JsValue::Null];
        assert_eq!(format_log_message("warn", &values), "WARN: hello, 42, null");
    }

    #[test]
    fn test_pending_placeholders() {
        assert_eq!(format_request_duration(None), "pending");
        assert_eq!(format_request_duration(Some(0)), "pending");
        assert_eq!(format_request_duration(Some(120)), "120ms");
        assert_eq!(format_request_status_code(None), "pending");
        assert_eq!(format_request_status_code(Some(404)), "404");
        assert_eq!(format_request_method(None), "GET");
    }

    #[test]
    fn test_convert_to_curl() {
        let headers = vec![("accept".to_string(), "application/json".to_string())];
        let curl = convert_to_curl(
            "post",
            "https://api.test/items",
            &headers,
            Some(&JsValue::from("{\"a\":1}")),
        );

        assert_eq!(
            curl,
            "curl -X POST \"https://api.test/items\" -H \"accept: application/json\" -d '{\"a\":1}'"
        );
    }

    #[test]
    fn test_curl_without_body() {
        let curl = convert_to_curl("GET", "https://api.test/x", &[], Some(&JsValue::Null));
        assert_eq!(curl, "curl -X GET \"https://api.test/x\"");
    }
}

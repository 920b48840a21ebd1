// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Host value representation
//!
//! Console arguments, request bodies and response payloads are arbitrary
//! host values. They are carried as [`JsValue`] so records can hold them
//! without knowing the host's own object model.

use std::collections::BTreeMap;

use bytes::Bytes;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Host value type.
///
/// Serializes as plain JSON; byte buffers become arrays of numbers.
#[derive(Debug, Clone, PartialEq)]
pub enum JsValue {
    /// Undefined value
    Undefined,
    /// Null value
    Null,
    /// Boolean value
    Boolean(bool),
    /// Number value (JavaScript only has f64)
    Number(f64),
    /// String value
    String(String),
    /// Array value
    Array(Vec<JsValue>),
    /// Plain object
    Object(BTreeMap<String, JsValue>),
    /// Binary payload (ArrayBuffer / Blob contents)
    Bytes(Bytes),
}

impl JsValue {
    /// Check if value is truthy
    pub fn is_truthy(&self) -> bool {
        match self {
            JsValue::Undefined | JsValue::Null => false,
            JsValue::Boolean(b) => *b,
            JsValue::Number(n) => *n != 0.0 && !n.is_nan(),
            JsValue::String(s) => !s.is_empty(),
            JsValue::Array(_) | JsValue::Object(_) | JsValue::Bytes(_) => true,
        }
    }

    /// Check if null or undefined
    pub fn is_nullish(&self) -> bool {
        matches!(self, JsValue::Undefined | JsValue::Null)
    }

    /// Get as string
    pub fn as_string(&self) -> Option<&str> {
        match self {
            JsValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Get as number
    pub fn as_number(&self) -> Option<f64> {
        match self {
            JsValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Convert to string (JavaScript-style coercion)
    pub fn to_string_value(&self) -> String {
        match self {
            JsValue::Undefined => "undefined".to_string(),
            JsValue::Null => "null".to_string(),
            JsValue::Boolean(b) => b.to_string(),
            JsValue::Number(n) => {
                if n.is_nan() {
                    "NaN".to_string()
                } else if n.is_infinite() {
                    if *n > 0.0 {
                        "Infinity".to_string()
                    } else {
                        "-Infinity".to_string()
                    }
                } else {
                    n.to_string()
                }
            }
            JsValue::String(s) => s.clone(),
            JsValue::Array(a) => a
                .iter()
                .map(|v| v.to_string_value())
                .collect::<Vec<_>>()
                .join(","),
            JsValue::Object(_) => "[object Object]".to_string(),
            JsValue::Bytes(_) => "[object ArrayBuffer]".to_string(),
        }
    }

    /// Render for display: strings as-is, everything else as JSON
    pub fn to_display_string(&self) -> String {
        match self {
            JsValue::String(s) => s.clone(),
            JsValue::Undefined => String::new(),
            other => other.to_json().to_string(),
        }
    }

    /// Create from JSON value
    pub fn from_json(json: &serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => JsValue::Null,
            serde_json::Value::Bool(b) => JsValue::Boolean(*b),
            serde_json::Value::Number(n) => JsValue::Number(n.as_f64().unwrap_or(f64::NAN)),
            serde_json::Value::String(s) => JsValue::String(s.clone()),
            serde_json::Value::Array(a) => JsValue::Array(a.iter().map(JsValue::from_json).collect()),
            serde_json::Value::Object(map) => JsValue::Object(
                map.iter()
                    .map(|(k, v)| (k.clone(), JsValue::from_json(v)))
                    .collect(),
            ),
        }
    }

    /// Convert to JSON value
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            JsValue::Undefined | JsValue::Null => serde_json::Value::Null,
            JsValue::Boolean(b) => serde_json::Value::Bool(*b),
            // Integral numbers print without a fraction, as the host would
            JsValue::Number(n) if n.fract() == 0.0 && n.abs() < 9_007_199_254_740_992.0 => {
                serde_json::Value::from(*n as i64)
            }
            JsValue::Number(n) => serde_json::Number::from_f64(*n)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            JsValue::String(s) => serde_json::Value::String(s.clone()),
            JsValue::Array(a) => serde_json::Value::Array(a.iter().map(|v| v.to_json()).collect()),
            JsValue::Object(map) => serde_json::Value::Object(
                map.iter().map(|(k, v)| (k.clone(), v.to_json())).collect(),
            ),
            JsValue::Bytes(b) => serde_json::Value::Array(
                b.iter().map(|byte| serde_json::Value::from(*byte)).collect(),
            ),
        }
    }

    /// Wire body for a request: strings and buffers as-is, nullish as no
    /// body, anything else serialized as JSON
    pub fn to_body(&self) -> Option<Bytes> {
        match self {
            JsValue::Undefined | JsValue::Null => None,
            JsValue::String(s) => Some(Bytes::from(s.clone())),
            JsValue::Bytes(b) => Some(b.clone()),
            other => Some(Bytes::from(other.to_json().to_string())),
        }
    }
}

impl Default for JsValue {
    fn default() -> Self {
        JsValue::Undefined
    }
}

impl From<bool> for JsValue {
    fn from(b: bool) -> Self {
        JsValue::Boolean(b)
    }
}

impl From<f64> for JsValue {
    fn from(n: f64) -> Self {
        JsValue::Number(n)
    }
}

impl From<i32> for JsValue {
    fn from(n: i32) -> Self {
        JsValue::Number(n as f64)
    }
}

impl From<String> for JsValue {
    fn from(s: String) -> Self {
        JsValue::String(s)
    }
}

impl From<&str> for JsValue {
    fn from(s: &str) -> Self {
        JsValue::String(s.to_string())
    }
}

impl From<Bytes> for JsValue {
    fn from(b: Bytes) -> Self {
        JsValue::Bytes(b)
    }
}

impl From<serde_json::Value> for JsValue {
    fn from(json: serde_json::Value) -> Self {
        JsValue::from_json(&json)
    }
}

impl Serialize for JsValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for JsValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        serde_json::Value::deserialize(deserializer).map(|json| JsValue::from_json(&json))
    }
}

impl std::fmt::Display for JsValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_string_value())
    }
}

// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Correlation id generation

use std::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};

const BASE36: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Length of the random suffix appended to the timestamp prefix
const RANDOM_SUFFIX_LEN: usize = 8;

/// Generate a correlation id for an HTTP operation.
///
/// Base36 epoch milliseconds followed by eight random base36 characters.
pub fn http_interceptor_id() -> String {
    let millis = chrono::Utc::now().timestamp_millis().max(0) as u64;
    let mut id = to_base36(millis);

    let mut rng = rand::thread_rng();
    id.extend((0..RANDOM_SUFFIX_LEN).map(|_| BASE36[rng.gen_range(0..BASE36.len())] as char));
    id
}

fn to_base36(mut value: u64) -> String {
    if value == 0 {
        return "0".to_string();
    }

    let mut digits = Vec::new();
    while value > 0 {
        digits.push(BASE36[(value % 36) as usize]);
        value /= 36;
    }
    digits.reverse();
    String::from_utf8_lossy(&digits).into_owned()
}

/// Key of a record in a correlation store
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RecordKey {
    /// HTTP operation (XHR or fetch)
    Http(String),
    /// WebSocket connection, keyed by the transport's socket id
    Socket(u64),
}

impl fmt::Display for RecordKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordKey::Http(id) => write!(f, "{}", id),
            RecordKey::Socket(id) => write!(f, "{}", id),
        }
    }
}

impl From<&str> for RecordKey {
    fn from(id: &str) -> Self {
        RecordKey::Http(id.to_string())
    }
}

impl From<u64> for RecordKey {
    fn from(id: u64) -> Self {
        RecordKey::Socket(id)
    }
}

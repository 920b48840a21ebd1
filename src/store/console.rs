// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Console log store

use std::collections::VecDeque;

use parking_lot::Mutex;

use super::record::LogRecord;
use crate::error::Result;
use crate::host::ConsoleLevel;
use crate::value::JsValue;

struct Logs {
    next_index: u64,
    records: VecDeque<LogRecord>,
}

/// Ordered console records with a monotonic index
pub struct LogStore {
    max_records: usize,
    logs: Mutex<Logs>,
}

impl LogStore {
    pub fn new(max_records: usize) -> Self {
        Self {
            max_records,
            logs: Mutex::new(Logs {
                next_index: 0,
                records: VecDeque::new(),
            }),
        }
    }

    /// Append one call, returning its index
    pub fn push(&self, level: ConsoleLevel, args: &[JsValue]) -> u64 {
        let mut logs = self.logs.lock();
        let index = logs.next_index;
        logs.next_index += 1;
        logs.records.push_back(LogRecord {
            index,
            level,
            values: args.to_vec(),
        });
        while logs.records.len() > self.max_records {
            logs.records.pop_front();
        }
        index
    }

    pub fn records(&self) -> Vec<LogRecord> {
        self.logs.lock().records.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.logs.lock().records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop all records; indices keep counting
    pub fn clear(&self) {
        self.logs.lock().records.clear();
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.records())?)
    }
}

impl Default for LogStore {
    fn default() -> Self {
        Self::new(1000)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_keeps_order_and_index() {
        let store = LogStore::default();
        store.push(ConsoleLevel::Log, &[JsValue::from("a")]);
        store.push(ConsoleLevel::Error, &[JsValue::from("b"), JsValue::from(2)]);

        let records = store.records();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].index, 0);
        assert_eq!(records[1].index, 1);
        assert_eq!(records[1].level, ConsoleLevel::Error);
        assert_eq!(records[1].values.len(), 2);
    }

    #[test]
    fn test_index_survives_clear_and_eviction() {
        let store = LogStore::new(2);
        for _ in 0..3 {
            store.push(ConsoleLevel::Info, &[]);
        }
        let indices: Vec<_> = store.records().iter().map(|r| r.index).collect();
        assert_eq!(indices, vec![1, 2]);

        store.clear();
        assert!(store.is_empty());
        assert_eq!(store.push(ConsoleLevel::Info, &[]), 3);
    }

    #[test]
    fn test_to_json() {
        let store = LogStore::default();
        store.push(ConsoleLevel::Warn, &[JsValue::from("x")]);
        let json: serde_json::Value = serde_json::from_str(&store.to_json().unwrap()).unwrap();
        assert_eq!(json[0]["index"], 0);
        assert_eq!(json[0]["values"][0], "x");
    }
}

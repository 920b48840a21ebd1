// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Correlation store for network records

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

use super::record::{Direction, HttpRecord, NetworkRecord, SocketMessage, WebSocketRecord};
use crate::correlation::{limit_char, RecordKey};
use crate::error::Result;
use crate::host::{Clock, WebSocketOptions};
use crate::interceptor::{HeadersReceived, HttpResponse, NetworkType, ServerClose, ServerError};
use crate::value::JsValue;

/// Retention and body capture policy of a store
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Oldest records are evicted past this count
    pub max_records: usize,
    /// Keep request and response bodies
    pub capture_bodies: bool,
    /// Truncate string bodies to this many characters
    pub max_body_chars: Option<usize>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            max_records: 1000,
            capture_bodies: true,
            max_body_chars: None,
        }
    }
}

#[derive(Default)]
struct Records {
    order: Vec<RecordKey>,
    by_key: HashMap<RecordKey, NetworkRecord>,
}

impl Records {
    fn insert(&mut self, key: RecordKey, record: NetworkRecord) {
        if self.by_key.insert(key.clone(), record).is_none() {
            self.order.push(key);
        }
    }

    fn remove(&mut self, key: &RecordKey) -> Option<NetworkRecord> {
        let removed = self.by_key.remove(key)?;
        self.order.retain(|k| k != key);
        Some(removed)
    }

    fn evict_to(&mut self, max: usize) {
        while self.order.len() > max {
            let oldest = self.order.remove(0);
            self.by_key.remove(&oldest);
        }
    }
}

/// Ordered, correlation-keyed network records.
///
/// Each apply method merges one interceptor event into the record it
/// belongs to. Events for ids with no record are ignored, so a record
/// only ever starts from `open` or `connect`.
pub struct NetworkStore {
    config: StoreConfig,
    clock: Arc<dyn Clock>,
    records: RwLock<Records>,
}

impl NetworkStore {
    pub fn new(config: StoreConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            config,
            clock,
            records: RwLock::new(Records::default()),
        }
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    // --- HTTP events ---

    pub fn open(&self, id: &str, kind: NetworkType, method: &str, url: &str) {
        let mut records = self.records.write();
        records.insert(
            RecordKey::from(id),
            NetworkRecord::Http(HttpRecord::new(kind, method, url)),
        );
        records.evict_to(self.config.max_records);
    }

    pub fn request_header(&self, id: &str, name: &str, value: &str) {
        self.update_http(id, |record| record.request_headers.set(name, value));
    }

    pub fn send(&self, id: &str, start_time: i64, body: Option<&JsValue>) {
        let body = self.capture(body);
        self.update_http(id, |record| {
            record.start_time = Some(start_time);
            record.body = body;
        });
    }

    pub fn header_received(&self, id: &str, received: &HeadersReceived) {
        self.update_http(id, |record| {
            record.response_content_type = received.content_type.clone();
            record.response_size = received.size;
            record.response_headers = Some(received.headers.clone());
        });
    }

    pub fn response(&self, id: &str, response: &HttpResponse) {
        let body = self.capture(response.body.as_ref());
        self.update_http(id, |record| {
            record.status = Some(response.status);
            record.timeout = Some(response.timeout);
            record.duration = Some(response.duration);
            record.end_time = record.start_time.map(|start| start + response.duration);
            record.response = body;
            if !response.url.is_empty() {
                record.url = response.url.clone();
            }
            record.response_type = Some(response.response_type.clone());
        });
    }

    /// Drop a record reported twice; the surviving one is of kind `reported_as`
    pub fn discard(&self, id: &str, reported_as: NetworkType) {
        let removed = self.records.write().remove(&RecordKey::from(id));
        if removed.is_some() {
            tracing::trace!(id, reported_as = %reported_as, "discarded duplicate record");
        }
    }

    // --- WebSocket events ---

    pub fn connect(
        &self,
        start_time: i64,
        url: &str,
        protocols: Option<&[String]>,
        options: Option<&WebSocketOptions>,
        socket_id: u64,
    ) {
        let record = WebSocketRecord::new(
            url,
            protocols.map(|p| p.to_vec()),
            options.cloned(),
            start_time,
        );
        let mut records = self.records.write();
        records.insert(RecordKey::Socket(socket_id), NetworkRecord::WebSocket(record));
        records.evict_to(self.config.max_records);
    }

    pub fn socket_send(&self, data: &str, socket_id: u64) {
        self.push_message(socket_id, Direction::Sent, data);
    }

    pub fn socket_close(&self, code: u16, reason: &str, socket_id: u64) {
        let now = self.clock.now_millis();
        self.update_socket(socket_id, |record| {
            record.status = Some(code);
            record.close_reason = Some(reason.to_string());
            record.end_time.get_or_insert(now);
        });
    }

    pub fn socket_open(&self, socket_id: u64, duration: Option<i64>) {
        self.update_socket(socket_id, |record| record.open_duration = duration);
    }

    pub fn socket_message(&self, socket_id: u64, payload: &str) {
        self.push_message(socket_id, Direction::Received, payload);
    }

    pub fn socket_error(&self, socket_id: u64, error: &ServerError) {
        self.update_socket(socket_id, |record| record.server_error = Some(error.clone()));
    }

    pub fn socket_closed(&self, socket_id: u64, close: &ServerClose) {
        let now = self.clock.now_millis();
        self.update_socket(socket_id, |record| {
            record.server_close = Some(close.clone());
            record.end_time.get_or_insert(now);
        });
    }

    // --- reading ---

    pub fn get(&self, key: &RecordKey) -> Option<NetworkRecord> {
        self.records.read().by_key.get(key).cloned()
    }

    pub fn http(&self, id: &str) -> Option<HttpRecord> {
        self.get(&RecordKey::from(id))
            .and_then(|r| r.as_http().cloned())
    }

    pub fn socket(&self, socket_id: u64) -> Option<WebSocketRecord> {
        self.get(&RecordKey::Socket(socket_id))
            .and_then(|r| r.as_websocket().cloned())
    }

    /// All records in creation order
    pub fn records(&self) -> Vec<(RecordKey, NetworkRecord)> {
        let records = self.records.read();
        records
            .order
            .iter()
            .filter_map(|key| records.by_key.get(key).map(|r| (key.clone(), r.clone())))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.records.read().order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Replace the mapping with an empty one
    pub fn clear(&self) {
        *self.records.write() = Records::default();
    }

    /// Records as a JSON array of `{ id, record }`
    pub fn to_json(&self) -> Result<String> {
        let entries: Vec<serde_json::Value> = self
            .records()
            .into_iter()
            .map(|(key, record)| -> Result<serde_json::Value> {
                Ok(serde_json::json!({
                    "id": key.to_string(),
                    "record": serde_json::to_value(record)?,
                }))
            })
            .collect::<Result<_>>()?;
        Ok(serde_json::to_string_pretty(&entries)?)
    }

    fn capture(&self, body: Option<&JsValue>) -> Option<JsValue> {
        if !self.config.capture_bodies {
            return None;
        }
        let body = body?;
        match (body, self.config.max_body_chars) {
            (JsValue::String(s), Some(limit)) => Some(JsValue::String(limit_char(s, limit))),
            _ => Some(body.clone()),
        }
    }

    fn update_http(&self, id: &str, f: impl FnOnce(&mut HttpRecord)) {
        let mut records = self.records.write();
        match records.by_key.get_mut(&RecordKey::from(id)) {
            Some(NetworkRecord::Http(record)) => f(record),
            _ => tracing::trace!(id, "ignored event for unknown request"),
        }
    }

    fn update_socket(&self, socket_id: u64, f: impl FnOnce(&mut WebSocketRecord)) {
        let mut records = self.records.write();
        match records.by_key.get_mut(&RecordKey::Socket(socket_id)) {
            Some(NetworkRecord::WebSocket(record)) => f(record),
            _ => tracing::trace!(socket_id, "ignored event for unknown socket"),
        }
    }

    fn push_message(&self, socket_id: u64, direction: Direction, payload: &str) {
        self.update_socket(socket_id, |record| {
            record.messages.push(SocketMessage {
                direction,
                payload: payload.to_string(),
            })
        });
    }
}

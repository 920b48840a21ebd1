// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Network inspector

use std::sync::Arc;

use super::config::InspectorConfig;
use crate::correlation::RecordKey;
use crate::error::Result;
use crate::host::HostRuntime;
use crate::interceptor::{
    FetchInterceptor, HttpInterceptor, Interceptor, WebSocketInterceptor, XhrInterceptor,
};
use crate::store::{NetworkRecord, NetworkStore};

/// Captures XHR, fetch and WebSocket traffic into one [`NetworkStore`]
pub struct NetworkInspector {
    config: InspectorConfig,
    xhr: Arc<XhrInterceptor>,
    fetch: Arc<FetchInterceptor>,
    websocket: Arc<WebSocketInterceptor>,
    store: Arc<NetworkStore>,
}

impl NetworkInspector {
    /// Inspector over the process-wide interceptors
    pub fn new(config: InspectorConfig) -> Self {
        Self::from_parts(
            config,
            HostRuntime::global(),
            XhrInterceptor::instance(),
            FetchInterceptor::instance(),
            WebSocketInterceptor::instance(),
        )
    }

    /// Inspector with its own interceptors bound to `host`
    pub fn with_host(host: Arc<HostRuntime>, config: InspectorConfig) -> Self {
        Self::from_parts(
            config,
            Arc::clone(&host),
            Arc::new(XhrInterceptor::new(Arc::clone(&host))),
            Arc::new(FetchInterceptor::new(Arc::clone(&host))),
            Arc::new(WebSocketInterceptor::new(host)),
        )
    }

    fn from_parts(
        config: InspectorConfig,
        host: Arc<HostRuntime>,
        xhr: Arc<XhrInterceptor>,
        fetch: Arc<FetchInterceptor>,
        websocket: Arc<WebSocketInterceptor>,
    ) -> Self {
        let store = Arc::new(NetworkStore::new(config.store_config(), host.clock()));
        let inspector = Self {
            config,
            xhr,
            fetch,
            websocket,
            store,
        };

        if inspector.config.auto_enabled {
            inspector.enable_interception();
        }
        inspector
    }

    /// Register store handlers on every interceptor, then enable them
    pub fn enable_interception(&self) {
        attach_http(self.xhr.as_ref(), &self.store);
        attach_http(self.fetch.as_ref(), &self.store);
        self.attach_websocket();

        self.xhr.enable_interception();
        self.fetch.enable_interception();
        self.websocket.enable_interception();

        tracing::debug!(enabled = self.is_interceptor_enabled(), "network inspector enabled");
    }

    pub fn disable_interception(&self) {
        self.xhr.disable_interception();
        self.fetch.disable_interception();
        self.websocket.disable_interception();
    }

    /// True only when all three interceptors are enabled
    pub fn is_interceptor_enabled(&self) -> bool {
        self.xhr.is_interceptor_enabled()
            && self.fetch.is_interceptor_enabled()
            && self.websocket.is_interceptor_enabled()
    }

    pub fn clear_all(&self) {
        self.store.clear();
    }

    /// Captured records in creation order
    pub fn network_requests(&self) -> Vec<(RecordKey, NetworkRecord)> {
        self.store.records()
    }

    pub fn store(&self) -> &Arc<NetworkStore> {
        &self.store
    }

    pub fn to_json(&self) -> Result<String> {
        self.store.to_json()
    }

    fn attach_websocket(&self) {
        let (s1, s2, s3) = (self.store.clone(), self.store.clone(), self.store.clone());
        let (s4, s5, s6, s7) = (
            self.store.clone(),
            self.store.clone(),
            self.store.clone(),
            self.store.clone(),
        );
        self.websocket
            .set_connect_callback(Arc::new(move |start, url, protocols, options, id| {
                s1.connect(start, url, protocols, options, id)
            }))
            .set_send_callback(Arc::new(move |data, id| s2.socket_send(data, id)))
            .set_close_callback(Arc::new(move |code, reason, id| s3.socket_close(code, reason, id)))
            .set_on_open_callback(Arc::new(move |id, duration| s4.socket_open(id, duration)))
            .set_on_message_callback(Arc::new(move |id, payload| s5.socket_message(id, payload)))
            .set_on_error_callback(Arc::new(move |id, error| s6.socket_error(id, error)))
            .set_on_close_callback(Arc::new(move |id, close| s7.socket_closed(id, close)));
    }
}

fn attach_http<I: HttpInterceptor>(interceptor: &I, store: &Arc<NetworkStore>) {
    let (s1, s2, s3) = (store.clone(), store.clone(), store.clone());
    let (s4, s5, s6) = (store.clone(), store.clone(), store.clone());
    interceptor
        .set_open_callback(Arc::new(move |id, kind, method, url| s1.open(id, kind, method, url)))
        .set_request_header_callback(Arc::new(move |id, name, value| {
            s2.request_header(id, name, value)
        }))
        .set_send_callback(Arc::new(move |id, start, body| s3.send(id, start, body)))
        .set_header_received_callback(Arc::new(move |id, received| {
            s4.header_received(id, received)
        }))
        .set_response_callback(Arc::new(move |id, response| s5.response(id, response)))
        .set_discard_callback(Arc::new(move |id, kind| s6.discard(id, kind)));
}

impl Drop for NetworkInspector {
    fn drop(&mut self) {
        if self.config.auto_enabled {
            self.disable_interception();
        }
    }
}

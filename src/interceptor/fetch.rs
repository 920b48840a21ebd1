// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Fetch interceptor

use std::sync::Arc;

use async_trait::async_trait;
use lazy_static::lazy_static;

use super::base::{Interceptor, InterceptorState};
use super::http::{
    headers_received, HttpHandlers, HttpInterceptor, HttpResponse, NetworkType,
    NETWORK_REQUEST_HEADER,
};
use crate::correlation::{format_request_method, http_interceptor_id};
use crate::error::Result;
use crate::host::{
    Clock, Fetch, FetchInput, FetchResponse, HeadersInit, HostRuntime, RequestInit,
};
use crate::value::JsValue;

lazy_static! {
    static ref INSTANCE: Arc<FetchInterceptor> =
        Arc::new(FetchInterceptor::new(HostRuntime::global()));
}

/// Intercepts the host's fetch
pub struct FetchInterceptor {
    host: Arc<HostRuntime>,
    original: Arc<dyn Fetch>,
    replacement: Arc<dyn Fetch>,
    state: Arc<InterceptorState<HttpHandlers>>,
}

impl FetchInterceptor {
    /// Bind to `host`, capturing its current fetch as the original
    pub fn new(host: Arc<HostRuntime>) -> Self {
        let original = host.fetch_slot().get();
        let state = Arc::new(InterceptorState::new("fetch"));
        let replacement: Arc<dyn Fetch> = Arc::new(InterceptedFetch {
            original: Arc::clone(&original),
            state: Arc::clone(&state),
            clock: host.clock(),
        });

        Self {
            host,
            original,
            replacement,
            state,
        }
    }

    /// Process-wide interceptor bound to [`HostRuntime::global`]
    pub fn instance() -> Arc<FetchInterceptor> {
        Arc::clone(&INSTANCE)
    }

    /// Fetch captured at construction
    pub fn original(&self) -> &Arc<dyn Fetch> {
        &self.original
    }
}

impl Interceptor for FetchInterceptor {
    fn enable_interception(&self) {
        self.state.enable_with(|| {
            self.host
                .fetch_slot()
                .patch(self.state.owner(), Arc::clone(&self.replacement))
        });
    }

    fn disable_interception(&self) {
        self.state.disable_with(|| {
            self.host
                .fetch_slot()
                .restore(self.state.owner(), Arc::clone(&self.original));
        });
    }

    fn is_interceptor_enabled(&self) -> bool {
        self.state.is_enabled()
    }
}

impl HttpInterceptor for FetchInterceptor {
    fn update_handlers(&self, f: &mut dyn FnMut(&mut HttpHandlers)) {
        self.state.update(|h| f(h));
    }
}

/// Fetch installed while interception is enabled
struct InterceptedFetch {
    original: Arc<dyn Fetch>,
    state: Arc<InterceptorState<HttpHandlers>>,
    clock: Arc<dyn Clock>,
}

#[async_trait]
impl Fetch for InterceptedFetch {
    async fn fetch(&self, input: FetchInput, mut init: RequestInit) -> Result<FetchResponse> {
        let id = http_interceptor_id();
        let session = self.state.session();

        // Declared headers plus the marker, so a request-object transport
        // underneath can tell this request was already reported
        let mut headers = match init.headers.take() {
            Some(declared) => declared.into_headers(),
            None => input.headers().cloned().unwrap_or_default(),
        };
        headers.append(NETWORK_REQUEST_HEADER, NetworkType::Fetch.as_str());

        let method = format_request_method(init.method.as_deref().or_else(|| input.method()));
        let url = input.url();

        self.state.emit_in(session, "open", |h| {
            if let Some(cb) = &h.open {
                cb(&id, NetworkType::Fetch, &method, &url);
            }
        });

        self.state.emit_in(session, "request_header", |h| {
            if let Some(cb) = &h.request_header {
                for (name, value) in headers.iter() {
                    cb(&id, name, value);
                }
            }
        });

        let body: Option<JsValue> = init.body.clone().or_else(|| match &input {
            FetchInput::Request(r) => r.body.clone(),
            _ => None,
        });
        let start_time = self.clock.now_millis();
        self.state.emit_in(session, "send", |h| {
            if let Some(cb) = &h.send {
                cb(&id, start_time, body.as_ref());
            }
        });

        init.headers = Some(HeadersInit::Headers(headers));
        let response = self.original.fetch(input, init).await?;
        let end_time = self.clock.now_millis();

        let received = headers_received(response.headers.clone());
        self.state.emit_in(session, "header_received", |h| {
            if let Some(cb) = &h.header_received {
                cb(&id, &received);
            }
        });

        let completed = HttpResponse {
            status: response.status,
            timeout: 0,
            duration: end_time - start_time,
            body: response.text().ok().map(JsValue::String),
            url: response.url.clone(),
            response_type: response.response_type.as_str().to_string(),
        };
        self.state.emit_in(session, "response", |h| {
            if let Some(cb) = &h.response {
                cb(&id, &completed);
            }
        });

        Ok(response)
    }
}

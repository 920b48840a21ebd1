// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Request-object interceptor

use std::sync::Arc;

use lazy_static::lazy_static;

use super::base::{Interceptor, InterceptorState};
use super::http::{
    headers_received, is_network_marker, HttpHandlers, HttpInterceptor, HttpResponse, NetworkType,
};
use crate::correlation::http_interceptor_id;
use crate::error::Result;
use crate::host::{Clock, Headers, HostRuntime, ReadyState, XhrPrototype, XmlHttpRequest};
use crate::value::JsValue;

lazy_static! {
    static ref INSTANCE: Arc<XhrInterceptor> = Arc::new(XhrInterceptor::new(HostRuntime::global()));
}

/// Intercepts `open`, `setRequestHeader` and `send` on the host's
/// request-object prototype
pub struct XhrInterceptor {
    host: Arc<HostRuntime>,
    original: Arc<dyn XhrPrototype>,
    replacement: Arc<dyn XhrPrototype>,
    state: Arc<InterceptorState<HttpHandlers>>,
}

impl XhrInterceptor {
    /// Bind to `host`, capturing its current prototype as the original
    pub fn new(host: Arc<HostRuntime>) -> Self {
        let original = host.xhr_prototype().get();
        let state = Arc::new(InterceptorState::new("xhr"));
        let replacement: Arc<dyn XhrPrototype> = Arc::new(InterceptedXhr {
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
    pub fn instance() -> Arc<XhrInterceptor> {
        Arc::clone(&INSTANCE)
    }

    /// Prototype captured at construction
    pub fn original(&self) -> &Arc<dyn XhrPrototype> {
        &self.original
    }
}

impl Interceptor for XhrInterceptor {
    fn enable_interception(&self) {
        self.state.enable_with(|| {
            self.host
                .xhr_prototype()
                .patch(self.state.owner(), Arc::clone(&self.replacement))
        });
    }

    fn disable_interception(&self) {
        self.state.disable_with(|| {
            self.host
                .xhr_prototype()
                .restore(self.state.owner(), Arc::clone(&self.original));
        });
    }

    fn is_interceptor_enabled(&self) -> bool {
        self.state.is_enabled()
    }
}

impl HttpInterceptor for XhrInterceptor {
    fn update_handlers(&self, f: &mut dyn FnMut(&mut HttpHandlers)) {
        self.state.update(|h| f(h));
    }
}

/// Prototype installed while interception is enabled
struct InterceptedXhr {
    original: Arc<dyn XhrPrototype>,
    state: Arc<InterceptorState<HttpHandlers>>,
    clock: Arc<dyn Clock>,
}

impl XhrPrototype for InterceptedXhr {
    fn open(&self, xhr: &Arc<XmlHttpRequest>, method: &str, url: &str) -> Result<()> {
        let id = http_interceptor_id();
        xhr.set_interception_id(id.clone());

        self.state.emit("open", |h| {
            if let Some(cb) = &h.open {
                cb(&id, NetworkType::Xhr, method, url);
            }
        });

        self.original.open(xhr, method, url)
    }

    fn set_request_header(&self, xhr: &Arc<XmlHttpRequest>, name: &str, value: &str) -> Result<()> {
        if let Some(id) = xhr.interception_id() {
            if is_network_marker(name, value) {
                if !xhr.is_internal() {
                    xhr.mark_internal();
                    tracing::trace!(id = %id, "request object driven by fetch");
                    self.state.emit("discard", |h| {
                        if let Some(cb) = &h.discard {
                            cb(&id, NetworkType::Fetch);
                        }
                    });
                }
            } else if !xhr.is_internal() {
                self.state.emit("request_header", |h| {
                    if let Some(cb) = &h.request_header {
                        cb(&id, name, value);
                    }
                });
            }
        }

        self.original.set_request_header(xhr, name, value)
    }

    fn send(&self, xhr: &Arc<XmlHttpRequest>, body: Option<JsValue>) -> Result<()> {
        let id = match xhr.interception_id() {
            Some(id) if !xhr.is_internal() => id,
            _ => return self.original.send(xhr, body),
        };

        let start_time = self.clock.now_millis();
        self.state.emit("send", |h| {
            if let Some(cb) = &h.send {
                cb(&id, start_time, body.as_ref());
            }
        });

        let session = self.state.session();
        let state = Arc::clone(&self.state);
        let clock = Arc::clone(&self.clock);
        let listener_id = id.clone();
        xhr.add_ready_state_listener(Arc::new(move |xhr| {
            // A reused object gets a new id at open; old listeners go quiet
            if xhr.interception_id().as_deref() != Some(listener_id.as_str()) {
                return;
            }

            match xhr.ready_state() {
                ReadyState::HeadersReceived => {
                    let received =
                        headers_received(Headers::parse_raw_block(&xhr.get_all_response_headers()));
                    state.emit_in(session, "header_received", |h| {
                        if let Some(cb) = &h.header_received {
                            cb(&listener_id, &received);
                        }
                    });
                }
                ReadyState::Done => {
                    let response = HttpResponse {
                        status: xhr.status(),
                        timeout: xhr.timeout(),
                        duration: clock.now_millis() - start_time,
                        body: xhr.response(),
                        url: xhr.response_url(),
                        response_type: xhr.response_type(),
                    };
                    state.emit_in(session, "response", |h| {
                        if let Some(cb) = &h.response {
                            cb(&listener_id, &response);
                        }
                    });
                }
                _ => {}
            }
        }));

        self.original.send(xhr, body)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use bytes::Bytes;
    use parking_lot::Mutex;

    use super::*;
    use crate::host::testing::ScriptedXhrBackend;
    use crate::host::ManualClock;
    use crate::interceptor::http::NETWORK_REQUEST_HEADER;

    #[derive(Debug, Clone, PartialEq)]
    enum Seen {
        Open(String, NetworkType, String, String),
        Header(String, String, String),
        Send(String, i64, Option<JsValue>),
        HeadersReceived(String, Option<String>, Option<u64>),
        Response(String, u16, i64, String),
        Discard(String, NetworkType),
    }

    fn setup() -> (Arc<HostRuntime>, Arc<ScriptedXhrBackend>, Arc<ManualClock>) {
        let backend = Arc::new(ScriptedXhrBackend::default());
        let clock = Arc::new(ManualClock::new(1_000));
        let host = HostRuntime::builder()
            .clock(clock.clone())
            .xhr_backend(backend.clone())
            .build();
        (host, backend, clock)
    }

    fn recording(interceptor: &XhrInterceptor) -> Arc<Mutex<Vec<Seen>>> {
        let seen = Arc::new(Mutex::new(Vec::new()));

        let (s1, s2, s3, s4, s5, s6) = (
            seen.clone(),
            seen.clone(),
            seen.clone(),
            seen.clone(),
            seen.clone(),
            seen.clone(),
        );
        interceptor
            .set_open_callback(Arc::new(move |id, kind, method, url| {
                s1.lock()
                    .push(Seen::Open(id.into(), kind, method.into(), url.into()))
            }))
            .set_request_header_callback(Arc::new(move |id, name, value| {
                s2.lock().push(Seen::Header(id.into(), name.into(), value.into()))
            }))
            .set_send_callback(Arc::new(move |id, start, body| {
                s3.lock().push(Seen::Send(id.into(), start, body.cloned()))
            }))
            .set_header_received_callback(Arc::new(move |id, received| {
                s4.lock().push(Seen::HeadersReceived(
                    id.into(),
                    received.content_type.clone(),
                    received.size,
                ))
            }))
            .set_response_callback(Arc::new(move |id, response| {
                s5.lock().push(Seen::Response(
                    id.into(),
                    response.status,
                    response.duration,
                    response.url.clone(),
                ))
            }))
            .set_discard_callback(Arc::new(move |id, kind| {
                s6.lock().push(Seen::Discard(id.into(), kind))
            }));

        seen
    }

    #[test]
    fn test_full_event_sequence() {
        let (host, backend, clock) = setup();
        let interceptor = XhrInterceptor::new(host.clone());
        let seen = recording(&interceptor);
        interceptor.enable_interception();

        let xhr = host.new_xhr();
        xhr.open("GET", "https://api.test/x?y=1").unwrap();
        xhr.set_request_header("accept", "application/json").unwrap();
        xhr.send(None).unwrap();
        let id = xhr.interception_id().unwrap();

        let dispatched = backend.next_request().unwrap();
        assert!(Arc::ptr_eq(&dispatched, &xhr));

        clock.advance(25);
        let mut headers = Headers::new();
        headers.append("Content-Type", "application/json; charset=utf-8");
        headers.append("Content-Length", "11");
        xhr.receive_headers(200, headers, "https://api.test/x?y=1");
        xhr.receive_body(Bytes::from_static(b"{\"a\":true}"));

        assert_eq!(
            *seen.lock(),
            vec![
                Seen::Open(id.clone(), NetworkType::Xhr, "GET".into(), "https://api.test/x?y=1".into()),
                Seen::Header(id.clone(), "accept".into(), "application/json".into()),
                Seen::Send(id.clone(), 1_000, None),
                Seen::HeadersReceived(id.clone(), Some("application/json".into()), Some(11)),
                Seen::Response(id, 200, 25, "https://api.test/x?y=1".into()),
            ]
        );
    }

    #[test]
    fn test_pass_through_reaches_backend() {
        let (host, backend, _clock) = setup();
        let interceptor = XhrInterceptor::new(host.clone());
        interceptor.enable_interception();

        let xhr = host.new_xhr();
        xhr.open("post", "https://api.test/items").unwrap();
        xhr.set_request_header("x-token", "t").unwrap();
        xhr.send(Some(JsValue::from("body"))).unwrap();

        let dispatched = backend.next_request().unwrap();
        assert_eq!(dispatched.method(), "POST");
        assert_eq!(dispatched.request_headers().get("x-token").as_deref(), Some("t"));
        assert_eq!(dispatched.request_body(), Some(JsValue::from("body")));
    }

    #[test]
    fn test_marker_header_discards() {
        let (host, backend, _clock) = setup();
        let interceptor = XhrInterceptor::new(host.clone());
        let seen = recording(&interceptor);
        interceptor.enable_interception();

        let xhr = host.new_xhr();
        xhr.open("GET", "https://api.test/x").unwrap();
        let id = xhr.interception_id().unwrap();
        xhr.set_request_header("X-Xenon-Network-Type", "Fetch").unwrap();
        xhr.set_request_header("accept", "*/*").unwrap();
        xhr.send(None).unwrap();
        xhr.receive_headers(200, Headers::new(), "");
        xhr.receive_body(Bytes::new());

        let seen = seen.lock().clone();
        assert_eq!(seen.len(), 2);
        assert!(matches!(&seen[0], Seen::Open(..)));
        assert_eq!(seen[1], Seen::Discard(id, NetworkType::Fetch));

        // the marker still reaches the original
        let dispatched = backend.next_request().unwrap();
        assert!(dispatched.request_headers().contains(NETWORK_REQUEST_HEADER));
    }

    #[test]
    fn test_disable_restores_original_prototype() {
        let (host, _backend, _clock) = setup();
        let interceptor = XhrInterceptor::new(host.clone());
        let original = host.xhr_prototype().get();

        interceptor.disable_interception();
        assert!(host.xhr_prototype().is(&original));

        interceptor.enable_interception();
        interceptor.enable_interception();
        assert!(!host.xhr_prototype().is(&original));
        assert!(interceptor.is_interceptor_enabled());

        interceptor.disable_interception();
        interceptor.disable_interception();
        assert!(host.xhr_prototype().is(&original));
        assert!(Arc::ptr_eq(interceptor.original(), &original));
    }

    #[test]
    fn test_disable_drops_in_flight_events() {
        let (host, _backend, _clock) = setup();
        let interceptor = XhrInterceptor::new(host.clone());
        let seen = recording(&interceptor);
        interceptor.enable_interception();

        let xhr = host.new_xhr();
        xhr.open("GET", "https://api.test/slow").unwrap();
        xhr.send(None).unwrap();
        let before = seen.lock().len();

        interceptor.disable_interception();
        xhr.receive_headers(200, Headers::new(), "");
        xhr.receive_body(Bytes::new());

        assert_eq!(seen.lock().len(), before);
        assert_eq!(xhr.ready_state(), ReadyState::Done);
    }

    #[test]
    fn test_second_interceptor_cannot_patch() {
        let (host, _backend, _clock) = setup();
        let first = XhrInterceptor::new(host.clone());
        let second = XhrInterceptor::new(host.clone());

        first.enable_interception();
        let patched = host.xhr_prototype().get();
        second.enable_interception();

        assert!(!second.is_interceptor_enabled());
        assert!(host.xhr_prototype().is(&patched));

        // the refused one must not undo the patch either
        second.disable_interception();
        assert!(host.xhr_prototype().is(&patched));
    }

    #[test]
    fn test_panicking_handler_does_not_break_host() {
        let (host, backend, _clock) = setup();
        let interceptor = XhrInterceptor::new(host.clone());
        let sends = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&sends);
        interceptor
            .set_open_callback(Arc::new(|_, _, _, _| panic!("broken consumer")))
            .set_send_callback(Arc::new(move |_, _, _| {
                counter.fetch_add(1, Ordering::SeqCst);
            }));
        interceptor.enable_interception();

        let xhr = host.new_xhr();
        xhr.open("GET", "https://api.test/x").unwrap();
        xhr.send(None).unwrap();

        assert_eq!(backend.pending(), 1);
        assert_eq!(sends.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_objects_opened_before_enable_are_silent() {
        let (host, backend, _clock) = setup();
        let interceptor = XhrInterceptor::new(host.clone());
        let seen = recording(&interceptor);

        let xhr = host.new_xhr();
        xhr.open("GET", "https://api.test/x").unwrap();
        interceptor.enable_interception();
        xhr.set_request_header("accept", "*/*").unwrap();
        xhr.send(None).unwrap();

        assert!(seen.lock().is_empty());
        assert_eq!(backend.pending(), 1);
    }
}

// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Interceptors for the host's network and console primitives
//!
//! Each interceptor captures the primitive it wraps when constructed,
//! installs an emitting replacement on enable and puts the captured
//! original back on disable. Replacements always forward to the original
//! with unchanged arguments.

mod base;
mod console;
mod fetch;
mod http;
mod websocket;
mod xhr;

pub use base::Interceptor;
pub use console::{ConsoleCallback, ConsoleHandlers, ConsoleInterceptor};
pub use fetch::FetchInterceptor;
pub use http::{
    is_network_marker, parse_content_length, parse_content_type, DiscardCallback,
    HeaderReceivedCallback, HeadersReceived, HttpHandlers, HttpInterceptor, HttpResponse,
    NetworkType, OpenCallback, RequestHeaderCallback, ResponseCallback, SendCallback,
    NETWORK_REQUEST_HEADER,
};
pub use websocket::{
    array_buffer_to_string, ConnectCallback, OnCloseCallback, OnErrorCallback, OnMessageCallback,
    OnOpenCallback, ServerClose, ServerError, SocketCloseCallback, SocketSendCallback,
    WebSocketHandlers, WebSocketInterceptor,
};
pub use xhr::XhrInterceptor;

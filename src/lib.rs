// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! # Xenon - Embedded Runtime Inspector
//!
//! Observes a host application's XHR, fetch, WebSocket and console activity
//! without its cooperation and assembles the observed events into records.
//!
//! ## Features
//!
//! - Transparent interception: every patched primitive forwards to the original
//! - Correlation ids joining the asynchronous events of one operation
//! - Fetch/XHR de-duplication when fetch is driven over the request object
//! - WebSocket message logs kept per socket
//! - Console capture for all ten console levels
//! - Enable and disable at any time, in-flight events of a disabled
//!   interceptor are dropped
//!
//! ## Example
//!
//! ```rust,no_run
//! use xenon::{HostRuntime, InspectorConfig, NetworkInspector, RequestInit};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let host = HostRuntime::global();
//!     let inspector = NetworkInspector::new(InspectorConfig::default());
//!     inspector.enable_interception();
//!
//!     host.fetch("https://example.com", RequestInit::new()).await?;
//!
//!     for (id, record) in inspector.network_requests() {
//!         println!("{} {} {}", id, record.kind(), record.url());
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod correlation;
pub mod error;
pub mod host;
pub mod http;
pub mod inspector;
pub mod interceptor;
pub mod store;
pub mod value;

// Re-exports for convenience

// Errors
pub use error::{Error, Result};

// Host
pub use host::{
    Clock, Console, ConsoleLevel, Fetch, FetchInput, FetchRequest, FetchResponse, Headers,
    HeadersInit, HostRuntime, HostRuntimeBuilder, ManualClock, NativeEventEmitter,
    NativeWebSocket, RequestInit, ResponseType, SystemClock, WebSocketEvent, WebSocketOptions,
    XmlHttpRequest,
};

// HTTP
pub use http::{HttpClient, HttpClientConfig};

// Interceptors
pub use interceptor::{
    ConsoleInterceptor, FetchInterceptor, HttpInterceptor, Interceptor, NetworkType,
    WebSocketInterceptor, XhrInterceptor, NETWORK_REQUEST_HEADER,
};

// Inspectors and stores
pub use inspector::{ConsoleInspector, InspectorConfig, NetworkInspector};
pub use store::{HttpRecord, LogRecord, LogStore, NetworkRecord, NetworkStore, WebSocketRecord};

// Values and formatting
pub use correlation::{convert_to_curl, http_interceptor_id, RecordKey};
pub use value::JsValue;

/// Xenon version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

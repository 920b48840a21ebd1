// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! HTTP transport for the default host
//!
//! A reqwest client that backs the native request object and can also
//! serve as an independent fetch.

mod client;

pub use client::{HttpClient, HttpClientConfig};

/// Default user agent string
pub const DEFAULT_USER_AGENT: &str = concat!("xenon/", env!("CARGO_PKG_VERSION"));

/// Common HTTP headers
pub mod headers {
    pub const ACCEPT: &str = "accept";
    pub const CONTENT_TYPE: &str = "content-type";
    pub const CONTENT_LENGTH: &str = "content-length";
}

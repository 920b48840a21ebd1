// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Correlation identities and record formatting helpers

mod format;
mod id;

pub use format::{
    convert_to_curl, create_http_header_line, create_socket_data_line, format_log_message,
    format_request_duration, format_request_method, format_request_status_code,
    key_value_to_string, limit_char, limit_value, DEFAULT_CHAR_LIMIT,
};
pub use id::{http_interceptor_id, RecordKey};

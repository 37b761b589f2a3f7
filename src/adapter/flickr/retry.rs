//! Flickr Error Classification
//!
//! Maps transport failures, HTTP statuses and API error codes onto
//! `RemoteError::Transient` (worth retrying) or `RemoteError::Fatal`.

use reqwest::StatusCode;

use crate::domain::errors::RemoteError;

/// "Service currently unavailable"
pub const API_CODE_SERVICE_UNAVAILABLE: i64 = 105;

/// Convert error chain to string including all causes
pub fn error_chain_to_string(e: &(dyn std::error::Error + 'static)) -> String {
    let mut messages = vec![e.to_string()];
    let mut source = e.source();
    while let Some(cause) = source {
        messages.push(cause.to_string());
        source = cause.source();
    }
    messages.join(" | ")
}

/// Check if an error message points at a dropped or refused connection
pub fn is_connection_error(error_msg: &str) -> bool {
    error_msg.contains("Broken pipe")
        || error_msg.contains("broken pipe")
        || error_msg.contains("Connection reset")
        || error_msg.contains("connection reset")
        || error_msg.contains("Connection refused")
        || error_msg.contains("connection refused")
        || error_msg.contains("connection error")
        || error_msg.contains("connection closed")
        || error_msg.contains("EOF")
        || error_msg.contains("unexpected end of file")
}

/// Check if an error message describes an overloaded or slow service
pub fn is_transient_error(error_msg: &str) -> bool {
    error_msg.contains("503")
        || error_msg.contains("502")
        || error_msg.contains("500")
        || error_msg.contains("429")
        || error_msg.contains("rate limit")
        || error_msg.contains("quota")
        || error_msg.contains("Quota")
        || error_msg.contains("timeout")
        || error_msg.contains("Timeout")
        || error_msg.contains("timed out")
}

/// Check if an error message indicates a retryable error
pub fn is_retryable_error(error_msg: &str) -> bool {
    is_connection_error(error_msg) || is_transient_error(error_msg)
}

/// Classify a non-success HTTP status
pub fn classify_status(status: StatusCode, body: &str) -> RemoteError {
    let message = format!("HTTP {}: {}", status, body.trim());
    if status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS {
        RemoteError::Transient(message)
    } else {
        RemoteError::Fatal(message)
    }
}

/// Classify a `stat="fail"` API reply
pub fn classify_api_failure(code: i64, message: &str) -> RemoteError {
    let message = format!("API error {}: {}", code, message);
    if code == API_CODE_SERVICE_UNAVAILABLE {
        RemoteError::Transient(message)
    } else {
        RemoteError::Fatal(message)
    }
}

/// Classify a transport-level failure
pub fn classify_transport(e: &reqwest::Error) -> RemoteError {
    let message = error_chain_to_string(e);
    if e.is_timeout() || e.is_connect() || is_retryable_error(&message) {
        RemoteError::Transient(message)
    } else {
        RemoteError::Fatal(message)
    }
}

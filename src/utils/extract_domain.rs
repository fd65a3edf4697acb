//! Request header accessors used by the redirect and well-known handlers.

use axum::http::{HeaderMap, header};

/// Returns the raw `Host` header, if present and valid UTF-8.
///
/// Port stripping and normalization are left to
/// [`crate::domain::resolver::DomainResolver::resolve`], which treats an
/// absent host as not found rather than as a client error.
pub fn host_from_headers(headers: &HeaderMap) -> Option<&str> {
    headers.get(header::HOST).and_then(|v| v.to_str().ok())
}

/// Returns the `User-Agent` header, if present and valid UTF-8.
pub fn user_agent_from_headers(headers: &HeaderMap) -> Option<&str> {
    headers.get(header::USER_AGENT).and_then(|v| v.to_str().ok())
}

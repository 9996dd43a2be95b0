//! HTTP request and response types passed between the controller and a
//! `Transport`.
//!
//! # Design
//! Requests and responses are plain owned data. The controller builds an
//! `HttpRequest` once per call and never mutates it; the transport turns it
//! into a real round-trip and hands back an `HttpResponse`. Keeping the
//! boundary as data lets tests substitute an in-memory transport and lets the
//! FFI layer inspect what would be sent.

use crate::config::ClientConfig;
use crate::headers;

/// HTTP method for a request. Only the two verbs the controller issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
}

impl HttpMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
        }
    }
}

/// One outgoing HTTP call described as plain data.
///
/// `body` is empty for GET. `headers` always carries the fixed
/// device/app bundle from [`headers::fixed_headers`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl HttpRequest {
    /// `url` is stored verbatim; callers validate it before building.
    pub fn new(
        method: HttpMethod,
        url: String,
        body: String,
        device_id: &str,
        config: &ClientConfig,
    ) -> Self {
        Self {
            method,
            url,
            headers: headers::fixed_headers(device_id, config),
            body,
        }
    }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// The raw result of a completed round-trip, whatever its status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

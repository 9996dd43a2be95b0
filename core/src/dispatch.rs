//! Executes one request and reduces its outcome to "body or nothing".
//!
//! # Design
//! Observers only ever see `Option<String>`. A transport failure becomes
//! `None`. A non-2xx status is logged but its body is still forwarded, so a
//! server error page reaches observers looking exactly like a success. Only a
//! non-2xx status with an empty body, or a body that is not UTF-8, becomes
//! `None`. Observers cannot tell a server error from a success.

use tracing::{debug, warn};

use crate::http::{HttpRequest, HttpResponse};
use crate::transport::Transport;

/// Perform exactly one round-trip and return the response body, if any.
pub async fn dispatch(transport: &dyn Transport, request: HttpRequest) -> Option<String> {
    let url = request.url.clone();
    let method = request.method;
    match transport.execute(request).await {
        Ok(response) => response_body(&url, response),
        Err(e) => {
            warn!(%url, method = method.as_str(), error = %e, "request failed");
            None
        }
    }
}

/// Reduce a completed round-trip to the body observers receive.
pub fn response_body(url: &str, response: HttpResponse) -> Option<String> {
    if !response.is_success() {
        warn!(url, status = response.status, "unexpected http status");
        if response.body.is_empty() {
            return None;
        }
    }
    match String::from_utf8(response.body) {
        Ok(body) => {
            debug!(url, status = response.status, %body, "response");
            Some(body)
        }
        Err(e) => {
            warn!(url, error = %e, "response body is not valid utf-8");
            None
        }
    }
}

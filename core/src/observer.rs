//! The observer contract for request completions.

use crate::http::HttpMethod;

/// What observers receive when a request finishes.
///
/// `response` is the decoded body, or `None` when the transport failed, a
/// non-2xx status came back without a body, or the body was not UTF-8.
/// A non-2xx status that carries a body still arrives as `Some`.
/// `error_message` is always `None` today; failures are only visible as an
/// absent response plus a log line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    pub method: HttpMethod,
    pub response: Option<String>,
    pub error_message: Option<String>,
    /// The caller's correlation token, echoed back unchanged.
    pub identify: String,
}

/// Receives completion notifications from an `HttpController`.
///
/// Called on a runtime worker thread, never on the thread that issued the
/// request. Implementations that touch UI state must hop to their own thread.
/// A panic inside `on_completed` is caught and logged by the controller; the
/// observers registered after it are still notified and the request's
/// `JoinHandle` still resolves to the `Completion`.
pub trait HttpObserver: Send + Sync {
    fn on_completed(&self, completion: &Completion);
}

impl<F> HttpObserver for F
where
    F: Fn(&Completion) + Send + Sync,
{
    fn on_completed(&self, completion: &Completion) {
        self(completion)
    }
}

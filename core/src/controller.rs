//! The controller facade: builds requests against the configured base URL,
//! dispatches them, and fans the outcome out to observers.
//!
//! # Design
//! `HttpController` owns its `ClientConfig` (behind a lock, so the base URL
//! can be changed while requests are in flight), a `dyn Transport`, a device
//! identity and the observer registry. Each `do_*` call is validated and
//! built synchronously (so a bad URL or unserializable params come back as
//! `Err` right away), then spawned onto the runtime handle the controller was
//! built with. The caller gets a `JoinHandle<Completion>` and never blocks;
//! dropping the handle detaches the task. Observers are notified from the
//! spawned task before the handle resolves. A panicking observer is logged
//! and skipped; the remaining observers are still notified.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

use parking_lot::RwLock;
use serde::Serialize;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{debug, warn};
use url::Url;

use crate::config::ClientConfig;
use crate::device::{DeviceIdentity, InstallId};
use crate::dispatch::dispatch;
use crate::error::{Error, Result};
use crate::http::{HttpMethod, HttpRequest};
use crate::notifier::{Multicast, SubscriptionId};
use crate::observer::{Completion, HttpObserver};
use crate::transport::Transport;

pub struct HttpController {
    config: RwLock<ClientConfig>,
    device: Arc<dyn DeviceIdentity>,
    transport: Arc<dyn Transport>,
    observers: Arc<Multicast<dyn HttpObserver>>,
    runtime: Handle,
}

impl HttpController {
    /// Create a controller that spawns its requests on `runtime`. The device
    /// id defaults to a freshly generated [`InstallId`].
    pub fn new(config: ClientConfig, transport: Arc<dyn Transport>, runtime: Handle) -> Self {
        Self {
            config: RwLock::new(config),
            device: Arc::new(InstallId::generate()),
            transport,
            observers: Arc::new(Multicast::new()),
            runtime,
        }
    }

    pub fn with_device_identity(mut self, device: Arc<dyn DeviceIdentity>) -> Self {
        self.device = device;
        self
    }

    /// A snapshot of the current configuration.
    pub fn config(&self) -> ClientConfig {
        self.config.read().clone()
    }

    pub fn base_url(&self) -> String {
        self.config.read().base_url.clone()
    }

    /// Takes effect for requests built after it returns; requests already
    /// built keep the URL they were built with.
    pub fn set_base_url(&self, url: &str) {
        self.config.write().base_url = url.to_string();
    }

    // ---------------------------------------------------------------------
    // Observers
    // ---------------------------------------------------------------------

    /// Register an observer. The controller holds it weakly; keep the `Arc`
    /// alive for as long as notifications are wanted.
    pub fn set_delegate(&self, observer: &Arc<dyn HttpObserver>) -> SubscriptionId {
        self.observers.add(observer)
    }

    pub fn remove_delegate(&self, observer: &Arc<dyn HttpObserver>) -> bool {
        self.observers.remove(observer)
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.observers.unsubscribe(id)
    }

    // ---------------------------------------------------------------------
    // Request building
    // ---------------------------------------------------------------------

    /// Build a POST to `base_url + endpoint` with `params` as a pretty-printed
    /// JSON body.
    pub fn build_post<P>(&self, params: &P, endpoint: &str) -> Result<HttpRequest>
    where
        P: Serialize + ?Sized,
    {
        let config = self.config.read();
        let url = endpoint_url(&config, endpoint)?;
        let body = serde_json::to_string_pretty(params)?;
        Ok(HttpRequest::new(
            HttpMethod::Post,
            url,
            body,
            &self.device.device_id(),
            &config,
        ))
    }

    /// Build a GET to exactly `base_url + endpoint` with an empty body.
    /// `params` are not sent; they are still serialized so input that cannot
    /// become JSON is rejected the same way as for POST.
    pub fn build_get<P>(&self, params: &P, endpoint: &str) -> Result<HttpRequest>
    where
        P: Serialize + ?Sized,
    {
        let config = self.config.read();
        let url = endpoint_url(&config, endpoint)?;
        serde_json::to_value(params)?;
        Ok(HttpRequest::new(
            HttpMethod::Get,
            url,
            String::new(),
            &self.device.device_id(),
            &config,
        ))
    }

    // ---------------------------------------------------------------------
    // Dispatch
    // ---------------------------------------------------------------------

    /// Fire a POST and return immediately. Every observer is notified with
    /// `request_id` once the response (or failure) arrives.
    pub fn do_post<P>(
        &self,
        params: &P,
        endpoint: &str,
        request_id: &str,
    ) -> Result<JoinHandle<Completion>>
    where
        P: Serialize + ?Sized,
    {
        let request = self.build_post(params, endpoint)?;
        debug!(endpoint, params = %request.body, "POST");
        Ok(self.spawn(request, request_id))
    }

    /// Fire a GET and return immediately. See [`HttpController::do_post`].
    pub fn do_get<P>(
        &self,
        params: &P,
        endpoint: &str,
        request_id: &str,
    ) -> Result<JoinHandle<Completion>>
    where
        P: Serialize + ?Sized,
    {
        let request = self.build_get(params, endpoint)?;
        debug!(endpoint, url = %request.url, "GET");
        Ok(self.spawn(request, request_id))
    }

    /// Awaitable form of [`HttpController::do_post`]; runs on the caller's task.
    pub async fn post<P>(&self, params: &P, endpoint: &str, request_id: &str) -> Result<Completion>
    where
        P: Serialize + ?Sized,
    {
        let request = self.build_post(params, endpoint)?;
        debug!(endpoint, params = %request.body, "POST");
        Ok(complete(self.transport.as_ref(), &self.observers, request, request_id.to_string()).await)
    }

    /// Awaitable form of [`HttpController::do_get`]; runs on the caller's task.
    pub async fn get<P>(&self, params: &P, endpoint: &str, request_id: &str) -> Result<Completion>
    where
        P: Serialize + ?Sized,
    {
        let request = self.build_get(params, endpoint)?;
        debug!(endpoint, url = %request.url, "GET");
        Ok(complete(self.transport.as_ref(), &self.observers, request, request_id.to_string()).await)
    }

    fn spawn(&self, request: HttpRequest, request_id: &str) -> JoinHandle<Completion> {
        let transport = Arc::clone(&self.transport);
        let observers = Arc::clone(&self.observers);
        let identify = request_id.to_string();
        self.runtime.spawn(async move {
            complete(transport.as_ref(), &observers, request, identify).await
        })
    }
}

/// Join base URL and endpoint, check the result parses as an absolute URL,
/// and return the joined string unchanged (no normalization).
fn endpoint_url(config: &ClientConfig, endpoint: &str) -> Result<String> {
    let raw = config.endpoint_url(endpoint);
    match Url::parse(&raw) {
        Ok(_) => Ok(raw),
        Err(source) => Err(Error::InvalidUrl { url: raw, source }),
    }
}

async fn complete(
    transport: &dyn Transport,
    observers: &Multicast<dyn HttpObserver>,
    request: HttpRequest,
    identify: String,
) -> Completion {
    let method = request.method;
    let response = dispatch(transport, request).await;
    let completion = Completion {
        method,
        response,
        error_message: None,
        identify,
    };
    observers.notify(|o| {
        if catch_unwind(AssertUnwindSafe(|| o.on_completed(&completion))).is_err() {
            warn!(identify = %completion.identify, "observer panicked");
        }
    });
    completion
}

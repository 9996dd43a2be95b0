//! Networking helper for a mobile app backend.
//!
//! # Overview
//! `HttpController` issues POST/GET requests against a configured base URL,
//! attaches the fixed device/app identification headers, and notifies every
//! registered observer when the response (or failure) arrives.
//!
//! # Design
//! - `Multicast` holds observers weakly and notifies them in registration
//!   order; registering returns a `SubscriptionId`.
//! - `Transport` is the only network seam. `ReqwestTransport` is the stock
//!   implementation; tests substitute in-memory ones.
//! - `dispatch` collapses every outcome to "body or nothing", forwarding
//!   non-2xx bodies unchanged.
//! - Requests run as tasks on a tokio runtime handle the caller supplies,
//!   so `do_post`/`do_get` never block and return a `JoinHandle`.

pub mod config;
pub mod controller;
pub mod device;
pub mod dispatch;
pub mod error;
pub mod headers;
pub mod http;
pub mod notifier;
pub mod observer;
pub mod transport;

pub use config::ClientConfig;
pub use controller::HttpController;
pub use device::{DeviceIdentity, InstallId};
pub use error::{Error, Result};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use notifier::{Multicast, SubscriptionId};
pub use observer::{Completion, HttpObserver};
pub use transport::{ReqwestTransport, Transport};

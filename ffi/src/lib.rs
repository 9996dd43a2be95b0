//! C-ABI wrapper around `http-controller-core`.
//!
//! # Overview
//! Lets a native host (Swift, Kotlin via JNI, plain C) create a controller,
//! register C observer callbacks and fire POST/GET requests without linking
//! against tokio or serde directly.
//!
//! # Design
//! - Every `extern "C"` function wraps its body in `catch_unwind` so panics
//!   never cross the FFI boundary.
//! - The handle owns a one-worker tokio runtime; requests run there and
//!   observer callbacks fire on that worker thread.
//! - Request parameters cross as a JSON string; completions cross as a
//!   borrowed `FfiCompletion` valid only for the duration of the callback.
//! - Synchronous failures are reported as `FfiStatus`; network outcomes are
//!   only ever reported through the observers.

pub mod types;

use std::collections::HashMap;
use std::ffi::{c_void, CStr};
use std::os::raw::c_char;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::{Arc, Mutex};

use http_controller_core::{
    ClientConfig, HttpController, HttpMethod, HttpObserver, InstallId, ReqwestTransport,
    SubscriptionId,
};
use serde_json::Value;
use tracing_subscriber::EnvFilter;

use types::*;

/// Borrow a C string as `&str`.
fn read_str<'a>(ptr: *const c_char) -> Result<&'a str, FfiStatus> {
    if ptr.is_null() {
        return Err(FfiStatus::NullArg);
    }
    unsafe { CStr::from_ptr(ptr) }
        .to_str()
        .map_err(|_| FfiStatus::InvalidString)
}

// ---------------------------------------------------------------------------
// Controller lifecycle
// ---------------------------------------------------------------------------

/// Create a controller bound to `base_url`.
///
/// `device_id` may be null, in which case a random install id is generated.
/// Returns null if `base_url` is null or not UTF-8, if the runtime cannot be
/// started, or if an internal panic occurs.
/// The caller must free the returned pointer with `http_controller_free`.
#[unsafe(no_mangle)]
pub extern "C" fn http_controller_new(
    base_url: *const c_char,
    device_id: *const c_char,
) -> *mut FfiHttpController {
    catch_unwind(|| {
        let Ok(url) = read_str(base_url) else {
            return std::ptr::null_mut();
        };
        let device = if device_id.is_null() {
            InstallId::generate()
        } else {
            match read_str(device_id) {
                Ok(id) => InstallId::new(id),
                Err(_) => return std::ptr::null_mut(),
            }
        };

        let runtime = match tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .enable_all()
            .build()
        {
            Ok(rt) => rt,
            Err(e) => {
                tracing::error!(error = %e, "failed to start runtime");
                return std::ptr::null_mut();
            }
        };
        let config = ClientConfig::new(url);
        let transport = match ReqwestTransport::from_config(&config) {
            Ok(t) => t,
            Err(e) => {
                tracing::error!(error = %e, "failed to build http client");
                return std::ptr::null_mut();
            }
        };
        let inner = HttpController::new(config, Arc::new(transport), runtime.handle().clone())
            .with_device_identity(Arc::new(device));

        Box::into_raw(Box::new(FfiHttpController {
            inner,
            observers: Mutex::new(HashMap::new()),
            runtime,
        }))
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Free a controller created by `http_controller_new`. Safe to call with
/// null. Must not be called from inside an observer callback.
#[unsafe(no_mangle)]
pub extern "C" fn http_controller_free(ctrl: *mut FfiHttpController) {
    if !ctrl.is_null() {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            drop(unsafe { Box::from_raw(ctrl) });
        }));
    }
}

/// Replace the base URL used by subsequent requests. May be called from any
/// thread, concurrently with `http_controller_do_post`/`_do_get`.
#[unsafe(no_mangle)]
pub extern "C" fn http_controller_set_base_url(
    ctrl: *const FfiHttpController,
    base_url: *const c_char,
) -> FfiStatus {
    catch_unwind(AssertUnwindSafe(|| {
        if ctrl.is_null() {
            return FfiStatus::NullArg;
        }
        let ctrl = unsafe { &*ctrl };
        match read_str(base_url) {
            Ok(url) => {
                ctrl.inner.set_base_url(url);
                FfiStatus::Ok
            }
            Err(status) => status,
        }
    }))
    .unwrap_or(FfiStatus::Panic)
}

/// Initialize `tracing` output on stderr, filtered by `RUST_LOG`.
/// Calling it more than once is harmless.
#[unsafe(no_mangle)]
pub extern "C" fn http_controller_init_logging() {
    let _ = catch_unwind(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| EnvFilter::new("http_controller_core=info")),
            )
            .try_init();
    });
}

// ---------------------------------------------------------------------------
// Observers
// ---------------------------------------------------------------------------

/// Register `callback` to be invoked with every completion.
///
/// `user_data` is passed back verbatim and must stay valid until the
/// observer is removed or the controller freed.
/// Returns a nonzero subscription id, or 0 if `ctrl` or `callback` is null.
#[unsafe(no_mangle)]
pub extern "C" fn http_controller_add_observer(
    ctrl: *const FfiHttpController,
    callback: Option<FfiCompletionCallback>,
    user_data: *mut c_void,
) -> u64 {
    catch_unwind(AssertUnwindSafe(|| {
        let Some(callback) = callback else {
            return 0;
        };
        if ctrl.is_null() {
            return 0;
        }
        let ctrl = unsafe { &*ctrl };
        let observer: Arc<dyn HttpObserver> = Arc::new(CallbackObserver {
            callback,
            user_data: UserData(user_data),
        });
        let id = ctrl.inner.set_delegate(&observer).as_raw();
        ctrl.observers().insert(id, observer);
        id
    }))
    .unwrap_or(0)
}

/// Remove an observer by the id `http_controller_add_observer` returned.
/// Returns false if the id is unknown.
#[unsafe(no_mangle)]
pub extern "C" fn http_controller_remove_observer(
    ctrl: *const FfiHttpController,
    subscription: u64,
) -> bool {
    catch_unwind(AssertUnwindSafe(|| {
        if ctrl.is_null() {
            return false;
        }
        let ctrl = unsafe { &*ctrl };
        ctrl.inner.unsubscribe(SubscriptionId::from_raw(subscription));
        ctrl.observers().remove(&subscription).is_some()
    }))
    .unwrap_or(false)
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

/// Fire a POST of `params_json` to `base_url + endpoint`.
///
/// `params_json` may be null (sent as `{}`). Returns immediately; the result
/// arrives through the observers tagged with `identify`.
#[unsafe(no_mangle)]
pub extern "C" fn http_controller_do_post(
    ctrl: *const FfiHttpController,
    params_json: *const c_char,
    endpoint: *const c_char,
    identify: *const c_char,
) -> FfiStatus {
    fire(ctrl, HttpMethod::Post, params_json, endpoint, identify)
}

/// Fire a GET to exactly `base_url + endpoint`. `params_json` must still be
/// valid JSON (or null) but is not sent. See `http_controller_do_post`.
#[unsafe(no_mangle)]
pub extern "C" fn http_controller_do_get(
    ctrl: *const FfiHttpController,
    params_json: *const c_char,
    endpoint: *const c_char,
    identify: *const c_char,
) -> FfiStatus {
    fire(ctrl, HttpMethod::Get, params_json, endpoint, identify)
}

fn fire(
    ctrl: *const FfiHttpController,
    method: HttpMethod,
    params_json: *const c_char,
    endpoint: *const c_char,
    identify: *const c_char,
) -> FfiStatus {
    catch_unwind(AssertUnwindSafe(|| {
        if ctrl.is_null() {
            return FfiStatus::NullArg;
        }
        let ctrl = unsafe { &*ctrl };
        let (endpoint, identify) = match (read_str(endpoint), read_str(identify)) {
            (Ok(e), Ok(i)) => (e, i),
            (Err(status), _) | (_, Err(status)) => return status,
        };
        let params: Value = if params_json.is_null() {
            Value::Object(Default::default())
        } else {
            match read_str(params_json).map(serde_json::from_str::<Value>) {
                Ok(Ok(v)) => v,
                Ok(Err(_)) => return FfiStatus::Serialization,
                Err(status) => return status,
            }
        };

        let fired = match method {
            HttpMethod::Post => ctrl.inner.do_post(&params, endpoint, identify),
            HttpMethod::Get => ctrl.inner.do_get(&params, endpoint, identify),
        };
        match fired {
            // Detached: the outcome is delivered to observers.
            Ok(_handle) => FfiStatus::Ok,
            Err(e) => FfiStatus::from(&e),
        }
    }))
    .unwrap_or(FfiStatus::Panic)
}

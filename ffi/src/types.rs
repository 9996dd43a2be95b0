//! `#[repr(C)]` types for the FFI boundary.
//!
//! # Design
//! The handle owns its own tokio runtime so a host without one can drive the
//! controller. C observers are a function pointer plus an opaque `user_data`
//! pointer; the handle keeps each one alive in a map keyed by subscription
//! id, since a C caller cannot hold an `Arc`.

use std::collections::HashMap;
use std::ffi::{c_void, CString};
use std::os::raw::c_char;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use http_controller_core::{Completion, Error, HttpController, HttpMethod, HttpObserver};

/// Opaque handle to an `HttpController`. C callers receive a pointer to this
/// and pass it back into every FFI function.
pub struct FfiHttpController {
    pub(crate) inner: HttpController,
    pub(crate) observers: Mutex<HashMap<u64, Arc<dyn HttpObserver>>>,
    // Declared last so in-flight tasks are torn down after the controller.
    pub(crate) runtime: tokio::runtime::Runtime,
}

impl FfiHttpController {
    pub(crate) fn observers(&self) -> MutexGuard<'_, HashMap<u64, Arc<dyn HttpObserver>>> {
        self.observers.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// HTTP method as a C enum.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FfiHttpMethod {
    Get = 0,
    Post = 1,
}

impl From<HttpMethod> for FfiHttpMethod {
    fn from(m: HttpMethod) -> Self {
        match m {
            HttpMethod::Get => FfiHttpMethod::Get,
            HttpMethod::Post => FfiHttpMethod::Post,
        }
    }
}

/// Status codes returned by FFI functions that can fail synchronously.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FfiStatus {
    Ok = 0,
    NullArg = 1,
    InvalidString = 2,
    InvalidUrl = 3,
    Serialization = 4,
    Panic = 5,
    /// Any other core error. No entry point returns it today: transport
    /// failures are only reported through the observers.
    Internal = 6,
}

impl From<&Error> for FfiStatus {
    fn from(e: &Error) -> Self {
        match e {
            Error::InvalidUrl { .. } => FfiStatus::InvalidUrl,
            Error::Serialization(_) => FfiStatus::Serialization,
            Error::Transport(_) => FfiStatus::Internal,
        }
    }
}

/// A completion as seen by a C observer.
///
/// `response` is null when absent. `error_message` is always null.
/// Every pointer is valid only for the duration of the callback.
#[repr(C)]
pub struct FfiCompletion {
    pub method: FfiHttpMethod,
    pub response: *const c_char,
    pub error_message: *const c_char,
    pub identify: *const c_char,
}

/// Observer callback. Invoked on a runtime worker thread.
pub type FfiCompletionCallback =
    extern "C" fn(completion: *const FfiCompletion, user_data: *mut c_void);

/// `user_data` is owned by the C caller, who promises it may be used from
/// the runtime thread.
#[derive(Clone, Copy)]
pub(crate) struct UserData(pub(crate) *mut c_void);

unsafe impl Send for UserData {}
unsafe impl Sync for UserData {}

pub(crate) struct CallbackObserver {
    pub(crate) callback: FfiCompletionCallback,
    pub(crate) user_data: UserData,
}

impl HttpObserver for CallbackObserver {
    fn on_completed(&self, completion: &Completion) {
        // A body with an interior NUL cannot cross as a C string; it is
        // reported as absent.
        let response = completion
            .response
            .as_deref()
            .and_then(|s| CString::new(s).ok());
        let identify = CString::new(completion.identify.as_str()).unwrap_or_default();

        let ffi = FfiCompletion {
            method: completion.method.into(),
            response: response.as_ref().map_or(std::ptr::null(), |s| s.as_ptr()),
            error_message: std::ptr::null(),
            identify: identify.as_ptr(),
        };
        (self.callback)(&ffi, self.user_data.0);
    }
}

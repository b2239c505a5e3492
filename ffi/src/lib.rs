//! C-ABI wrapper around `outtie-core`.
//!
//! # Overview
//! Exposes link resolution and creation through `extern "C"` functions so a
//! mobile host (Swift, Kotlin/JNI, C) can use the SDK without linking to
//! Rust's standard library types.
//!
//! # Design
//! - Every `extern "C"` function wraps its body in `catch_unwind` so panics
//!   never cross the FFI boundary.
//! - Two ways to create a link: `outtie_build_create_link` /
//!   `outtie_parse_create_link` for hosts that do their own networking, and
//!   `outtie_create_link` which performs the round-trip on a worker thread.
//! - `outtie_create_link` invokes its callback on that worker thread. Hosts
//!   must hop to their UI thread themselves (e.g. `DispatchQueue.main`).
//! - The C caller owns all returned pointers and must call the matching
//!   `outtie_free_*` function to release them.

pub mod types;

use std::ffi::{c_void, CStr, CString};
use std::os::raw::c_char;
use std::panic::{catch_unwind, AssertUnwindSafe};

use outtie_core::error::ErrorCode;
use outtie_core::http::HttpResponse;
use outtie_core::{Config, LinkOutcome, Presenter, Url, UrlOpener};

use types::*;

/// Borrow a nullable C string as `&str`. Null and non-UTF-8 input both come
/// back as `None`.
///
/// # Safety
/// `ptr` must be null or point to a NUL-terminated string that outlives `'a`.
unsafe fn opt_str<'a>(ptr: *const c_char) -> Option<&'a str> {
    if ptr.is_null() {
        return None;
    }
    unsafe { CStr::from_ptr(ptr) }.to_str().ok()
}

// ---------------------------------------------------------------------------
// Client lifecycle
// ---------------------------------------------------------------------------

/// Create a configured SDK instance.
///
/// Every argument may be null. A null `base_url` selects the production
/// endpoint; null `client_id` / `sdk_key` leave the SDK unconfigured, which
/// later operations report (or fail open on) as they would in the core.
/// The caller must free the returned pointer with `outtie_client_free`.
#[unsafe(no_mangle)]
pub extern "C" fn outtie_client_new(
    base_url: *const c_char,
    client_id: *const c_char,
    sdk_key: *const c_char,
    external_uid: *const c_char,
) -> *mut FfiOuttieClient {
    catch_unwind(|| {
        let mut config = Config::default();
        config.client_id = unsafe { opt_str(client_id) }.map(str::to_string);
        config.sdk_key = unsafe { opt_str(sdk_key) }.map(str::to_string);
        config.external_uid = unsafe { opt_str(external_uid) }.map(str::to_string);
        if let Some(base) = unsafe { opt_str(base_url) } {
            config = config.with_base_url(base);
        }
        let inner = outtie_core::Outtie::new(config);
        Box::into_raw(Box::new(FfiOuttieClient { inner }))
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Free a client created by `outtie_client_new`. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn outtie_client_free(client: *mut FfiOuttieClient) {
    if !client.is_null() {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            drop(unsafe { Box::from_raw(client) });
        }));
    }
}

// ---------------------------------------------------------------------------
// Resolution
// ---------------------------------------------------------------------------

/// Build the create-link URL for `url`.
///
/// Returns null if an argument is null or the SDK is not configured.
/// The caller must free the returned string with `outtie_free_string`.
#[unsafe(no_mangle)]
pub extern "C" fn outtie_resolve_url(
    client: *const FfiOuttieClient,
    url: *const c_char,
) -> *mut c_char {
    catch_unwind(AssertUnwindSafe(|| {
        if client.is_null() {
            return std::ptr::null_mut();
        }
        let Some(url) = (unsafe { opt_str(url) }) else {
            return std::ptr::null_mut();
        };
        let client = unsafe { &*client };
        match client.inner.resolve(url) {
            Some(resolved) => to_c_string(resolved.as_str()),
            None => std::ptr::null_mut(),
        }
    }))
    .unwrap_or(std::ptr::null_mut())
}

// ---------------------------------------------------------------------------
// Host-does-IO link creation
// ---------------------------------------------------------------------------

/// Build the HTTP request that creates a link for `url`.
///
/// Returns null if an argument is null or the SDK is not configured; the
/// host should then use its original URL unchanged.
/// The caller must free the returned pointer with `outtie_free_request`.
#[unsafe(no_mangle)]
pub extern "C" fn outtie_build_create_link(
    client: *const FfiOuttieClient,
    url: *const c_char,
) -> *mut FfiHttpRequest {
    catch_unwind(AssertUnwindSafe(|| {
        if client.is_null() {
            return std::ptr::null_mut();
        }
        let Some(url) = (unsafe { opt_str(url) }) else {
            return std::ptr::null_mut();
        };
        let client = unsafe { &*client };
        match client.inner.client().build_create_link(url) {
            Ok(req) => FfiHttpRequest::from_core(req),
            Err(_) => std::ptr::null_mut(),
        }
    }))
    .unwrap_or(std::ptr::null_mut())
}

/// Convert an `FfiHttpResponse` to a core `HttpResponse`. A null body is an
/// empty body.
fn ffi_response_to_core(resp: &FfiHttpResponse) -> HttpResponse {
    let body = unsafe { opt_str(resp.body) }.unwrap_or("").to_string();
    HttpResponse {
        status: resp.status,
        headers: Vec::new(),
        body,
    }
}

/// Parse the service's response to a request from `outtie_build_create_link`.
///
/// `url` is the original destination, returned in `result.url` when the
/// response carries no usable link.
/// The caller must free the returned pointer with `outtie_free_result`.
#[unsafe(no_mangle)]
pub extern "C" fn outtie_parse_create_link(
    client: *const FfiOuttieClient,
    url: *const c_char,
    response: *const FfiHttpResponse,
) -> *mut FfiLinkResult {
    catch_unwind(AssertUnwindSafe(|| {
        if client.is_null() {
            return FfiLinkResult::null_arg("client");
        }
        if response.is_null() {
            return FfiLinkResult::null_arg("response");
        }
        let Some(url) = (unsafe { opt_str(url) }) else {
            return FfiLinkResult::null_arg("url");
        };
        let client = unsafe { &*client };
        let resp = unsafe { &*response };
        let result = client.inner.client().parse_create_link(&ffi_response_to_core(resp));
        FfiLinkResult::from_outcome(LinkOutcome::from_result(url, result))
    }))
    .unwrap_or_else(|_| FfiLinkResult::panic("panic in outtie_parse_create_link"))
}

// ---------------------------------------------------------------------------
// Library-does-IO link creation
// ---------------------------------------------------------------------------

/// Create a link for `url`, performing the HTTP round-trip on a worker
/// thread.
///
/// `callback` runs exactly once with `user_data` and a result that is freed
/// when the callback returns. On a misconfigured client it runs before this
/// function returns, with `error_code = Ok` and the original URL. Null
/// `client` or `url` also produce an immediate `NullArg` result.
#[unsafe(no_mangle)]
pub extern "C" fn outtie_create_link(
    client: *const FfiOuttieClient,
    url: *const c_char,
    callback: FfiLinkCallback,
    user_data: *mut c_void,
) {
    let deliver = move |result: *mut FfiLinkResult| {
        callback(user_data, result);
        outtie_free_result(result);
    };

    let outcome = catch_unwind(AssertUnwindSafe(|| {
        if client.is_null() {
            return Err(FfiLinkResult::null_arg("client"));
        }
        let Some(url) = (unsafe { opt_str(url) }) else {
            return Err(FfiLinkResult::null_arg("url"));
        };
        let client = unsafe { &*client };
        let user_data = UserData(user_data);
        client.inner.create_link(url, move |outcome| {
            let result = FfiLinkResult::from_outcome(outcome);
            callback(user_data.as_ptr(), result);
            outtie_free_result(result);
        });
        Ok(())
    }))
    .unwrap_or_else(|_| Err(FfiLinkResult::panic("panic in outtie_create_link")));

    if let Err(result) = outcome {
        deliver(result);
    }
}

// ---------------------------------------------------------------------------
// Presentation
// ---------------------------------------------------------------------------

struct CallbackPresenter {
    present: FfiPresentFn,
    user_data: *mut c_void,
}

impl Presenter for CallbackPresenter {
    fn present(&self, url: &Url) {
        let url = to_c_string(url.as_str());
        (self.present)(self.user_data, url);
        drop(unsafe { CString::from_raw(url) });
    }
}

struct CallbackOpener {
    can_open: FfiCanOpenFn,
    open: FfiOpenFn,
    user_data: *mut c_void,
}

impl UrlOpener for CallbackOpener {
    fn can_open(&self, url: &Url) -> bool {
        let url = to_c_string(url.as_str());
        let can = (self.can_open)(self.user_data, url);
        drop(unsafe { CString::from_raw(url) });
        can
    }

    fn open(&self, url: &Url) {
        let url = to_c_string(url.as_str());
        (self.open)(self.user_data, url);
        drop(unsafe { CString::from_raw(url) });
    }
}

/// Resolve `url` and hand the result to `present` for display in an embedded
/// browser. Does nothing if an argument is null or resolution fails.
/// The string passed to `present` is only valid during the call.
#[unsafe(no_mangle)]
pub extern "C" fn outtie_open_link(
    client: *const FfiOuttieClient,
    url: *const c_char,
    present: FfiPresentFn,
    user_data: *mut c_void,
) {
    let _ = catch_unwind(AssertUnwindSafe(|| {
        if client.is_null() {
            return;
        }
        let Some(url) = (unsafe { opt_str(url) }) else {
            return;
        };
        let client = unsafe { &*client };
        let presenter = CallbackPresenter { present, user_data };
        client.inner.open_link(&presenter, url);
    }));
}

/// Resolve `url` and, if `can_open` reports a handler, pass it to `open`.
/// Does nothing if an argument is null, resolution fails or no handler exists.
#[unsafe(no_mangle)]
pub extern "C" fn outtie_open_external_link(
    client: *const FfiOuttieClient,
    url: *const c_char,
    can_open: FfiCanOpenFn,
    open: FfiOpenFn,
    user_data: *mut c_void,
) {
    let _ = catch_unwind(AssertUnwindSafe(|| {
        if client.is_null() {
            return;
        }
        let Some(url) = (unsafe { opt_str(url) }) else {
            return;
        };
        let client = unsafe { &*client };
        let opener = CallbackOpener {
            can_open,
            open,
            user_data,
        };
        client.inner.open_external_link(&opener, url);
    }));
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Human-readable description for an `FfiErrorCode` value in 1..=6.
///
/// Returns null for any other code. The caller must free the returned string
/// with `outtie_free_string`.
#[unsafe(no_mangle)]
pub extern "C" fn outtie_error_description(code: i32) -> *mut c_char {
    catch_unwind(|| match ErrorCode::from_raw(code) {
        Some(code) => to_c_string(code.to_error().to_string()),
        None => std::ptr::null_mut(),
    })
    .unwrap_or(std::ptr::null_mut())
}

// ---------------------------------------------------------------------------
// Free functions
// ---------------------------------------------------------------------------

/// Free an `FfiHttpRequest` returned by `outtie_build_create_link`.
/// Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn outtie_free_request(req: *mut FfiHttpRequest) {
    if req.is_null() {
        return;
    }
    let _ = catch_unwind(|| {
        let req = unsafe { Box::from_raw(req) };
        if !req.url.is_null() {
            drop(unsafe { CString::from_raw(req.url) });
        }
        if !req.body.is_null() {
            drop(unsafe { CString::from_raw(req.body) });
        }
        if !req.headers.is_null() && req.headers_len > 0 {
            let slice = std::ptr::slice_from_raw_parts_mut(req.headers, req.headers_len as usize);
            let headers = unsafe { Box::from_raw(slice) };
            for h in headers.iter() {
                if !h.key.is_null() {
                    drop(unsafe { CString::from_raw(h.key) });
                }
                if !h.value.is_null() {
                    drop(unsafe { CString::from_raw(h.value) });
                }
            }
        }
    });
}

/// Free an `FfiLinkResult` returned by `outtie_parse_create_link`.
/// Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn outtie_free_result(result: *mut FfiLinkResult) {
    if result.is_null() {
        return;
    }
    let _ = catch_unwind(|| {
        let result = unsafe { Box::from_raw(result) };
        if !result.error_message.is_null() {
            drop(unsafe { CString::from_raw(result.error_message) });
        }
        if !result.url.is_null() {
            drop(unsafe { CString::from_raw(result.url) });
        }
    });
}

/// Free a C string allocated by this library. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn outtie_free_string(s: *mut c_char) {
    if !s.is_null() {
        let _ = catch_unwind(|| {
            drop(unsafe { CString::from_raw(s) });
        });
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

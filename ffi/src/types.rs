//! `#[repr(C)]` types for the FFI boundary.
//!
//! # Design
//! Each type mirrors a core type but uses C-compatible representations:
//! `*mut c_char` instead of `String`, raw pointers instead of `Vec`, and
//! enums with explicit discriminants. Conversion functions live here to keep
//! `lib.rs` focused on the `extern "C"` surface.

use std::ffi::CString;
use std::os::raw::c_char;

use outtie_core::error::{ErrorCode, OuttieError};
use outtie_core::http::HttpMethod;
use outtie_core::LinkOutcome;

/// Opaque handle to a configured `Outtie` instance. C callers receive a
/// pointer to this and pass it back into every FFI function.
pub struct FfiOuttieClient {
    pub(crate) inner: outtie_core::Outtie,
}

/// Copy `s` into a heap C string. Interior NULs are stripped rather than
/// failing, since URLs and messages never legitimately carry them.
pub(crate) fn to_c_string(s: impl Into<String>) -> *mut c_char {
    let mut bytes: Vec<u8> = s.into().into_bytes();
    bytes.retain(|b| *b != 0);
    CString::new(bytes).unwrap_or_default().into_raw()
}

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// HTTP method as a C enum.
#[repr(C)]
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

/// A single HTTP header as a key-value pair of C strings.
#[repr(C)]
pub struct FfiHeader {
    pub key: *mut c_char,
    pub value: *mut c_char,
}

/// An HTTP request described as C-compatible plain data.
///
/// Built by `outtie_build_create_link`. The C caller executes the request
/// and passes the response back through `outtie_parse_create_link`.
#[repr(C)]
pub struct FfiHttpRequest {
    pub method: FfiHttpMethod,
    pub url: *mut c_char,
    pub headers: *mut FfiHeader,
    pub headers_len: u32,
    pub body: *mut c_char,
}

impl FfiHttpRequest {
    /// Convert a core `HttpRequest` into a heap-allocated `FfiHttpRequest`.
    pub(crate) fn from_core(req: outtie_core::HttpRequest) -> *mut Self {
        let url = to_c_string(req.url);
        let body = match req.body {
            Some(b) => to_c_string(b),
            None => std::ptr::null_mut(),
        };

        let headers_len = req.headers.len() as u32;
        let headers = if req.headers.is_empty() {
            std::ptr::null_mut()
        } else {
            let ffi_headers: Box<[FfiHeader]> = req
                .headers
                .into_iter()
                .map(|(k, v)| FfiHeader {
                    key: to_c_string(k),
                    value: to_c_string(v),
                })
                .collect();
            Box::into_raw(ffi_headers) as *mut FfiHeader
        };

        Box::into_raw(Box::new(FfiHttpRequest {
            method: req.method.into(),
            url,
            headers,
            headers_len,
            body,
        }))
    }
}

// ---------------------------------------------------------------------------
// Response input (caller-provided, not heap-allocated by us)
// ---------------------------------------------------------------------------

/// An HTTP response described as C-compatible plain data.
///
/// The C caller constructs this on the stack after executing the request,
/// then passes a pointer to `outtie_parse_create_link`. The FFI layer reads
/// but does not free these fields.
#[repr(C)]
pub struct FfiHttpResponse {
    pub status: u16,
    pub body: *const c_char,
}

// ---------------------------------------------------------------------------
// Result types
// ---------------------------------------------------------------------------

/// Error codes returned in `FfiLinkResult`. Values 1-6 match
/// `outtie_core::ErrorCode`.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FfiErrorCode {
    Ok = 0,
    MissingClientId = 1,
    MissingSdkKey = 2,
    InvalidUrl = 3,
    CouldNotCreateLink = 4,
    ParsingError = 5,
    Unexpected = 6,
    Panic = 7,
    NullArg = 8,
}

impl From<ErrorCode> for FfiErrorCode {
    fn from(code: ErrorCode) -> Self {
        match code {
            ErrorCode::MissingClientId => FfiErrorCode::MissingClientId,
            ErrorCode::MissingSdkKey => FfiErrorCode::MissingSdkKey,
            ErrorCode::InvalidUrl => FfiErrorCode::InvalidUrl,
            ErrorCode::CouldNotCreateLink => FfiErrorCode::CouldNotCreateLink,
            ErrorCode::ParsingError => FfiErrorCode::ParsingError,
            ErrorCode::Unexpected => FfiErrorCode::Unexpected,
        }
    }
}

/// Result envelope for link creation.
///
/// `url` is the created link on success, otherwise the caller's original URL
/// exactly as passed in. It is null only for `NullArg` and `Panic`.
/// `error_code` is `Ok` when
/// there is nothing to report, including the misconfigured fail-open path.
/// `http_status` is set only for `Unexpected`.
#[repr(C)]
pub struct FfiLinkResult {
    pub error_code: FfiErrorCode,
    pub error_message: *mut c_char,
    pub http_status: u16,
    pub url: *mut c_char,
}

impl FfiLinkResult {
    /// Build a heap-allocated result from a core `LinkOutcome`.
    pub(crate) fn from_outcome(outcome: LinkOutcome) -> *mut Self {
        let url = to_c_string(outcome.url());
        let (error_code, error_message, http_status) = match &outcome.error {
            None => (FfiErrorCode::Ok, std::ptr::null_mut(), 0),
            Some(err) => {
                let status = match err {
                    OuttieError::Unexpected { code } => *code,
                    _ => 0,
                };
                (err.code().into(), to_c_string(err.to_string()), status)
            }
        };
        Box::into_raw(Box::new(FfiLinkResult {
            error_code,
            error_message,
            http_status,
            url,
        }))
    }

    /// Build an error result for a null argument.
    pub(crate) fn null_arg(name: &str) -> *mut Self {
        Self::failure(FfiErrorCode::NullArg, &format!("null argument: {name}"))
    }

    /// Build an error result for a caught panic.
    pub(crate) fn panic(msg: &str) -> *mut Self {
        Self::failure(FfiErrorCode::Panic, msg)
    }

    fn failure(error_code: FfiErrorCode, msg: &str) -> *mut Self {
        tracing::warn!(code = ?error_code, "{msg}");
        Box::into_raw(Box::new(FfiLinkResult {
            error_code,
            error_message: to_c_string(msg),
            http_status: 0,
            url: std::ptr::null_mut(),
        }))
    }
}

/// Completion for `outtie_create_link`. The result is only valid for the
/// duration of the call; the library frees it afterwards.
pub type FfiLinkCallback =
    extern "C" fn(user_data: *mut std::ffi::c_void, result: *const FfiLinkResult);

/// Presents a URL in an embedded browser view.
pub type FfiPresentFn = extern "C" fn(user_data: *mut std::ffi::c_void, url: *const c_char);

/// Returns whether the OS has a handler for a URL.
pub type FfiCanOpenFn =
    extern "C" fn(user_data: *mut std::ffi::c_void, url: *const c_char) -> bool;

/// Opens a URL in the OS's external handler.
pub type FfiOpenFn = extern "C" fn(user_data: *mut std::ffi::c_void, url: *const c_char);

/// Host context pointer passed through to a callback on another thread.
pub(crate) struct UserData(pub *mut std::ffi::c_void);

impl UserData {
    pub(crate) fn as_ptr(&self) -> *mut std::ffi::c_void {
        self.0
    }
}

// The host promises the pointer is usable from the completion thread.
unsafe impl Send for UserData {}

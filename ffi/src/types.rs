//! `#[repr(C)]` types for the FFI boundary.
//!
//! # Design
//! Each type mirrors a core type but uses C-compatible representations:
//! `*mut c_char` instead of `String`, raw pointers instead of `Vec`, and
//! tagged enums with explicit discriminants. Conversion functions live here
//! to keep `lib.rs` focused on the `extern "C"` surface.

use std::ffi::{c_void, CString};
use std::os::raw::c_char;

use galaxy_core::error::ApiError;
use galaxy_core::http::HttpMethod;
use galaxy_core::types::{TodoItem, UserProfile};

/// Opaque handle to an `ApiClient`. C callers receive a pointer to this
/// and pass it back into every FFI function.
pub struct FfiGalaxyClient {
    pub(crate) inner: galaxy_core::ApiClient,
}

/// Heap-allocate `s` as a C string. Interior NULs cannot be represented, so
/// such strings come out empty rather than failing.
pub(crate) fn into_c_string(s: impl Into<Vec<u8>>) -> *mut c_char {
    CString::new(s).unwrap_or_default().into_raw()
}

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// HTTP method as a C enum.
#[repr(C)]
#[derive(Debug)]
pub enum FfiHttpMethod {
    Get = 0,
    Post = 1,
    Delete = 2,
}

impl From<HttpMethod> for FfiHttpMethod {
    fn from(m: HttpMethod) -> Self {
        match m {
            HttpMethod::Get => FfiHttpMethod::Get,
            HttpMethod::Post => FfiHttpMethod::Post,
            HttpMethod::Delete => FfiHttpMethod::Delete,
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
/// Built by `galaxy_build_*` functions. The C caller executes the request
/// and passes the response back through `galaxy_parse_*`.
#[repr(C)]
pub struct FfiHttpRequest {
    pub method: FfiHttpMethod,
    pub path: *mut c_char,
    pub headers: *mut FfiHeader,
    pub headers_len: u32,
    pub body: *mut c_char,
}

impl FfiHttpRequest {
    /// Convert a core `HttpRequest` into a heap-allocated `FfiHttpRequest`.
    pub(crate) fn from_core(req: galaxy_core::HttpRequest) -> *mut Self {
        let path = into_c_string(req.path);
        let body = match req.body {
            Some(b) => into_c_string(b),
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
                    key: into_c_string(k),
                    value: into_c_string(v),
                })
                .collect();
            Box::into_raw(ffi_headers) as *mut FfiHeader
        };

        Box::into_raw(Box::new(FfiHttpRequest {
            method: req.method.into(),
            path,
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
/// The C caller constructs this on the stack after executing an HTTP request,
/// then passes a pointer to a `galaxy_parse_*` function. The FFI layer reads
/// but does not free these fields.
#[repr(C)]
pub struct FfiHttpResponse {
    pub status: u16,
    pub body: *const c_char,
}

// ---------------------------------------------------------------------------
// Result types
// ---------------------------------------------------------------------------

/// Error codes returned in `FfiGalaxyResult`.
#[repr(C)]
#[derive(Debug)]
pub enum FfiErrorCode {
    Ok = 0,
    Auth = 1,
    Validation = 2,
    Network = 3,
    NotFound = 4,
    Http = 5,
    Deserialization = 6,
    Serialization = 7,
    Storage = 8,
    Panic = 9,
    NullArg = 10,
}

/// Tag that tells `galaxy_free_result` what `FfiGalaxyResult::data` points to.
#[repr(C)]
#[derive(Debug)]
pub enum FfiDataTag {
    None = 0,
    /// `data` is a `char*` holding the session token.
    Token = 1,
    TodoList = 2,
    Profile = 3,
}

/// A single to-do item exposed to C.
#[repr(C)]
pub struct FfiTodo {
    pub id: *mut c_char,
    pub title: *mut c_char,
    pub description: *mut c_char,
}

impl FfiTodo {
    fn from_core(item: TodoItem) -> Self {
        FfiTodo {
            id: into_c_string(item.id),
            title: into_c_string(item.title),
            description: into_c_string(item.description),
        }
    }
}

/// A list of to-do items exposed to C.
#[repr(C)]
pub struct FfiTodoList {
    pub items: *mut FfiTodo,
    pub len: u32,
}

/// The user's profile exposed to C.
#[repr(C)]
pub struct FfiProfile {
    pub username: *mut c_char,
    pub email: *mut c_char,
}

/// Result envelope for all parse operations.
///
/// On success `error_code` is `Ok`, both message fields are null, and `data`
/// points to the parsed payload (tagged by `data_tag`).
/// On failure `error_code` describes the category, `error_message` is a
/// diagnostic C string, `server_message` is the text the API sent (null when
/// it sent none) and `data` is null. `http_status` is only filled in for
/// `NotFound` and `Http`.
#[repr(C)]
pub struct FfiGalaxyResult {
    pub error_code: FfiErrorCode,
    pub error_message: *mut c_char,
    pub server_message: *mut c_char,
    pub http_status: u16,
    pub data_tag: FfiDataTag,
    pub data: *mut c_void,
}

impl FfiGalaxyResult {
    fn ok(data_tag: FfiDataTag, data: *mut c_void) -> *mut Self {
        Box::into_raw(Box::new(FfiGalaxyResult {
            error_code: FfiErrorCode::Ok,
            error_message: std::ptr::null_mut(),
            server_message: std::ptr::null_mut(),
            http_status: 0,
            data_tag,
            data,
        }))
    }

    fn failure(error_code: FfiErrorCode, http_status: u16, msg: String) -> *mut Self {
        Box::into_raw(Box::new(FfiGalaxyResult {
            error_code,
            error_message: into_c_string(msg),
            server_message: std::ptr::null_mut(),
            http_status,
            data_tag: FfiDataTag::None,
            data: std::ptr::null_mut(),
        }))
    }

    /// Build a success result carrying a session token (may be absent after
    /// registration, in which case `data` is null).
    pub(crate) fn ok_token(token: Option<String>) -> *mut Self {
        match token {
            Some(token) => Self::ok(FfiDataTag::Token, into_c_string(token) as *mut c_void),
            None => Self::ok_empty(),
        }
    }

    /// Build a success result carrying a `FfiTodoList`.
    pub(crate) fn ok_todo_list(todos: Vec<TodoItem>) -> *mut Self {
        let len = todos.len() as u32;
        let items = if todos.is_empty() {
            std::ptr::null_mut()
        } else {
            let ffi_todos: Box<[FfiTodo]> = todos.into_iter().map(FfiTodo::from_core).collect();
            Box::into_raw(ffi_todos) as *mut FfiTodo
        };
        let ffi_list = Box::new(FfiTodoList { items, len });
        Self::ok(FfiDataTag::TodoList, Box::into_raw(ffi_list) as *mut c_void)
    }

    /// Build a success result carrying a `FfiProfile`.
    pub(crate) fn ok_profile(profile: UserProfile) -> *mut Self {
        let ffi_profile = Box::new(FfiProfile {
            username: into_c_string(profile.username),
            email: into_c_string(profile.email),
        });
        Self::ok(FfiDataTag::Profile, Box::into_raw(ffi_profile) as *mut c_void)
    }

    /// Build a success result with no data payload (add, delete).
    pub(crate) fn ok_empty() -> *mut Self {
        Self::ok(FfiDataTag::None, std::ptr::null_mut())
    }

    /// Build an error result from an `ApiError`.
    pub(crate) fn from_error(err: ApiError) -> *mut Self {
        let (error_code, http_status) = match &err {
            ApiError::Auth(_) => (FfiErrorCode::Auth, 0),
            ApiError::Validation(_) => (FfiErrorCode::Validation, 0),
            ApiError::Network(_) => (FfiErrorCode::Network, 0),
            ApiError::NotFound => (FfiErrorCode::NotFound, 404),
            ApiError::Http { status, .. } => (FfiErrorCode::Http, *status),
            ApiError::Deserialization(_) => (FfiErrorCode::Deserialization, 0),
            ApiError::Serialization(_) => (FfiErrorCode::Serialization, 0),
            ApiError::Storage(_) => (FfiErrorCode::Storage, 0),
        };
        let result = Self::failure(error_code, http_status, err.to_string());
        if let Some(msg) = err.server_message() {
            // SAFETY: `result` was just allocated by `failure` and is not shared.
            unsafe { (*result).server_message = into_c_string(msg) };
        }
        result
    }

    /// Build an error result for a null argument.
    pub(crate) fn null_arg(name: &str) -> *mut Self {
        Self::failure(FfiErrorCode::NullArg, 0, format!("null argument: {name}"))
    }

    /// Build an error result for a caught panic.
    pub(crate) fn panic(msg: &str) -> *mut Self {
        Self::failure(FfiErrorCode::Panic, 0, msg.to_string())
    }
}

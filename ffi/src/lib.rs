//! C-ABI wrapper around `galaxy-core` for the mobile host.
//!
//! # Overview
//! Exposes the Galaxy Missions session and to-do API through `extern "C"`
//! functions so the app shell can build and parse HTTP requests/responses
//! with its own networking stack and secure storage.
//!
//! # Design
//! - Every `extern "C"` function wraps its body in `catch_unwind` so panics
//!   never cross the FFI boundary.
//! - Per-operation `build_*` / `parse_*` mirrors the core API 1:1. The
//!   session token is an explicit (nullable) argument of every authorized
//!   build function; the host owns where it is stored.
//! - A single `FfiGalaxyResult` envelope with `FfiDataTag` + `void* data`
//!   conveys success payloads and errors uniformly.
//! - The C caller owns all returned pointers and must call the matching
//!   `galaxy_free_*` function to release them.

pub mod types;

use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::panic::catch_unwind;

use galaxy_core::http::HttpResponse;
use galaxy_core::types::{Credentials, NewTodo, Registration};

use types::*;

/// Borrow a C string as `&str`. `None` for null or non-UTF-8 input.
///
/// # Safety
/// `ptr` must be null or point to a NUL-terminated string that outlives `'a`.
unsafe fn read_str<'a>(ptr: *const c_char) -> Option<&'a str> {
    if ptr.is_null() {
        return None;
    }
    unsafe { CStr::from_ptr(ptr) }.to_str().ok()
}

// ---------------------------------------------------------------------------
// Client lifecycle
// ---------------------------------------------------------------------------

/// Create a new client bound to `base_url`.
///
/// Returns null if `base_url` is null or if an internal panic occurs.
/// The caller must free the returned pointer with `galaxy_client_free`.
#[unsafe(no_mangle)]
pub extern "C" fn galaxy_client_new(base_url: *const c_char) -> *mut FfiGalaxyClient {
    catch_unwind(|| {
        let Some(url) = (unsafe { read_str(base_url) }) else {
            return std::ptr::null_mut();
        };
        let client = galaxy_core::ApiClient::new(url);
        Box::into_raw(Box::new(FfiGalaxyClient { inner: client }))
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Free a client created by `galaxy_client_new`. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn galaxy_client_free(client: *mut FfiGalaxyClient) {
    if !client.is_null() {
        let _ = catch_unwind(|| {
            drop(unsafe { Box::from_raw(client) });
        });
    }
}

// ---------------------------------------------------------------------------
// Build request functions
// ---------------------------------------------------------------------------

/// Build the login request. Never carries a bearer header.
///
/// Returns null if any argument is null.
/// The caller must free the returned pointer with `galaxy_free_request`.
#[unsafe(no_mangle)]
pub extern "C" fn galaxy_build_login(
    client: *const FfiGalaxyClient,
    username: *const c_char,
    password: *const c_char,
) -> *mut FfiHttpRequest {
    catch_unwind(|| {
        if client.is_null() {
            return std::ptr::null_mut();
        }
        let client = unsafe { &*client };
        let (Some(username), Some(password)) =
            (unsafe { read_str(username) }, unsafe { read_str(password) })
        else {
            return std::ptr::null_mut();
        };
        let input = Credentials {
            username: username.to_string(),
            password: password.to_string(),
        };
        match client.inner.build_login(&input) {
            Ok(req) => FfiHttpRequest::from_core(req),
            Err(_) => std::ptr::null_mut(),
        }
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Build the register request. `email` may be null.
///
/// Returns null if `client`, `username` or `password` is null.
#[unsafe(no_mangle)]
pub extern "C" fn galaxy_build_register(
    client: *const FfiGalaxyClient,
    username: *const c_char,
    password: *const c_char,
    email: *const c_char,
) -> *mut FfiHttpRequest {
    catch_unwind(|| {
        if client.is_null() {
            return std::ptr::null_mut();
        }
        let client = unsafe { &*client };
        let (Some(username), Some(password)) =
            (unsafe { read_str(username) }, unsafe { read_str(password) })
        else {
            return std::ptr::null_mut();
        };
        let input = Registration {
            username: username.to_string(),
            password: password.to_string(),
            email: unsafe { read_str(email) }
                .filter(|e| !e.is_empty())
                .map(str::to_string),
        };
        match client.inner.build_register(&input) {
            Ok(req) => FfiHttpRequest::from_core(req),
            Err(_) => std::ptr::null_mut(),
        }
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Build the list request. A null `token` sends no Authorization header.
///
/// Returns null if `client` is null.
#[unsafe(no_mangle)]
pub extern "C" fn galaxy_build_list_todos(
    client: *const FfiGalaxyClient,
    token: *const c_char,
) -> *mut FfiHttpRequest {
    catch_unwind(|| {
        if client.is_null() {
            return std::ptr::null_mut();
        }
        let client = unsafe { &*client };
        let req = client.inner.build_list_todos(unsafe { read_str(token) });
        FfiHttpRequest::from_core(req)
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Build the add request.
///
/// Returns null if `client`, `title` or `description` is null, or if either
/// field is blank (check with `galaxy_todo_is_complete` first to show the
/// right message).
#[unsafe(no_mangle)]
pub extern "C" fn galaxy_build_add_todo(
    client: *const FfiGalaxyClient,
    token: *const c_char,
    title: *const c_char,
    description: *const c_char,
) -> *mut FfiHttpRequest {
    catch_unwind(|| {
        if client.is_null() {
            return std::ptr::null_mut();
        }
        let client = unsafe { &*client };
        let (Some(title), Some(description)) =
            (unsafe { read_str(title) }, unsafe { read_str(description) })
        else {
            return std::ptr::null_mut();
        };
        let input = NewTodo::new(title, description);
        match client.inner.build_add_todo(unsafe { read_str(token) }, &input) {
            Ok(req) => FfiHttpRequest::from_core(req),
            Err(_) => std::ptr::null_mut(),
        }
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Build the delete request for the item with `id`.
///
/// Returns null if `client` or `id` is null, or if `id` is not usable in a path.
#[unsafe(no_mangle)]
pub extern "C" fn galaxy_build_delete_todo(
    client: *const FfiGalaxyClient,
    token: *const c_char,
    id: *const c_char,
) -> *mut FfiHttpRequest {
    catch_unwind(|| {
        if client.is_null() {
            return std::ptr::null_mut();
        }
        let client = unsafe { &*client };
        let Some(id) = (unsafe { read_str(id) }) else {
            return std::ptr::null_mut();
        };
        match client.inner.build_delete_todo(unsafe { read_str(token) }, id) {
            Ok(req) => FfiHttpRequest::from_core(req),
            Err(_) => std::ptr::null_mut(),
        }
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Build the profile request.
///
/// Returns null if `client` is null.
#[unsafe(no_mangle)]
pub extern "C" fn galaxy_build_get_profile(
    client: *const FfiGalaxyClient,
    token: *const c_char,
) -> *mut FfiHttpRequest {
    catch_unwind(|| {
        if client.is_null() {
            return std::ptr::null_mut();
        }
        let client = unsafe { &*client };
        let req = client.inner.build_get_profile(unsafe { read_str(token) });
        FfiHttpRequest::from_core(req)
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Whether both fields carry something other than whitespace. Null counts
/// as blank.
#[unsafe(no_mangle)]
pub extern "C" fn galaxy_todo_is_complete(
    title: *const c_char,
    description: *const c_char,
) -> bool {
    catch_unwind(|| {
        match (unsafe { read_str(title) }, unsafe { read_str(description) }) {
            (Some(title), Some(description)) => NewTodo::new(title, description).is_complete(),
            _ => false,
        }
    })
    .unwrap_or(false)
}

// ---------------------------------------------------------------------------
// Parse response functions
// ---------------------------------------------------------------------------

/// Convert an `FfiHttpResponse` to a core `HttpResponse`. A null body reads
/// as empty.
fn ffi_response_to_core(resp: &FfiHttpResponse) -> HttpResponse {
    let body = unsafe { read_str(resp.body) }.unwrap_or("").to_string();
    HttpResponse {
        status: resp.status,
        headers: Vec::new(),
        body,
    }
}

/// Shared null checks and panic guard for every `galaxy_parse_*` function.
fn parse_with(
    name: &'static str,
    client: *const FfiGalaxyClient,
    response: *const FfiHttpResponse,
    parse: impl FnOnce(&galaxy_core::ApiClient, HttpResponse) -> *mut FfiGalaxyResult
        + std::panic::UnwindSafe,
) -> *mut FfiGalaxyResult {
    catch_unwind(|| {
        if client.is_null() {
            return FfiGalaxyResult::null_arg("client");
        }
        if response.is_null() {
            return FfiGalaxyResult::null_arg("response");
        }
        let client = unsafe { &*client };
        let resp = unsafe { &*response };
        parse(&client.inner, ffi_response_to_core(resp))
    })
    .unwrap_or_else(|_| FfiGalaxyResult::panic(&format!("panic in {name}")))
}

/// Parse a login response. `data_tag = Token` on success; the host stores
/// the token.
#[unsafe(no_mangle)]
pub extern "C" fn galaxy_parse_login(
    client: *const FfiGalaxyClient,
    response: *const FfiHttpResponse,
) -> *mut FfiGalaxyResult {
    parse_with("galaxy_parse_login", client, response, |c, resp| {
        match c.parse_login(resp) {
            Ok(token) => FfiGalaxyResult::ok_token(Some(token)),
            Err(e) => FfiGalaxyResult::from_error(e),
        }
    })
}

/// Parse a register response. `data_tag = Token` if the server logged the
/// account in, `None` otherwise.
#[unsafe(no_mangle)]
pub extern "C" fn galaxy_parse_register(
    client: *const FfiGalaxyClient,
    response: *const FfiHttpResponse,
) -> *mut FfiGalaxyResult {
    parse_with("galaxy_parse_register", client, response, |c, resp| {
        match c.parse_register(resp) {
            Ok(token) => FfiGalaxyResult::ok_token(token),
            Err(e) => FfiGalaxyResult::from_error(e),
        }
    })
}

/// Parse a list response. `data_tag = TodoList` on success.
#[unsafe(no_mangle)]
pub extern "C" fn galaxy_parse_list_todos(
    client: *const FfiGalaxyClient,
    response: *const FfiHttpResponse,
) -> *mut FfiGalaxyResult {
    parse_with("galaxy_parse_list_todos", client, response, |c, resp| {
        match c.parse_list_todos(resp) {
            Ok(todos) => FfiGalaxyResult::ok_todo_list(todos),
            Err(e) => FfiGalaxyResult::from_error(e),
        }
    })
}

/// Parse an add response. `data_tag = None` on success; re-fetch the list.
#[unsafe(no_mangle)]
pub extern "C" fn galaxy_parse_add_todo(
    client: *const FfiGalaxyClient,
    response: *const FfiHttpResponse,
) -> *mut FfiGalaxyResult {
    parse_with("galaxy_parse_add_todo", client, response, |c, resp| {
        match c.parse_add_todo(resp) {
            Ok(()) => FfiGalaxyResult::ok_empty(),
            Err(e) => FfiGalaxyResult::from_error(e),
        }
    })
}

/// Parse a delete response. `data_tag = None` on success; re-fetch the list.
#[unsafe(no_mangle)]
pub extern "C" fn galaxy_parse_delete_todo(
    client: *const FfiGalaxyClient,
    response: *const FfiHttpResponse,
) -> *mut FfiGalaxyResult {
    parse_with("galaxy_parse_delete_todo", client, response, |c, resp| {
        match c.parse_delete_todo(resp) {
            Ok(()) => FfiGalaxyResult::ok_empty(),
            Err(e) => FfiGalaxyResult::from_error(e),
        }
    })
}

/// Parse a profile response. `data_tag = Profile` on success.
#[unsafe(no_mangle)]
pub extern "C" fn galaxy_parse_get_profile(
    client: *const FfiGalaxyClient,
    response: *const FfiHttpResponse,
) -> *mut FfiGalaxyResult {
    parse_with("galaxy_parse_get_profile", client, response, |c, resp| {
        match c.parse_get_profile(resp) {
            Ok(profile) => FfiGalaxyResult::ok_profile(profile),
            Err(e) => FfiGalaxyResult::from_error(e),
        }
    })
}

// ---------------------------------------------------------------------------
// Free functions
// ---------------------------------------------------------------------------

/// Free a C string allocated by this library, ignoring null.
fn free_c_string(s: *mut c_char) {
    if !s.is_null() {
        drop(unsafe { CString::from_raw(s) });
    }
}

/// Free an `FfiHttpRequest` returned by any `galaxy_build_*` function.
/// Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn galaxy_free_request(req: *mut FfiHttpRequest) {
    if req.is_null() {
        return;
    }
    let _ = catch_unwind(|| {
        let req = unsafe { Box::from_raw(req) };
        free_c_string(req.path);
        free_c_string(req.body);
        if !req.headers.is_null() && req.headers_len > 0 {
            let headers = unsafe {
                Box::from_raw(std::ptr::slice_from_raw_parts_mut(
                    req.headers,
                    req.headers_len as usize,
                ))
            };
            for h in headers.iter() {
                free_c_string(h.key);
                free_c_string(h.value);
            }
        }
    });
}

/// Free an `FfiGalaxyResult` returned by any `galaxy_parse_*` function.
/// Safe to call with null. Uses `data_tag` to determine what `data` points to.
#[unsafe(no_mangle)]
pub extern "C" fn galaxy_free_result(result: *mut FfiGalaxyResult) {
    if result.is_null() {
        return;
    }
    let _ = catch_unwind(|| {
        let result = unsafe { Box::from_raw(result) };
        free_c_string(result.error_message);
        free_c_string(result.server_message);
        if result.data.is_null() {
            return;
        }
        match result.data_tag {
            FfiDataTag::Token => free_c_string(result.data as *mut c_char),
            FfiDataTag::TodoList => {
                let list = unsafe { Box::from_raw(result.data as *mut FfiTodoList) };
                if !list.items.is_null() && list.len > 0 {
                    let items = unsafe {
                        Box::from_raw(std::ptr::slice_from_raw_parts_mut(
                            list.items,
                            list.len as usize,
                        ))
                    };
                    for item in items.iter() {
                        free_c_string(item.id);
                        free_c_string(item.title);
                        free_c_string(item.description);
                    }
                }
            }
            FfiDataTag::Profile => {
                let profile = unsafe { Box::from_raw(result.data as *mut FfiProfile) };
                free_c_string(profile.username);
                free_c_string(profile.email);
            }
            FfiDataTag::None => {}
        }
    });
}

/// Free a C string allocated by this library. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn galaxy_free_string(s: *mut c_char) {
    let _ = catch_unwind(|| free_c_string(s));
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

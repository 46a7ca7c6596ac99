//! The seam where the host plugs in real HTTP.
//!
//! The core never opens a socket. Whatever executes an `HttpRequest` (the
//! platform HTTP stack on device, ureq in the integration tests, a scripted
//! fake in unit tests) implements `Transport`. One call is one attempt: no
//! retries, no timeouts beyond the transport's own defaults.

use crate::error::ApiError;
use crate::http::{HttpRequest, HttpResponse};

pub trait Transport {
    /// Execute `request` once. Non-2xx statuses are returned as data;
    /// only connectivity failures become `ApiError::Network`.
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ApiError>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        (**self).execute(request)
    }
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        (**self).execute(request)
    }
}

//! Session and data-access core of the Galaxy Missions client.
//!
//! # Overview
//! Builds `HttpRequest` values and parses `HttpResponse` values for the
//! remote to-do API without touching the network (host-does-IO pattern).
//! On top of that sit the persisted session token, a mutate-then-refetch
//! to-do cache and `GalaxyApp`, which ties them to a host `Transport`.
//!
//! # Design
//! - `ApiClient` is stateless; the bearer token is an explicit argument.
//! - Each operation is split into `build_*` and `parse_*`, so the I/O
//!   boundary is explicit and the `ffi` crate can expose it 1:1.
//! - DTOs are defined independently from the mock-server crate; integration
//!   tests catch schema drift.

pub mod app;
pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod notice;
pub mod session;
pub mod todos;
pub mod transport;
pub mod types;

#[cfg(test)]
mod test_util;

pub use app::GalaxyApp;
pub use client::ApiClient;
pub use config::Config;
pub use error::{ApiError, SessionError};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use notice::{Notice, NoticeKind};
pub use session::{FileSessionStore, MemorySessionStore, SessionStore};
pub use todos::TodoCache;
pub use transport::Transport;
pub use types::{Credentials, NewTodo, Registration, TodoItem, UserProfile};

//! The modal texts screens show after an action.
//!
//! Failures never reach the user raw: a server-provided message wins,
//! otherwise each action has its own generic wording.

use crate::client::MISSING_FIELDS;
use crate::error::ApiError;

pub const LOGIN_SUCCEEDED: &str = "Login successful!";
pub const REGISTER_SUCCEEDED: &str = "Registration successful!";
pub const GENERIC_FAILURE: &str = "An error occurred";
pub const ADD_FAILED: &str = "Failed to add todo";
pub const DELETE_FAILED: &str = "Failed to delete todo";
pub const LOAD_FAILED: &str = "Failed to load todos";
pub const PROFILE_UNAVAILABLE: &str = "No profile data available";
pub const CONFIRM_LOGOUT: &str = "Are you sure you want to logout?";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Failure,
    Confirm,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
}

impl Notice {
    fn new(kind: NoticeKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    fn failure(err: &ApiError, fallback: &str) -> Self {
        Self::new(
            NoticeKind::Failure,
            err.server_message().unwrap_or(fallback),
        )
    }

    pub fn missing_fields() -> Self {
        Self::new(NoticeKind::Failure, MISSING_FIELDS)
    }

    pub fn login_succeeded() -> Self {
        Self::new(NoticeKind::Success, LOGIN_SUCCEEDED)
    }

    pub fn register_succeeded() -> Self {
        Self::new(NoticeKind::Success, REGISTER_SUCCEEDED)
    }

    /// Login and register failures show exactly what the server said.
    pub fn auth_failed(err: &ApiError) -> Self {
        Self::failure(err, GENERIC_FAILURE)
    }

    pub fn add_failed(err: &ApiError) -> Self {
        Self::failure(err, ADD_FAILED)
    }

    pub fn delete_failed(err: &ApiError) -> Self {
        Self::failure(err, DELETE_FAILED)
    }

    /// Loading the list is quiet about server detail; a 401 on the list
    /// screen reads the same as a dropped connection.
    pub fn load_failed(_err: &ApiError) -> Self {
        Self::new(NoticeKind::Failure, LOAD_FAILED)
    }

    pub fn profile_unavailable() -> Self {
        Self::new(NoticeKind::Failure, PROFILE_UNAVAILABLE)
    }

    pub fn confirm_logout() -> Self {
        Self::new(NoticeKind::Confirm, CONFIRM_LOGOUT)
    }

    pub fn is_failure(&self) -> bool {
        self.kind == NoticeKind::Failure
    }
}

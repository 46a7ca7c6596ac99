//! Stateless HTTP request builder and response parser for the Galaxy API.
//!
//! # Design
//! `ApiClient` holds only a `base_url`. The bearer token is passed into every
//! authorized `build_*` call instead of living in the client, so whoever owns
//! the session decides which token (if any) a request carries. Each operation
//! is a `build_*` / `parse_*` pair; the host executes the round-trip between
//! them.

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::types::{
    Credentials, DataEnvelope, ErrorEnvelope, NewTodo, Registration, RegistrationReceipt,
    TodoItem, TokenGrant, UserProfile,
};

/// Validation text for a to-do submitted with a blank field.
pub const MISSING_FIELDS: &str = "Both title and description are required.";

/// Synchronous, stateless client for the Galaxy Missions API.
#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn build_login(&self, credentials: &Credentials) -> Result<HttpRequest, ApiError> {
        self.json_request(HttpMethod::Post, "/api/auth/login", None, credentials)
    }

    pub fn build_register(&self, registration: &Registration) -> Result<HttpRequest, ApiError> {
        self.json_request(HttpMethod::Post, "/api/auth/register", None, registration)
    }

    pub fn build_list_todos(&self, token: Option<&str>) -> HttpRequest {
        self.request(HttpMethod::Get, "/api/todos", token)
    }

    /// Fails with `Validation` before anything is built when either field is
    /// blank.
    pub fn build_add_todo(
        &self,
        token: Option<&str>,
        input: &NewTodo,
    ) -> Result<HttpRequest, ApiError> {
        if !input.is_complete() {
            return Err(ApiError::Validation(MISSING_FIELDS.to_string()));
        }
        self.json_request(HttpMethod::Post, "/api/todos", token, input)
    }

    pub fn build_delete_todo(&self, token: Option<&str>, id: &str) -> Result<HttpRequest, ApiError> {
        if id.is_empty() || id.contains(['/', '?', '#']) {
            return Err(ApiError::Validation(format!("invalid todo id: {id:?}")));
        }
        Ok(self.request(HttpMethod::Delete, &format!("/api/todos/{id}"), token))
    }

    pub fn build_get_profile(&self, token: Option<&str>) -> HttpRequest {
        self.request(HttpMethod::Get, "/api/profile", token)
    }

    /// Returns the session token handed out by the server.
    pub fn parse_login(&self, response: HttpResponse) -> Result<String, ApiError> {
        check_auth_status(&response)?;
        let grant: TokenGrant = decode_data(&response.body)?;
        if grant.token.is_empty() {
            return Err(ApiError::Deserialization("login returned an empty token".to_string()));
        }
        Ok(grant.token)
    }

    /// Returns the token if the server logged the new user in straight away.
    pub fn parse_register(&self, response: HttpResponse) -> Result<Option<String>, ApiError> {
        check_auth_status(&response)?;
        if response.body.trim().is_empty() {
            return Ok(None);
        }
        let receipt = serde_json::from_str::<DataEnvelope<RegistrationReceipt>>(&response.body)
            .map(|envelope| envelope.data)
            .unwrap_or_else(|e| {
                debug!(error = %e, "register response carried no usable data envelope");
                RegistrationReceipt::default()
            });
        Ok(receipt.token.filter(|t| !t.is_empty()))
    }

    pub fn parse_list_todos(&self, response: HttpResponse) -> Result<Vec<TodoItem>, ApiError> {
        check_status(&response)?;
        decode_data(&response.body)
    }

    /// The created item is not needed: callers re-fetch the whole collection.
    pub fn parse_add_todo(&self, response: HttpResponse) -> Result<(), ApiError> {
        check_status(&response)
    }

    pub fn parse_delete_todo(&self, response: HttpResponse) -> Result<(), ApiError> {
        check_status(&response)
    }

    pub fn parse_get_profile(&self, response: HttpResponse) -> Result<UserProfile, ApiError> {
        check_status(&response)?;
        decode_data(&response.body)
    }

    fn request(&self, method: HttpMethod, route: &str, token: Option<&str>) -> HttpRequest {
        let mut headers = Vec::new();
        if let Some(token) = token.filter(|t| !t.is_empty()) {
            headers.push(("authorization".to_string(), format!("Bearer {token}")));
        }
        let path = format!("{}{route}", self.base_url);
        debug!(method = method.as_str(), %path, authorized = !headers.is_empty(), "built request");
        HttpRequest {
            method,
            path,
            headers,
            body: None,
        }
    }

    fn json_request<T: Serialize>(
        &self,
        method: HttpMethod,
        route: &str,
        token: Option<&str>,
        payload: &T,
    ) -> Result<HttpRequest, ApiError> {
        let body =
            serde_json::to_string(payload).map_err(|e| ApiError::Serialization(e.to_string()))?;
        let mut req = self.request(method, route, token);
        req.headers
            .push(("content-type".to_string(), "application/json".to_string()));
        req.body = Some(body);
        Ok(req)
    }
}

/// Pull `{message}` out of an error body, if it has one.
fn server_message(body: &str) -> Option<String> {
    serde_json::from_str::<ErrorEnvelope>(body)
        .ok()
        .and_then(|e| e.message)
        .filter(|m| !m.is_empty())
}

/// Login and register: every rejection is an authentication failure carrying
/// the server's explanation.
fn check_auth_status(response: &HttpResponse) -> Result<(), ApiError> {
    debug!(status = response.status, "auth response");
    if response.is_success() {
        return Ok(());
    }
    Err(ApiError::Auth(server_message(&response.body).unwrap_or_default()))
}

/// Map non-success status codes to the appropriate `ApiError` variant.
fn check_status(response: &HttpResponse) -> Result<(), ApiError> {
    debug!(status = response.status, "response");
    if response.is_success() {
        return Ok(());
    }
    let message = server_message(&response.body);
    Err(match response.status {
        401 | 403 => ApiError::Auth(message.unwrap_or_default()),
        400 | 422 => ApiError::Validation(message.unwrap_or_default()),
        404 => ApiError::NotFound,
        status => ApiError::Http {
            status,
            message: message.unwrap_or_else(|| response.body.clone()),
        },
    })
}

fn decode_data<T: DeserializeOwned>(body: &str) -> Result<T, ApiError> {
    serde_json::from_str::<DataEnvelope<T>>(body)
        .map(|envelope| envelope.data)
        .map_err(|e| ApiError::Deserialization(e.to_string()))
}

//! In-process stand-in for the remote API, used by unit tests.

use std::cell::{Cell, RefCell};

use serde_json::json;

use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::transport::Transport;
use crate::types::{NewTodo, TodoItem};

pub const USERNAME: &str = "boboiboy";
pub const PASSWORD: &str = "galaxy";
pub const TOKEN: &str = "token-boboiboy";

/// Records every request and answers the way the real API does.
#[derive(Default)]
pub struct FakeApi {
    pub todos: RefCell<Vec<TodoItem>>,
    pub requests: RefCell<Vec<HttpRequest>>,
    pub offline: Cell<bool>,
    /// Fails only `GET /api/todos`, after any write has gone through.
    pub list_offline: Cell<bool>,
    next_id: Cell<u32>,
}

impl FakeApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_todos(items: &[(&str, &str)]) -> Self {
        let api = Self::new();
        for (title, description) in items {
            api.insert(title, description);
        }
        api
    }

    pub fn insert(&self, title: &str, description: &str) -> String {
        let id = self.next_id.get() + 1;
        self.next_id.set(id);
        let id = format!("id-{id}");
        self.todos.borrow_mut().push(TodoItem {
            id: id.clone(),
            title: title.to_string(),
            description: description.to_string(),
        });
        id
    }

    pub fn request_count(&self) -> usize {
        self.requests.borrow().len()
    }

    pub fn last_request(&self) -> Option<HttpRequest> {
        self.requests.borrow().last().cloned()
    }

    fn reply(status: u16, body: serde_json::Value) -> HttpResponse {
        HttpResponse {
            status,
            headers: Vec::new(),
            body: body.to_string(),
        }
    }

    fn route(&self, request: &HttpRequest) -> HttpResponse {
        let route = request
            .path
            .split_once("/api/")
            .map(|(_, r)| r)
            .unwrap_or_default();

        match (request.method, route) {
            (HttpMethod::Post, "auth/login") => {
                let body: serde_json::Value =
                    serde_json::from_str(request.body.as_deref().unwrap_or("{}")).unwrap();
                if body["username"] == USERNAME && body["password"] == PASSWORD {
                    Self::reply(200, json!({ "data": { "token": TOKEN } }))
                } else {
                    Self::reply(401, json!({ "message": "Invalid username or password" }))
                }
            }
            (HttpMethod::Post, "auth/register") => {
                Self::reply(201, json!({ "data": { "token": TOKEN } }))
            }
            _ if request.bearer_token() != Some(TOKEN) => {
                Self::reply(401, json!({ "message": "Unauthorized" }))
            }
            (HttpMethod::Get, "todos") => {
                let todos = self.todos.borrow().clone();
                Self::reply(200, json!({ "data": todos }))
            }
            (HttpMethod::Post, "todos") => {
                let input: NewTodo =
                    serde_json::from_str(request.body.as_deref().unwrap_or("{}")).unwrap();
                let id = self.insert(&input.title, &input.description);
                Self::reply(201, json!({ "data": { "_id": id } }))
            }
            (HttpMethod::Delete, r) if r.starts_with("todos/") => {
                let id = &r["todos/".len()..];
                let mut todos = self.todos.borrow_mut();
                let before = todos.len();
                todos.retain(|t| t.id != id);
                if todos.len() == before {
                    Self::reply(404, json!({ "message": "Todo not found" }))
                } else {
                    Self::reply(200, json!({ "data": null }))
                }
            }
            (HttpMethod::Get, "profile") => Self::reply(
                200,
                json!({ "data": { "username": USERNAME, "email": "boboiboy@tapops.my" } }),
            ),
            _ => Self::reply(404, json!({ "message": "Not found" })),
        }
    }
}

impl Transport for FakeApi {
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        self.requests.borrow_mut().push(request.clone());
        if self.offline.get() {
            return Err(ApiError::Network("connection refused".to_string()));
        }
        if self.list_offline.get()
            && request.method == HttpMethod::Get
            && request.path.ends_with("/api/todos")
        {
            return Err(ApiError::Network("connection reset".to_string()));
        }
        Ok(self.route(&request))
    }
}

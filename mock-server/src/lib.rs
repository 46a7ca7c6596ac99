use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::{Path, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::{net::TcpListener, sync::RwLock};
use tracing::info;
use uuid::Uuid;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Todo {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: String,
    pub description: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Profile {
    pub username: String,
    pub email: String,
}

#[derive(Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Deserialize)]
pub struct CreateTodo {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
}

struct Account {
    password: String,
    email: String,
}

#[derive(Default)]
pub struct Store {
    accounts: HashMap<String, Account>,
    /// token -> username
    sessions: HashMap<String, String>,
    /// username -> todos, in insertion order
    todos: HashMap<String, Vec<Todo>>,
}

impl Store {
    /// Create an account directly, bypassing the HTTP surface.
    pub fn add_account(&mut self, username: &str, password: &str, email: &str) {
        self.accounts.insert(
            username.to_string(),
            Account {
                password: password.to_string(),
                email: email.to_string(),
            },
        );
    }

    fn open_session(&mut self, username: &str) -> String {
        let token = Uuid::new_v4().simple().to_string();
        self.sessions.insert(token.clone(), username.to_string());
        token
    }
}

pub type Db = Arc<RwLock<Store>>;

/// `{ "message": ... }` error response.
pub struct Failure(StatusCode, &'static str);

impl IntoResponse for Failure {
    fn into_response(self) -> Response {
        (self.0, Json(json!({ "message": self.1 }))).into_response()
    }
}

pub fn app() -> Router {
    app_with_state(Arc::new(RwLock::new(Store::default())))
}

pub fn app_with_state(db: Db) -> Router {
    Router::new()
        .route("/api/auth/login", post(login))
        .route("/api/auth/register", post(register))
        .route("/api/todos", get(list_todos).post(create_todo))
        .route("/api/todos/{id}", delete(delete_todo))
        .route("/api/profile", get(profile))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

/// Resolve the bearer token in `headers` to a username.
fn authorize(headers: &HeaderMap, store: &Store) -> Result<String, Failure> {
    let token = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .ok_or(Failure(StatusCode::UNAUTHORIZED, "No token provided"))?;
    store
        .sessions
        .get(token)
        .cloned()
        .ok_or(Failure(StatusCode::UNAUTHORIZED, "Invalid token"))
}

async fn login(
    State(db): State<Db>,
    Json(input): Json<LoginRequest>,
) -> Result<Json<serde_json::Value>, Failure> {
    let mut store = db.write().await;
    let valid = store
        .accounts
        .get(&input.username)
        .is_some_and(|account| account.password == input.password);
    if !valid {
        return Err(Failure(
            StatusCode::UNAUTHORIZED,
            "Invalid username or password",
        ));
    }
    let token = store.open_session(&input.username);
    info!(username = %input.username, "login");
    Ok(Json(json!({ "data": { "token": token } })))
}

async fn register(
    State(db): State<Db>,
    Json(input): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<serde_json::Value>), Failure> {
    if input.username.trim().is_empty() || input.password.is_empty() {
        return Err(Failure(
            StatusCode::BAD_REQUEST,
            "Username and password are required",
        ));
    }
    let mut store = db.write().await;
    if store.accounts.contains_key(&input.username) {
        return Err(Failure(StatusCode::CONFLICT, "Username already taken"));
    }
    let email = input.email.unwrap_or_default();
    store.add_account(&input.username, &input.password, &email);
    let token = store.open_session(&input.username);
    info!(username = %input.username, "registered");
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "data": { "username": input.username, "email": email, "token": token }
        })),
    ))
}

async fn list_todos(
    State(db): State<Db>,
    headers: HeaderMap,
) -> Result<Json<serde_json::Value>, Failure> {
    let store = db.read().await;
    let username = authorize(&headers, &store)?;
    let todos = store.todos.get(&username).cloned().unwrap_or_default();
    Ok(Json(json!({ "data": todos })))
}

async fn create_todo(
    State(db): State<Db>,
    headers: HeaderMap,
    Json(input): Json<CreateTodo>,
) -> Result<(StatusCode, Json<serde_json::Value>), Failure> {
    let mut store = db.write().await;
    let username = authorize(&headers, &store)?;
    if input.title.trim().is_empty() || input.description.trim().is_empty() {
        return Err(Failure(
            StatusCode::BAD_REQUEST,
            "Title and description are required",
        ));
    }
    let todo = Todo {
        id: Uuid::new_v4().simple().to_string(),
        title: input.title,
        description: input.description,
    };
    store
        .todos
        .entry(username.clone())
        .or_default()
        .push(todo.clone());
    info!(%username, id = %todo.id, "todo created");
    Ok((StatusCode::CREATED, Json(json!({ "data": todo }))))
}

async fn delete_todo(
    State(db): State<Db>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, Failure> {
    let mut store = db.write().await;
    let username = authorize(&headers, &store)?;
    let todos = store.todos.entry(username.clone()).or_default();
    let position = todos
        .iter()
        .position(|t| t.id == id)
        .ok_or(Failure(StatusCode::NOT_FOUND, "Todo not found"))?;
    let removed = todos.remove(position);
    info!(%username, id = %removed.id, "todo deleted");
    Ok(Json(json!({ "data": removed })))
}

async fn profile(
    State(db): State<Db>,
    headers: HeaderMap,
) -> Result<Json<serde_json::Value>, Failure> {
    let store = db.read().await;
    let username = authorize(&headers, &store)?;
    let email = store
        .accounts
        .get(&username)
        .map(|a| a.email.clone())
        .unwrap_or_default();
    let profile = Profile { username, email };
    Ok(Json(json!({ "data": profile })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn todo_serializes_with_underscore_id() {
        let todo = Todo {
            id: "abc".to_string(),
            title: "Test".to_string(),
            description: "Desc".to_string(),
        };
        let json = serde_json::to_value(&todo).unwrap();
        assert_eq!(json["_id"], "abc");
        assert!(json.get("id").is_none());
        assert_eq!(json["description"], "Desc");
    }

    #[test]
    fn create_todo_missing_fields_default_to_empty() {
        let input: CreateTodo = serde_json::from_str(r#"{"title":"Only title"}"#).unwrap();
        assert_eq!(input.title, "Only title");
        assert!(input.description.is_empty());
    }

    #[test]
    fn register_email_is_optional() {
        let input: RegisterRequest =
            serde_json::from_str(r#"{"username":"yaya","password":"x"}"#).unwrap();
        assert!(input.email.is_none());
    }

    #[test]
    fn authorize_requires_known_bearer() {
        let mut store = Store::default();
        store.add_account("boboiboy", "galaxy", "b@tapops.my");
        let token = store.open_session("boboiboy");

        let mut headers = HeaderMap::new();
        assert!(authorize(&headers, &store).is_err());

        headers.insert(header::AUTHORIZATION, "Bearer nope".parse().unwrap());
        assert!(authorize(&headers, &store).is_err());

        headers.insert(header::AUTHORIZATION, format!("Bearer {token}").parse().unwrap());
        assert_eq!(authorize(&headers, &store).ok().as_deref(), Some("boboiboy"));
    }
}

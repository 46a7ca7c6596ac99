//! The session context every screen works through.
//!
//! # Design
//! `GalaxyApp` owns the session store, the transport and the to-do cache.
//! There is no global token: each action reads it from the store it owns,
//! and mutations take `&mut self`, so a login or logout can never interleave
//! with a request that is still using the old token.

use tracing::{error, info, warn};

use crate::client::ApiClient;
use crate::config::Config;
use crate::error::ApiError;
use crate::session::SessionStore;
use crate::todos::TodoCache;
use crate::transport::Transport;
use crate::types::{Credentials, NewTodo, Registration, TodoItem, UserProfile};

pub struct GalaxyApp<S, T> {
    client: ApiClient,
    store: S,
    transport: T,
    todos: TodoCache,
}

impl<S: SessionStore, T: Transport> GalaxyApp<S, T> {
    pub fn new(config: &Config, store: S, transport: T) -> Self {
        Self {
            client: ApiClient::new(&config.api_url),
            store,
            transport,
            todos: TodoCache::new(),
        }
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// The persisted token. An unreadable store counts as logged out; the
    /// server will answer the next request with an authorization error.
    pub fn token(&self) -> Option<String> {
        match self.store.get() {
            Ok(token) => token.filter(|t| !t.is_empty()),
            Err(e) => {
                warn!(error = %e, "session read failed; continuing unauthenticated");
                None
            }
        }
    }

    pub fn is_logged_in(&self) -> bool {
        self.token().is_some()
    }

    /// Persists the token on success. On failure the store is untouched and
    /// the `Auth` error carries the server's message.
    pub fn login(&mut self, username: &str, password: &str) -> Result<(), ApiError> {
        let request = self.client.build_login(&Credentials {
            username: username.to_string(),
            password: password.to_string(),
        })?;
        let token = self.client.parse_login(self.transport.execute(request)?)?;
        self.store.set(&token)?;
        info!(username, "logged in");
        Ok(())
    }

    /// Returns whether the server also logged the new account in.
    pub fn register(
        &mut self,
        username: &str,
        password: &str,
        email: Option<&str>,
    ) -> Result<bool, ApiError> {
        let request = self.client.build_register(&Registration {
            username: username.to_string(),
            password: password.to_string(),
            email: email.filter(|e| !e.is_empty()).map(str::to_string),
        })?;
        let token = self
            .client
            .parse_register(self.transport.execute(request)?)?;
        info!(username, logged_in = token.is_some(), "registered");
        match token {
            Some(token) => {
                self.store.set(&token)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Forget the token and everything fetched with it.
    pub fn logout(&mut self) -> Result<(), ApiError> {
        self.store.clear()?;
        self.todos.clear();
        info!("logged out");
        Ok(())
    }

    pub fn todos(&self) -> &[TodoItem] {
        self.todos.items()
    }

    pub fn refresh_todos(&mut self) -> Result<&[TodoItem], ApiError> {
        let token = self.token();
        self.todos
            .refresh(&self.client, &self.transport, token.as_deref())
    }

    pub fn add_todo(&mut self, title: &str, description: &str) -> Result<(), ApiError> {
        let token = self.token();
        self.todos.add(
            &self.client,
            &self.transport,
            token.as_deref(),
            &NewTodo::new(title, description),
        )
    }

    pub fn delete_todo(&mut self, id: &str) -> Result<(), ApiError> {
        let token = self.token();
        self.todos
            .delete(&self.client, &self.transport, token.as_deref(), id)
    }

    /// Fetched fresh on every call; never cached.
    pub fn profile(&self) -> Result<UserProfile, ApiError> {
        let token = self.token();
        let request = self.client.build_get_profile(token.as_deref());
        self.transport
            .execute(request)
            .and_then(|response| self.client.parse_get_profile(response))
            .inspect_err(|e| error!(error = %e, "failed to fetch profile"))
    }
}

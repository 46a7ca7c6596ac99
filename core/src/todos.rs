//! In-memory copy of the user's to-do collection.
//!
//! # Design
//! Mutate-then-refetch: `add` and `delete` forward to the API and, once the
//! server accepts the change, replace the whole collection with a fresh
//! list. Nothing is ever patched locally, so the cache can only ever hold
//! what the server last said.

use tracing::{debug, warn};

use crate::client::ApiClient;
use crate::error::ApiError;
use crate::transport::Transport;
use crate::types::{NewTodo, TodoItem};

#[derive(Debug, Clone, Default)]
pub struct TodoCache {
    items: Vec<TodoItem>,
}

impl TodoCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn items(&self) -> &[TodoItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&TodoItem> {
        self.items.iter().find(|item| item.id == id)
    }

    /// Drop everything held, e.g. after logout.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Replace the collection with the server's current list. On failure the
    /// previous contents are kept.
    pub fn refresh<T: Transport + ?Sized>(
        &mut self,
        client: &ApiClient,
        transport: &T,
        token: Option<&str>,
    ) -> Result<&[TodoItem], ApiError> {
        let request = client.build_list_todos(token);
        let items = transport
            .execute(request)
            .and_then(|response| client.parse_list_todos(response))
            .inspect_err(|e| warn!(error = %e, "refreshing todos failed"))?;
        debug!(count = items.len(), "todo collection refreshed");
        self.items = items;
        Ok(&self.items)
    }

    /// Blank fields are rejected before any request is made.
    pub fn add<T: Transport + ?Sized>(
        &mut self,
        client: &ApiClient,
        transport: &T,
        token: Option<&str>,
        input: &NewTodo,
    ) -> Result<(), ApiError> {
        let request = client.build_add_todo(token, input)?;
        client.parse_add_todo(transport.execute(request)?)?;
        self.refetch_after_change(client, transport, token);
        Ok(())
    }

    pub fn delete<T: Transport + ?Sized>(
        &mut self,
        client: &ApiClient,
        transport: &T,
        token: Option<&str>,
        id: &str,
    ) -> Result<(), ApiError> {
        let request = client.build_delete_todo(token, id)?;
        client.parse_delete_todo(transport.execute(request)?)?;
        self.refetch_after_change(client, transport, token);
        Ok(())
    }

    /// The server already holds the change, so a failed re-fetch only leaves
    /// the list stale until the next refresh.
    fn refetch_after_change<T: Transport + ?Sized>(
        &mut self,
        client: &ApiClient,
        transport: &T,
        token: Option<&str>,
    ) {
        if self.refresh(client, transport, token).is_err() {
            warn!("change accepted but the list could not be re-fetched");
        }
    }
}

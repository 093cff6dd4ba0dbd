//! The todo model and its in-memory store.
use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use uuid::Uuid;

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct BaseTodo {
    pub title: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
}

#[derive(Debug, Clone, serde::Serialize, reqbind::Reply)]
pub struct Todo {
    pub id: Uuid,
    #[serde(flatten)]
    pub base: BaseTodo,
}

#[derive(Default)]
pub struct TodoStore {
    todos: Mutex<HashMap<Uuid, Todo>>,
}

impl TodoStore {
    pub fn insert(&self, base: BaseTodo) -> Uuid {
        let id = Uuid::new_v4();
        self.lock().insert(id, Todo { id, base });
        id
    }

    pub fn get(&self, id: Uuid) -> Option<Todo> {
        self.lock().get(&id).cloned()
    }

    /// All the todos whose title and description contain the given fragments.
    ///
    /// Empty fragments match everything.
    pub fn search(&self, title: &str, description: &str) -> Vec<Todo> {
        self.lock()
            .values()
            .filter(|t| t.base.title.contains(title) && t.base.description.contains(description))
            .cloned()
            .collect()
    }

    /// Apply `update` to the todo with the given id, if it exists.
    pub fn update(&self, id: Uuid, update: impl FnOnce(&mut BaseTodo)) -> Option<Todo> {
        let mut todos = self.lock();
        let todo = todos.get_mut(&id)?;
        update(&mut todo.base);
        Some(todo.clone())
    }

    pub fn remove(&self, id: Uuid) -> Option<Todo> {
        self.lock().remove(&id)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<Uuid, Todo>> {
        // Updates never leave the map half-written.
        self.todos.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

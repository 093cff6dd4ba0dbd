//! Request shapes and handlers for the todo API.
use std::sync::Arc;

use reqbind::bind::BindError;
use reqbind::pipeline::{Context, OnBindError, TypedRequest, Validate};
use reqbind::{Error, Params, Reply, RequestShape};
use uuid::Uuid;

use crate::errors::{NothingToUpdate, TodoNotFound, TodoTitleEmpty};
use crate::todo::{BaseTodo, Todo, TodoStore};

#[derive(Debug, Default, Params)]
pub struct TodoPath {
    #[param("alias=id,desc=The todo identifier")]
    pub id: Uuid,
}

#[derive(Debug, serde::Serialize, Reply)]
pub struct TodoIdOnly {
    pub id: Uuid,
}

/// Wrap a handler that needs access to the store.
pub fn with_store<T, F, Fut>(
    store: &Arc<TodoStore>,
    handler: F,
) -> impl Fn(TypedRequest<T>) -> Fut + Send + Sync + use<T, F, Fut>
where
    F: Fn(Arc<TodoStore>, TypedRequest<T>) -> Fut + Send + Sync,
{
    let store = Arc::clone(store);
    move |request: TypedRequest<T>| handler(Arc::clone(&store), request)
}

// Create

#[derive(Debug, RequestShape)]
#[request(validate)]
pub struct CreateTodo {
    #[bind(body)]
    pub body: BaseTodo,
}

impl Validate for CreateTodo {
    fn validate(&self, _ctx: &mut Context<'_>) -> Result<(), Error> {
        tracing::debug!("Validating a new todo");
        if self.body.title.is_empty() {
            return Err(TodoTitleEmpty.into());
        }
        Ok(())
    }
}

pub async fn create_todo(
    store: Arc<TodoStore>,
    request: TypedRequest<CreateTodo>,
) -> Result<TodoIdOnly, Error> {
    let id = store.insert(request.into_data().body);
    tracing::info!(%id, "Created todo");
    Ok(TodoIdOnly { id })
}

// Get

#[derive(Debug, RequestShape)]
pub struct GetTodo {
    #[bind(path)]
    pub path: TodoPath,
}

pub async fn get_todo(
    store: Arc<TodoStore>,
    request: TypedRequest<GetTodo>,
) -> Result<Todo, Error> {
    let id = request.path.id;
    Ok(store.get(id).ok_or(TodoNotFound { id })?)
}

// List

#[derive(Debug, Default, Params)]
pub struct Search {
    #[param("title,optional,desc=Only return todos whose title contains this text")]
    pub title: String,
    #[param("description,optional,desc=Only return todos whose description contains this text")]
    pub description: String,
}

#[derive(Debug, RequestShape)]
pub struct ListTodos {
    #[bind(query)]
    pub search: Search,
}

#[derive(Debug, serde::Serialize, Reply)]
pub struct TodoList {
    pub todos: Vec<Todo>,
}

pub async fn list_todos(
    store: Arc<TodoStore>,
    request: TypedRequest<ListTodos>,
) -> Result<TodoList, Error> {
    let Search { title, description } = &request.search;
    Ok(TodoList {
        todos: store.search(title, description),
    })
}

// Update

#[derive(Debug, Default, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TodoPatch {
    #[serde(default)]
    pub new_title: String,
    #[serde(default)]
    pub new_description: String,
}

#[derive(Debug, RequestShape)]
#[request(validate)]
pub struct UpdateTodo {
    #[bind(path)]
    pub path: TodoPath,
    #[bind(body)]
    pub patch: TodoPatch,
}

impl Validate for UpdateTodo {
    fn validate(&self, _ctx: &mut Context<'_>) -> Result<(), Error> {
        if self.patch.new_title.is_empty() && self.patch.new_description.is_empty() {
            return Err(NothingToUpdate.into());
        }
        Ok(())
    }
}

pub async fn update_todo(
    store: Arc<TodoStore>,
    request: TypedRequest<UpdateTodo>,
) -> Result<TodoIdOnly, Error> {
    let id = request.path.id;
    let patch = &request.patch;
    store
        .update(id, |todo| {
            if !patch.new_title.is_empty() {
                todo.title.clone_from(&patch.new_title);
            }
            if !patch.new_description.is_empty() {
                todo.description.clone_from(&patch.new_description);
            }
        })
        .ok_or(TodoNotFound { id })?;
    Ok(TodoIdOnly { id })
}

// Delete

#[derive(Debug, RequestShape)]
pub struct DeleteTodo {
    #[bind(path)]
    pub path: TodoPath,
}

pub async fn delete_todo(
    store: Arc<TodoStore>,
    request: TypedRequest<DeleteTodo>,
) -> Result<TodoIdOnly, Error> {
    let id = request.path.id;
    store.remove(id).ok_or(TodoNotFound { id })?;
    Ok(TodoIdOnly { id })
}

// Hello

#[derive(Debug, Default, Params)]
pub struct HelloPath {
    #[param("name")]
    pub name: String,
}

impl Validate for HelloPath {
    fn validate(&self, _ctx: &mut Context<'_>) -> Result<(), Error> {
        tracing::debug!(name = %self.name, "Validating hello path");
        Ok(())
    }
}

#[derive(Debug, Default, Params)]
pub struct HelloQuery {
    #[param("name,optional")]
    pub names: Vec<String>,
}

/// Names injected by [`inject_names`](crate::router::inject_names).
#[derive(Debug, Default, Params)]
pub struct HelloContext {
    #[param("names,optional")]
    pub names: Vec<String>,
}

#[derive(Debug, RequestShape)]
#[request(validate, on_bind_error)]
pub struct Hello {
    #[bind(path, validate)]
    pub path: Box<HelloPath>,
    #[bind(query)]
    pub query: HelloQuery,
    #[bind(context)]
    pub context: HelloContext,
}

impl Validate for Hello {
    fn validate(&self, _ctx: &mut Context<'_>) -> Result<(), Error> {
        tracing::debug!("Validating hello");
        Ok(())
    }
}

impl OnBindError for Hello {
    fn on_bind_error(_ctx: &mut Context<'_>, error: BindError) -> Option<Error> {
        tracing::warn!(%error, "Failed to bind a hello request");
        Some(error.into())
    }
}

#[derive(Debug, serde::Serialize, Reply)]
pub struct Greeting {
    pub message: String,
}

pub async fn hello(request: TypedRequest<Hello>) -> Result<Greeting, Error> {
    let names: Vec<&str> = std::iter::once(request.path.name.as_str())
        .chain(request.query.names.iter().map(String::as_str))
        .chain(request.context.names.iter().map(String::as_str))
        .collect();
    Ok(Greeting {
        message: format!("Hello, {}!", names.join(", ")),
    })
}

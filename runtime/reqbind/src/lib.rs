//! # reqbind
//!
//! Declarative request binding for HTTP handlers.
//!
//! A request shape is a struct that describes everything a handler needs from the
//! incoming request, split into regions: the JSON body, the path parameters, the query
//! parameters and the context values injected by upstream middlewares.
//!
//! ```rust
//! use reqbind::{Params, RequestShape};
//!
//! #[derive(Default, Params)]
//! pub struct TodoPath {
//!     #[param("id")]
//!     pub id: uuid::Uuid,
//! }
//!
//! #[derive(Default, Params)]
//! pub struct Filters {
//!     #[param("status,optional,desc=Only return todos with this status")]
//!     pub status: String,
//!     #[param("tag,optional")]
//!     pub tags: Vec<String>,
//! }
//!
//! #[derive(serde::Deserialize)]
//! pub struct Patch {
//!     pub title: Option<String>,
//! }
//!
//! #[derive(RequestShape)]
//! pub struct UpdateTodo {
//!     #[bind(body)]
//!     pub body: Patch,
//!     #[bind(path)]
//!     pub path: TodoPath,
//!     #[bind(query)]
//!     pub filters: Filters,
//! }
//! ```
//!
//! The shape is turned into a [`BindingPlan`](reflect::BindingPlan) once, before serving
//! any request. The plan drives the [binding](bind) of every incoming request.
//! An [`Endpoint`](pipeline::Endpoint) puts everything together: it binds the request,
//! validates it, invokes the handler and renders the outcome.
pub mod bind;
pub mod coerce;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod reflect;
pub mod request;
pub mod response;

pub use bind::Params;
pub use coerce::FromParam;
pub use error::Error;
pub use reflect::RequestShape;
pub use response::Reply;

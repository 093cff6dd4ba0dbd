//! Path-based dispatch on top of `matchit`.
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;
use std::sync::Arc;

use anyhow::Context as _;
use percent_encoding::percent_decode_str;
use reqbind::config::EndpointConfig;
use reqbind::pipeline::{Endpoint, Handler};
use reqbind::reflect::RequestShape;
use reqbind::request::{ContextValues, PathValues};
use reqbind::response::Response;
use tracing_log_error::log_error;

use crate::routes;
use crate::todo::TodoStore;

type RouteFuture = Pin<Box<dyn Future<Output = Response>>>;

pub type BoxedRoute<B> = Box<dyn Fn(http::Request<B>) -> RouteFuture>;

/// Maps request paths to endpoints.
///
/// Routes match any method.
pub struct Router<B> {
    router: matchit::Router<BoxedRoute<B>>,
    config: EndpointConfig,
}

impl<B> Router<B>
where
    B: http_body::Body + 'static,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    pub fn new(config: EndpointConfig) -> Self {
        Self {
            router: matchit::Router::new(),
            config,
        }
    }

    /// Register `handler` for `path`, binding requests to `T`.
    ///
    /// It fails if `T` is not a valid request shape or if `path` conflicts with an
    /// existing route.
    pub fn route<T, H>(&mut self, path: &str, handler: H) -> Result<&mut Self, anyhow::Error>
    where
        T: RequestShape + 'static,
        H: Handler<T> + 'static,
    {
        self.route_with(path, handler, |route| route)
    }

    /// Like [`Router::route`], with `middleware` wrapped around the endpoint.
    pub fn route_with<T, H>(
        &mut self,
        path: &str,
        handler: H,
        middleware: impl FnOnce(BoxedRoute<B>) -> BoxedRoute<B>,
    ) -> Result<&mut Self, anyhow::Error>
    where
        T: RequestShape + 'static,
        H: Handler<T> + 'static,
    {
        let endpoint = Endpoint::<T, H>::build(handler)
            .with_context(|| format!("Invalid request shape for `{path}`"))?
            .with_config(self.config.clone());
        let endpoint = Rc::new(endpoint);
        let route: BoxedRoute<B> = Box::new(move |request: http::Request<B>| -> RouteFuture {
            let endpoint = Rc::clone(&endpoint);
            Box::pin(async move { endpoint.handle(request).await })
        });
        self.router
            .insert(path, middleware(route))
            .with_context(|| format!("Failed to register a route for `{path}`"))?;
        Ok(self)
    }

    /// Dispatch `request` to the matching endpoint, exposing the matched path parameters
    /// as [`PathValues`].
    ///
    /// Path parameters are percent-decoded: requests with a parameter that doesn't
    /// decode to valid UTF-8 are rejected with a `400 Bad Request`.
    pub async fn dispatch(&self, mut request: http::Request<B>) -> Response {
        let path = request.uri().path().to_owned();
        let Ok(matched) = self.router.at(&path) else {
            tracing::debug!(%path, "No route matched");
            return Response::not_found();
        };
        let params = match decode_params(&matched.params) {
            Ok(params) => params,
            Err(e) => {
                log_error!(e, level: tracing::Level::DEBUG, "Invalid path parameter");
                return Response::bad_request().set_typed_body(e.to_string());
            }
        };
        request.extensions_mut().insert(params);
        (matched.value)(request).await
    }
}

/// A path parameter that isn't valid UTF-8 once percent-decoded.
#[derive(Debug, thiserror::Error)]
#[error("The path parameter `{name}` is not valid UTF-8 once percent-decoded: `{raw}`")]
pub struct InvalidPathParam {
    name: String,
    raw: String,
    #[source]
    source: std::str::Utf8Error,
}

fn decode_params(params: &matchit::Params<'_, '_>) -> Result<PathValues, InvalidPathParam> {
    params
        .iter()
        .map(|(name, raw)| {
            percent_decode_str(raw)
                .decode_utf8()
                .map(|value| (name, value.into_owned()))
                .map_err(|source| InvalidPathParam {
                    name: name.to_owned(),
                    raw: raw.to_owned(),
                    source,
                })
        })
        .collect()
}

/// Put the names of the default guests in the request context, as a typed value.
pub fn inject_names<B: 'static>(next: BoxedRoute<B>) -> BoxedRoute<B> {
    Box::new(move |mut request: http::Request<B>| {
        tracing::debug!("Adding names to the request context");
        let mut context = request
            .extensions_mut()
            .remove::<ContextValues>()
            .unwrap_or_default();
        context.insert_typed("names", vec!["Alice".to_string(), "Bob".to_string()]);
        request.extensions_mut().insert(context);
        next(request)
    })
}

/// All the routes of the todo API.
pub fn todo_api<B>(store: Arc<TodoStore>, config: EndpointConfig) -> Result<Router<B>, anyhow::Error>
where
    B: http_body::Body + 'static,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let mut router = Router::new(config);
    router
        .route("/todo", routes::with_store(&store, routes::create_todo))?
        .route("/todo/{id}/get", routes::with_store(&store, routes::get_todo))?
        .route("/todos", routes::with_store(&store, routes::list_todos))?
        .route("/todo/{id}/update", routes::with_store(&store, routes::update_todo))?
        .route("/todo/{id}/delete", routes::with_store(&store, routes::delete_todo))?
        .route_with("/hello/{name}", routes::hello, inject_names)?;
    Ok(router)
}

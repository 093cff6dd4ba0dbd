use std::future::Future;
use std::sync::Arc;

use bytes::Bytes;
use tracing::Instrument;
use tracing_log_error::log_error;

use crate::bind::{BindError, bind};
use crate::config::EndpointConfig;
use crate::error::{Error, InternalError};
use crate::reflect::{BindingPlan, PlanErrors, RegionKind, RequestShape};
use crate::request::body::{buffer_body, check_json_content_type};
use crate::request::{ContextValues, PathValues, QueryValues, RequestHead};
use crate::response::{RenderError, Reply, Response, ResponseWriter};

use super::{Context, Stage, TypedRequest};

/// The code invoked for a bound and validated request.
///
/// It's implemented for every async function (or closure) that takes a
/// [`TypedRequest<T>`] and returns a `Result<impl Reply, Error>`.
pub trait Handler<T>: Send + Sync {
    type Output: Reply;

    fn call(
        &self,
        request: TypedRequest<T>,
    ) -> impl Future<Output = Result<Self::Output, Error>> + Send;
}

impl<T, F, Fut, O> Handler<T> for F
where
    F: Fn(TypedRequest<T>) -> Fut + Send + Sync,
    Fut: Future<Output = Result<O, Error>> + Send,
    O: Reply,
{
    type Output = O;

    fn call(
        &self,
        request: TypedRequest<T>,
    ) -> impl Future<Output = Result<Self::Output, Error>> + Send {
        (self)(request)
    }
}

/// A request shape paired with its handler.
///
/// The binding plan is built once, when the endpoint is created, and shared by all
/// requests.
pub struct Endpoint<T, H> {
    plan: Arc<BindingPlan<T>>,
    handler: H,
    config: EndpointConfig,
}

struct RenderFailure {
    stage: Stage,
    error: RenderError,
}

impl Stage {
    fn failed(self) -> impl FnOnce(RenderError) -> RenderFailure {
        move |error| RenderFailure { stage: self, error }
    }

    fn enter(self) {
        tracing::Span::current().record("reqbind.stage", self.as_str());
    }
}

impl<T, H> Endpoint<T, H>
where
    T: RequestShape,
    H: Handler<T>,
{
    /// Create an endpoint from a pre-built plan, using the default configuration.
    pub fn new(plan: Arc<BindingPlan<T>>, handler: H) -> Self {
        Self {
            plan,
            handler,
            config: EndpointConfig::default(),
        }
    }

    /// Build the binding plan for `T` and create an endpoint with it.
    pub fn build(handler: H) -> Result<Self, PlanErrors> {
        Ok(Self::new(Arc::new(BindingPlan::build()?), handler))
    }

    pub fn with_config(mut self, config: EndpointConfig) -> Self {
        self.config = config;
        self
    }

    pub fn plan(&self) -> &Arc<BindingPlan<T>> {
        &self.plan
    }

    /// Process an incoming request.
    ///
    /// Path values and context values are read from the request extensions,
    /// see [`PathValues`] and [`ContextValues`].
    /// Failures never escape: they are rendered into the returned response.
    pub async fn handle<B>(&self, request: http::Request<B>) -> Response
    where
        B: http_body::Body,
        B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        let span = tracing::info_span!(
            "reqbind.request",
            http.request.method = %request.method(),
            url.path = %request.uri().path(),
            reqbind.shape = self.plan.shape(),
            reqbind.stage = tracing::field::Empty,
            http.response.status_code = tracing::field::Empty,
        );
        let response = self.process(request).instrument(span.clone()).await;
        span.record("http.response.status_code", response.status().as_u16());
        response
    }

    async fn process<B>(&self, request: http::Request<B>) -> Response
    where
        B: http_body::Body,
        B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        Stage::ExtractInputs.enter();
        let (mut parts, body) = request.into_parts();
        let path = parts.extensions.remove::<PathValues>().unwrap_or_default();
        let context = parts
            .extensions
            .remove::<ContextValues>()
            .unwrap_or_default();
        let query = QueryValues::parse(
            parts.uri.query().unwrap_or_default(),
            self.plan.aliases(RegionKind::Query),
        );
        let head = Arc::new(RequestHead::from(parts));

        let mut writer = ResponseWriter::new();
        let outcome = self
            .run(&head, body, &path, &query, &context, &mut writer)
            .await;
        if let Err(failure) = outcome {
            log_error!(
                failure.error,
                stage = failure.stage.as_str(),
                "Failed to render the response"
            );
            InternalError::write_fallback(&mut writer, &failure.error);
        }
        writer.finish()
    }

    async fn run<B>(
        &self,
        head: &Arc<RequestHead>,
        body: B,
        path: &PathValues,
        query: &QueryValues,
        context: &ContextValues,
        writer: &mut ResponseWriter,
    ) -> Result<(), RenderFailure>
    where
        B: http_body::Body,
        B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        let body = match self.read_body(head, body).await {
            Ok(body) => body,
            Err(e) => return self.bind_failed(Stage::ExtractInputs, head, writer, e),
        };

        Stage::Bind.enter();
        let data = match bind(&*self.plan, &body[..], path, query, context) {
            Ok(data) => data,
            Err(e) => return self.bind_failed(Stage::Bind, head, writer, e),
        };

        let mut ctx = Context::new(head, writer);
        Stage::ValidateRegions.enter();
        for (region, validator) in self.plan.region_validators() {
            if let Err(e) = validator(&data, &mut ctx) {
                log_error!(
                    e.inner_ref(),
                    level: tracing::Level::DEBUG,
                    region = region.as_str(),
                    "Region validation failed"
                );
                return e.render(&mut ctx).map_err(Stage::ValidateRegions.failed());
            }
        }

        if let Some(validator) = self.plan.validator() {
            Stage::ValidateWhole.enter();
            if let Err(e) = validator(&data, &mut ctx) {
                log_error!(e.inner_ref(), level: tracing::Level::DEBUG, "Validation failed");
                return e.render(&mut ctx).map_err(Stage::ValidateWhole.failed());
            }
        }

        Stage::Invoke.enter();
        let output = self
            .handler
            .call(TypedRequest::new(Arc::clone(head), data))
            .await;

        Stage::Render.enter();
        respond(output, &mut ctx)
    }

    async fn read_body<B>(&self, head: &RequestHead, body: B) -> Result<Bytes, BindError>
    where
        B: http_body::Body,
        B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        if self.plan.region(RegionKind::Body).is_none() {
            return Ok(Bytes::new());
        }
        if self.config.require_json_content_type {
            check_json_content_type(&head.headers)?;
        }
        Ok(buffer_body(&head.headers, body, self.config.body_size_limit).await?)
    }

    fn bind_failed(
        &self,
        stage: Stage,
        head: &RequestHead,
        writer: &mut ResponseWriter,
        error: BindError,
    ) -> Result<(), RenderFailure> {
        log_error!(
            error,
            level: tracing::Level::DEBUG,
            "Failed to bind the incoming request"
        );
        let mut ctx = Context::new(head, writer);
        let rendered = match self.plan.bind_error_hook() {
            Some(hook) => match hook(&mut ctx, error) {
                Some(e) => e.render(&mut ctx),
                // The hook has written the response itself.
                None => Ok(()),
            },
            None => crate::response::Render::render(&error, &mut ctx),
        };
        rendered.map_err(stage.failed())
    }
}

/// Write the outcome of the handler, whether it succeeded or not.
fn respond<O: Reply>(output: Result<O, Error>, ctx: &mut Context<'_>) -> Result<(), RenderFailure> {
    match output {
        Ok(output) => output.reply(ctx),
        Err(e) => {
            log_error!(e.inner_ref(), level: tracing::Level::DEBUG, "The handler failed");
            e.render(ctx)
        }
    }
    .map_err(Stage::Render.failed())
}

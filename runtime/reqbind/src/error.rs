//! The error type returned by handlers and validators.
use std::fmt;

use http::StatusCode;

use crate::pipeline::Context;
use crate::response::{Json, Render, RenderError, ResponseWriter};

/// An error that knows how to render itself.
///
/// Any type that implements both [`std::error::Error`] and [`Render`] converts into
/// [`Error`], so you can use `?` in handlers and validators:
///
/// ```rust
/// use reqbind::pipeline::Context;
/// use reqbind::response::{Render, RenderError};
/// use reqbind::Error;
///
/// #[derive(Debug, thiserror::Error)]
/// #[error("Todo not found")]
/// struct NotFound;
///
/// impl Render for NotFound {
///     fn render(&self, ctx: &mut Context<'_>) -> Result<(), RenderError> {
///         ctx.response().set_status(http::StatusCode::NOT_FOUND);
///         Ok(())
///     }
/// }
///
/// fn find() -> Result<(), Error> {
///     Err(NotFound)?
/// }
/// ```
///
/// Errors that don't know how to render themselves can be wrapped with [`Error::internal`]:
/// they'll be reported as `500 Internal Server Error`.
pub struct Error {
    inner: Box<dyn RenderableError>,
}

trait RenderableError: std::error::Error + Render + Send + Sync + 'static {
    fn as_std(&self) -> &(dyn std::error::Error + Send + Sync + 'static);
}

impl<E> RenderableError for E
where
    E: std::error::Error + Render + Send + Sync + 'static,
{
    fn as_std(&self) -> &(dyn std::error::Error + Send + Sync + 'static) {
        self
    }
}

impl Error {
    pub fn new<E>(error: E) -> Self
    where
        E: std::error::Error + Render + Send + Sync + 'static,
    {
        Self {
            inner: Box::new(error),
        }
    }

    /// Wrap an error that has no specific rendering.
    ///
    /// It's rendered as an [`InternalError`].
    pub fn internal(error: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self::new(InternalError::new(error))
    }

    /// A reference to the underlying error.
    pub fn inner_ref(&self) -> &(dyn std::error::Error + Send + Sync + 'static) {
        self.inner.as_std()
    }

    /// Write the underlying error into the response.
    pub fn render(&self, ctx: &mut Context<'_>) -> Result<(), RenderError> {
        self.inner.render(ctx)
    }
}

impl<E> From<E> for Error
where
    E: std::error::Error + Render + Send + Sync + 'static,
{
    fn from(error: E) -> Self {
        Self::new(error)
    }
}

impl fmt::Debug for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self.inner.as_std(), f)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self.inner.as_std(), f)
    }
}

/// The body of the default error responses.
#[derive(Debug, serde::Serialize, serde::Deserialize, PartialEq, Eq)]
pub struct ErrorMessage {
    pub message: String,
}

/// Write `{"message": <message>}` as a JSON body, with the given status code.
pub fn render_message(
    ctx: &mut Context<'_>,
    status: StatusCode,
    message: String,
) -> Result<(), RenderError> {
    let body = Json::new(ErrorMessage { message })?;
    ctx.response().set_status(status).set_typed_body(body);
    Ok(())
}

/// Something went wrong on our side.
///
/// It's rendered as `500 Internal Server Error`, with the error message in the body.
#[derive(Debug, thiserror::Error)]
#[error("{source}")]
pub struct InternalError {
    source: Box<dyn std::error::Error + Send + Sync>,
}

impl InternalError {
    pub fn new(source: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self {
            source: source.into(),
        }
    }

    /// Overwrite whatever is in `writer` with a `500 Internal Server Error` response.
    ///
    /// Unlike [`Render::render`], it can't fail: it's used when rendering itself went wrong.
    pub fn write_fallback(writer: &mut ResponseWriter, cause: &dyn fmt::Display) {
        writer.reset();
        let body = serde_json::json!({
            "message": format!("Internal server error: {cause}")
        });
        writer.set_status(StatusCode::INTERNAL_SERVER_ERROR);
        writer.headers_mut().insert(
            http::header::CONTENT_TYPE,
            http::HeaderValue::from_static("application/json"),
        );
        writer.write(body.to_string().as_bytes());
    }
}

impl Render for InternalError {
    fn render(&self, ctx: &mut Context<'_>) -> Result<(), RenderError> {
        render_message(
            ctx,
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Internal server error: {self}"),
        )
    }
}

use crate::pipeline::Context;

use super::{JsonSerializationError, Response};

/// A value that knows how to write itself into a response.
///
/// Errors returned by handlers and validators must implement [`Render`],
/// on top of [`std::error::Error`].
pub trait Render {
    /// Write `self` into the response of the current request.
    fn render(&self, ctx: &mut Context<'_>) -> Result<(), RenderError>;
}

/// A value returned by a handler that can be turned into the response.
///
/// Implement it with `#[derive(Reply)]`:
///
/// - `#[reply(text)]` renders the [`Display`](std::fmt::Display) representation as `text/plain`;
/// - `#[reply(render)]` delegates to the type's [`Render`] implementation;
/// - without attributes, the value is serialized as JSON.
pub trait Reply {
    fn reply(self, ctx: &mut Context<'_>) -> Result<(), RenderError>;
}

#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
/// Something went wrong while writing the response.
pub enum RenderError {
    #[error("Failed to serialize the response body as JSON")]
    Json(#[from] JsonSerializationError),
    #[error(transparent)]
    Custom(Box<dyn std::error::Error + Send + Sync>),
}

impl RenderError {
    /// Wrap an arbitrary error.
    pub fn custom(e: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self::Custom(e.into())
    }
}

impl Reply for String {
    fn reply(self, ctx: &mut Context<'_>) -> Result<(), RenderError> {
        ctx.response().set_typed_body(self);
        Ok(())
    }
}

impl Reply for &'static str {
    fn reply(self, ctx: &mut Context<'_>) -> Result<(), RenderError> {
        ctx.response().set_typed_body(self);
        Ok(())
    }
}

impl Reply for serde_json::Value {
    fn reply(self, ctx: &mut Context<'_>) -> Result<(), RenderError> {
        super::reply::json(&self, ctx)
    }
}

impl Reply for Response {
    fn reply(self, ctx: &mut Context<'_>) -> Result<(), RenderError> {
        let writer = ctx.response();
        writer.set_status(self.status);
        writer.headers_mut().extend(self.headers);
        writer.write(&self.body);
        Ok(())
    }
}

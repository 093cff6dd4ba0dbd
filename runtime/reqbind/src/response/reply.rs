//! The rendering strategies used by `#[derive(Reply)]`.
use std::fmt::Display;

use crate::pipeline::Context;

use super::{Json, Render, RenderError};

/// Render the [`Display`] representation of `value` as `text/plain`.
pub fn text<T: Display + ?Sized>(value: &T, ctx: &mut Context<'_>) -> Result<(), RenderError> {
    ctx.response().set_typed_body(value.to_string());
    Ok(())
}

/// Serialize `value` as JSON.
pub fn json<T: serde::Serialize + ?Sized>(
    value: &T,
    ctx: &mut Context<'_>,
) -> Result<(), RenderError> {
    ctx.response().set_typed_body(Json::new(value)?);
    Ok(())
}

/// Delegate to the [`Render`] implementation of `value`.
pub fn render<T: Render + ?Sized>(value: &T, ctx: &mut Context<'_>) -> Result<(), RenderError> {
    value.render(ctx)
}

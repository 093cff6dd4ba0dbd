use http::StatusCode;
use reqbind::pipeline::Context;
use reqbind::response::{Render, RenderError};
use uuid::Uuid;

#[derive(Debug, thiserror::Error)]
#[error("todo not found")]
pub struct TodoNotFound {
    pub id: Uuid,
}

#[derive(Debug, thiserror::Error)]
#[error("title cannot be empty")]
pub struct TodoTitleEmpty;

#[derive(Debug, thiserror::Error)]
#[error("title or description should be provided")]
pub struct NothingToUpdate;

fn plain(ctx: &mut Context<'_>, status: StatusCode, message: String) -> Result<(), RenderError> {
    ctx.response().set_status(status).set_typed_body(message);
    Ok(())
}

impl Render for TodoNotFound {
    fn render(&self, ctx: &mut Context<'_>) -> Result<(), RenderError> {
        plain(ctx, StatusCode::NOT_FOUND, self.to_string())
    }
}

impl Render for TodoTitleEmpty {
    fn render(&self, ctx: &mut Context<'_>) -> Result<(), RenderError> {
        plain(ctx, StatusCode::BAD_REQUEST, self.to_string())
    }
}

impl Render for NothingToUpdate {
    fn render(&self, ctx: &mut Context<'_>) -> Result<(), RenderError> {
        plain(ctx, StatusCode::BAD_REQUEST, self.to_string())
    }
}

//! Run the request lifecycle: bind, validate, invoke the handler, render.
//!
//! # Overview
//!
//! An [`Endpoint`] ties a request shape to a handler. For every incoming request it goes
//! through the following [`Stage`]s, stopping at the first failure:
//!
//! 1. [`Stage::ExtractInputs`]: collect the path values, the context values, the declared
//!    query parameters and, if the shape has a body region, the buffered body;
//! 2. [`Stage::Bind`]: populate the request shape. Failures are handed to the shape's
//!    [`OnBindError`] hook, if it has one, or rendered as `400 Bad Request`;
//! 3. [`Stage::ValidateRegions`]: invoke the region validators, in a fixed order
//!    (path, query, context, body);
//! 4. [`Stage::ValidateWhole`]: invoke the validator of the whole shape;
//! 5. [`Stage::Invoke`]: call the handler;
//! 6. [`Stage::Render`]: render the handler's output, or its error.
//!
//! If rendering fails at any stage, the partial response is discarded and replaced with
//! a fixed `500 Internal Server Error` response.
use std::fmt;
use std::sync::Arc;

use crate::bind::BindError;
use crate::error::Error;
use crate::request::RequestHead;
use crate::response::ResponseWriter;

pub use endpoint::{Endpoint, Handler};

mod endpoint;

/// The request-scoped context handed to validators, error hooks and renderers.
pub struct Context<'a> {
    head: &'a RequestHead,
    response: &'a mut ResponseWriter,
}

impl<'a> Context<'a> {
    pub fn new(head: &'a RequestHead, response: &'a mut ResponseWriter) -> Self {
        Self { head, response }
    }

    /// The head of the incoming request.
    pub fn head(&self) -> &RequestHead {
        self.head
    }

    /// The response under construction.
    pub fn response(&mut self) -> &mut ResponseWriter {
        &mut *self.response
    }
}

/// A bound request, as received by handlers.
#[derive(Debug)]
pub struct TypedRequest<T> {
    /// The head of the incoming request.
    pub head: Arc<RequestHead>,
    /// The bound request shape.
    pub data: T,
}

impl<T> TypedRequest<T> {
    pub fn new(head: Arc<RequestHead>, data: T) -> Self {
        Self { head, data }
    }

    pub fn into_data(self) -> T {
        self.data
    }
}

impl<T> std::ops::Deref for TypedRequest<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.data
    }
}

/// A value that can check itself once it has been bound.
///
/// Regions opt into validation with `#[bind(<region>, validate)]`,
/// whole request shapes with `#[request(validate)]`.
pub trait Validate {
    fn validate(&self, ctx: &mut Context<'_>) -> Result<(), Error>;
}

impl<T: Validate> Validate for Box<T> {
    fn validate(&self, ctx: &mut Context<'_>) -> Result<(), Error> {
        T::validate(self, ctx)
    }
}

/// A request shape that takes over the rendering of its binding failures.
///
/// Opt in with `#[request(on_bind_error)]`.
pub trait OnBindError {
    /// Handle a binding failure.
    ///
    /// Return the error to render, or `None` if the response has already been written
    /// through `ctx`.
    fn on_bind_error(ctx: &mut Context<'_>, error: BindError) -> Option<Error>;
}

/// A step of the request lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    ExtractInputs,
    Bind,
    ValidateRegions,
    ValidateWhole,
    Invoke,
    Render,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::ExtractInputs => "extract_inputs",
            Stage::Bind => "bind",
            Stage::ValidateRegions => "validate_regions",
            Stage::ValidateWhole => "validate_whole",
            Stage::Invoke => "invoke",
            Stage::Render => "render",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

//! Describe request shapes and turn those descriptions into binding plans.
//!
//! # Overview
//!
//! A request shape is a struct whose fields are split into (up to) four regions:
//! the JSON body, the path parameters, the query parameters and the context values.
//! `#[derive(RequestShape)]` generates a descriptor table for it, a [`ShapeDecl`], which
//! [`BindingPlan::build`] validates and turns into a [`BindingPlan`].
//!
//! A plan is built once per shape, before serving any request, and it's read-only afterwards:
//! wrap it in an [`Arc`](std::sync::Arc) to share it across all the requests of that shape.
//!
//! ```rust
//! use reqbind::reflect::{BindingPlan, RegionKind};
//! use reqbind::{Params, RequestShape};
//!
//! #[derive(Default, Params)]
//! pub struct TodoPath {
//!     #[param("id,desc=The todo identifier")]
//!     pub id: uuid::Uuid,
//! }
//!
//! #[derive(RequestShape)]
//! pub struct GetTodo {
//!     #[bind(path)]
//!     pub path: TodoPath,
//! }
//!
//! let plan = BindingPlan::<GetTodo>::build().unwrap();
//! let path = plan.region(RegionKind::Path).unwrap();
//! assert_eq!(path.params()[0].alias(), "id");
//! assert!(!path.params()[0].is_optional());
//! ```
use std::fmt::{self, Display};

use serde::de::DeserializeOwned;
use smallvec::SmallVec;
use tracing_log_error::log_error;

use crate::bind::{BindError, Inputs, Params};
use crate::coerce::{FromParam, ParamKind};
use crate::error::Error;
use crate::pipeline::Context;

pub use errors::{PlanError, PlanErrors};
/// Derive [`RequestShape`](trait@RequestShape) for a struct.
///
/// Regions are marked with `#[bind(body)]`, `#[bind(path)]`, `#[bind(query)]` or
/// `#[bind(context)]`, optionally followed by `validate` to invoke the region's
/// [`Validate`](crate::pipeline::Validate) implementation once the request is bound.
/// All other fields are set to their [`Default`] value.
///
/// Container attributes: `#[request(validate)]` to validate the whole shape,
/// `#[request(on_bind_error)]` to route binding failures through
/// [`OnBindError`](crate::pipeline::OnBindError).
pub use reqbind_macros::RequestShape;
pub use tag::{ParamTag, TagError};

mod errors;
pub mod tag;

/// A callback that validates (part of) a fully bound request value.
pub type Validator<T> = fn(&T, &mut Context<'_>) -> Result<(), Error>;

/// A callback that takes over the rendering of binding failures.
///
/// Returning `None` signals that the hook has already written the response.
pub type BindErrorHook = fn(&mut Context<'_>, BindError) -> Option<Error>;

/// A request shape: a struct that can be bound from an incoming request.
///
/// Implement it using `#[derive(RequestShape)]`.
pub trait RequestShape: Sized {
    /// The descriptor table for this shape.
    fn declare() -> ShapeDecl<Self>;

    /// Bind a new instance of `Self` from the raw request inputs, following `plan`.
    fn bind(plan: &BindingPlan<Self>, inputs: &mut Inputs<'_>) -> Result<Self, BindError>;
}

/// The four regions of a request shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RegionKind {
    /// The request body, decoded as JSON.
    Body,
    /// Values extracted from the path by the router.
    Path,
    /// Values extracted from the query string.
    Query,
    /// Values attached to the request by upstream middlewares.
    Context,
}

impl RegionKind {
    /// The order regions are bound in.
    pub const BINDING_ORDER: [RegionKind; 4] = [
        RegionKind::Body,
        RegionKind::Path,
        RegionKind::Query,
        RegionKind::Context,
    ];

    /// The order region validators are invoked in.
    pub const VALIDATION_ORDER: [RegionKind; 4] = [
        RegionKind::Path,
        RegionKind::Query,
        RegionKind::Context,
        RegionKind::Body,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RegionKind::Body => "body",
            RegionKind::Path => "path",
            RegionKind::Query => "query",
            RegionKind::Context => "context",
        }
    }
}

impl Display for RegionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The declaration of a single parameter inside a path, query or context region.
#[derive(Debug, Clone)]
pub struct ParamDecl {
    field: &'static str,
    tag: &'static str,
    type_name: &'static str,
    kind: ParamKind,
    nullable: bool,
}

impl ParamDecl {
    /// Declare a parameter of type `T`, stored in `field` and configured by `tag`.
    ///
    /// See [`tag`] for the grammar of `tag`.
    pub fn new<T: FromParam>(field: &'static str, tag: &'static str) -> Self {
        Self {
            field,
            tag,
            type_name: std::any::type_name::<T>(),
            kind: T::kind(),
            nullable: false,
        }
    }

    /// Declare a parameter of type `T` that is bound as it is, without coercion.
    ///
    /// Only context regions can declare such parameters. The value must have been
    /// attached with [`ContextValues::insert_typed`](crate::request::ContextValues::insert_typed),
    /// using `T` itself.
    pub fn typed<T: 'static>(field: &'static str, tag: &'static str) -> Self {
        Self {
            field,
            tag,
            type_name: std::any::type_name::<T>(),
            kind: ParamKind::Typed,
            nullable: false,
        }
    }

    /// The parameter is stored in an `Option`, set to `None` when an optional value is
    /// absent.
    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }
}

/// The declaration of a region, mounted on a field of the request shape `T`.
pub struct RegionDecl<T> {
    kind: RegionKind,
    field: &'static str,
    type_name: &'static str,
    params: Vec<ParamDecl>,
    validator: Option<Validator<T>>,
}

impl<T> RegionDecl<T> {
    /// A body region of type `B`.
    pub fn body<B: DeserializeOwned>(field: &'static str) -> Self {
        Self::with_params::<B>(RegionKind::Body, field, Vec::new())
    }

    /// A path region of type `P`.
    pub fn path<P: Params>(field: &'static str) -> Self {
        Self::with_params::<P>(RegionKind::Path, field, P::declare())
    }

    /// A query region of type `P`.
    pub fn query<P: Params>(field: &'static str) -> Self {
        Self::with_params::<P>(RegionKind::Query, field, P::declare())
    }

    /// A context region of type `P`.
    pub fn context<P: Params>(field: &'static str) -> Self {
        Self::with_params::<P>(RegionKind::Context, field, P::declare())
    }

    pub(crate) fn with_params<R>(
        kind: RegionKind,
        field: &'static str,
        params: Vec<ParamDecl>,
    ) -> Self {
        Self {
            kind,
            field,
            type_name: std::any::type_name::<R>(),
            params,
            validator: None,
        }
    }

    /// Validate this region once the whole request has been bound.
    pub fn validated(mut self, validator: Validator<T>) -> Self {
        self.validator = Some(validator);
        self
    }
}

/// The descriptor table of the request shape `T`.
pub struct ShapeDecl<T> {
    type_name: &'static str,
    regions: Vec<RegionDecl<T>>,
    validator: Option<Validator<T>>,
    on_bind_error: Option<BindErrorHook>,
}

impl<T> Default for ShapeDecl<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> ShapeDecl<T> {
    /// A shape with no regions.
    pub fn new() -> Self {
        Self {
            type_name: std::any::type_name::<T>(),
            regions: Vec::new(),
            validator: None,
            on_bind_error: None,
        }
    }

    /// Add a region.
    pub fn region(mut self, region: RegionDecl<T>) -> Self {
        self.regions.push(region);
        self
    }

    /// Validate the whole request value once all its regions have passed validation.
    pub fn validated(mut self, validator: Validator<T>) -> Self {
        self.validator = Some(validator);
        self
    }

    /// Take over the rendering of binding failures.
    pub fn on_bind_error(mut self, hook: BindErrorHook) -> Self {
        self.on_bind_error = Some(hook);
        self
    }
}

/// The resolved metadata of a single parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamDescriptor {
    field: &'static str,
    type_name: &'static str,
    kind: ParamKind,
    alias: String,
    optional: bool,
    description: String,
}

impl ParamDescriptor {
    /// The name of the field the value is stored in.
    pub fn field(&self) -> &'static str {
        self.field
    }

    /// The key used to look the value up.
    pub fn alias(&self) -> &str {
        &self.alias
    }

    pub fn is_optional(&self) -> bool {
        self.optional
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// The name of the declared type.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub fn kind(&self) -> ParamKind {
        self.kind
    }
}

/// The resolved description of a single region.
pub struct RegionPlan<T> {
    kind: RegionKind,
    field: &'static str,
    type_name: &'static str,
    params: Vec<ParamDescriptor>,
    validator: Option<Validator<T>>,
}

impl<T> RegionPlan<T> {
    pub fn kind(&self) -> RegionKind {
        self.kind
    }

    /// The field of the request shape this region is mounted on.
    pub fn field(&self) -> &'static str {
        self.field
    }

    /// The name of the region type.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// The parameters of this region, in declaration order.
    ///
    /// Always empty for body regions.
    pub fn params(&self) -> &[ParamDescriptor] {
        &self.params
    }

    pub fn validator(&self) -> Option<Validator<T>> {
        self.validator
    }
}

impl<T> Clone for RegionPlan<T> {
    fn clone(&self) -> Self {
        Self {
            kind: self.kind,
            field: self.field,
            type_name: self.type_name,
            params: self.params.clone(),
            validator: self.validator,
        }
    }
}

impl<T> fmt::Debug for RegionPlan<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegionPlan")
            .field("kind", &self.kind)
            .field("field", &self.field)
            .field("type_name", &self.type_name)
            .field("params", &self.params)
            .field("validated", &self.validator.is_some())
            .finish()
    }
}

/// How to populate the request shape `T` from the raw inputs of an incoming request.
///
/// Build it with [`BindingPlan::build`].
pub struct BindingPlan<T> {
    shape: &'static str,
    regions: Vec<RegionPlan<T>>,
    validator: Option<Validator<T>>,
    on_bind_error: Option<BindErrorHook>,
}

impl<T: RequestShape> BindingPlan<T> {
    /// Build the plan for `T`, using the descriptor table generated by its
    /// [`RequestShape`] implementation.
    pub fn build() -> Result<Self, PlanErrors> {
        Self::from_decl(T::declare())
    }
}

impl<T> BindingPlan<T> {
    /// Build a plan from a descriptor table.
    ///
    /// All problems are collected and logged before returning.
    pub fn from_decl(decl: ShapeDecl<T>) -> Result<Self, PlanErrors> {
        let mut errors = SmallVec::<[PlanError; 2]>::new();
        let mut regions: Vec<RegionPlan<T>> = Vec::with_capacity(decl.regions.len());

        for region in decl.regions {
            if let Some(first) = regions.iter().find(|r| r.kind == region.kind) {
                errors.push(PlanError::DuplicateRegion {
                    kind: region.kind,
                    first: first.field,
                    second: region.field,
                });
                continue;
            }

            let mut params = Vec::with_capacity(region.params.len());
            for param in region.params {
                let tag = match tag::parse(param.tag) {
                    Ok(tag) => tag,
                    Err(tag_errors) => {
                        errors.extend(tag_errors.into_iter().map(|source| {
                            PlanError::InvalidTag {
                                region: region.field,
                                field: param.field,
                                source,
                            }
                        }));
                        continue;
                    }
                };
                if region.kind == RegionKind::Path && param.kind == ParamKind::Sequence {
                    errors.push(PlanError::UnsupportedParamType {
                        kind: region.kind,
                        region: region.field,
                        field: param.field,
                        type_name: param.type_name,
                    });
                    continue;
                }
                let optional = tag.optional.unwrap_or(false);
                if param.kind == ParamKind::Typed {
                    if region.kind != RegionKind::Context {
                        errors.push(PlanError::TypedOutsideContext {
                            kind: region.kind,
                            region: region.field,
                            field: param.field,
                            type_name: param.type_name,
                        });
                        continue;
                    }
                    if optional && !param.nullable {
                        errors.push(PlanError::OptionalTypedParam {
                            region: region.field,
                            field: param.field,
                            type_name: param.type_name,
                        });
                        continue;
                    }
                }
                params.push(ParamDescriptor {
                    field: param.field,
                    type_name: param.type_name,
                    kind: param.kind,
                    alias: tag.alias.unwrap_or_else(|| param.field.to_owned()),
                    optional,
                    description: tag
                        .description
                        .unwrap_or_else(|| format!("The {} parameter", param.field)),
                });
            }

            regions.push(RegionPlan {
                kind: region.kind,
                field: region.field,
                type_name: region.type_name,
                params,
                validator: region.validator,
            });
        }

        if let Some(errors) = PlanErrors::new(decl.type_name, errors) {
            for e in errors.iter() {
                log_error!(e, shape = decl.type_name, "Invalid request shape");
            }
            return Err(errors);
        }

        tracing::debug!(shape = decl.type_name, regions = regions.len(), "Built binding plan");
        Ok(Self {
            shape: decl.type_name,
            regions,
            validator: decl.validator,
            on_bind_error: decl.on_bind_error,
        })
    }

    /// The name of the request shape.
    pub fn shape(&self) -> &'static str {
        self.shape
    }

    /// The plan for the region of the given kind, if the shape declares one.
    pub fn region(&self, kind: RegionKind) -> Option<&RegionPlan<T>> {
        self.regions.iter().find(|r| r.kind == kind)
    }

    /// All the declared regions, in declaration order.
    pub fn regions(&self) -> impl Iterator<Item = &RegionPlan<T>> + ExactSizeIterator {
        self.regions.iter()
    }

    /// The aliases declared by the region of the given kind.
    pub fn aliases(&self, kind: RegionKind) -> impl Iterator<Item = &str> {
        self.region(kind)
            .into_iter()
            .flat_map(|r| r.params.iter().map(ParamDescriptor::alias))
    }

    /// The region validators, in validation order.
    pub fn region_validators(&self) -> impl Iterator<Item = (RegionKind, Validator<T>)> + '_ {
        RegionKind::VALIDATION_ORDER
            .into_iter()
            .filter_map(|kind| Some((kind, self.region(kind)?.validator?)))
    }

    /// The validator for the request value as a whole.
    pub fn validator(&self) -> Option<Validator<T>> {
        self.validator
    }

    /// The hook that takes over the rendering of binding failures.
    pub fn bind_error_hook(&self) -> Option<BindErrorHook> {
        self.on_bind_error
    }
}

impl<T> Clone for BindingPlan<T> {
    fn clone(&self) -> Self {
        Self {
            shape: self.shape,
            regions: self.regions.clone(),
            validator: self.validator,
            on_bind_error: self.on_bind_error,
        }
    }
}

impl<T> fmt::Debug for BindingPlan<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BindingPlan")
            .field("shape", &self.shape)
            .field("regions", &self.regions)
            .field("validated", &self.validator.is_some())
            .field("on_bind_error", &self.on_bind_error.is_some())
            .finish()
    }
}

impl<T> Display for BindingPlan<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.shape)?;
        for region in &self.regions {
            write!(f, "  {} `{}`: {}", region.kind, region.field, region.type_name)?;
            if region.validator.is_some() {
                write!(f, " (validated)")?;
            }
            writeln!(f)?;
            for param in &region.params {
                writeln!(
                    f,
                    "    `{}` <- \"{}\" ({}, {}): {}",
                    param.field,
                    param.alias,
                    if param.optional { "optional" } else { "required" },
                    param.type_name,
                    param.description
                )?;
            }
        }
        Ok(())
    }
}

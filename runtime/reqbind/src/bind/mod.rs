//! Populate request shapes from the raw inputs of an incoming request.
//!
//! [`bind`] is the entry point: it follows a [`BindingPlan`] to turn a body, a set of
//! path values, a query multimap and a set of context values into a request shape.
//!
//! Regions are bound in a fixed order (body, path, query, context) and binding stops at
//! the first failure.
//!
//! The functions in this module, other than [`bind`], are called by the code generated by
//! `#[derive(RequestShape)]` and `#[derive(Params)]`.
use std::io::Read;

use serde::de::DeserializeOwned;

use crate::coerce::FromParam;
use crate::reflect::{BindingPlan, ParamDecl, ParamDescriptor, RegionKind, RegionPlan, RequestShape};
use crate::request::{ContextValues, PathValues, QueryValues};

pub use binders::{ContextBinder, ParamBinder, PathBinder, QueryBinder};
pub use errors::{BindError, MissingParam};
/// Derive [`Params`](trait@Params) for a struct.
///
/// Parameters are marked with `#[param]`, or `#[param("<tag>")]` to configure them.
/// See [`reflect::tag`](crate::reflect::tag) for the tag grammar.
///
/// Context values that are not textual are bound with `#[param("<tag>", typed)]`:
/// the value inserted with [`ContextValues::insert_typed`] is cloned into the field,
/// which only has to be `Clone + Send + Sync + 'static`.
/// A typed parameter can be optional only if the field is an `Option`.
pub use reqbind_macros::Params;

mod binders;
mod errors;

/// Bind a new instance of the request shape `T`.
///
/// The body is decoded only if the shape declares a body region.
pub fn bind<T, R>(
    plan: &BindingPlan<T>,
    mut body: R,
    path: &PathValues,
    query: &QueryValues,
    context: &ContextValues,
) -> Result<T, BindError>
where
    T: RequestShape,
    R: Read,
{
    let mut inputs = Inputs::new(&mut body, path, query, context);
    T::bind(plan, &mut inputs)
}

/// The raw inputs of a single request.
pub struct Inputs<'a> {
    body: &'a mut dyn Read,
    path: &'a PathValues,
    query: &'a QueryValues,
    context: &'a ContextValues,
}

impl<'a> Inputs<'a> {
    pub fn new(
        body: &'a mut dyn Read,
        path: &'a PathValues,
        query: &'a QueryValues,
        context: &'a ContextValues,
    ) -> Self {
        Self {
            body,
            path,
            query,
            context,
        }
    }
}

/// A region made of parameters: the type of a path, query or context region.
///
/// Implement it using `#[derive(Params)]`.
/// Fields marked with `#[param]` are parameters, all the others are left to their
/// [`Default`] value.
pub trait Params: Sized {
    /// The declarations of the parameters, in field order.
    fn declare() -> Vec<ParamDecl>;

    /// Bind each parameter through `binder`.
    ///
    /// `params` holds the resolved descriptors, in the same order as [`Params::declare`].
    fn bind<B: ParamBinder>(params: &[ParamDescriptor], binder: &B) -> Result<Self, BindError>;
}

impl<P: Params> Params for Box<P> {
    fn declare() -> Vec<ParamDecl> {
        P::declare()
    }

    fn bind<B: ParamBinder>(params: &[ParamDescriptor], binder: &B) -> Result<Self, BindError> {
        P::bind(params, binder).map(Box::new)
    }
}

/// Walks the resolved descriptors of a region, in declaration order.
pub struct ParamCursor<'a> {
    shape: &'static str,
    params: std::slice::Iter<'a, ParamDescriptor>,
}

impl<'a> ParamCursor<'a> {
    pub fn new(shape: &'static str, params: &'a [ParamDescriptor]) -> Self {
        Self {
            shape,
            params: params.iter(),
        }
    }

    /// The descriptor for `field`, which must be the next one in line.
    pub fn next(&mut self, field: &'static str) -> Result<&'a ParamDescriptor, BindError> {
        match self.params.next() {
            Some(param) if param.field() == field => Ok(param),
            _ => Err(BindError::UnplannedField {
                shape: self.shape,
                field,
            }),
        }
    }
}

/// Decode the body region mounted on `field`.
pub fn body<B, T>(
    plan: &BindingPlan<T>,
    field: &'static str,
    inputs: &mut Inputs<'_>,
) -> Result<B, BindError>
where
    B: DeserializeOwned,
{
    planned(plan, RegionKind::Body, field)?;
    let mut deserializer = serde_json::Deserializer::from_reader(&mut *inputs.body);
    serde_path_to_error::deserialize(&mut deserializer)
        .map_err(|source| BindError::Body { field, source })
}

/// Bind the parameter region of the given kind, mounted on `field`.
pub fn params<P, T>(
    plan: &BindingPlan<T>,
    kind: RegionKind,
    field: &'static str,
    inputs: &mut Inputs<'_>,
) -> Result<P, BindError>
where
    P: Params,
{
    let region = planned(plan, kind, field)?;
    match kind {
        RegionKind::Path => P::bind(region.params(), &PathBinder::new(inputs.path)),
        RegionKind::Query => P::bind(region.params(), &QueryBinder::new(inputs.query)),
        RegionKind::Context => P::bind(region.params(), &ContextBinder::new(inputs.context)),
        RegionKind::Body => Err(BindError::UnplannedField {
            shape: plan.shape(),
            field,
        }),
    }
}

/// Bind a single parameter.
pub fn param<T, B>(cursor: &mut ParamCursor<'_>, field: &'static str, binder: &B) -> Result<T, BindError>
where
    T: FromParam + Default + Clone + Send + Sync + 'static,
    B: ParamBinder,
{
    binder.bind(cursor.next(field)?)
}

/// Bind a required parameter that is handed over without coercion.
pub fn typed_param<T, B>(cursor: &mut ParamCursor<'_>, field: &'static str, binder: &B) -> Result<T, BindError>
where
    T: Clone + Send + Sync + 'static,
    B: ParamBinder,
{
    let param = cursor.next(field)?;
    binder
        .bind_typed(param)?
        .ok_or_else(|| BindError::missing(RegionKind::Context, param.alias(), field))
}

/// Bind a parameter that is handed over without coercion, if it is present.
pub fn optional_typed_param<T, B>(
    cursor: &mut ParamCursor<'_>,
    field: &'static str,
    binder: &B,
) -> Result<Option<T>, BindError>
where
    T: Clone + Send + Sync + 'static,
    B: ParamBinder,
{
    binder.bind_typed(cursor.next(field)?)
}

fn planned<'p, T>(
    plan: &'p BindingPlan<T>,
    kind: RegionKind,
    field: &'static str,
) -> Result<&'p RegionPlan<T>, BindError> {
    plan.region(kind)
        .filter(|region| region.field() == field)
        .ok_or(BindError::UnplannedField {
            shape: plan.shape(),
            field,
        })
}

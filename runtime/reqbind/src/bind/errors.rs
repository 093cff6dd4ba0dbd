//! Errors that can occur while binding a request shape.
use http::StatusCode;

use crate::coerce::CoercionError;
use crate::error::render_message;
use crate::pipeline::Context;
use crate::reflect::RegionKind;
use crate::request::body::errors::{ExtractBodyError, JsonContentTypeError};
use crate::response::{Render, RenderError};

/// The parameter involved in a [`BindError`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingParam {
    /// The key the value was looked up with.
    pub alias: String,
    /// The field the value should have been stored in.
    pub field: &'static str,
}

/// The error returned when an incoming request can't be bound to a request shape.
///
/// Every parameter-level variant carries the alias and the field name of the offending
/// parameter.
/// Binding stops at the first failure: regions are bound in a fixed order, body first,
/// then path, query and context.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum BindError {
    #[error("Missing required path parameter `{}` (field `{}`)", .0.alias, .0.field)]
    MissingPathParam(MissingParam),
    #[error("Missing required query parameter `{}` (field `{}`)", .0.alias, .0.field)]
    MissingQueryParam(MissingParam),
    #[error("Missing required context value `{}` (field `{}`)", .0.alias, .0.field)]
    MissingContextValue(MissingParam),
    #[error("The context value `{alias}` (field `{field}`) is a `{actual}`, expected a `{expected}`")]
    /// A typed context value doesn't have the declared type.
    TypeMismatch {
        alias: String,
        field: &'static str,
        expected: &'static str,
        actual: &'static str,
    },
    #[error("Invalid {region} parameter `{alias}` (field `{field}`): {source}")]
    /// The value could not be coerced into the declared type.
    InvalidValue {
        region: RegionKind,
        alias: String,
        field: &'static str,
        source: CoercionError,
    },
    #[error("The {region} parameter `{alias}` (field `{field}`) has a type that can't be bound: {source}")]
    /// The declared type can't be built from the supplied values.
    UnsupportedType {
        region: RegionKind,
        alias: String,
        field: &'static str,
        source: CoercionError,
    },
    #[error("Failed to decode the JSON body into `{field}`: {source}")]
    /// The body is not a valid JSON document for the declared type.
    Body {
        field: &'static str,
        source: serde_path_to_error::Error<serde_json::Error>,
    },
    #[error(transparent)]
    /// The body could not be read.
    BodyRead(#[from] ExtractBodyError),
    #[error(transparent)]
    /// The body is not labelled as JSON.
    ContentType(#[from] JsonContentTypeError),
    #[error("`{field}` is not part of the binding plan for `{shape}`")]
    /// The binding plan doesn't match the shape being bound.
    UnplannedField {
        shape: &'static str,
        field: &'static str,
    },
}

impl BindError {
    pub(crate) fn missing(region: RegionKind, alias: &str, field: &'static str) -> Self {
        let param = MissingParam {
            alias: alias.to_owned(),
            field,
        };
        match region {
            RegionKind::Path => BindError::MissingPathParam(param),
            RegionKind::Query => BindError::MissingQueryParam(param),
            // Body regions have no parameters.
            RegionKind::Context | RegionKind::Body => BindError::MissingContextValue(param),
        }
    }

    pub(crate) fn coercion(
        region: RegionKind,
        alias: &str,
        field: &'static str,
        source: CoercionError,
    ) -> Self {
        let alias = alias.to_owned();
        match source {
            CoercionError::UnsupportedType { .. } => BindError::UnsupportedType {
                region,
                alias,
                field,
                source,
            },
            _ => BindError::InvalidValue {
                region,
                alias,
                field,
                source,
            },
        }
    }

    /// The alias of the offending parameter, if the error concerns a single parameter.
    pub fn alias(&self) -> Option<&str> {
        match self {
            BindError::MissingPathParam(p)
            | BindError::MissingQueryParam(p)
            | BindError::MissingContextValue(p) => Some(p.alias.as_str()),
            BindError::TypeMismatch { alias, .. }
            | BindError::InvalidValue { alias, .. }
            | BindError::UnsupportedType { alias, .. } => Some(alias.as_str()),
            _ => None,
        }
    }

    /// The name of the field involved in the failure, if any.
    pub fn field(&self) -> Option<&'static str> {
        match self {
            BindError::MissingPathParam(p)
            | BindError::MissingQueryParam(p)
            | BindError::MissingContextValue(p) => Some(p.field),
            BindError::TypeMismatch { field, .. }
            | BindError::InvalidValue { field, .. }
            | BindError::UnsupportedType { field, .. }
            | BindError::Body { field, .. }
            | BindError::UnplannedField { field, .. } => Some(*field),
            BindError::BodyRead(_) | BindError::ContentType(_) => None,
        }
    }

    /// The region that failed to bind.
    pub fn region(&self) -> Option<RegionKind> {
        match self {
            BindError::MissingPathParam(_) => Some(RegionKind::Path),
            BindError::MissingQueryParam(_) => Some(RegionKind::Query),
            BindError::MissingContextValue(_) | BindError::TypeMismatch { .. } => {
                Some(RegionKind::Context)
            }
            BindError::InvalidValue { region, .. } | BindError::UnsupportedType { region, .. } => {
                Some(*region)
            }
            BindError::Body { .. } | BindError::BodyRead(_) | BindError::ContentType(_) => {
                Some(RegionKind::Body)
            }
            BindError::UnplannedField { .. } => None,
        }
    }

    /// The status code used to report this error to the caller.
    ///
    /// Caller mistakes are reported as `400 Bad Request`, except for oversized bodies
    /// (`413`) and non-JSON bodies (`415`).
    /// Declaration mistakes are reported as `500 Internal Server Error`.
    pub fn status_code(&self) -> StatusCode {
        match self {
            BindError::BodyRead(e) => e.status_code(),
            BindError::ContentType(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            BindError::UnsupportedType { .. } | BindError::UnplannedField { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            _ => StatusCode::BAD_REQUEST,
        }
    }
}

impl Render for BindError {
    fn render(&self, ctx: &mut Context<'_>) -> Result<(), RenderError> {
        let status = self.status_code();
        let message = if status.is_server_error() {
            format!("Internal server error: {self}")
        } else {
            format!("Error unmarshalling request: {self}")
        };
        render_message(ctx, status, message)
    }
}

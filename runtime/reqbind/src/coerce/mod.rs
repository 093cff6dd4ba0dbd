//! Convert textual values into statically declared types.
//!
//! # Overview
//!
//! Path segments, query values and textual context values all reach a handler as strings.
//! [`FromParam`] is the trait that turns one of those strings (or, for multi-value query
//! keys, a list of strings) into the type declared on the request shape.
//!
//! Out of the box, [`FromParam`] is implemented for:
//!
//! - [`String`], returned as-is
//! - all signed and unsigned integers, parsed in base 10 with an overflow check at the
//!   target width
//! - [`f32`] and [`f64`]
//! - [`bool`], see [`parse_bool`] for the accepted literals
//! - [`Bytes`], the raw bytes of the source text
//! - [`Option<T>`] and [`Box<T>`], coercing into `T` and wrapping the result
//! - [`Vec<T>`], for multi-value query parameters
//! - [`Uuid`], parsed using its canonical textual representation
//!
//! Your own types can opt in using `#[derive(FromParam)]`, either via their [`FromStr`]
//! implementation or via their `serde::Deserialize` implementation:
//!
//! ```rust
//! use reqbind::coerce::{FromParam, coerce};
//!
//! #[derive(Debug, Default, PartialEq, FromParam)]
//! #[from_param(text)]
//! pub struct Slug(String);
//!
//! impl std::str::FromStr for Slug {
//!     type Err = std::convert::Infallible;
//!
//!     fn from_str(s: &str) -> Result<Self, Self::Err> {
//!         Ok(Slug(s.to_lowercase()))
//!     }
//! }
//!
//! let slug: Slug = coerce("Hello-World").unwrap();
//! assert_eq!(slug, Slug("hello-world".into()));
//! ```
//!
//! [`FromStr`]: std::str::FromStr
use std::fmt::Display;
use std::str::FromStr;

use bytes::Bytes;
use serde::de::DeserializeOwned;
use uuid::Uuid;

pub use errors::CoercionError;
/// Derive [`FromParam`] for a type that can decode itself from text.
///
/// `#[from_param(text)]` (the default) relies on the type's [`FromStr`] implementation,
/// `#[from_param(json)]` on its `serde::Deserialize` implementation, fed with the raw
/// text as a JSON document.
/// If both are specified, the textual decoder wins.
pub use reqbind_macros::FromParam;

mod errors;

/// The structural category of a [`FromParam`] type.
///
/// It is recorded in the binding plan to reject shapes that can never be bound, e.g. a
/// sequence declared as a path parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum ParamKind {
    /// Textual values, returned without conversion.
    Text,
    /// Signed or unsigned integers.
    Integer,
    /// Floating-point numbers.
    Float,
    /// Booleans.
    Boolean,
    /// Raw bytes.
    Bytes,
    /// Types that decode themselves, either from text or from a JSON literal.
    Decoded,
    /// Well-known types with a canonical textual grammar, e.g. [`Uuid`].
    WellKnown,
    /// A sequence of values, only reachable from multi-value query parameters.
    Sequence,
    /// Values handed over as they are, without coercion.
    ///
    /// Only typed context values can be bound to them.
    Typed,
}

impl ParamKind {
    /// A human-readable name for this kind, used in diagnostics.
    pub fn as_str(&self) -> &'static str {
        match self {
            ParamKind::Text => "text",
            ParamKind::Integer => "integer",
            ParamKind::Float => "float",
            ParamKind::Boolean => "boolean",
            ParamKind::Bytes => "bytes",
            ParamKind::Decoded => "decoded",
            ParamKind::WellKnown => "well-known",
            ParamKind::Sequence => "sequence",
            ParamKind::Typed => "typed",
        }
    }
}

impl Display for ParamKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A type that can be built from one (or more) textual parameter values.
///
/// Check out the [module documentation](self) for the list of built-in implementations.
pub trait FromParam: Sized {
    /// The structural category of `Self`.
    fn kind() -> ParamKind;

    /// Convert a single textual value into `Self`.
    fn from_param(text: &str) -> Result<Self, CoercionError>;

    /// Convert all the values supplied for a multi-value key into `Self`.
    ///
    /// Non-sequence types look at the first value only. An empty list is treated as a
    /// single empty string.
    fn from_params(values: &[String]) -> Result<Self, CoercionError> {
        Self::from_param(values.first().map(String::as_str).unwrap_or_default())
    }
}

/// Coerce `text` into `T`.
pub fn coerce<T: FromParam>(text: &str) -> Result<T, CoercionError> {
    T::from_param(text)
}

/// Coerce a list of textual values into `T`, usually a sequence type.
///
/// Order is preserved and an empty list yields an empty sequence.
pub fn coerce_many<T: FromParam>(values: &[String]) -> Result<T, CoercionError> {
    T::from_params(values)
}

impl FromParam for String {
    fn kind() -> ParamKind {
        ParamKind::Text
    }

    fn from_param(text: &str) -> Result<Self, CoercionError> {
        Ok(text.to_owned())
    }
}

macro_rules! from_param_via_from_str {
    ($kind:ident, $expected:literal, $($ty:ty),+ $(,)?) => {
        $(
            impl FromParam for $ty {
                fn kind() -> ParamKind {
                    ParamKind::$kind
                }

                fn from_param(text: &str) -> Result<Self, CoercionError> {
                    text.parse::<$ty>()
                        .map_err(|e| CoercionError::malformed(text, $expected, e))
                }
            }
        )+
    };
}

from_param_via_from_str!(
    Integer, "integer", i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize
);
from_param_via_from_str!(Float, "floating-point number", f32, f64);

impl FromParam for bool {
    fn kind() -> ParamKind {
        ParamKind::Boolean
    }

    fn from_param(text: &str) -> Result<Self, CoercionError> {
        parse_bool(text)
            .ok_or_else(|| CoercionError::malformed(text, "boolean", "unrecognized literal"))
    }
}

/// Parse a boolean literal.
///
/// `1`, `t`, `T`, `TRUE`, `true` and `True` are truthy;
/// `0`, `f`, `F`, `FALSE`, `false` and `False` are falsy.
/// Anything else is rejected.
pub fn parse_bool(text: &str) -> Option<bool> {
    match text {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Some(true),
        "0" | "f" | "F" | "FALSE" | "false" | "False" => Some(false),
        _ => None,
    }
}

impl FromParam for Bytes {
    fn kind() -> ParamKind {
        ParamKind::Bytes
    }

    fn from_param(text: &str) -> Result<Self, CoercionError> {
        Ok(Bytes::copy_from_slice(text.as_bytes()))
    }
}

impl FromParam for Uuid {
    fn kind() -> ParamKind {
        ParamKind::WellKnown
    }

    fn from_param(text: &str) -> Result<Self, CoercionError> {
        Uuid::parse_str(text).map_err(|e| CoercionError::malformed(text, "UUID", e))
    }
}

impl<T: FromParam> FromParam for Option<T> {
    fn kind() -> ParamKind {
        T::kind()
    }

    fn from_param(text: &str) -> Result<Self, CoercionError> {
        T::from_param(text).map(Some)
    }

    fn from_params(values: &[String]) -> Result<Self, CoercionError> {
        T::from_params(values).map(Some)
    }
}

impl<T: FromParam> FromParam for Box<T> {
    fn kind() -> ParamKind {
        T::kind()
    }

    fn from_param(text: &str) -> Result<Self, CoercionError> {
        T::from_param(text).map(Box::new)
    }

    fn from_params(values: &[String]) -> Result<Self, CoercionError> {
        T::from_params(values).map(Box::new)
    }
}

impl<T: FromParam> FromParam for Vec<T> {
    fn kind() -> ParamKind {
        ParamKind::Sequence
    }

    fn from_param(_text: &str) -> Result<Self, CoercionError> {
        Err(CoercionError::unsupported::<Self>())
    }

    fn from_params(values: &[String]) -> Result<Self, CoercionError> {
        values.iter().map(|v| T::from_param(v)).collect()
    }
}

/// Decode `T` from text using its [`FromStr`] implementation.
///
/// It backs `#[derive(FromParam)]` with `#[from_param(text)]`.
pub fn decode_text<T>(text: &str) -> Result<T, CoercionError>
where
    T: FromStr,
    T::Err: Display,
{
    text.parse::<T>()
        .map_err(|e| CoercionError::malformed(text, std::any::type_name::<T>(), e))
}

/// Decode `T` from a single JSON literal.
///
/// It backs `#[derive(FromParam)]` with `#[from_param(json)]`.
pub fn decode_json<T>(text: &str) -> Result<T, CoercionError>
where
    T: DeserializeOwned,
{
    serde_json::from_str(text)
        .map_err(|e| CoercionError::malformed(text, std::any::type_name::<T>(), e))
}

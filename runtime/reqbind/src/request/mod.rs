//! The raw inputs of an incoming request.
//!
//! Each region of a request shape is populated from a different input:
//!
//! - [`PathValues`], the segments captured by the router;
//! - [`QueryValues`], the query string, parsed as a multimap;
//! - [`ContextValues`], the values attached to the request by upstream middlewares;
//! - the request body, buffered in memory under a [`BodySizeLimit`](body::BodySizeLimit).
//!
//! The router and the middlewares hand over path and context values by inserting
//! [`PathValues`] and [`ContextValues`] into the extensions of the [`http::Request`].
use http::{HeaderMap, Method, Uri, Version};

pub use context::{ContextValue, ContextValues};
pub use path::PathValues;
pub use query::QueryValues;

pub mod body;
mod context;
mod path;
mod query;

/// All the information that is transmitted as part of an HTTP request ahead of the body.
///
/// It includes the [method](Method), the [target](Uri),
/// the [HTTP version](Version), and the [headers](HeaderMap).
#[non_exhaustive]
#[derive(Debug, Clone)]
pub struct RequestHead {
    /// The HTTP method of the request.
    pub method: Method,
    /// The [target](https://datatracker.ietf.org/doc/html/rfc7230#section-5.3) of the request.
    pub target: Uri,
    /// The HTTP version used by the request.
    pub version: Version,
    /// The headers attached to the request.
    pub headers: HeaderMap,
}

impl From<http::request::Parts> for RequestHead {
    fn from(parts: http::request::Parts) -> Self {
        Self {
            method: parts.method,
            target: parts.uri,
            version: parts.version,
            headers: parts.headers,
        }
    }
}

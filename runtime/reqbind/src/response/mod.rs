//! Build the responses sent back to the caller.
//!
//! A [`ResponseWriter`] is handed to every rendering step of the pipeline, through the
//! [`Context`](crate::pipeline::Context). Once the pipeline is done, the writer is turned
//! into a [`Response`], which converts into a plain [`http::Response`].
use bytes::{Bytes, BytesMut};
use http::header::CONTENT_TYPE;
use http::{HeaderMap, HeaderValue, StatusCode};
use http_body_util::Full;

pub use body::{Json, JsonSerializationError, TypedBody};
pub use render::{Render, RenderError, Reply};
/// Derive [`Reply`](trait@Reply) for a type.
pub use reqbind_macros::Reply;

mod body;
mod render;
pub mod reply;

/// A response under construction.
#[derive(Debug)]
pub struct ResponseWriter {
    status: StatusCode,
    headers: HeaderMap,
    body: BytesMut,
}

impl Default for ResponseWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl ResponseWriter {
    /// An empty `200 OK` response.
    pub fn new() -> Self {
        Self {
            status: StatusCode::OK,
            headers: HeaderMap::new(),
            body: BytesMut::new(),
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn set_status(&mut self, status: StatusCode) -> &mut Self {
        self.status = status;
        self
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    /// Append raw bytes to the body.
    pub fn write(&mut self, chunk: &[u8]) -> &mut Self {
        self.body.extend_from_slice(chunk);
        self
    }

    /// Replace the body, setting the `Content-Type` header to match.
    pub fn set_typed_body<B: TypedBody>(&mut self, body: B) -> &mut Self {
        self.headers.insert(CONTENT_TYPE, body.content_type());
        self.body.clear();
        self.body.extend_from_slice(&body.into_bytes());
        self
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Discard everything written so far.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    pub fn finish(self) -> Response {
        Response {
            status: self.status,
            headers: self.headers,
            body: self.body.freeze(),
        }
    }
}

/// A complete response.
#[derive(Debug, Clone)]
pub struct Response {
    status: StatusCode,
    headers: HeaderMap,
    body: Bytes,
}

impl Response {
    /// An empty response with the given status code.
    ///
    /// Check out the shorthands (e.g. [`Response::not_found`]) for well-known status codes.
    pub fn new(status: StatusCode) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: Bytes::new(),
        }
    }

    pub fn set_status(mut self, status: StatusCode) -> Self {
        self.status = status;
        self
    }

    /// Append a header, keeping the existing values for the same name.
    pub fn append_header(mut self, name: http::HeaderName, value: HeaderValue) -> Self {
        self.headers.append(name, value);
        self
    }

    /// Set the body, along with the matching `Content-Type` header.
    pub fn set_typed_body<B: TypedBody>(mut self, body: B) -> Self {
        self.headers.insert(CONTENT_TYPE, body.content_type());
        self.body = body.into_bytes();
        self
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// Convert into an [`http::Response`] with a fully buffered body.
    pub fn into_http(self) -> http::Response<Full<Bytes>> {
        let mut response = http::Response::new(Full::new(self.body));
        *response.status_mut() = self.status;
        *response.headers_mut() = self.headers;
        response
    }
}

impl From<Response> for http::Response<Full<Bytes>> {
    fn from(response: Response) -> Self {
        response.into_http()
    }
}

macro_rules! shorthand {
    ($name:ident) => {
        paste::paste! {
            #[doc = "An empty [`Response`] with [`" $name "`](`StatusCode::" $name "`) as status code."]
            pub fn [<$name:lower>]() -> Response {
                Response::new(StatusCode::[<$name>])
            }
        }
    };
}

/// Shorthands for building a new [`Response`] using a well-known status code.
impl Response {
    // 2xx
    shorthand!(OK);
    shorthand!(CREATED);
    shorthand!(ACCEPTED);
    shorthand!(NO_CONTENT);

    // 4xx
    shorthand!(BAD_REQUEST);
    shorthand!(UNAUTHORIZED);
    shorthand!(FORBIDDEN);
    shorthand!(NOT_FOUND);
    shorthand!(METHOD_NOT_ALLOWED);
    shorthand!(CONFLICT);
    shorthand!(PAYLOAD_TOO_LARGE);
    shorthand!(UNSUPPORTED_MEDIA_TYPE);
    shorthand!(UNPROCESSABLE_ENTITY);

    // 5xx
    shorthand!(INTERNAL_SERVER_ERROR);
    shorthand!(SERVICE_UNAVAILABLE);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn typed_bodies_set_the_content_type() {
        let mut writer = ResponseWriter::new();
        writer.write(b"stale");
        writer.set_typed_body("Hello");
        let response = writer.finish();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[CONTENT_TYPE],
            "text/plain; charset=utf-8"
        );
        assert_eq!(response.body().as_ref(), b"Hello");
    }

    #[test]
    fn reset_discards_everything() {
        let mut writer = ResponseWriter::new();
        writer
            .set_status(StatusCode::NOT_FOUND)
            .set_typed_body(Json::new(serde_json::json!({"a": 1})).unwrap());
        writer.reset();
        let response = writer.finish();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().is_empty());
        assert!(response.body().is_empty());
    }

    #[test]
    fn conversion_into_http_keeps_status_and_headers() {
        let response = Response::not_found().set_typed_body("Missing".to_string());
        let http_response = response.into_http();
        assert_eq!(http_response.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            http_response.headers()[CONTENT_TYPE],
            "text/plain; charset=utf-8"
        );
    }
}

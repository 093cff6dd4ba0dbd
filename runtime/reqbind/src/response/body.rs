use bytes::Bytes;
use http::HeaderValue;

/// A body type that knows its own `Content-Type`.
pub trait TypedBody {
    /// The value of the `Content-Type` header for this body.
    fn content_type(&self) -> HeaderValue;

    /// The raw bytes of the body.
    fn into_bytes(self) -> Bytes;
}

/// A JSON-encoded body, with `Content-Type` set to `application/json`.
#[derive(Debug, Clone)]
pub struct Json(Bytes);

impl Json {
    /// Serialize `value` as JSON.
    pub fn new<T>(value: T) -> Result<Self, JsonSerializationError>
    where
        T: serde::Serialize,
    {
        let bytes = serde_json::to_vec(&value).map_err(JsonSerializationError)?;
        Ok(Self(bytes.into()))
    }
}

#[derive(Debug, thiserror::Error)]
#[error(transparent)]
/// The error returned by [`Json::new`] when the serialization into JSON fails.
pub struct JsonSerializationError(serde_json::Error);

impl TypedBody for Json {
    fn content_type(&self) -> HeaderValue {
        HeaderValue::from_static("application/json")
    }

    fn into_bytes(self) -> Bytes {
        self.0
    }
}

impl TypedBody for String {
    fn content_type(&self) -> HeaderValue {
        HeaderValue::from_static("text/plain; charset=utf-8")
    }

    fn into_bytes(self) -> Bytes {
        self.into()
    }
}

impl TypedBody for &'static str {
    fn content_type(&self) -> HeaderValue {
        HeaderValue::from_static("text/plain; charset=utf-8")
    }

    fn into_bytes(self) -> Bytes {
        Bytes::from_static(self.as_bytes())
    }
}

impl TypedBody for Bytes {
    fn content_type(&self) -> HeaderValue {
        HeaderValue::from_static("application/octet-stream")
    }

    fn into_bytes(self) -> Bytes {
        self
    }
}

//! Errors that can occur while reading the request body.
use http::StatusCode;
use ubyte::ByteUnit;

/// The error returned by [`buffer_body`](super::buffer_body).
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ExtractBodyError {
    /// The body, or the length announced by `Content-Length`, exceeds the configured limit.
    #[error("The request body exceeds the limit of {} bytes", .limit.as_u64())]
    TooLarge {
        limit: ByteUnit,
        /// The value of `Content-Length`, if it was present and well-formed.
        declared: Option<u64>,
    },
    /// The body stream failed.
    #[error("Failed to read the request body")]
    Read(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl ExtractBodyError {
    /// The status code used to report this error to the caller.
    pub fn status_code(&self) -> StatusCode {
        match self {
            ExtractBodyError::TooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            ExtractBodyError::Read(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// The error returned by [`check_json_content_type`](super::check_json_content_type).
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum JsonContentTypeError {
    #[error("Expected a JSON body, but the request has no `Content-Type` header")]
    Missing,
    /// The header holds something other than a JSON media type.
    #[error("Expected a JSON body, but the `Content-Type` header is `{0}`")]
    NotJson(String),
}

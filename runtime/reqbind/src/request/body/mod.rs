//! Buffer the request body and check its content type.
use bytes::Bytes;
use http::HeaderMap;
use http::header::{CONTENT_LENGTH, CONTENT_TYPE};
use http_body_util::{BodyExt, LengthLimitError, Limited};
use ubyte::{ByteUnit, ToByteUnit};

use errors::{ExtractBodyError, JsonContentTypeError};

pub mod errors;

/// An upper limit on the size of incoming request bodies.
///
/// Check out [`buffer_body`] for more details.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum BodySizeLimit {
    /// There is an active limit on the size of incoming request bodies.
    Enabled {
        /// The maximum size of incoming request bodies, in bytes.
        max_size: ByteUnit,
    },
    /// There is no limit on the size of incoming request bodies.
    Disabled,
}

impl Default for BodySizeLimit {
    fn default() -> Self {
        Self::Enabled {
            max_size: 2.megabytes(),
        }
    }
}

/// Buffer the whole request body in memory.
///
/// When a limit is set, a `Content-Length` above it is rejected before any byte is read.
/// The limit is still enforced on the bytes actually received.
pub async fn buffer_body<B>(
    headers: &HeaderMap,
    body: B,
    limit: BodySizeLimit,
) -> Result<Bytes, ExtractBodyError>
where
    B: http_body::Body,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let BodySizeLimit::Enabled { max_size } = limit else {
        let collected = body
            .collect()
            .await
            .map_err(|e| ExtractBodyError::Read(e.into()))?;
        return Ok(collected.to_bytes());
    };

    let declared = declared_length(headers);
    let too_large = || ExtractBodyError::TooLarge {
        limit: max_size,
        declared,
    };
    if declared.is_some_and(|len| len > max_size.as_u64()) {
        return Err(too_large());
    }

    let max_bytes = usize::try_from(max_size.as_u64()).unwrap_or(usize::MAX);
    let collected = Limited::new(body, max_bytes).collect().await.map_err(|e| {
        if e.is::<LengthLimitError>() {
            too_large()
        } else {
            ExtractBodyError::Read(e)
        }
    })?;
    Ok(collected.to_bytes())
}

fn declared_length(headers: &HeaderMap) -> Option<u64> {
    headers.get(CONTENT_LENGTH)?.to_str().ok()?.trim().parse().ok()
}

/// Reject requests that are not labelled as JSON.
///
/// `application/json` is accepted, with or without parameters, and so is any
/// `application/*+json` media type.
pub fn check_json_content_type(headers: &HeaderMap) -> Result<(), JsonContentTypeError> {
    let value = headers
        .get(CONTENT_TYPE)
        .ok_or(JsonContentTypeError::Missing)?;
    let raw = String::from_utf8_lossy(value.as_bytes());
    match raw.parse::<mime::Mime>() {
        Ok(media_type) if is_json(&media_type) => Ok(()),
        _ => Err(JsonContentTypeError::NotJson(raw.into_owned())),
    }
}

fn is_json(media_type: &mime::Mime) -> bool {
    media_type.type_() == mime::APPLICATION
        && (media_type.subtype() == mime::JSON || media_type.suffix() == Some(mime::JSON))
}

use std::fmt::Display;

#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
/// The error returned by [`FromParam`](super::FromParam) implementations.
pub enum CoercionError {
    /// The text does not match the grammar of the target type.
    #[error("`{value}` is not a valid {expected}: {reason}")]
    Malformed {
        /// The offending textual value.
        value: String,
        /// A human-readable description of the expected grammar.
        expected: &'static str,
        /// Why the conversion failed.
        reason: String,
    },
    /// The target type cannot be built from the supplied values.
    #[error("`{type_name}` cannot be decoded from a single textual value")]
    UnsupportedType {
        /// The name of the target type.
        type_name: &'static str,
    },
}

impl CoercionError {
    pub(crate) fn malformed(value: &str, expected: &'static str, reason: impl Display) -> Self {
        CoercionError::Malformed {
            value: value.to_owned(),
            expected,
            reason: reason.to_string(),
        }
    }

    pub(crate) fn unsupported<T>() -> Self {
        CoercionError::UnsupportedType {
            type_name: std::any::type_name::<T>(),
        }
    }
}

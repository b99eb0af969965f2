use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors returned when building a layout descriptor.
///
/// # Examples
/// ```
/// use sonarlog_core::LayoutError;
///
/// let err = LayoutError::OpenFieldNotLast { name: "text".to_string() };
/// assert!(err.to_string().contains("must be the last field"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LayoutError {
    #[error("duplicate field name: {name}")]
    DuplicateField { name: String },
    #[error("fixed-length field {name} must declare a non-zero length")]
    ZeroLength { name: String },
    #[error("open-length field {name} must be the last field")]
    OpenFieldNotLast { name: String },
    #[error("field {name} pushes the layout size past usize::MAX")]
    TooLarge { name: String },
}

/// Errors returned while decoding frames, headers and payloads.
///
/// # Examples
/// ```
/// use sonarlog_core::{DecodeError, DecodeErrorKind};
///
/// let err = DecodeError::SizeMismatch { expected: 6, actual: 5 };
/// assert_eq!(err.kind(), DecodeErrorKind::SizeMismatch);
/// assert!(err.to_string().contains("5 bytes"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("invalid header signature: {actual:02x?}")]
    BadSignature { actual: [u8; 2] },
    #[error("not enough data: need {needed} bytes, got {actual}")]
    InsufficientBytes { needed: usize, actual: usize },
    #[error("layout does not match data size: layout covers {expected} bytes, data has {actual} bytes")]
    SizeMismatch { expected: usize, actual: usize },
    #[error("field {field} is not ASCII text")]
    InvalidText { field: String },
    #[error("invalid checksum: frame carries {expected:#06x}, computed {computed:#06x}")]
    ChecksumMismatch { expected: u16, computed: u16 },
    #[error("unknown message type: {id}")]
    UnknownMessageType { id: u16 },
    #[error("field {field} missing or not {expected}")]
    FieldMismatch {
        field: &'static str,
        expected: &'static str,
    },
}

/// Stable, serializable classification of a [`DecodeError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecodeErrorKind {
    BadSignature,
    InsufficientBytes,
    SizeMismatch,
    InvalidText,
    ChecksumMismatch,
    UnknownMessageType,
    FieldMismatch,
}

impl DecodeError {
    pub fn kind(&self) -> DecodeErrorKind {
        match self {
            DecodeError::BadSignature { .. } => DecodeErrorKind::BadSignature,
            DecodeError::InsufficientBytes { .. } => DecodeErrorKind::InsufficientBytes,
            DecodeError::SizeMismatch { .. } => DecodeErrorKind::SizeMismatch,
            DecodeError::InvalidText { .. } => DecodeErrorKind::InvalidText,
            DecodeError::ChecksumMismatch { .. } => DecodeErrorKind::ChecksumMismatch,
            DecodeError::UnknownMessageType { .. } => DecodeErrorKind::UnknownMessageType,
            DecodeError::FieldMismatch { .. } => DecodeErrorKind::FieldMismatch,
        }
    }
}

/// Errors returned when extending a message registry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("message type {id} is already registered as \"{label}\"")]
    Duplicate { id: u16, label: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_serialize_as_snake_case() {
        let value = serde_json::to_value(DecodeErrorKind::InsufficientBytes).unwrap();
        assert_eq!(value, "insufficient_bytes");
    }

    #[test]
    fn checksum_message_is_hex() {
        let err = DecodeError::ChecksumMismatch {
            expected: 0x0102,
            computed: 0x00ff,
        };
        assert_eq!(
            err.to_string(),
            "invalid checksum: frame carries 0x0102, computed 0x00ff"
        );
    }
}

//! Record encoding formats.
//!
//! A [`Format`] turns a [`CachedRecord`] into the bytes a store keeps and
//! back. Every field of the record survives the round trip exactly, the
//! payload byte for byte. Decoding never panics: corrupt input surfaces as
//! [`FormatError::Deserialize`] so the cache can fall back to a fresh
//! computation.
//!
//! | Format | Size | Human-readable | Use Case |
//! |--------|------|----------------|----------|
//! | [`JsonFormat`] | Larger | Yes | Default, debugging, string-only stores |
//! | [`BincodeFormat`] | Compact | No | Binary-safe stores such as Redis |

use cachet_core::{CachedRecord, Raw};
use thiserror::Error;

use crate::StoredValue;

mod bincode;
mod json;

pub use bincode::BincodeFormat;
pub use json::JsonFormat;

/// Error raised while encoding or decoding a record.
#[derive(Error, Debug)]
pub enum FormatError {
    /// The record could not be encoded.
    #[error(transparent)]
    Serialize(Box<dyn std::error::Error + Send + Sync>),

    /// The stored bytes are not a valid record.
    #[error(transparent)]
    Deserialize(Box<dyn std::error::Error + Send + Sync>),
}

/// Unique identifier for format types, used to compare format equality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormatTypeId {
    /// [`JsonFormat`].
    Json,
    /// [`BincodeFormat`].
    Bincode,
    /// For user-defined custom formats. The string should be a unique identifier.
    Custom(&'static str),
}

/// Object-safe record format.
///
/// Stores expose their format through [`Backend::value_format`], so the
/// trait is used as `&dyn Format`.
///
/// [`Backend::value_format`]: crate::Backend::value_format
pub trait Format: std::fmt::Debug + Send + Sync {
    /// Encodes a record.
    fn encode(&self, record: &CachedRecord) -> Result<Raw, FormatError>;

    /// Decodes a record from raw bytes.
    fn decode(&self, data: &[u8]) -> Result<CachedRecord, FormatError>;

    /// Clone this format into a box (for object safety).
    fn clone_box(&self) -> Box<dyn Format>;

    /// Returns a unique identifier for this format type.
    fn format_type_id(&self) -> FormatTypeId;

    /// Decodes a record from a store value of either shape.
    fn decode_stored(&self, value: &StoredValue) -> Result<CachedRecord, FormatError> {
        self.decode(value.as_bytes())
    }
}

impl Clone for Box<dyn Format> {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}

impl Format for Box<dyn Format> {
    fn encode(&self, record: &CachedRecord) -> Result<Raw, FormatError> {
        (**self).encode(record)
    }

    fn decode(&self, data: &[u8]) -> Result<CachedRecord, FormatError> {
        (**self).decode(data)
    }

    fn clone_box(&self) -> Box<dyn Format> {
        (**self).clone_box()
    }

    fn format_type_id(&self) -> FormatTypeId {
        (**self).format_type_id()
    }
}

impl Format for std::sync::Arc<dyn Format> {
    fn encode(&self, record: &CachedRecord) -> Result<Raw, FormatError> {
        (**self).encode(record)
    }

    fn decode(&self, data: &[u8]) -> Result<CachedRecord, FormatError> {
        (**self).decode(data)
    }

    fn clone_box(&self) -> Box<dyn Format> {
        (**self).clone_box()
    }

    fn format_type_id(&self) -> FormatTypeId {
        (**self).format_type_id()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn record() -> CachedRecord {
        let mut record = CachedRecord::new(vec![0u8, 159, 146, 150, 255])
            .with_status(203)
            .with_header("content-type", "application/octet-stream")
            .with_header("x-request-id", "abc")
            .with_last_valid_at(1_700_000_123);
        record.etag = "12345-1700000123".to_owned();
        record.warning = "max-age=5,min-fresh=3".to_owned();
        record.from_cache = true;
        record
    }

    fn formats() -> Vec<Box<dyn Format>> {
        vec![Box::new(JsonFormat), Box::new(BincodeFormat)]
    }

    #[test]
    fn every_field_survives_the_round_trip() {
        for format in formats() {
            let original = record();
            let encoded = format.encode(&original).unwrap();
            let decoded = format.decode(&encoded).unwrap();
            assert_eq!(decoded, original, "{:?}", format.format_type_id());
        }
    }

    #[test]
    fn garbage_is_a_decode_error() {
        for format in formats() {
            let result = format.decode(&[0xff, 0x00, 0x13]);
            assert!(
                matches!(result, Err(FormatError::Deserialize(_))),
                "{:?}",
                format.format_type_id()
            );
        }
    }

    #[test]
    fn text_values_decode_like_bytes() {
        let original = record();
        let encoded = JsonFormat.encode(&original).unwrap();
        let text = String::from_utf8(encoded.to_vec()).unwrap();
        let decoded = JsonFormat.decode_stored(&StoredValue::Text(text)).unwrap();
        assert_eq!(decoded, original);
    }

    #[test]
    fn boxed_format_delegates() {
        let format: Box<dyn Format> = Box::new(BincodeFormat);
        let cloned = format.clone();
        assert_eq!(cloned.format_type_id(), FormatTypeId::Bincode);
    }
}

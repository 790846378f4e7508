//! Values as returned by a store.

use bytes::Bytes;
use cachet_core::Raw;

/// A value read back from a store.
///
/// Most stores hand back bytes, but some clients only surface strings. Both
/// shapes decode the same way.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoredValue {
    /// Binary value.
    Bytes(Raw),
    /// Textual value.
    Text(String),
}

impl StoredValue {
    /// Returns the value's bytes regardless of its shape.
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            StoredValue::Bytes(bytes) => bytes,
            StoredValue::Text(text) => text.as_bytes(),
        }
    }

    /// Length of the value in bytes.
    pub fn len(&self) -> usize {
        self.as_bytes().len()
    }

    /// Whether the value is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl From<Raw> for StoredValue {
    fn from(bytes: Raw) -> Self {
        StoredValue::Bytes(bytes)
    }
}

impl From<Vec<u8>> for StoredValue {
    fn from(bytes: Vec<u8>) -> Self {
        StoredValue::Bytes(Bytes::from(bytes))
    }
}

impl From<String> for StoredValue {
    fn from(text: String) -> Self {
        StoredValue::Text(text)
    }
}

use bytes::Bytes;
use cachet_core::{CachedRecord, Raw};

use super::{Format, FormatError, FormatTypeId};

/// Bincode format
///
/// Uses bincode's standard configuration through its serde bridge.
#[derive(Debug, Clone, Copy, Default)]
pub struct BincodeFormat;

impl Format for BincodeFormat {
    fn encode(&self, record: &CachedRecord) -> Result<Raw, FormatError> {
        ::bincode::serde::encode_to_vec(record, ::bincode::config::standard())
            .map(Bytes::from)
            .map_err(|err| FormatError::Serialize(Box::new(err)))
    }

    fn decode(&self, data: &[u8]) -> Result<CachedRecord, FormatError> {
        let (record, _read) =
            ::bincode::serde::decode_from_slice(data, ::bincode::config::standard())
                .map_err(|err| FormatError::Deserialize(Box::new(err)))?;
        Ok(record)
    }

    fn clone_box(&self) -> Box<dyn Format> {
        Box::new(*self)
    }

    fn format_type_id(&self) -> FormatTypeId {
        FormatTypeId::Bincode
    }
}

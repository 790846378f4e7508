use bytes::Bytes;
use cachet_core::{CachedRecord, Raw};

use super::{Format, FormatError, FormatTypeId};

/// JSON format (default)
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonFormat;

impl Format for JsonFormat {
    fn encode(&self, record: &CachedRecord) -> Result<Raw, FormatError> {
        serde_json::to_vec(record)
            .map(Bytes::from)
            .map_err(|err| FormatError::Serialize(Box::new(err)))
    }

    fn decode(&self, data: &[u8]) -> Result<CachedRecord, FormatError> {
        serde_json::from_slice(data).map_err(|err| FormatError::Deserialize(Box::new(err)))
    }

    fn clone_box(&self) -> Box<dyn Format> {
        Box::new(*self)
    }

    fn format_type_id(&self) -> FormatTypeId {
        FormatTypeId::Json
    }
}

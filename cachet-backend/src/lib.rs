//! Store trait and record formats for cachet.
//!
//! If you want to put cached responses somewhere new, you are in the right
//! place: implement [`Backend`] for your store and every route can use it.
//! [`CacheBackend`] layers record encoding, decoding and metrics on top of
//! the raw four-operation store interface.
mod backend;
mod error;
pub mod format;
pub mod metrics;
mod value;

pub use backend::{Backend, BackendResult, CacheBackend};
pub use error::BackendError;
pub use format::{BincodeFormat, Format, FormatError, FormatTypeId, JsonFormat};
pub use value::StoredValue;

/// Status of deleting result.
#[derive(Debug, PartialEq, Eq)]
pub enum DeleteStatus {
    /// Record successfully deleted.
    Deleted(u32),
    /// Record already missing.
    Missing,
}

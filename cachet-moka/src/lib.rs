#![doc = include_str!("../README.md")]
#![warn(missing_docs)]
#![cfg_attr(docsrs, feature(doc_cfg))]

mod backend;
mod builder;
mod metrics;

pub use backend::{Entry, MokaBackend};
pub use builder::{ByteCapacity, EntryCapacity, MokaBackendBuilder, NoCapacity};
pub use moka::policy::EvictionPolicy;

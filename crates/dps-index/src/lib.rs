// Path: crates/dps-index/src/lib.rs
//! On-disk `IndexReader` implementation backed by `redb` height/id indices
//! plus a `dps_storage::PayloadStoreImpl` for content-addressed blobs.

pub mod config;
pub mod local;

pub use config::LocalIndexConfig;
pub use local::{BlockIngest, LocalIndex};

// Path: crates/dps-api/src/lib.rs
//! Trait contracts shared by every Index Reader and Payload Store
//! implementation in this workspace.
//!
//! This crate defines interfaces only — no concrete backend. `dps-index`
//! and `dps-rpc::client` each implement `IndexReader`; `dps-storage`
//! implements `PayloadStore`.

pub mod index;
pub mod payload;

pub use index::IndexReader;
pub use payload::PayloadStore;

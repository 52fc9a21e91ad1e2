// Path: crates/dps-invoker/src/lib.rs
//! wasmtime-backed Script Invoker: compiles and executes scripts against a
//! point-in-time ledger view, with a shared byte-budgeted register-read
//! cache (`spec.md` §4.7).

pub mod cache;
pub mod config;
pub mod runtime;
pub mod storage_view;

pub use cache::RegisterCache;
pub use config::InvokerConfig;
pub use runtime::Invoker;
pub use storage_view::{AccountSnapshot, StorageView};

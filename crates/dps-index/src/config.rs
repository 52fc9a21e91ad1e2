// Path: crates/dps-index/src/config.rs
//! Construction-time configuration for [`crate::LocalIndex`].

use dps_storage::PayloadStoreConfig;
use dps_types::DpsError;
use std::path::PathBuf;

/// Configuration for a [`crate::LocalIndex`].
#[derive(Debug, Clone)]
pub struct LocalIndexConfig {
    /// Path to the `redb` database holding height/id indices, register
    /// history, and per-height aggregate lists.
    pub index_path: PathBuf,
    /// Configuration for the backing Payload Store, which holds the
    /// content-addressed headers, collections, guarantees, transaction
    /// bodies, results, and seals.
    pub payload_store: PayloadStoreConfig,
}

impl LocalIndexConfig {
    /// Validates this configuration, delegating to the embedded Payload
    /// Store configuration's own validation.
    pub fn validate(&self) -> Result<(), DpsError> {
        self.payload_store.validate()
    }
}

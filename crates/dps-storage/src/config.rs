// Path: crates/dps-storage/src/config.rs
//! Construction-time configuration for the Payload Store.
//!
//! Ambient addition over `spec.md` §4.3: validated at construction so
//! misconfiguration fails fast with `DpsError::Config` rather than
//! surfacing as a confusing runtime symptom later, mirroring the Script
//! Invoker's `InvalidConfig` requirement in `spec.md` §4.7.

use dps_types::DpsError;
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// Configuration for a [`crate::PayloadStoreImpl`].
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PayloadStoreConfig {
    /// Maximum number of entries held in the in-memory LRU before eviction.
    pub capacity: usize,
    /// Maximum number of concurrently in-flight commit transactions.
    pub max_in_flight: usize,
    /// How often the currently-building transaction is flushed even under
    /// low load (bounds tail latency of visibility).
    pub flush_interval: Duration,
    /// How often the LRU is inspected for eviction down to half capacity.
    pub persist_interval: Duration,
    /// Directory holding the on-disk `redb` database file.
    pub kv_path: PathBuf,
}

impl PayloadStoreConfig {
    /// Parses this configuration from a TOML document, then validates it.
    pub fn from_toml_str(s: &str) -> Result<Self, DpsError> {
        let config: Self =
            toml::from_str(s).map_err(|e| DpsError::Config(format!("invalid config toml: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Validates this configuration, rejecting a zero capacity or a zero
    /// in-flight limit — both would make the store unable to ever hold or
    /// commit a payload.
    pub fn validate(&self) -> Result<(), DpsError> {
        if self.capacity == 0 {
            return Err(DpsError::Config(
                "payload store capacity must be non-zero".to_string(),
            ));
        }
        if self.max_in_flight == 0 {
            return Err(DpsError::Config(
                "payload store max_in_flight must be non-zero".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for PayloadStoreConfig {
    fn default() -> Self {
        Self {
            capacity: 10_000,
            max_in_flight: 16,
            flush_interval: Duration::from_secs(1),
            persist_interval: Duration::from_millis(100),
            kv_path: PathBuf::from("dps-payload-store.redb"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_zero_capacity() {
        let cfg = PayloadStoreConfig {
            capacity: 0,
            ..PayloadStoreConfig::default()
        };
        assert!(matches!(cfg.validate(), Err(DpsError::Config(_))));
    }

    #[test]
    fn rejects_zero_in_flight() {
        let cfg = PayloadStoreConfig {
            max_in_flight: 0,
            ..PayloadStoreConfig::default()
        };
        assert!(matches!(cfg.validate(), Err(DpsError::Config(_))));
    }

    #[test]
    fn default_is_valid() {
        assert!(PayloadStoreConfig::default().validate().is_ok());
    }

    #[test]
    fn parses_partial_toml_over_defaults() {
        let config = PayloadStoreConfig::from_toml_str("capacity = 5000\n").unwrap();
        assert_eq!(config.capacity, 5000);
        assert_eq!(config.max_in_flight, PayloadStoreConfig::default().max_in_flight);
    }

    #[test]
    fn rejects_invalid_toml() {
        assert!(PayloadStoreConfig::from_toml_str("not valid toml :::").is_err());
    }
}

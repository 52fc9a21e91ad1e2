// Path: crates/dps-invoker/src/config.rs
//! Construction-time configuration for [`crate::Invoker`].

use dps_types::DpsError;
use serde::Deserialize;

/// Configuration for a [`crate::Invoker`].
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct InvokerConfig {
    /// Byte budget for the process-wide register-read cache. A zero budget
    /// is rejected: a cache that can hold nothing defeats the purpose of
    /// having one and almost always indicates a misconfigured deployment.
    pub register_cache_bytes: usize,
    /// Number of distinct compiled script modules to keep resident. Bounds
    /// memory rather than bytes, since `wasmtime::Module`'s in-memory size
    /// is not cheaply knowable ahead of compilation.
    pub module_cache_capacity: usize,
}

impl InvokerConfig {
    /// Parses this configuration from a TOML document, then validates it.
    pub fn from_toml_str(s: &str) -> Result<Self, DpsError> {
        let config: Self =
            toml::from_str(s).map_err(|e| DpsError::Config(format!("invalid config toml: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Validates this configuration, rejecting a zero-byte register cache
    /// budget or a zero module cache capacity with `DpsError::Config`, per
    /// `spec.md` §4.7's `InvalidConfig` requirement.
    pub fn validate(&self) -> Result<(), DpsError> {
        if self.register_cache_bytes == 0 {
            return Err(DpsError::Config(
                "register_cache_bytes must be greater than zero".to_string(),
            ));
        }
        if self.module_cache_capacity == 0 {
            return Err(DpsError::Config(
                "module_cache_capacity must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for InvokerConfig {
    fn default() -> Self {
        Self {
            register_cache_bytes: 64 * 1024 * 1024,
            module_cache_capacity: 256,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_zero_register_budget() {
        let cfg = InvokerConfig {
            register_cache_bytes: 0,
            ..InvokerConfig::default()
        };
        assert!(matches!(cfg.validate(), Err(DpsError::Config(_))));
    }

    #[test]
    fn rejects_zero_module_capacity() {
        let cfg = InvokerConfig {
            module_cache_capacity: 0,
            ..InvokerConfig::default()
        };
        assert!(matches!(cfg.validate(), Err(DpsError::Config(_))));
    }

    #[test]
    fn accepts_defaults() {
        assert!(InvokerConfig::default().validate().is_ok());
    }

    #[test]
    fn parses_partial_toml_over_defaults() {
        let config = InvokerConfig::from_toml_str("module_cache_capacity = 8\n").unwrap();
        assert_eq!(config.module_cache_capacity, 8);
        assert_eq!(config.register_cache_bytes, InvokerConfig::default().register_cache_bytes);
    }
}

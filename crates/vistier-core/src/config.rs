//! Ingestion configuration
//!
//! Built once at process start and passed explicitly into the pipeline;
//! nothing here is ambient global state.

use tracing::warn;

/// Salt used when no VISTIER_ANON_SALT is configured. Fine for development,
/// useless for privacy in production.
const DEV_SALT: &str = "vistier-dev-salt";

#[derive(Debug, Clone)]
pub struct IngestConfig {
    /// Server-held secret mixed into every account/source hash
    pub anonymization_salt: String,
    /// Fail-fast probe size for the batch categorizer
    pub probe_size: usize,
    /// Retry failed non-probe classifier calls once before ruling the item
    pub retry_failed_items: bool,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            anonymization_salt: DEV_SALT.to_string(),
            probe_size: 1,
            retry_failed_items: true,
        }
    }
}

impl IngestConfig {
    /// Load configuration from environment variables
    /// (VISTIER_ANON_SALT, VISTIER_PROBE_SIZE)
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let anonymization_salt = match std::env::var("VISTIER_ANON_SALT") {
            Ok(salt) if !salt.trim().is_empty() => salt,
            _ => {
                warn!("VISTIER_ANON_SALT not set; using the development salt");
                defaults.anonymization_salt
            }
        };

        let probe_size = std::env::var("VISTIER_PROBE_SIZE")
            .ok()
            .and_then(|v| v.parse().ok())
            .filter(|n: &usize| *n >= 1)
            .unwrap_or(defaults.probe_size);

        Self {
            anonymization_salt,
            probe_size,
            retry_failed_items: defaults.retry_failed_items,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = IngestConfig::default();
        assert_eq!(config.probe_size, 1);
        assert!(config.retry_failed_items);
        assert!(!config.anonymization_salt.is_empty());
    }
}

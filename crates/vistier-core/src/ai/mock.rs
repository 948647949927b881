//! Mock backend for testing
//!
//! Deterministic keyword answers for unit tests without a running model
//! server. `unavailable()` simulates a dead service so the fail-fast batch
//! policy can be exercised.

use async_trait::async_trait;

use crate::error::{Error, Result};
use crate::models::Category;

use super::ClassifierBackend;

/// Mock classifier backend for testing
#[derive(Clone, Default)]
pub struct MockBackend {
    /// Whether calls succeed and health_check returns true
    pub healthy: bool,
}

impl MockBackend {
    /// Create a new mock backend (healthy by default)
    pub fn new() -> Self {
        Self { healthy: true }
    }

    /// Create a mock backend whose calls all fail
    pub fn unavailable() -> Self {
        Self { healthy: false }
    }
}

#[async_trait]
impl ClassifierBackend for MockBackend {
    async fn categorize(&self, description: &str, _amount: f64) -> Result<Category> {
        if !self.healthy {
            return Err(Error::Classification(
                "mock classifier unavailable".to_string(),
            ));
        }

        let d = description.to_uppercase();
        let category = if d.contains("NETFLIX") || d.contains("SPOTIFY") {
            Category::Subscription
        } else if d.contains("KAUFLAND") || d.contains("LIDL") || d.contains("MEGA IMAGE") {
            Category::Groceries
        } else if d.contains("UBER") || d.contains("BOLT") {
            Category::TaxiAndRideshare
        } else if d.contains("OMV") || d.contains("PETROM") {
            Category::FuelTransport
        } else if d.contains("COMISION") {
            Category::OtherFee
        } else {
            Category::Other
        };
        Ok(category)
    }

    async fn health_check(&self) -> bool {
        self.healthy
    }

    fn model(&self) -> &str {
        "mock"
    }

    fn host(&self) -> &str {
        "mock://localhost"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_keywords() {
        let mock = MockBackend::new();
        assert_eq!(
            mock.categorize("LIDL BUCURESTI", -80.0).await.unwrap(),
            Category::Groceries
        );
        assert_eq!(
            mock.categorize("something else", -80.0).await.unwrap(),
            Category::Other
        );
    }

    #[tokio::test]
    async fn test_unavailable_mock_errors() {
        let mock = MockBackend::unavailable();
        assert!(mock.categorize("LIDL", -80.0).await.is_err());
        assert!(!mock.health_check().await);
    }
}

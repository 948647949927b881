//! Pluggable local classifier abstraction
//!
//! The categorizer talks to an external classification service through this
//! module. All backends run locally (no cloud APIs) - only the transaction
//! description (bounded length) and amount ever leave the process, and only
//! as far as the local model server.
//!
//! # Architecture
//!
//! - `ClassifierBackend` trait: the single-call classification interface
//! - `ClassifierClient` enum: concrete wrapper providing Clone + compile-time dispatch
//! - Backend implementations: `OllamaBackend`, `MockBackend`
//!
//! # Configuration
//!
//! Environment variables:
//! - `CLASSIFIER_BACKEND`: Backend to use (ollama, mock). Default: ollama
//! - `OLLAMA_HOST`: Ollama server URL (required for ollama backend)
//! - `OLLAMA_MODEL`: Model name (default: mistral)

mod mock;
mod ollama;
pub mod parsing;

pub use mock::MockBackend;
pub use ollama::OllamaBackend;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::Category;

/// Trait defining the interface for classification backends
///
/// Backends must be Send + Sync so the categorizer can be used across
/// async tasks.
#[async_trait]
pub trait ClassifierBackend: Send + Sync {
    /// Classify one transaction into a category from the closed set.
    ///
    /// A response that names no known category parses as `OTHER` and still
    /// counts as a successful classification; an `Err` means the service
    /// itself was unreachable or unusable.
    async fn categorize(&self, description: &str, amount: f64) -> Result<Category>;

    /// Check if the backend is available
    async fn health_check(&self) -> bool;

    /// Get the model name (for logging)
    fn model(&self) -> &str;

    /// Get the host URL (for logging)
    fn host(&self) -> &str;
}

/// Concrete classifier client enum
///
/// Provides Clone and compile-time dispatch without Box<dyn> overhead.
#[derive(Clone)]
pub enum ClassifierClient {
    /// Ollama backend (HTTP API)
    Ollama(OllamaBackend),
    /// Mock backend for testing
    Mock(MockBackend),
}

impl ClassifierClient {
    /// Create a classifier client from environment variables
    ///
    /// Returns None if the required environment variables are not set, in
    /// which case the categorizer runs on keyword rules only.
    pub fn from_env() -> Option<Self> {
        let backend =
            std::env::var("CLASSIFIER_BACKEND").unwrap_or_else(|_| "ollama".to_string());

        match backend.to_lowercase().as_str() {
            "ollama" => OllamaBackend::from_env().map(ClassifierClient::Ollama),
            "mock" => Some(ClassifierClient::Mock(MockBackend::new())),
            _ => {
                tracing::warn!(backend = %backend, "Unknown CLASSIFIER_BACKEND, falling back to ollama");
                OllamaBackend::from_env().map(ClassifierClient::Ollama)
            }
        }
    }

    /// Create an Ollama backend directly
    pub fn ollama(host: &str, model: &str) -> Self {
        ClassifierClient::Ollama(OllamaBackend::new(host, model))
    }

    /// Create a mock backend for testing
    pub fn mock() -> Self {
        ClassifierClient::Mock(MockBackend::new())
    }
}

#[async_trait]
impl ClassifierBackend for ClassifierClient {
    async fn categorize(&self, description: &str, amount: f64) -> Result<Category> {
        match self {
            ClassifierClient::Ollama(b) => b.categorize(description, amount).await,
            ClassifierClient::Mock(b) => b.categorize(description, amount).await,
        }
    }

    async fn health_check(&self) -> bool {
        match self {
            ClassifierClient::Ollama(b) => b.health_check().await,
            ClassifierClient::Mock(b) => b.health_check().await,
        }
    }

    fn model(&self) -> &str {
        match self {
            ClassifierClient::Ollama(b) => b.model(),
            ClassifierClient::Mock(b) => b.model(),
        }
    }

    fn host(&self) -> &str {
        match self {
            ClassifierClient::Ollama(b) => b.host(),
            ClassifierClient::Mock(b) => b.host(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classifier_client_mock() {
        let client = ClassifierClient::mock();
        assert_eq!(client.model(), "mock");
        assert_eq!(client.host(), "mock://localhost");
    }

    #[tokio::test]
    async fn test_mock_health_check() {
        let client = ClassifierClient::mock();
        assert!(client.health_check().await);
    }

    #[tokio::test]
    async fn test_mock_categorize() {
        let client = ClassifierClient::mock();
        let category = client.categorize("NETFLIX.COM", -45.0).await.unwrap();
        assert_eq!(category, Category::Subscription);
    }
}

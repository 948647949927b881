//! Vistier Core Library
//!
//! Shared functionality for the Vistier statement ingestion service:
//! - Bank CSV layout detection (ING, BRD, BCR, Raiffeisen)
//! - Canonical transaction parsing with Romanian locale handling
//! - Category assignment via a pluggable local classifier with rule fallback
//! - One-way anonymization (account and description hashing, recurrence flags)
//! - Ingestion orchestration and the storage collaborator boundary

pub mod ai;
pub mod anonymize;
pub mod categorize;
pub mod config;
pub mod error;
pub mod import;
pub mod ingest;
pub mod layout;
pub mod models;
pub mod store;

/// Test utilities including mock classifier server
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use ai::{ClassifierBackend, ClassifierClient, MockBackend, OllamaBackend};
pub use anonymize::Anonymizer;
pub use categorize::{BatchOutcome, Categorizer, CategorizerConfig};
pub use config::IngestConfig;
pub use error::{Error, Result};
pub use ingest::{IngestOutcome, Ingestor};
pub use layout::LayoutId;
pub use models::{
    AnonymizedTransaction, Category, ParsedTransaction, TransactionSource, TransactionType,
};
pub use store::{MemoryStore, Store};

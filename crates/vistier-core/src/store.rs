//! Storage collaborator boundary
//!
//! The pipeline ends with a single `persist` hand-off of one
//! `TransactionSource` plus its anonymized transactions. Identifier
//! assignment, foreign keys, and commit semantics all live behind this
//! trait, in whatever store the host application wires in.

use std::sync::Mutex;

use crate::error::{Error, Result};
use crate::models::{AnonymizedTransaction, TransactionSource};

/// Receives the output of one ingestion call
pub trait Store: Send + Sync {
    /// Persist one upload atomically: the source and all of its transactions
    fn persist(
        &self,
        source: &TransactionSource,
        transactions: &[AnonymizedTransaction],
    ) -> Result<()>;
}

/// One persisted upload, as `MemoryStore` keeps it
#[derive(Debug, Clone)]
pub struct StoredUpload {
    pub source: TransactionSource,
    pub transactions: Vec<AnonymizedTransaction>,
}

/// In-process store used by tests and the CLI
#[derive(Default)]
pub struct MemoryStore {
    uploads: Mutex<Vec<StoredUpload>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything persisted so far
    pub fn uploads(&self) -> Vec<StoredUpload> {
        self.uploads
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }
}

impl Store for MemoryStore {
    fn persist(
        &self,
        source: &TransactionSource,
        transactions: &[AnonymizedTransaction],
    ) -> Result<()> {
        let mut guard = self
            .uploads
            .lock()
            .map_err(|_| Error::Storage("memory store poisoned".into()))?;
        guard.push(StoredUpload {
            source: source.clone(),
            transactions: transactions.to_vec(),
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_round_trip() {
        let store = MemoryStore::new();
        let source = TransactionSource::new("hash".into(), "BRD import".into());
        store.persist(&source, &[]).unwrap();

        let uploads = store.uploads();
        assert_eq!(uploads.len(), 1);
        assert_eq!(uploads[0].source.source_account_hash, "hash");
        assert!(uploads[0].transactions.is_empty());
    }
}

//! Ingestion orchestrator
//!
//! Sequences one uploaded file through the whole pipeline:
//! detect + parse -> categorize -> anonymize -> one hand-off to the store.
//! The hand-off happens only after categorization and anonymization have
//! completed, so a caller that aborts mid-ingestion never leaves a partial
//! upload behind the storage boundary.

use tracing::info;

use crate::ai::ClassifierClient;
use crate::anonymize::{build_anonymized, hash_description, Anonymizer};
use crate::categorize::{Categorizer, CategorizerConfig};
use crate::config::IngestConfig;
use crate::error::Result;
use crate::import::parse_csv;
use crate::layout::normalize_header;
use crate::models::{ParsedTransaction, TransactionSource};
use crate::store::Store;

/// Summary returned to the caller after one ingestion call
#[derive(Debug)]
pub struct IngestOutcome {
    pub source: TransactionSource,
    pub transactions_imported: usize,
    /// Whether the external classifier (vs the rule engine) categorized the batch
    pub used_classifier: bool,
}

/// Runs the ingestion pipeline for uploaded statement files
pub struct Ingestor {
    anonymizer: Anonymizer,
    categorizer: Categorizer,
}

impl Ingestor {
    pub fn new(config: IngestConfig, classifier: Option<ClassifierClient>) -> Self {
        let categorizer_config = CategorizerConfig {
            probe_size: config.probe_size,
            retry_failed_items: config.retry_failed_items,
        };
        Self {
            anonymizer: Anonymizer::new(config.anonymization_salt),
            categorizer: Categorizer::with_config(classifier, categorizer_config),
        }
    }

    /// Ingest one uploaded CSV for a user.
    ///
    /// Fails only when no layout matches the header; every other row-level
    /// problem degrades to skipping that row. An upload that parses to zero
    /// rows still persists an (empty) source so the import stays auditable.
    pub async fn ingest(
        &self,
        user_id: &str,
        content: &[u8],
        filename: &str,
        bank_label: &str,
        store: &dyn Store,
    ) -> Result<IngestOutcome> {
        let (layout, parsed) = parse_csv(content, filename)?;

        let label = if bank_label.trim().is_empty() {
            format!("{} import", layout)
        } else {
            bank_label.trim().to_string()
        };

        if parsed.is_empty() {
            let source_hash = self.anonymizer.source_hash_for_upload(user_id, filename, "");
            let source = TransactionSource::new(source_hash, label);
            store.persist(&source, &[])?;
            info!("Ingested {} with zero parseable rows (layout={})", filename, layout);
            return Ok(IngestOutcome {
                source,
                transactions_imported: 0,
                used_classifier: false,
            });
        }

        let items: Vec<(String, f64)> = parsed
            .iter()
            .map(|p| (p.description.clone(), p.amount))
            .collect();
        let batch = self.categorizer.categorize_batch(&items).await;

        // Descriptions survive past this point only as digests
        let description_hashes: Vec<String> =
            parsed.iter().map(|p| hash_description(&p.description)).collect();
        let dates: Vec<_> = parsed.iter().map(|p| p.date).collect();
        let amounts: Vec<_> = parsed.iter().map(|p| p.amount).collect();
        let currencies: Vec<_> = parsed.iter().map(|p| p.currency.clone()).collect();

        // Prefer a real account identifier from the export; otherwise a
        // deterministic composite of filename, layout, and content fingerprint
        let account_id = derive_account_id(&parsed).unwrap_or_else(|| {
            format!("{}:{}:{}", filename, layout, description_hashes[0])
        });

        let (source_hash, anonymized) = build_anonymized(
            &self.anonymizer,
            &dates,
            &amounts,
            &currencies,
            &batch.categories,
            &description_hashes,
            user_id,
            &account_id,
        );

        let source = TransactionSource::new(source_hash, label);
        store.persist(&source, &anonymized)?;

        info!(
            "Ingested {} transactions from {} (layout={}, classifier={})",
            anonymized.len(),
            filename,
            layout,
            batch.used_classifier
        );

        Ok(IngestOutcome {
            source,
            transactions_imported: anonymized.len(),
            used_classifier: batch.used_classifier,
        })
    }
}

/// Look for an account/IBAN column in the first parsed row.
/// The raw rows are dropped right after this.
fn derive_account_id(parsed: &[ParsedTransaction]) -> Option<String> {
    let first = parsed.first()?;
    first.raw_row.iter().find_map(|(key, value)| {
        let key = normalize_header(key);
        let value = value.trim();
        if value.is_empty() {
            return None;
        }
        if key.contains("iban") || key.contains("numar cont") || key.contains("account number") {
            Some(value.to_string())
        } else {
            None
        }
    })
}

//! One-way anonymization for transaction data before storage
//!
//! Everything past this module is PII-free: account identifiers are salted
//! and digested, descriptions survive only as unsalted digests used for
//! dedup/recurrence comparison. Nothing here can be reversed into the
//! original text, and nothing downstream should try.

use chrono::NaiveDate;
use sha2::{Digest, Sha256};

use crate::models::{AnonymizedTransaction, Category};

/// Two amounts within this band count as "the same charge" for recurrence
pub const RECURRENCE_AMOUNT_TOLERANCE: f64 = 0.01;

/// Hashes identifiers with a server-held salt
#[derive(Debug, Clone)]
pub struct Anonymizer {
    salt: String,
}

impl Anonymizer {
    pub fn new(salt: impl Into<String>) -> Self {
        Self { salt: salt.into() }
    }

    /// Hash an account identifier so it is never stored in raw form.
    ///
    /// The digest is stable for (salt, user, account), which is what makes
    /// duplicate-import detection possible upstream.
    pub fn hash_account(&self, account_id: &str, user_id: &str) -> String {
        let raw = format!("{}:{}:{}", self.salt, user_id, account_id);
        sha256_hex(raw.as_bytes())
    }

    /// Stable source hash for uploads with no real account ID.
    ///
    /// Uses user + filename + an optional content preview so re-uploading the
    /// same file yields the same hash.
    pub fn source_hash_for_upload(
        &self,
        user_id: &str,
        filename: &str,
        first_row_preview: &str,
    ) -> String {
        let raw = format!(
            "{}:{}:{}:{}",
            self.salt, user_id, filename, first_row_preview
        );
        sha256_hex(raw.as_bytes())
    }
}

/// Hash a description for deduplication / recurrence detection only
pub fn hash_description(description: &str) -> String {
    sha256_hex(description.as_bytes())
}

fn sha256_hex(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

/// Mark transactions as recurring when another transaction in the batch
/// shares the description hash with an amount inside the tolerance band.
///
/// Pairwise over the batch; per-upload batches are small enough that the
/// quadratic scan is irrelevant.
pub fn detect_recurring(
    description_hashes: &[String],
    amounts: &[f64],
    tolerance: f64,
) -> Vec<bool> {
    let n = description_hashes.len();
    let mut recurring = vec![false; n];
    for i in 0..n {
        for j in 0..n {
            if i == j {
                continue;
            }
            if description_hashes[j] == description_hashes[i]
                && (amounts[j] - amounts[i]).abs() <= tolerance
            {
                recurring[i] = true;
                break;
            }
        }
    }
    recurring
}

/// Assemble the source hash and anonymized records from parallel slices
/// (parser output plus one category per row).
pub fn build_anonymized(
    anonymizer: &Anonymizer,
    dates: &[NaiveDate],
    amounts: &[f64],
    currencies: &[String],
    categories: &[Category],
    description_hashes: &[String],
    user_id: &str,
    account_id_for_hash: &str,
) -> (String, Vec<AnonymizedTransaction>) {
    let source_hash = anonymizer.hash_account(account_id_for_hash, user_id);
    let recurring = detect_recurring(description_hashes, amounts, RECURRENCE_AMOUNT_TOLERANCE);

    let transactions = (0..dates.len())
        .map(|i| AnonymizedTransaction {
            date: dates[i],
            amount: amounts[i],
            currency: currencies[i].clone(),
            category: categories[i],
            is_recurring: recurring[i],
            description_hash: if description_hashes[i].is_empty() {
                None
            } else {
                Some(description_hashes[i].clone())
            },
        })
        .collect();

    (source_hash, transactions)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_account_is_stable_and_salted() {
        let a = Anonymizer::new("salt-1");
        let h1 = a.hash_account("RO49AAAA1B31007593840000", "user-1");
        let h2 = a.hash_account("RO49AAAA1B31007593840000", "user-1");
        assert_eq!(h1, h2);
        assert_eq!(h1.len(), 64);

        // Different user or salt must change the digest
        assert_ne!(h1, a.hash_account("RO49AAAA1B31007593840000", "user-2"));
        let b = Anonymizer::new("salt-2");
        assert_ne!(h1, b.hash_account("RO49AAAA1B31007593840000", "user-1"));
    }

    #[test]
    fn test_hash_never_contains_input() {
        let a = Anonymizer::new("salt");
        let h = a.hash_account("RO49AAAA1B31007593840000", "user-1");
        assert!(!h.contains("RO49"));
        assert!(h.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_source_hash_idempotent_per_upload() {
        let a = Anonymizer::new("salt");
        let h1 = a.source_hash_for_upload("user-1", "extras.csv", "preview");
        let h2 = a.source_hash_for_upload("user-1", "extras.csv", "preview");
        assert_eq!(h1, h2);
        assert_ne!(h1, a.source_hash_for_upload("user-1", "other.csv", "preview"));
    }

    #[test]
    fn test_description_hash() {
        let h = hash_description("Cumparare POS Mega Image");
        assert_eq!(h, hash_description("Cumparare POS Mega Image"));
        assert_ne!(h, hash_description("Cumparare POS Kaufland"));
        assert_eq!(h.len(), 64);
    }

    #[test]
    fn test_detect_recurring_pairs() {
        let h_netflix = hash_description("NETFLIX");
        let h_rent = hash_description("CHIRIE");
        let hashes = vec![h_netflix.clone(), h_netflix, h_rent];
        let amounts = vec![-45.99, -45.99, -1800.0];
        assert_eq!(
            detect_recurring(&hashes, &amounts, RECURRENCE_AMOUNT_TOLERANCE),
            vec![true, true, false]
        );
    }

    #[test]
    fn test_detect_recurring_respects_tolerance() {
        let h = hash_description("NETFLIX");
        let hashes = vec![h.clone(), h];
        // Same description but amounts differ past the tolerance
        assert_eq!(
            detect_recurring(&hashes, &[-45.99, -49.99], RECURRENCE_AMOUNT_TOLERANCE),
            vec![false, false]
        );
        // Exactly at the tolerance still counts
        assert_eq!(
            detect_recurring(&hashes, &[-45.99, -46.00], RECURRENCE_AMOUNT_TOLERANCE),
            vec![true, true]
        );
    }

    #[test]
    fn test_build_anonymized_carries_no_text() {
        let a = Anonymizer::new("salt");
        let dates = vec![NaiveDate::from_ymd_opt(2026, 2, 26).unwrap()];
        let amounts = vec![-45.99];
        let currencies = vec!["RON".to_string()];
        let categories = vec![Category::Subscription];
        let hashes = vec![hash_description("NETFLIX.COM AMSTERDAM")];

        let (source_hash, txs) = build_anonymized(
            &a, &dates, &amounts, &currencies, &categories, &hashes, "user-1", "upload-1",
        );
        assert_eq!(source_hash.len(), 64);
        assert_eq!(txs.len(), 1);
        let json = serde_json::to_string(&txs[0]).unwrap();
        assert!(!json.contains("NETFLIX"));
    }
}

//! Bank CSV layout detection
//!
//! Each supported bank is described by a static `LayoutSpec` mapping the
//! canonical fields (date, amount, description, type, currency) to the
//! header names that bank uses. Header comparison is case-insensitive,
//! whitespace-collapsed, diacritic-folded, and matches substrings in either
//! direction, so "Data tranzacţie" resolves the same as "data tranzactie".
//!
//! The ING export is special: its real header may sit below a "Titular cont"
//! line, it splits amounts into Debit/Credit columns, and its dates use
//! Romanian month names. It is probed separately before the generic layouts.

use tracing::debug;

/// Supported bank layouts for CSV import
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutId {
    Ing,
    Brd,
    Bcr,
    Raiffeisen,
}

impl LayoutId {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ing => "ING",
            Self::Brd => "BRD",
            Self::Bcr => "BCR",
            Self::Raiffeisen => "Raiffeisen",
        }
    }
}

impl std::fmt::Display for LayoutId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Human-readable list for the unsupported-format error message
pub fn supported_layouts() -> &'static str {
    "ING, BRD, BCR, Raiffeisen"
}

/// Column indexes resolved for one generic layout
#[derive(Debug, Clone)]
pub struct ColumnMap {
    pub date: usize,
    pub amount: usize,
    pub description: usize,
    pub tx_type: Option<usize>,
    pub currency: Option<usize>,
}

/// Header-name variants for one bank, per canonical field (pre-normalized)
struct LayoutSpec {
    id: LayoutId,
    date: &'static [&'static str],
    amount: &'static [&'static str],
    description: &'static [&'static str],
    tx_type: &'static [&'static str],
    currency: &'static [&'static str],
}

/// Generic single-row layouts, evaluated in fixed priority order.
/// Adding a bank means adding an entry here, not touching the parser.
static LAYOUTS: &[LayoutSpec] = &[
    LayoutSpec {
        id: LayoutId::Brd,
        date: &["data", "data tranzactie", "date"],
        amount: &["suma", "amount", "suma debit", "suma credit"],
        description: &["descriere", "description", "detalii", "explicatie"],
        tx_type: &["tip", "type", "debit/credit", "debit", "credit"],
        currency: &["moneda", "currency", "valuta"],
    },
    LayoutSpec {
        id: LayoutId::Bcr,
        date: &["data", "data tranzactie", "date", "data operatiunii"],
        amount: &["suma", "amount", "debit", "credit", "sold"],
        description: &["descriere", "description", "detalii", "explicatie", "operatiune"],
        tx_type: &["tip", "type", "debit/credit"],
        currency: &["moneda", "currency", "valuta"],
    },
    LayoutSpec {
        id: LayoutId::Raiffeisen,
        date: &["data", "date", "data tranzactie", "booking date"],
        amount: &["amount", "suma", "debit", "credit", "transaction amount"],
        description: &["description", "descriere", "detalii", "details", "beneficiary", "payer"],
        tx_type: &["type", "tip", "debit/credit"],
        currency: &["currency", "moneda", "valuta"],
    },
];

/// Fold Romanian diacritics so header matching tolerates both spellings
fn fold_diacritics(c: char) -> char {
    match c {
        'ă' | 'â' => 'a',
        'î' => 'i',
        'ș' | 'ş' => 's',
        'ț' | 'ţ' => 't',
        _ => c,
    }
}

/// Lowercase, fold diacritics, trim, collapse internal whitespace
pub fn normalize_header(header: &str) -> String {
    header
        .to_lowercase()
        .chars()
        .map(fold_diacritics)
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Substring match in either direction between a normalized header and a variant
fn header_matches(header: &str, variant: &str) -> bool {
    !header.is_empty() && (header.contains(variant) || variant.contains(header))
}

fn find_column(normalized: &[String], variants: &[&str]) -> Option<usize> {
    normalized
        .iter()
        .position(|h| variants.iter().any(|v| header_matches(h, v)))
}

/// Match a header row against the generic layouts.
///
/// A layout only matches when date, amount, and description all resolve;
/// type and currency columns are optional.
pub fn detect_layout(headers: &[String]) -> Option<(LayoutId, ColumnMap)> {
    let normalized: Vec<String> = headers.iter().map(|h| normalize_header(h)).collect();

    for spec in LAYOUTS {
        let date = find_column(&normalized, spec.date);
        let amount = find_column(&normalized, spec.amount);
        let description = find_column(&normalized, spec.description);

        if let (Some(date), Some(amount), Some(description)) = (date, amount, description) {
            let map = ColumnMap {
                date,
                amount,
                description,
                tx_type: find_column(&normalized, spec.tx_type),
                currency: find_column(&normalized, spec.currency),
            };
            debug!(layout = %spec.id, ?map, "Detected generic layout");
            return Some((spec.id, map));
        }
    }

    None
}

/// Check whether a row is the ING multi-row header:
/// Data, Detalii tranzactie, Debit, Credit all present at once.
pub fn is_multirow_header(row: &[String]) -> bool {
    let normalized: Vec<String> = row.iter().map(|h| normalize_header(h)).collect();
    let has_date = normalized.iter().any(|n| n.contains("data"));
    let has_details = normalized
        .iter()
        .any(|n| n.contains("detalii") && n.contains("tranzactie"));
    let has_debit = normalized.iter().any(|n| n.contains("debit"));
    let has_credit = normalized.iter().any(|n| n.contains("credit"));
    has_date && has_details && has_debit && has_credit
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_normalize_header() {
        assert_eq!(normalize_header("  Data   Tranzacţie "), "data tranzactie");
        assert_eq!(normalize_header("Sumă"), "suma");
        assert_eq!(normalize_header("MONEDĂ"), "moneda");
    }

    #[test]
    fn test_detect_brd() {
        let (id, map) = detect_layout(&headers(&["Data", "Descriere", "Suma", "Moneda"])).unwrap();
        assert_eq!(id, LayoutId::Brd);
        assert_eq!(map.date, 0);
        assert_eq!(map.description, 1);
        assert_eq!(map.amount, 2);
        assert_eq!(map.currency, Some(3));
    }

    #[test]
    fn test_detect_with_diacritics() {
        let (id, _) =
            detect_layout(&headers(&["Dată", "Explicație", "Sumă", "Tip"])).unwrap();
        assert_eq!(id, LayoutId::Brd);
    }

    #[test]
    fn test_detect_raiffeisen_english_headers() {
        // "Details" resolves a description only in the Raiffeisen variants, so
        // the earlier layouts fall through on the required-field rule.
        let (id, map) = detect_layout(&headers(&[
            "Booking Date",
            "Details",
            "Transaction Amount",
            "Currency",
        ]))
        .unwrap();
        assert_eq!(id, LayoutId::Raiffeisen);
        assert_eq!(map.date, 0);
        assert_eq!(map.amount, 2);
        assert_eq!(map.currency, Some(3));
    }

    #[test]
    fn test_detect_requires_core_fields() {
        // Amount present but no description-like column
        assert!(detect_layout(&headers(&["Data", "Suma", "Sold final"])).is_none());
    }

    #[test]
    fn test_detect_unknown() {
        assert!(detect_layout(&headers(&["Foo", "Bar", "Baz"])).is_none());
    }

    #[test]
    fn test_multirow_header() {
        assert!(is_multirow_header(&headers(&[
            "Data",
            "",
            "",
            "Detalii tranzactie",
            "",
            "Debit",
            "Credit"
        ])));
        assert!(!is_multirow_header(&headers(&["Data", "Descriere", "Suma"])));
    }

    #[test]
    fn test_multirow_header_with_diacritics() {
        assert!(is_multirow_header(&headers(&[
            "Dată",
            "Detalii tranzacție",
            "Debit",
            "Credit"
        ])));
    }
}

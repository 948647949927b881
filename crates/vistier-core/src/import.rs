//! Canonical CSV parser for bank statement exports
//!
//! Converts a raw upload into `ParsedTransaction` records using the layout
//! detected from the header row(s). Decoding is permissive (invalid byte
//! sequences never abort a batch) and row-level problems degrade to skipping
//! that row; only an unrecognized header fails the whole file.

use std::collections::HashMap;

use chrono::NaiveDate;
use csv::ReaderBuilder;
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::layout::{detect_layout, is_multirow_header, supported_layouts, ColumnMap, LayoutId};
use crate::models::{ParsedTransaction, TransactionType};

/// Romanian month names for ING-style "26 februarie 2026" dates
static RO_MONTHS: &[(&str, u32)] = &[
    ("ianuarie", 1),
    ("februarie", 2),
    ("martie", 3),
    ("aprilie", 4),
    ("mai", 5),
    ("iunie", 6),
    ("iulie", 7),
    ("august", 8),
    ("septembrie", 9),
    ("octombrie", 10),
    ("noiembrie", 11),
    ("decembrie", 12),
];

// ING export columns are fixed: Data=0, Detalii tranzactie=3, Debit=5, Credit=6
const ING_COL_DATE: usize = 0;
const ING_COL_DESC: usize = 3;
const ING_COL_DEBIT: usize = 5;
const ING_COL_CREDIT: usize = 6;

/// Parse CSV content and return the detected layout plus parsed transactions.
///
/// The ING multi-row layout is probed first, at header-row candidates 0 and 1
/// (the file may open with a "Titular cont" line); generic layouts are tried
/// against row 0 only.
pub fn parse_csv(content: &[u8], filename: &str) -> Result<(LayoutId, Vec<ParsedTransaction>)> {
    let text = String::from_utf8_lossy(content);

    let mut rdr = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(text.as_bytes());

    let mut rows: Vec<Vec<String>> = Vec::new();
    for result in rdr.records() {
        let record = result?;
        rows.push(record.iter().map(|s| s.to_string()).collect());
    }

    if rows.is_empty() {
        return Err(Error::InvalidData("CSV file is empty".into()));
    }

    for header_idx in 0..=1usize {
        if header_idx < rows.len() && is_multirow_header(&rows[header_idx]) {
            return Ok(parse_multirow(&rows[header_idx..], filename));
        }
    }

    let headers: Vec<String> = rows[0].iter().map(|h| h.trim().to_string()).collect();
    let (layout, map) = detect_layout(&headers)
        .ok_or_else(|| Error::UnsupportedFormat(supported_layouts().to_string()))?;

    let transactions = parse_generic(&headers, &rows[1..], &map);
    info!(
        "Parsed {} transactions from {} (layout={})",
        transactions.len(),
        filename,
        layout
    );
    Ok((layout, transactions))
}

/// Parse data rows for a generic single-amount-column layout
fn parse_generic(
    headers: &[String],
    data_rows: &[Vec<String>],
    map: &ColumnMap,
) -> Vec<ParsedTransaction> {
    let max_col = [
        Some(map.date),
        Some(map.amount),
        Some(map.description),
        map.tx_type,
        map.currency,
    ]
    .into_iter()
    .flatten()
    .max()
    .unwrap_or(0);

    let mut out = Vec::new();
    for row in data_rows {
        if row.len() <= max_col {
            continue;
        }

        let date = match parse_date(&row[map.date]) {
            Some(d) => d,
            None => {
                debug!(value = %row[map.date], "Skipping row with unparseable date");
                continue;
            }
        };
        let mut amount = match parse_amount(&row[map.amount]) {
            Some(a) => a,
            None => {
                debug!(value = %row[map.amount], "Skipping row with unparseable amount");
                continue;
            }
        };

        let description = row[map.description].trim().to_string();

        // An explicit type column overrides the raw sign
        if let Some(type_col) = map.tx_type {
            match row[type_col].trim().to_lowercase().as_str() {
                "debit" | "out" | "minus" => amount = -amount.abs(),
                "credit" | "in" | "plus" => amount = amount.abs(),
                _ => {}
            }
        }

        let currency = map
            .currency
            .map(|c| row[c].trim().to_string())
            .filter(|c| !c.is_empty())
            .map(|c| c.chars().take(3).collect::<String>().to_uppercase())
            .unwrap_or_else(|| "RON".to_string());

        out.push(ParsedTransaction {
            date,
            amount,
            description,
            tx_type: TransactionType::from_amount(amount),
            currency,
            raw_row: raw_row(headers, row),
        });
    }
    out
}

/// Parse an ING Bank Romania export: Romanian dates, Debit/Credit columns.
/// `rows` must start with the header row.
fn parse_multirow(rows: &[Vec<String>], filename: &str) -> (LayoutId, Vec<ParsedTransaction>) {
    let mut out = Vec::new();
    if rows.is_empty() {
        return (LayoutId::Ing, out);
    }
    let headers: Vec<String> = rows[0].iter().map(|h| h.trim().to_string()).collect();

    for row in &rows[1..] {
        if row.len() <= ING_COL_CREDIT {
            continue;
        }
        let date_val = row[ING_COL_DATE].trim();
        let lowered = date_val.to_lowercase();
        if date_val.is_empty() || lowered.contains("titular") || lowered == "data" {
            continue;
        }
        let date = match parse_date_ro(date_val) {
            Some(d) => d,
            None => continue,
        };

        let description = row[ING_COL_DESC].trim().to_string();
        let debit = parse_amount(&row[ING_COL_DEBIT]);
        let credit = parse_amount(&row[ING_COL_CREDIT]);

        // Populated debit column means outflow, credit means inflow
        let amount = match (debit, credit) {
            (Some(d), _) => -d.abs(),
            (None, Some(c)) => c.abs(),
            (None, None) => continue,
        };

        out.push(ParsedTransaction {
            date,
            amount,
            description,
            tx_type: TransactionType::from_amount(amount),
            currency: "RON".to_string(),
            raw_row: raw_row(&headers, row),
        });
    }

    info!(
        "Parsed {} transactions from {} (layout=ING)",
        out.len(),
        filename
    );
    (LayoutId::Ing, out)
}

/// Keep the original header->cell mapping for optional account-id extraction
fn raw_row(headers: &[String], row: &[String]) -> HashMap<String, String> {
    headers
        .iter()
        .zip(row.iter())
        .map(|(h, v)| (h.clone(), v.clone()))
        .collect()
}

/// Parse common date formats (DD.MM.YYYY, YYYY-MM-DD, DD/MM/YYYY, DD-MM-YYYY)
fn parse_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    for fmt in ["%d.%m.%Y", "%Y-%m-%d", "%d/%m/%Y", "%d-%m-%Y"] {
        if let Ok(date) = NaiveDate::parse_from_str(value, fmt) {
            return Some(date);
        }
    }
    None
}

/// Parse a Romanian date like "26 februarie 2026" or "30 decembrie 2025"
fn parse_date_ro(value: &str) -> Option<NaiveDate> {
    let value = value.trim().to_lowercase();
    let parts: Vec<&str> = value.split_whitespace().collect();
    if parts.len() != 3 {
        return None;
    }
    let day: u32 = parts[0].parse().ok()?;
    let month = RO_MONTHS
        .iter()
        .find(|(name, _)| *name == parts[1])
        .map(|(_, m)| *m)?;
    let year: i32 = parts[2].parse().ok()?;
    if !(1990..=2100).contains(&year) {
        return None;
    }
    NaiveDate::from_ymd_opt(year, month, day)
}

/// Parse an amount, normalizing Romanian (80.000,00) and international
/// (1,234.56) decimal conventions
fn parse_amount(value: &str) -> Option<f64> {
    let mut s: String = value
        .trim()
        .chars()
        .filter(|c| *c != '\u{a0}' && *c != ' ' && *c != '"')
        .collect();
    if s.is_empty() {
        return None;
    }
    if s.contains(',') && s.contains('.') {
        // Dots are thousands separators, comma is the decimal point
        s = s.replace('.', "").replace(',', ".");
    } else if s.contains(',') {
        s = s.replace(',', ".");
    }
    s.parse::<f64>().ok()
}

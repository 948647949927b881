//! Domain models for Vistier
//!
//! Two shapes matter here: `ParsedTransaction` is the transient canonical
//! record produced by the CSV parser and never persisted, while
//! `AnonymizedTransaction`/`TransactionSource` are storage-ready and
//! structurally contain no free-text description or account identifier.

use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Direction of a transaction, always consistent with the amount's sign
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    Debit,
    Credit,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Debit => "debit",
            Self::Credit => "credit",
        }
    }

    /// Derive the type from a signed amount (negative = outflow = debit)
    pub fn from_amount(amount: f64) -> Self {
        if amount >= 0.0 {
            Self::Credit
        } else {
            Self::Debit
        }
    }
}

impl std::str::FromStr for TransactionType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "debit" => Ok(Self::Debit),
            "credit" => Ok(Self::Credit),
            _ => Err(format!("Unknown transaction type: {}", s)),
        }
    }
}

impl std::fmt::Display for TransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One row normalized from a bank CSV export
///
/// `raw_row` keeps the original header->cell mapping so the orchestrator can
/// derive an account identifier when the layout exposes one. It is dropped
/// before anything reaches storage.
#[derive(Debug, Clone)]
pub struct ParsedTransaction {
    pub date: NaiveDate,
    /// Signed: negative = outflow
    pub amount: f64,
    pub description: String,
    pub tx_type: TransactionType,
    /// 3-letter code, defaults to RON
    pub currency: String,
    pub raw_row: HashMap<String, String>,
}

/// Spending category: a closed, case-sensitive token set
///
/// Fee subcategories all carry a `_FEE` suffix so downstream reporting can
/// aggregate them with `is_fee`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Category {
    Subscription,
    Groceries,
    Dining,
    FuelTransport,
    PublicTransport,
    TaxiAndRideshare,
    ParkingAndTolls,
    CarMaintenance,
    OtherTransport,
    AccountMaintenanceFee,
    AtmFee,
    TransferFee,
    CardFee,
    OverdraftFee,
    LoanInterestFee,
    ForeignExchangeFee,
    OtherFee,
    Utilities,
    ElectronicsShopping,
    ClothingShopping,
    HomeGardenShopping,
    BeautyAndPersonalCare,
    OtherShopping,
    PharmacyHealth,
    DoctorAndClinic,
    DentalHealth,
    OpticsHealth,
    HealthInsurance,
    Other,
}

impl Category {
    /// All categories, in the order used when matching classifier responses
    pub const ALL: [Category; 29] = [
        Self::Subscription,
        Self::Groceries,
        Self::Dining,
        Self::FuelTransport,
        Self::PublicTransport,
        Self::TaxiAndRideshare,
        Self::ParkingAndTolls,
        Self::CarMaintenance,
        Self::OtherTransport,
        Self::AccountMaintenanceFee,
        Self::AtmFee,
        Self::TransferFee,
        Self::CardFee,
        Self::OverdraftFee,
        Self::LoanInterestFee,
        Self::ForeignExchangeFee,
        Self::OtherFee,
        Self::Utilities,
        Self::ElectronicsShopping,
        Self::ClothingShopping,
        Self::HomeGardenShopping,
        Self::BeautyAndPersonalCare,
        Self::OtherShopping,
        Self::PharmacyHealth,
        Self::DoctorAndClinic,
        Self::DentalHealth,
        Self::OpticsHealth,
        Self::HealthInsurance,
        Self::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Subscription => "SUBSCRIPTION",
            Self::Groceries => "GROCERIES",
            Self::Dining => "DINING",
            Self::FuelTransport => "FUEL_TRANSPORT",
            Self::PublicTransport => "PUBLIC_TRANSPORT",
            Self::TaxiAndRideshare => "TAXI_AND_RIDESHARE",
            Self::ParkingAndTolls => "PARKING_AND_TOLLS",
            Self::CarMaintenance => "CAR_MAINTENANCE",
            Self::OtherTransport => "OTHER_TRANSPORT",
            Self::AccountMaintenanceFee => "ACCOUNT_MAINTENANCE_FEE",
            Self::AtmFee => "ATM_FEE",
            Self::TransferFee => "TRANSFER_FEE",
            Self::CardFee => "CARD_FEE",
            Self::OverdraftFee => "OVERDRAFT_FEE",
            Self::LoanInterestFee => "LOAN_INTEREST_FEE",
            Self::ForeignExchangeFee => "FOREIGN_EXCHANGE_FEE",
            Self::OtherFee => "OTHER_FEE",
            Self::Utilities => "UTILITIES",
            Self::ElectronicsShopping => "ELECTRONICS_SHOPPING",
            Self::ClothingShopping => "CLOTHING_SHOPPING",
            Self::HomeGardenShopping => "HOME_GARDEN_SHOPPING",
            Self::BeautyAndPersonalCare => "BEAUTY_AND_PERSONAL_CARE",
            Self::OtherShopping => "OTHER_SHOPPING",
            Self::PharmacyHealth => "PHARMACY_HEALTH",
            Self::DoctorAndClinic => "DOCTOR_AND_CLINIC",
            Self::DentalHealth => "DENTAL_HEALTH",
            Self::OpticsHealth => "OPTICS_HEALTH",
            Self::HealthInsurance => "HEALTH_INSURANCE",
            Self::Other => "OTHER",
        }
    }

    /// Whether this is a bank-fee subcategory
    pub fn is_fee(&self) -> bool {
        self.as_str().ends_with("_FEE")
    }
}

impl std::str::FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .find(|c| c.as_str() == s)
            .copied()
            .ok_or_else(|| format!("Unknown category: {}", s))
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A storage-ready transaction: no PII
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnonymizedTransaction {
    pub date: NaiveDate,
    pub amount: f64,
    pub currency: String,
    pub category: Category,
    pub is_recurring: bool,
    /// One-way digest kept only for dedup/recurrence comparison
    pub description_hash: Option<String>,
}

/// One imported statement source (one CSV upload per account)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionSource {
    /// Hash of (salt + user + account/upload identity); no raw IBAN
    pub source_account_hash: String,
    /// User-supplied label, e.g. "BRD Current"
    pub bank_label: String,
    pub format: String,
    pub imported_at: DateTime<Utc>,
}

impl TransactionSource {
    pub fn new(source_account_hash: String, bank_label: String) -> Self {
        Self {
            source_account_hash,
            bank_label,
            format: "csv".to_string(),
            imported_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_from_amount() {
        assert_eq!(TransactionType::from_amount(-12.5), TransactionType::Debit);
        assert_eq!(TransactionType::from_amount(0.0), TransactionType::Credit);
        assert_eq!(TransactionType::from_amount(300.0), TransactionType::Credit);
    }

    #[test]
    fn test_category_round_trip() {
        for cat in Category::ALL {
            let parsed: Category = cat.as_str().parse().unwrap();
            assert_eq!(parsed, cat);
        }
    }

    #[test]
    fn test_category_tokens_are_unique() {
        let mut seen = std::collections::HashSet::new();
        for cat in Category::ALL {
            assert!(seen.insert(cat.as_str()), "duplicate token: {}", cat);
        }
        assert_eq!(seen.len(), 29);
    }

    #[test]
    fn test_category_is_fee() {
        assert!(Category::AtmFee.is_fee());
        assert!(Category::AccountMaintenanceFee.is_fee());
        assert!(!Category::Groceries.is_fee());
        assert!(!Category::Other.is_fee());
    }

    #[test]
    fn test_category_unknown_token() {
        assert!("GAMBLING".parse::<Category>().is_err());
        // Tokens are case-sensitive
        assert!("groceries".parse::<Category>().is_err());
    }

    #[test]
    fn test_source_defaults_to_csv_format() {
        let source = TransactionSource::new("abc123".into(), "BRD Current".into());
        assert_eq!(source.format, "csv");
    }

    #[test]
    fn test_anonymized_serializes_category_token() {
        let tx = AnonymizedTransaction {
            date: NaiveDate::from_ymd_opt(2026, 2, 26).unwrap(),
            amount: -45.0,
            currency: "RON".into(),
            category: Category::TaxiAndRideshare,
            is_recurring: false,
            description_hash: None,
        };
        let json = serde_json::to_string(&tx).unwrap();
        assert!(json.contains("\"TAXI_AND_RIDESHARE\""));
    }
}

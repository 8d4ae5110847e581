use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CaptureError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaptureMode {
    Scan,
    Manual,
}

impl CaptureMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            CaptureMode::Scan => "scan",
            CaptureMode::Manual => "manual",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            CaptureMode::Scan => "Receipt scan",
            CaptureMode::Manual => "Manual",
        }
    }
}

impl fmt::Display for CaptureMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CaptureMode {
    type Err = CaptureError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "scan" => Ok(CaptureMode::Scan),
            "manual" => Ok(CaptureMode::Manual),
            other => Err(CaptureError::UnknownMode(other.to_string())),
        }
    }
}

/// Names of the editable draft fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DraftField {
    Merchant,
    Amount,
    Date,
    Category,
    PaymentMethod,
    Notes,
}

impl DraftField {
    pub const ALL: [DraftField; 6] = [
        DraftField::Merchant,
        DraftField::Amount,
        DraftField::Date,
        DraftField::Category,
        DraftField::PaymentMethod,
        DraftField::Notes,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DraftField::Merchant => "merchant",
            DraftField::Amount => "amount",
            DraftField::Date => "date",
            DraftField::Category => "category",
            DraftField::PaymentMethod => "paymentMethod",
            DraftField::Notes => "notes",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            DraftField::Merchant => "Merchant",
            DraftField::Amount => "Amount",
            DraftField::Date => "Date",
            DraftField::Category => "Category",
            DraftField::PaymentMethod => "Payment method",
            DraftField::Notes => "Notes",
        }
    }

    pub fn is_required(&self) -> bool {
        matches!(self, DraftField::Merchant | DraftField::Amount | DraftField::Date)
    }
}

impl fmt::Display for DraftField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DraftField {
    type Err = CaptureError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "merchant" => Ok(DraftField::Merchant),
            "amount" => Ok(DraftField::Amount),
            "date" => Ok(DraftField::Date),
            "category" => Ok(DraftField::Category),
            "paymentmethod" | "payment_method" | "payment" => Ok(DraftField::PaymentMethod),
            "notes" => Ok(DraftField::Notes),
            _ => Err(CaptureError::UnknownField(s.to_string())),
        }
    }
}

/// The in-progress expense. `amount` holds raw user input until a review is
/// generated.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseDraft {
    pub merchant: String,
    pub amount: String,
    pub date: String,
    pub category: String,
    pub payment_method: String,
    pub notes: String,
}

impl ExpenseDraft {
    pub fn get(&self, field: DraftField) -> &str {
        match field {
            DraftField::Merchant => &self.merchant,
            DraftField::Amount => &self.amount,
            DraftField::Date => &self.date,
            DraftField::Category => &self.category,
            DraftField::PaymentMethod => &self.payment_method,
            DraftField::Notes => &self.notes,
        }
    }

    /// Touches only `field`.
    pub fn set(&mut self, field: DraftField, value: impl Into<String>) {
        let value = value.into();
        match field {
            DraftField::Merchant => self.merchant = value,
            DraftField::Amount => self.amount = value,
            DraftField::Date => self.date = value,
            DraftField::Category => self.category = value,
            DraftField::PaymentMethod => self.payment_method = value,
            DraftField::Notes => self.notes = value,
        }
    }

    /// Blanks all six fields.
    pub fn reset(&mut self) {
        *self = ExpenseDraft::default();
    }

    /// Replaces all six fields with the extracted values.
    pub fn fill_from_extraction(&mut self, result: &ExtractionResult) {
        self.merchant = result.merchant.clone();
        self.amount = result.amount.clone();
        self.date = result.date.clone();
        self.category = result.category.clone();
        self.payment_method = result.payment_method.clone();
        self.notes = result.notes.clone();
    }

    pub fn is_blank(&self) -> bool {
        DraftField::ALL.iter().all(|field| self.get(*field).is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionResult {
    pub merchant: String,
    pub amount: String,
    pub date: String,
    pub category: String,
    pub payment_method: String,
    pub notes: String,
    pub confidence: f64,
}

impl ExtractionResult {
    pub fn summary(&self) -> ExtractionSummary {
        ExtractionSummary {
            merchant: self.merchant.clone(),
            amount: self.amount.clone(),
            category: self.category.clone(),
            confidence: self.confidence,
        }
    }
}

/// What the "auto-detected from receipt" panel shows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionSummary {
    pub merchant: String,
    pub amount: String,
    pub category: String,
    pub confidence: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseRecord {
    pub id: String,
    pub mode: CaptureMode,
    pub created_at: String,
    pub receipt_file_name: String,
    pub merchant: String,
    pub amount: String,
    pub date: String,
    pub category: String,
    pub payment_method: String,
    pub notes: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusKind {
    Info,
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusMessage {
    pub kind: StatusKind,
    pub text: String,
}

impl StatusMessage {
    pub fn info(text: impl Into<String>) -> Self {
        StatusMessage {
            kind: StatusKind::Info,
            text: text.into(),
        }
    }

    pub fn success(text: impl Into<String>) -> Self {
        StatusMessage {
            kind: StatusKind::Success,
            text: text.into(),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        StatusMessage {
            kind: StatusKind::Error,
            text: text.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorScenario {
    pub id: &'static str,
    pub title: &'static str,
    pub summary: &'static str,
    pub cta: &'static str,
}

/// A triggered scenario, stamped with the local `HH:MM` it was raised at.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActiveError {
    pub scenario: &'static ErrorScenario,
    pub timestamp: String,
}

use crate::models::{ErrorScenario, ExtractionResult};
use crate::utils::days_ago_iso;

pub const CATEGORIES: [&str; 7] = [
    "Food & Beverage",
    "Transport",
    "Accommodation",
    "Groceries",
    "Office Supplies",
    "Entertainment",
    "Miscellaneous",
];

pub const PAYMENT_METHODS: [&str; 5] = [
    "Corporate Card",
    "Personal Card",
    "Cash",
    "Bank Transfer",
    "Reimbursable Wallet",
];

pub static ERROR_SCENARIOS: [ErrorScenario; 5] = [
    ErrorScenario {
        id: "camera",
        title: "Camera access denied",
        summary: "System prompts user to grant permission or choose an image from the gallery.",
        cta: "Request camera access",
    },
    ErrorScenario {
        id: "ocr",
        title: "Unreadable receipt",
        summary: "OCR fails to extract data; system asks user to enter details manually.",
        cta: "Switch to manual entry",
    },
    ErrorScenario {
        id: "network",
        title: "Network failure",
        summary: "Image queued locally; system retries upload when connection is restored.",
        cta: "Retry upload",
    },
    ErrorScenario {
        id: "validation",
        title: "Validation error",
        summary: "Missing or invalid amount/date; system highlights the error for correction.",
        cta: "Fix highlighted fields",
    },
    ErrorScenario {
        id: "save",
        title: "Save failure",
        summary: "Database error; system shows \u{201c}Failed to save expense\u{201d} and retains draft.",
        cta: "Try again later",
    },
];

pub fn find_scenario(id: &str) -> Option<&'static ErrorScenario> {
    ERROR_SCENARIOS.iter().find(|scenario| scenario.id == id)
}

struct MockReceipt {
    merchant: &'static str,
    amount: &'static str,
    days_ago: i64,
    category: &'static str,
    payment_method: &'static str,
    notes: &'static str,
    confidence: f64,
}

const MOCK_RECEIPTS: [MockReceipt; 3] = [
    MockReceipt {
        merchant: "Everyday Grocer",
        amount: "42.70",
        days_ago: 0,
        category: "Groceries",
        payment_method: "Visa **** 2189",
        notes: "Auto-captured from receipt photo. Verify tip before saving.",
        confidence: 0.93,
    },
    MockReceipt {
        merchant: "Metro Taxi",
        amount: "18.40",
        days_ago: 1,
        category: "Transport",
        payment_method: "Corporate Card **** 0045",
        notes: "OCR identified license plate #SJD2041.",
        confidence: 0.86,
    },
    MockReceipt {
        merchant: "Cafe Solstice",
        amount: "12.80",
        days_ago: 2,
        category: "Food & Beverage",
        payment_method: "Mastercard **** 5573",
        notes: "Suggested category based on OCR keywords.",
        confidence: 0.78,
    },
];

pub fn mock_receipt_count() -> usize {
    MOCK_RECEIPTS.len()
}

/// Wraps `index` around the catalog. Dates are relative to today.
pub fn mock_receipt(index: usize) -> ExtractionResult {
    let receipt = &MOCK_RECEIPTS[index % MOCK_RECEIPTS.len()];
    ExtractionResult {
        merchant: receipt.merchant.to_string(),
        amount: receipt.amount.to_string(),
        date: days_ago_iso(receipt.days_ago),
        category: receipt.category.to_string(),
        payment_method: receipt.payment_method.to_string(),
        notes: receipt.notes.to_string(),
        confidence: receipt.confidence,
    }
}

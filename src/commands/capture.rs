use std::fmt::Write;

use crate::models::{CaptureMode, DraftField, ExpenseRecord, StatusKind};
use crate::services::catalog::{CATEGORIES, ERROR_SCENARIOS, PAYMENT_METHODS};
use crate::services::workflow::{CaptureWorkflow, ConfirmationSink, Phase};

pub fn render(workflow: &CaptureWorkflow, currency: &str) -> String {
    let mut out = String::new();
    let mode = workflow.mode();

    let _ = writeln!(out, "== PocketPal · Capture Expense ({} in history) ==", workflow.expenses().len());
    let _ = writeln!(
        out,
        "Mode: {}  [{}]",
        mode.label(),
        match mode {
            CaptureMode::Scan => "upload a receipt image; fields are auto-filled for editing",
            CaptureMode::Manual => "type the details; for cash expenses or unreadable receipts",
        }
    );
    if !workflow.receipt_file_name().is_empty() {
        let _ = writeln!(out, "Receipt file: {}", workflow.receipt_file_name());
    }

    match workflow.phase() {
        Phase::ChoosingCaptureMethod => {
            let _ = writeln!(out, "-- Select input method: `upload <file>`, `camera`, or `cancel` --");
        }
        Phase::AwaitingCameraCapture => {
            let _ = writeln!(out, "-- Mock camera preview: align receipt within the guide. `capture` or `close` --");
        }
        Phase::Extracting => {
            let _ = writeln!(out, "(processing... save is disabled)");
        }
        _ => {}
    }

    if let Some(status) = workflow.status() {
        let tag = match status.kind {
            StatusKind::Info => "info",
            StatusKind::Success => "ok",
            StatusKind::Error => "error",
        };
        let _ = writeln!(out, "[{tag}] {}", status.text);
    }

    let _ = writeln!(out);
    for field in DraftField::ALL {
        let marker = if field.is_required() { " *" } else { "" };
        let value = workflow.draft().get(field);
        let shown = if value.is_empty() { "-" } else { value };
        let _ = writeln!(out, "  {:<16} {}", format!("{}{}", field.label(), marker), shown);
    }

    if let Some(review) = workflow.review_snapshot() {
        let _ = writeln!(out);
        let _ = writeln!(out, "-- Review (ready to confirm) --");
        let _ = write!(out, "{}", render_review(review, currency));
        if mode == CaptureMode::Scan {
            if let Some(summary) = workflow.extraction_summary() {
                let _ = writeln!(out, "  Auto-detected from receipt:");
                let _ = writeln!(out, "    Merchant: {}", summary.merchant);
                let _ = writeln!(out, "    Amount: {currency} {}", summary.amount);
                let _ = writeln!(out, "    Suggested category: {}", summary.category);
                let _ = writeln!(out, "    Confidence: {:.0}%", summary.confidence * 100.0);
            }
        }
        let _ = writeln!(out, "  `confirm` to submit");
    }

    if let Some(error) = workflow.active_error() {
        let _ = writeln!(out);
        let _ = writeln!(out, "!! {} ({})", error.scenario.title, error.timestamp);
        let _ = writeln!(out, "   {}", error.scenario.summary);
        let _ = writeln!(out, "   [{}] or `dismiss`", error.scenario.cta);
    }

    out
}

fn render_review(review: &ExpenseRecord, currency: &str) -> String {
    let or = |value: &str, fallback: &str| {
        if value.is_empty() {
            fallback.to_string()
        } else {
            value.to_string()
        }
    };
    let mut out = String::new();
    let _ = writeln!(out, "  Merchant        {}", or(&review.merchant, "--"));
    let _ = writeln!(out, "  Amount          {currency} {}", review.amount);
    let _ = writeln!(out, "  Total           {currency} {}", review.amount);
    let _ = writeln!(out, "  Date            {}", or(&review.date, "--"));
    let _ = writeln!(out, "  Category        {}", or(&review.category, "Awaiting selection"));
    let _ = writeln!(out, "  Payment method  {}", or(&review.payment_method, "Not provided"));
    let _ = writeln!(out, "  Notes           {}", or(&review.notes, "Add context for approvers"));
    out
}

pub fn render_confirmation(record: &ExpenseRecord, currency: &str) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "== Expense captured ==");
    let _ = writeln!(out, "Saved as a draft. Sync it to the ledger or capture another expense.");
    let _ = writeln!(out, "  Merchant  {}", record.merchant);
    let _ = writeln!(out, "  Amount    {currency} {}", record.amount);
    let _ = writeln!(out, "  Date      {}", record.date);
    if !record.category.is_empty() {
        let _ = writeln!(out, "  Category  {}", record.category);
    }
    let _ = writeln!(out, "  Mode      {}", record.mode.label());
    let _ = writeln!(out, "`show {}` for details", record.id);
    out
}

pub fn render_option_lists() -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Categories: {}", CATEGORIES.join(", "));
    let _ = writeln!(out, "Payment methods: {}", PAYMENT_METHODS.join(", "));
    let ids: Vec<&str> = ERROR_SCENARIOS.iter().map(|scenario| scenario.id).collect();
    let _ = writeln!(out, "Simulated errors: {}", ids.join(", "));
    out
}

/// Prints the confirmation screen when an expense is confirmed.
pub struct ConfirmationScreen {
    pub currency: String,
}

impl ConfirmationSink for ConfirmationScreen {
    fn expense_confirmed(&mut self, record: &ExpenseRecord) {
        println!("{}", render_confirmation(record, &self.currency));
    }
}

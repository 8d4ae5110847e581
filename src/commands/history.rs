use std::fmt::Write;

use crate::services::history::{project, summarize, HistoryFilter};
use crate::store::ExpenseStore;
use crate::utils::format_decimal;

pub fn render_list(store: &ExpenseStore, filter: &HistoryFilter, currency: &str) -> String {
    let mut out = String::new();
    let visible = project(store.all(), filter);
    let summary = summarize(&visible);

    let _ = writeln!(
        out,
        "== Expense History: {} {} · {currency} {} total ==",
        summary.count,
        if summary.count == 1 { "expense" } else { "expenses" },
        format_decimal(summary.total)
    );
    if !filter.is_empty() {
        let _ = writeln!(
            out,
            "Filters: category={} mode={}",
            filter.category.as_deref().unwrap_or("all"),
            filter.mode.map(|mode| mode.as_str()).unwrap_or("all")
        );
    }

    if store.is_empty() {
        let _ = writeln!(out, "No expenses yet. Start capturing expenses to see them appear here.");
    } else if visible.is_empty() {
        let _ = writeln!(out, "No matching expenses. Try adjusting your filters to see more results.");
    } else {
        for record in visible {
            let _ = writeln!(
                out,
                "  {}  {:<20} {currency} {:>9}  {}  {:<16} {}",
                &record.id[..8.min(record.id.len())],
                record.merchant,
                record.amount,
                record.date,
                record.category,
                record.mode.label()
            );
        }
    }
    out
}

/// Accepts a full id or any unique prefix of one.
pub fn render_detail(store: &ExpenseStore, id: &str) -> String {
    let found = store.get(id).or_else(|| {
        let mut matches = store.all().iter().filter(|record| !id.is_empty() && record.id.starts_with(id));
        match (matches.next(), matches.next()) {
            (Some(record), None) => Some(record),
            _ => None,
        }
    });

    match found {
        Some(record) => match serde_json::to_string_pretty(record) {
            Ok(json) => format!("== Expense Details ==\n{json}"),
            Err(err) => format!("! Could not render expense: {err}"),
        },
        None => "Expense Not Found. The expense you're looking for doesn't exist or has been removed.".to_string(),
    }
}

use rust_decimal::Decimal;

use crate::models::{CaptureMode, ExpenseRecord};
use crate::utils::parse_decimal;

/// Criteria left as `None` (or an empty category) match every record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HistoryFilter {
    pub category: Option<String>,
    pub mode: Option<CaptureMode>,
}

impl HistoryFilter {
    pub fn all() -> Self {
        HistoryFilter::default()
    }

    pub fn matches(&self, record: &ExpenseRecord) -> bool {
        let category_ok = match self.category.as_deref() {
            Some(category) if !category.is_empty() => record.category == category,
            _ => true,
        };
        let mode_ok = self.mode.map(|mode| record.mode == mode).unwrap_or(true);
        category_ok && mode_ok
    }

    pub fn is_empty(&self) -> bool {
        self.category.as_deref().map(str::is_empty).unwrap_or(true) && self.mode.is_none()
    }
}

/// Keeps the input order.
pub fn project<'a>(records: &'a [ExpenseRecord], filter: &HistoryFilter) -> Vec<&'a ExpenseRecord> {
    records.iter().filter(|record| filter.matches(record)).collect()
}

/// Unparseable amounts count as zero.
pub fn aggregate_total<'a, I>(records: I) -> Decimal
where
    I: IntoIterator<Item = &'a ExpenseRecord>,
{
    records
        .into_iter()
        .map(|record| parse_decimal(&record.amount).unwrap_or(Decimal::ZERO))
        .sum()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistorySummary {
    pub count: usize,
    pub total: Decimal,
}

pub fn summarize(records: &[&ExpenseRecord]) -> HistorySummary {
    HistorySummary {
        count: records.len(),
        total: aggregate_total(records.iter().copied()),
    }
}

use std::str::FromStr;

use chrono::{Duration, Local, Utc};
use rust_decimal::{Decimal, RoundingStrategy};

pub fn now_rfc3339() -> String {
    Utc::now().to_rfc3339()
}

pub fn local_clock_hhmm() -> String {
    Local::now().format("%H:%M").to_string()
}

pub fn days_ago_iso(days: i64) -> String {
    (Local::now().date_naive() - Duration::days(days))
        .format("%Y-%m-%d")
        .to_string()
}

pub fn camera_file_label() -> String {
    format!("CameraCapture-{}.jpg", Utc::now().timestamp_millis())
}

/// Rounds half away from zero to two places. Returns `None` when the value
/// has too many integer digits to carry a two-digit scale.
pub fn round_to_cents(value: Decimal) -> Option<Decimal> {
    let mut rounded = value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(2);
    (rounded.scale() == 2).then_some(rounded)
}

/// Renders two fractional digits using the [`round_to_cents`] rule.
pub fn format_decimal(value: Decimal) -> String {
    match round_to_cents(value) {
        Some(rounded) => rounded.to_string(),
        None => value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero).to_string(),
    }
}

/// Accepts `12.50`, `12,50` and scientific forms like `1.25e1`. A comma is only
/// read as the decimal separator when the input has no dot.
pub fn parse_decimal(value: &str) -> Option<Decimal> {
    let raw = value.trim();
    if raw.is_empty() {
        return None;
    }
    let normalized = if raw.contains('.') {
        raw.to_string()
    } else {
        raw.replacen(',', ".", 1)
    };
    Decimal::from_str(&normalized)
        .or_else(|_| Decimal::from_scientific(&normalized))
        .ok()
}

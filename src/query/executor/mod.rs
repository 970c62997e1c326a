//! Per-category query executors
//!
//! Each module is configuration over the shared engine pieces
//! ([`crate::query::predicate`], [`crate::query::date`],
//! [`crate::query::units`]): which fields are filterable, how rows are
//! shaped, and what the summary aggregates.

pub mod cash;
pub mod orders;
pub mod purchases;
pub mod sales;
pub mod stock;
pub mod suppliers;

use crate::query::date::{format_date_for_display, matches_granular, parse_any_date};
use crate::query::filter::DateWindow;

/// Resolve a record's raw timestamp against the whole date window: the
/// standard start/end pair (inclusive, compared as parsed) and the
/// granular from/to descriptors. An unparseable or absent timestamp never
/// matches an active window.
pub(crate) fn date_in_window(raw: &str, window: &DateWindow) -> bool {
    if !window.is_active() {
        return true;
    }
    let Some(candidate) = parse_any_date(raw) else {
        return false;
    };
    if window.has_standard_pair() {
        let start = window.start_raw().and_then(parse_any_date);
        let end = window.end_raw().and_then(parse_any_date);
        let (Some(start), Some(end)) = (start, end) else {
            return false;
        };
        if candidate < start || candidate > end {
            return false;
        }
    }
    if window.has_granular() && !matches_granular(candidate, &window.from, &window.to) {
        return false;
    }
    true
}

/// Summary period label for the standard date pair
pub(crate) fn period_label(window: &DateWindow) -> String {
    match (window.start_raw(), window.end_raw()) {
        (Some(start), Some(end)) => format!(
            "{} - {}",
            format_date_for_display(start),
            format_date_for_display(end)
        ),
        _ => "Todos los períodos".to_string(),
    }
}

//! Granular date filtering
//!
//! A granular date filter is a pair of partially-specified descriptors
//! ("desde" and "hasta"), each holding independently optional year, month,
//! day, hour and minute components.
//!
//! The matching contract, preserved from the production screens:
//!
//! - While the "hasta" descriptor is completely empty, every set "desde"
//!   component is an independent equality constraint: `{month: 11}` means
//!   "November of any year".
//! - The moment any "hasta" component is set, both descriptors switch to
//!   range semantics: "desde" components become lower bounds and "hasta"
//!   components upper bounds, with carry semantics per level — a bound at
//!   some level only applies while every more significant set level is
//!   exactly equal to the candidate's; once a more significant level is
//!   strictly past its bound, the finer bounds are vacuously satisfied.
//!
//! Whether the exact/range asymmetry is considered UX or accident is an
//! open product question; the behavior is load-bearing ("type only a month
//! number" must keep meaning "that exact month") and is kept as is.

use chrono::{Datelike, NaiveDate, NaiveDateTime, Timelike};

/// A partially-specified date descriptor, most significant field first
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateSpec {
    pub year: Option<i32>,
    pub month: Option<u32>,
    pub day: Option<u32>,
    pub hour: Option<u32>,
    pub minute: Option<u32>,
}

impl DateSpec {
    pub fn is_empty(&self) -> bool {
        self.year.is_none()
            && self.month.is_none()
            && self.day.is_none()
            && self.hour.is_none()
            && self.minute.is_none()
    }

    /// Components ordered year, month, day, hour, minute
    fn levels(&self) -> [Option<i64>; 5] {
        [
            self.year.map(i64::from),
            self.month.map(i64::from),
            self.day.map(i64::from),
            self.hour.map(i64::from),
            self.minute.map(i64::from),
        ]
    }
}

fn candidate_levels(ts: NaiveDateTime) -> [i64; 5] {
    [
        i64::from(ts.year()),
        i64::from(ts.month()),
        i64::from(ts.day()),
        i64::from(ts.hour()),
        i64::from(ts.minute()),
    ]
}

/// Every set level must equal the candidate's component
fn exact_ok(cand: &[i64; 5], spec: &[Option<i64>; 5]) -> bool {
    spec.iter()
        .zip(cand.iter())
        .all(|(bound, value)| bound.map_or(true, |b| *value == b))
}

/// Lower-bound check with carry semantics: the bound at a level applies
/// only while all more significant set levels are exactly equal.
fn lower_bound_ok(cand: &[i64; 5], spec: &[Option<i64>; 5]) -> bool {
    for level in 0..5 {
        let Some(bound) = spec[level] else { continue };
        let carry_exact = (0..level).all(|above| spec[above].map_or(true, |b| cand[above] == b));
        if carry_exact && cand[level] < bound {
            return false;
        }
    }
    true
}

/// Symmetric upper-bound check
fn upper_bound_ok(cand: &[i64; 5], spec: &[Option<i64>; 5]) -> bool {
    for level in 0..5 {
        let Some(bound) = spec[level] else { continue };
        let carry_exact = (0..level).all(|above| spec[above].map_or(true, |b| cand[above] == b));
        if carry_exact && cand[level] > bound {
            return false;
        }
    }
    true
}

/// Resolve a granular from/to pair against a candidate timestamp.
///
/// An absent or unparseable candidate never matches; parse upstream with
/// [`parse_any_date`].
pub fn matches_granular(candidate: NaiveDateTime, from: &DateSpec, to: &DateSpec) -> bool {
    let cand = candidate_levels(candidate);
    if to.is_empty() {
        exact_ok(&cand, &from.levels())
    } else {
        lower_bound_ok(&cand, &from.levels()) && upper_bound_ok(&cand, &to.levels())
    }
}

/// Parse the timestamp spellings that occur across the historical record
/// collections. Date-only forms resolve to midnight. Returns `None` for
/// anything unrecognized; a non-matching record, never an error.
pub fn parse_any_date(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    // ISO 8601 / RFC 3339 with offset
    if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_utc());
    }

    const DATETIME_FORMATS: [&str; 5] = [
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%d %H:%M",
        "%Y/%m/%d %H:%M:%S",
        "%Y/%m/%d %H:%M",
    ];
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(dt);
        }
    }

    const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%Y/%m/%d", "%d/%m/%Y"];
    for fmt in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(raw, fmt) {
            return d.and_hms_opt(0, 0, 0);
        }
    }

    None
}

/// Reformat an ISO `YYYY-MM-DD` input date as `DD/MM/YYYY` for summary
/// display; anything unparseable is shown as typed.
pub fn format_date_for_display(raw: &str) -> String {
    match NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d") {
        Ok(d) => d.format("%d/%m/%Y").to_string(),
        Err(_) => raw.trim().to_string(),
    }
}

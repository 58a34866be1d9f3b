//! Date normalizer — resolves raw collection-date strings into calendar dates
//! or date ranges.
//!
//! Candidate formats are tried in order and the first one that succeeds wins.
//! Strings containing the [`WILDCARD`] placeholder in a component are expanded
//! to the range of dates they may denote; an unknown year cannot be expanded
//! and leaves the date unresolved.

use crate::types::{NumDate, RecordDate, SequenceRecord, DATE, RAW_DATE};
use chrono::{Datelike, Local, NaiveDate};
use std::fmt;

/// Placeholder marking an unknown date component, e.g. `2020-XX-XX`.
pub const WILDCARD: &str = "XX";

/// Average year length used for fractional years. Leap years are not
/// special-cased.
const DAYS_PER_YEAR: f64 = 365.25;

/// Convert a calendar date to a fractional year:
/// `year + days_since_jan_1 / 365.25`.
pub fn num_date(date: NaiveDate) -> f64 {
    f64::from(date.year()) + f64::from(date.ordinal0()) / DAYS_PER_YEAR
}

/// Fractional-year value of a normalised date, if it has one.
pub fn num_date_of(date: &RecordDate) -> Option<NumDate> {
    match date {
        RecordDate::Exact(d) => Some(NumDate::Point(num_date(*d))),
        RecordDate::Range { lower, upper } => {
            Some(NumDate::Interval([num_date(*lower), num_date(*upper)]))
        }
        RecordDate::Missing | RecordDate::Unparsed(_) => None,
    }
}

// ---------------------------------------------------------------------------
// Candidate formats
// ---------------------------------------------------------------------------

type ParseFn = Box<dyn Fn(&str) -> Option<NaiveDate> + Send + Sync>;

/// One candidate way of reading a date string.
pub enum DateFormat {
    /// A strftime-style pattern such as `%Y-%m-%d`. Must match the whole string.
    Pattern(String),
    /// A caller-supplied parser. Never used for wildcard dates.
    Custom(ParseFn),
}

impl DateFormat {
    pub fn pattern(pattern: impl Into<String>) -> Self {
        DateFormat::Pattern(pattern.into())
    }

    pub fn custom<F>(parse: F) -> Self
    where
        F: Fn(&str) -> Option<NaiveDate> + Send + Sync + 'static,
    {
        DateFormat::Custom(Box::new(parse))
    }
}

impl fmt::Debug for DateFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DateFormat::Pattern(p) => f.debug_tuple("Pattern").field(p).finish(),
            DateFormat::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

// ---------------------------------------------------------------------------
// Ambiguous dates
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Component {
    Year,
    Month,
    Day,
}

impl Component {
    fn of_token(token: &str) -> Self {
        let token = token.to_ascii_lowercase();
        if token.contains('y') {
            Component::Year
        } else if token.contains('d') {
            Component::Day
        } else {
            Component::Month
        }
    }
}

#[derive(Debug, Default)]
struct Bounds {
    year: Option<i32>,
    month: Option<i32>,
    day: Option<i32>,
}

impl Bounds {
    fn set(&mut self, component: Component, value: i32) {
        match component {
            Component::Year => self.year = Some(value),
            Component::Month => self.month = Some(value),
            Component::Day => self.day = Some(value),
        }
    }

    fn to_date(&self) -> Option<NaiveDate> {
        let month = u32::try_from(self.month?).ok()?;
        let day = u32::try_from(self.day?).ok()?;
        NaiveDate::from_ymd_opt(self.year?, month, day)
    }
}

/// The separator is the character that closes the first `%` directive's
/// segment, e.g. `-` for `%Y-%m-%d`.
fn separator(pattern: &str) -> Option<char> {
    pattern.split('%').nth(1)?.chars().last()
}

/// Last day of `month`, with February fixed at 28.
fn last_day_of_month(month: i32) -> i32 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        2 => 28,
        _ => 30,
    }
}

/// Expand a wildcard date string into `(lower, upper)` according to `pattern`.
///
/// Unknown months span 1..=12 and unknown days 1..=31, with the upper day then
/// clamped to the length of the upper month. `upper` is clamped to `today`.
/// Returns `None` when the year is unknown or the string does not fit the
/// pattern.
pub fn ambiguous_date_range(
    raw: &str,
    pattern: &str,
    today: NaiveDate,
) -> Option<(NaiveDate, NaiveDate)> {
    let sep = separator(pattern)?;
    let field_sep = format!("{sep}%");

    let mut min = Bounds::default();
    let mut max = Bounds::default();

    for (value, token) in raw.split(sep).zip(pattern.split(field_sep.as_str())) {
        let component = Component::of_token(token);
        if value.contains(WILDCARD) {
            let (lo, hi) = match component {
                Component::Year => return None,
                Component::Month => (1, 12),
                Component::Day => (1, 31),
            };
            min.set(component, lo);
            max.set(component, hi);
        } else {
            let n: i32 = value.trim().parse().ok()?;
            min.set(component, n);
            max.set(component, n);
        }
    }

    max.day = Some(max.day?.min(last_day_of_month(max.month?)));

    let lower = min.to_date()?;
    let upper = max.to_date()?;
    Some((lower, if upper < today { upper } else { today }))
}

// ---------------------------------------------------------------------------
// DateNormalizer
// ---------------------------------------------------------------------------

/// Resolves date strings against an ordered list of candidate formats.
#[derive(Debug)]
pub struct DateNormalizer {
    formats: Vec<DateFormat>,
    today: NaiveDate,
}

impl DateNormalizer {
    pub fn new(formats: Vec<DateFormat>) -> Self {
        Self {
            formats,
            today: Local::now().date_naive(),
        }
    }

    /// Build from strftime-style patterns only.
    pub fn from_patterns<I, S>(patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(patterns.into_iter().map(DateFormat::pattern).collect())
    }

    /// Override the date used to clamp the upper end of ranges.
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = today;
        self
    }

    pub fn formats(&self) -> &[DateFormat] {
        &self.formats
    }

    /// Resolve a raw date string. The first format that accepts it wins; if
    /// none does the string comes back as [`RecordDate::Unparsed`].
    pub fn resolve(&self, raw: &str) -> RecordDate {
        if raw.is_empty() {
            return RecordDate::Missing;
        }
        for format in &self.formats {
            match self.try_format(raw, format) {
                Some(date) => return date,
                None => tracing::trace!(raw, ?format, "date format did not match"),
            }
        }
        RecordDate::Unparsed(raw.to_string())
    }

    fn try_format(&self, raw: &str, format: &DateFormat) -> Option<RecordDate> {
        if raw.contains(WILDCARD) {
            let DateFormat::Pattern(pattern) = format else {
                return None;
            };
            let (lower, upper) = ambiguous_date_range(raw, pattern, self.today)?;
            return Some(RecordDate::Range { lower, upper });
        }
        let date = match format {
            DateFormat::Pattern(pattern) => NaiveDate::parse_from_str(raw, pattern).ok(),
            DateFormat::Custom(parse) => parse(raw),
        };
        date.map(RecordDate::Exact)
    }

    /// Normalise the `date` attribute of one record in place.
    ///
    /// On success the string moves from `date` to `raw_date`, and `date` /
    /// `num_date` carry the typed result. On failure the attribute is left
    /// untouched and the record is marked [`RecordDate::Unparsed`]. A record
    /// already resolved with no new `date` attribute is left as it is.
    pub fn normalize(&self, record: &mut SequenceRecord) {
        if record.date.is_resolved() && !record.attributes.contains_key(DATE) {
            return;
        }
        let resolved = match record.attributes.get(DATE) {
            Some(raw) => self.resolve(raw),
            None => RecordDate::Missing,
        };
        if resolved.is_resolved() {
            if let Some(raw) = record.attributes.remove(DATE) {
                record.attributes.insert(RAW_DATE.to_string(), raw);
            }
        } else if let RecordDate::Unparsed(raw) = &resolved {
            tracing::debug!(id = %record.id, raw = %raw, "could not parse date");
        }
        record.num_date = num_date_of(&resolved);
        record.date = resolved;
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

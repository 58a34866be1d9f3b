//! Core types for phylosample-core.
//!
//! This module defines the fundamental data structures shared across the
//! pipeline stages: the [`SequenceRecord`], its typed [`RecordDate`] and
//! [`NumDate`] annotations, and the transient [`SamplingState`] written by the
//! subsampler.

use chrono::{Datelike, NaiveDate};
use std::collections::BTreeMap;

/// Attribute key holding the strain name, which becomes the record id.
pub const STRAIN: &str = "strain";
/// Attribute key holding the raw collection date string.
pub const DATE: &str = "date";
/// Attribute key holding the original date string once it has been resolved.
pub const RAW_DATE: &str = "raw_date";

/// One biological sequence plus its metadata.
///
/// `attributes` holds the string fields produced by header parsing. The typed
/// date annotations live next to them rather than inside the map, so a
/// resolved date can never be confused with an unparsed string.
#[derive(Debug, Clone, PartialEq)]
pub struct SequenceRecord {
    /// Unique identifier. After header parsing this is the `strain` attribute.
    pub id: String,
    /// Raw header line (without the leading `>`), as supplied by the loader.
    pub description: String,
    /// Sequence characters.
    pub seq: String,
    /// Open string-to-string metadata mapping.
    pub attributes: BTreeMap<String, String>,
    /// Outcome of date normalisation.
    pub date: RecordDate,
    /// Fractional-year value(s) of `date`, set together with it.
    pub num_date: Option<NumDate>,
    /// Scores written during subsampling. Never serialised.
    pub sampling: SamplingState,
}

impl SequenceRecord {
    pub fn new(id: impl Into<String>, seq: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            description: String::new(),
            seq: seq.into(),
            attributes: BTreeMap::new(),
            date: RecordDate::Missing,
            num_date: None,
            sampling: SamplingState::default(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }

    /// The original date string, if the date has been resolved.
    pub fn raw_date(&self) -> Option<&str> {
        self.attribute(RAW_DATE)
    }
}

/// Result of normalising a record's `date` attribute.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum RecordDate {
    /// No `date` attribute, or an empty one.
    #[default]
    Missing,
    /// No candidate format accepted the string; it is kept verbatim.
    Unparsed(String),
    /// A fully specified calendar date.
    Exact(NaiveDate),
    /// A partially specified date expanded to the range it may denote.
    Range { lower: NaiveDate, upper: NaiveDate },
}

impl RecordDate {
    /// The working calendar date: the date itself, or the lower end of a range.
    pub fn working_date(&self) -> Option<NaiveDate> {
        match self {
            RecordDate::Exact(date) => Some(*date),
            RecordDate::Range { lower, .. } => Some(*lower),
            RecordDate::Missing | RecordDate::Unparsed(_) => None,
        }
    }

    /// `true` for an exact date or a date range.
    pub fn is_resolved(&self) -> bool {
        self.working_date().is_some()
    }

    /// `(year, month)` of the working date.
    pub fn year_month(&self) -> Option<(i32, u32)> {
        self.working_date().map(|d| (d.year(), d.month()))
    }
}

/// Fractional-year representation of a [`RecordDate`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NumDate {
    Point(f64),
    Interval([f64; 2]),
}

impl NumDate {
    /// Lower end of the value (the point itself for [`NumDate::Point`]).
    pub fn min(&self) -> f64 {
        match self {
            NumDate::Point(v) => *v,
            NumDate::Interval([lo, _]) => *lo,
        }
    }

    pub fn max(&self) -> f64 {
        match self {
            NumDate::Point(v) => *v,
            NumDate::Interval([_, hi]) => *hi,
        }
    }
}

/// Transient scores attached to a record by the subsampler.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SamplingState {
    /// Priority assigned by the configured priority strategy.
    pub priority: Option<f64>,
    /// `min(1.0, bucket_size / threshold)` for the record's category.
    pub under_sampling: Option<f64>,
}

//! Test builders — ergonomic constructors for `SequenceRecord` and corpora.
//!
//! These builders are designed for readability in test assertions, not for
//! production use. They panic on invalid input rather than returning `Result`.

use chrono::NaiveDate;
use phylosample_core::{RecordDate, SequenceRecord};

/// Attribute read by `attribute_priority` in the harnesses.
pub const SCORE: &str = "score";

pub fn ymd(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid test date")
}

// ---------------------------------------------------------------------------
// RecordBuilder
// ---------------------------------------------------------------------------

/// Fluent builder for [`SequenceRecord`] test fixtures.
///
/// # Example
///
/// ```rust
/// let record = RecordBuilder::new("A/Perth/16/2009")
///     .date(2009, 7, 4)
///     .attr("region", "oceania")
///     .score(0.9)
///     .build();
/// ```
pub struct RecordBuilder {
    record: SequenceRecord,
}

impl RecordBuilder {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            record: SequenceRecord::new(id, "ACGTACGT"),
        }
    }

    pub fn seq(mut self, seq: impl Into<String>) -> Self {
        self.record.seq = seq.into();
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.record.description = description.into();
        self
    }

    pub fn attr(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.record.attributes.insert(key.into(), value.into());
        self
    }

    /// Set an already-resolved exact date.
    pub fn date(mut self, year: i32, month: u32, day: u32) -> Self {
        self.record.date = RecordDate::Exact(ymd(year, month, day));
        self
    }

    /// Set the raw, not yet normalised, `date` attribute.
    pub fn raw_date(self, raw: &str) -> Self {
        self.attr("date", raw)
    }

    pub fn score(self, score: f64) -> Self {
        self.attr(SCORE, score.to_string())
    }

    pub fn build(self) -> SequenceRecord {
        self.record
    }
}

// ---------------------------------------------------------------------------
// Convenience constructors
// ---------------------------------------------------------------------------

/// A record with an exact date on the first of the month and a score.
pub fn scored_record(id: &str, year: i32, month: u32, score: f64) -> SequenceRecord {
    RecordBuilder::new(id).date(year, month, 1).score(score).build()
}

/// A record carrying only a raw date string.
pub fn raw_dated_record(id: &str, raw: &str) -> SequenceRecord {
    RecordBuilder::new(id).raw_date(raw).build()
}

// ---------------------------------------------------------------------------
// Corpus helpers
// ---------------------------------------------------------------------------

/// `n` dated records spread over the twelve months of 2020, with distinct
/// scores so the expected survivors of each month are known.
pub fn build_corpus(n: usize) -> Vec<SequenceRecord> {
    (0..n)
        .map(|i| {
            let month = (i % 12) as u32 + 1;
            RecordBuilder::new(format!("strain-{i}"))
                .date(2020, month, (i % 28) as u32 + 1)
                .score(i as f64)
                .attr("region", ["asia", "europe", "africa"][i % 3])
                .build()
        })
        .collect()
}

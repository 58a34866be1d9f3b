//! Domain-specific assertion macros for phylosample harnesses.
//!
//! These add context-rich failure messages that make it clear which record
//! and which pipeline stage violated an expectation.

use phylosample_core::{SequenceRecord, SequenceSet};

/// Assert that a record resolved to an exact date.
///
/// ```rust
/// assert_exact_date!(record, ymd(2020, 3, 4));
/// ```
#[macro_export]
macro_rules! assert_exact_date {
    ($record:expr, $date:expr) => {{
        let record: &phylosample_core::SequenceRecord = &$record;
        let expected: chrono::NaiveDate = $date;
        match &record.date {
            phylosample_core::RecordDate::Exact(actual) if *actual == expected => {}
            other => panic!(
                "assert_exact_date! failed for {:?}:\n  expected: Exact({})\n  actual:   {:?}",
                record.id, expected, other
            ),
        }
    }};
}

/// Assert that a record resolved to a date range with the given bounds.
#[macro_export]
macro_rules! assert_date_range {
    ($record:expr, $lower:expr, $upper:expr) => {{
        let record: &phylosample_core::SequenceRecord = &$record;
        let (lower, upper): (chrono::NaiveDate, chrono::NaiveDate) = ($lower, $upper);
        match &record.date {
            phylosample_core::RecordDate::Range { lower: l, upper: u } if *l == lower && *u == upper => {}
            other => panic!(
                "assert_date_range! failed for {:?}:\n  expected: {}..={}\n  actual:   {:?}",
                record.id, lower, upper, other
            ),
        }
    }};
}

/// Assert the exact, sorted id set of a `SequenceSet`.
///
/// ```rust
/// assert_ids!(set, ["a", "c"]);
/// ```
#[macro_export]
macro_rules! assert_ids {
    ($set:expr, [$($id:expr),* $(,)?]) => {{
        let set: &phylosample_core::SequenceSet = &$set;
        let mut expected: Vec<&str> = vec![$($id),*];
        expected.sort_unstable();
        let actual = set.ids();
        if actual != expected {
            panic!(
                "assert_ids! failed:\n  expected: {:?}\n  actual:   {:?}",
                expected, actual
            );
        }
    }};
}

/// Every record in `set` must have a resolved date or date range.
pub fn assert_all_dated(set: &SequenceSet) {
    for record in set.records() {
        assert!(
            record.date.is_resolved(),
            "record {:?} survived pruning without a date: {:?}",
            record.id,
            record.date
        );
    }
}

/// Every record must carry the transient scores written by subsampling.
pub fn assert_sampled(record: &SequenceRecord) {
    assert!(
        record.sampling.priority.is_some(),
        "record {:?} has no priority after subsampling",
        record.id
    );
    let factor = record
        .sampling
        .under_sampling
        .unwrap_or_else(|| panic!("record {:?} has no under_sampling", record.id));
    assert!(
        factor > 0.0 && factor <= 1.0,
        "under_sampling of {:?} out of range: {factor}",
        record.id
    );
}

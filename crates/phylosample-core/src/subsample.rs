//! Subsampler — reduces a sequence set to at most `threshold` records per
//! category, keeping the highest-priority records of each category.
//!
//! The three strategies (category, priority, threshold) are bundled in a
//! [`SubsampleConfig`]. Each slot has a default:
//!
//! | Slot | Default |
//! |------|---------|
//! | category | `(year, month)` of the resolved date, see [`date_category`] |
//! | priority | uniform random score, see [`random_priority`] |
//! | threshold | constant 5, see [`DEFAULT_THRESHOLD`] |

use crate::types::SequenceRecord;
use rand::{rngs::StdRng, Rng, SeedableRng};
use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;

/// Records kept per category when no threshold is configured.
pub const DEFAULT_THRESHOLD: i64 = 5;

/// Pseudo-attributes that [`trait_category`] reads from the resolved date when
/// the record has no attribute of that name.
const YEAR: &str = "year";
const MONTH: &str = "month";

// ---------------------------------------------------------------------------
// Category keys
// ---------------------------------------------------------------------------

/// Grouping key produced by the built-in category strategies.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CategoryKey {
    /// Year and month of the record's working date.
    YearMonth { year: i32, month: u32 },
    /// The record has no resolved date.
    Undated,
    /// Values of a list of attributes, in configuration order.
    Traits(Vec<Option<String>>),
}

impl fmt::Display for CategoryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CategoryKey::YearMonth { year, month } => write!(f, "{year}-{month:02}"),
            CategoryKey::Undated => write!(f, "undated"),
            CategoryKey::Traits(values) => {
                let parts: Vec<&str> = values
                    .iter()
                    .map(|v| v.as_deref().unwrap_or("?"))
                    .collect();
                write!(f, "{}", parts.join("/"))
            }
        }
    }
}

/// Default category: `(year, month)` of the working date.
pub fn date_category(record: &SequenceRecord) -> CategoryKey {
    match record.date.year_month() {
        Some((year, month)) => CategoryKey::YearMonth { year, month },
        None => CategoryKey::Undated,
    }
}

/// Category built from the values of `fields`. `year` and `month` fall back to
/// the working date when the record carries no such attribute.
pub fn trait_category(fields: Vec<String>) -> impl Fn(&SequenceRecord) -> CategoryKey {
    move |record| {
        let values = fields
            .iter()
            .map(|field| match record.attribute(field) {
                Some(value) => Some(value.to_string()),
                None => {
                    let (year, month) = record.date.year_month()?;
                    match field.as_str() {
                        YEAR => Some(year.to_string()),
                        MONTH => Some(month.to_string()),
                        _ => None,
                    }
                }
            })
            .collect();
        CategoryKey::Traits(values)
    }
}

// ---------------------------------------------------------------------------
// Priority
// ---------------------------------------------------------------------------

pub type CategoryFn<K> = Box<dyn Fn(&SequenceRecord) -> K>;
pub type PriorityFn = Box<dyn FnMut(&SequenceRecord) -> f64>;

/// Default priority: a uniform random score in `[0, 1)`. A seed makes the
/// sequence of scores reproducible.
pub fn random_priority(seed: Option<u64>) -> PriorityFn {
    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };
    Box::new(move |_| rng.random::<f64>())
}

/// Priority read from a numeric attribute. Records without a parseable value,
/// or with `NaN`, rank below every record that has one.
pub fn attribute_priority(field: String) -> impl FnMut(&SequenceRecord) -> f64 {
    move |record| {
        record
            .attribute(&field)
            .and_then(|v| v.trim().parse::<f64>().ok())
            .filter(|v| !v.is_nan())
            .unwrap_or(f64::NEG_INFINITY)
    }
}

// ---------------------------------------------------------------------------
// Threshold
// ---------------------------------------------------------------------------

/// Maximum number of records kept for a category. Zero or negative values
/// drop the whole category.
pub enum Threshold<K> {
    Constant(i64),
    PerCategory(Box<dyn Fn(&K) -> i64>),
}

impl<K> Threshold<K> {
    pub fn for_category(&self, category: &K) -> i64 {
        match self {
            Threshold::Constant(n) => *n,
            Threshold::PerCategory(f) => f(category),
        }
    }
}

impl<K> From<i64> for Threshold<K> {
    fn from(n: i64) -> Self {
        Threshold::Constant(n)
    }
}

impl<K> Default for Threshold<K> {
    fn default() -> Self {
        Threshold::Constant(DEFAULT_THRESHOLD)
    }
}

impl<K> fmt::Debug for Threshold<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Threshold::Constant(n) => f.debug_tuple("Constant").field(n).finish(),
            Threshold::PerCategory(_) => f.write_str("PerCategory(..)"),
        }
    }
}

// ---------------------------------------------------------------------------
// SubsampleConfig
// ---------------------------------------------------------------------------

/// Strategy bundle for [`subsample`].
pub struct SubsampleConfig<K = CategoryKey> {
    category: CategoryFn<K>,
    priority: PriorityFn,
    threshold: Threshold<K>,
}

impl Default for SubsampleConfig<CategoryKey> {
    fn default() -> Self {
        Self::new(date_category)
    }
}

impl<K> SubsampleConfig<K> {
    /// Group by `category`; priority and threshold take their defaults.
    pub fn new<F>(category: F) -> Self
    where
        F: Fn(&SequenceRecord) -> K + 'static,
    {
        Self {
            category: Box::new(category),
            priority: random_priority(None),
            threshold: Threshold::default(),
        }
    }

    pub fn with_priority<F>(mut self, priority: F) -> Self
    where
        F: FnMut(&SequenceRecord) -> f64 + 'static,
    {
        self.priority = Box::new(priority);
        self
    }

    /// Use the random default priority, seeded for reproducible runs.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.priority = random_priority(Some(seed));
        self
    }

    /// Same threshold for every category.
    pub fn with_threshold(mut self, threshold: i64) -> Self {
        self.threshold = Threshold::Constant(threshold);
        self
    }

    pub fn with_threshold_fn<F>(mut self, threshold: F) -> Self
    where
        F: Fn(&K) -> i64 + 'static,
    {
        self.threshold = Threshold::PerCategory(Box::new(threshold));
        self
    }

    pub fn threshold(&self) -> &Threshold<K> {
        &self.threshold
    }
}

impl<K> fmt::Debug for SubsampleConfig<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SubsampleConfig")
            .field("threshold", &self.threshold)
            .finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// Subsampling
// ---------------------------------------------------------------------------

/// Bookkeeping for one category.
#[derive(Debug, Clone, PartialEq)]
pub struct CategorySummary<K> {
    pub category: K,
    pub size: usize,
    pub threshold: i64,
    pub under_sampling: f64,
    pub kept: usize,
}

/// Outcome of a subsampling pass.
#[derive(Debug, Clone, PartialEq)]
pub struct SubsampleReport<K> {
    pub before: usize,
    pub after: usize,
    pub categories: Vec<CategorySummary<K>>,
}

/// `min(1.0, size / threshold)`; a non-positive threshold counts as saturated.
pub fn under_sampling(size: usize, threshold: i64) -> f64 {
    if threshold <= 0 {
        return 1.0;
    }
    (size as f64 / threshold as f64).min(1.0)
}

/// Partition `records` by category and keep the `threshold` highest-priority
/// records of each category.
///
/// Every record, kept or not, has its priority and its category's
/// under-sampling factor written to [`SequenceRecord::sampling`]. Ties in
/// priority are kept in bucket order.
pub fn subsample<K>(
    records: impl IntoIterator<Item = SequenceRecord>,
    config: &mut SubsampleConfig<K>,
) -> (HashMap<String, SequenceRecord>, SubsampleReport<K>)
where
    K: Hash + Eq + Clone,
{
    let mut index: HashMap<K, usize> = HashMap::new();
    let mut buckets: Vec<(K, Vec<(f64, SequenceRecord)>)> = Vec::new();
    let mut before = 0;

    for mut record in records {
        before += 1;
        let priority = (config.priority)(&record);
        record.sampling.priority = Some(priority);
        let category = (config.category)(&record);
        let slot = *index.entry(category.clone()).or_insert_with(|| {
            buckets.push((category, Vec::new()));
            buckets.len() - 1
        });
        buckets[slot].1.push((priority, record));
    }

    let mut kept = HashMap::new();
    let mut categories = Vec::with_capacity(buckets.len());

    for (category, mut bucket) in buckets {
        let threshold = config.threshold.for_category(&category);
        let factor = under_sampling(bucket.len(), threshold);
        for (_, record) in &mut bucket {
            record.sampling.under_sampling = Some(factor);
        }
        bucket.sort_by(|a, b| b.0.total_cmp(&a.0));

        let size = bucket.len();
        let take = usize::try_from(threshold).unwrap_or(0).min(size);
        kept.extend(
            bucket
                .into_iter()
                .take(take)
                .map(|(_, record)| (record.id.clone(), record)),
        );
        categories.push(CategorySummary {
            category,
            size,
            threshold,
            under_sampling: factor,
            kept: take,
        });
    }

    let report = SubsampleReport {
        before,
        after: kept.len(),
        categories,
    };
    (kept, report)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

//! Sequence set — the keyed working collection that every pipeline stage
//! mutates in place.
//!
//! Each stage that removes records replaces the map with a strict subset and
//! reports every removed id through a [`DropLog`].

use crate::dates::DateNormalizer;
use crate::drops::{DropLog, DUPLICATE_STRAIN, MISSING_DATE, MISSING_STRAIN, SUBSAMPLED};
use crate::error::{PipelineError, Result};
use crate::subsample::{self, SubsampleConfig, SubsampleReport};
use crate::types::{SequenceRecord, STRAIN};
use regex::Regex;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::hash::Hash;
use std::sync::LazyLock;

/// Characters replaced by `_` in header words.
static UNSAFE_NAME_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[ ()':]").expect("static regex is valid"));

/// Replace characters that are awkward in strain names with `_`.
pub fn fix_names(name: &str) -> String {
    UNSAFE_NAME_CHARS.replace_all(name, "_").into_owned()
}

/// Mapping from header word index to attribute name.
pub type HeaderFields = BTreeMap<usize, String>;

#[derive(Debug, Clone, Default)]
pub struct SequenceSet {
    segment: String,
    seqs: HashMap<String, SequenceRecord>,
    nstart: usize,
    /// Free-form entries merged into the top level of the output document.
    pub extras: serde_json::Map<String, serde_json::Value>,
}

impl SequenceSet {
    /// Build a set from loaded records, keyed by their current id. A later
    /// record with an id already seen replaces the earlier one.
    pub fn new(
        segment: impl Into<String>,
        records: impl IntoIterator<Item = SequenceRecord>,
    ) -> Self {
        let seqs: HashMap<String, SequenceRecord> =
            records.into_iter().map(|r| (r.id.clone(), r)).collect();
        let segment = segment.into();
        tracing::info!(segment = %segment, n = seqs.len(), "loaded sequences");
        Self {
            segment,
            nstart: seqs.len(),
            seqs,
            extras: serde_json::Map::new(),
        }
    }

    pub fn segment(&self) -> &str {
        &self.segment
    }

    /// Number of records the set started with.
    pub fn nstart(&self) -> usize {
        self.nstart
    }

    pub fn len(&self) -> usize {
        self.seqs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seqs.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&SequenceRecord> {
        self.seqs.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.seqs.contains_key(id)
    }

    pub fn records(&self) -> impl Iterator<Item = &SequenceRecord> {
        self.seqs.values()
    }

    /// Current ids, sorted.
    pub fn ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.seqs.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }

    /// Remove gap characters and upper-case every sequence.
    pub fn ungap(&mut self) {
        for record in self.seqs.values_mut() {
            record.seq = record
                .seq
                .chars()
                .filter(|&c| c != '-')
                .map(|c| c.to_ascii_uppercase())
                .collect();
        }
    }

    /// Split each description on `sep` and store the words named in `fields`
    /// as attributes, then re-key the set by strain name.
    ///
    /// Fails before touching any record if `fields` has no `strain` entry.
    /// Words equal to `""` or `"-"` are stored as empty strings. Records left
    /// without a strain, or whose strain is already taken, are dropped.
    pub fn parse_headers(
        &mut self,
        fields: &HeaderFields,
        sep: &str,
        log: &mut dyn DropLog,
    ) -> Result<()> {
        if !fields.values().any(|f| f == STRAIN) {
            return Err(PipelineError::MissingStrainField);
        }

        let mut rekeyed: HashMap<String, SequenceRecord> =
            HashMap::with_capacity(self.seqs.len());
        let mut records: Vec<SequenceRecord> = self.seqs.drain().map(|(_, r)| r).collect();
        records.sort_by(|a, b| a.id.cmp(&b.id));

        for mut record in records {
            let header = record.description.trim_start_matches('>').to_string();
            for (i, word) in header.split(sep).enumerate() {
                let Some(field) = fields.get(&i) else { continue };
                let value = match fix_names(word) {
                    v if v == "-" => String::new(),
                    v => v,
                };
                record.attributes.insert(field.clone(), value);
            }

            let strain = record.attribute(STRAIN).filter(|s| !s.is_empty());
            let Some(strain) = strain.map(str::to_string) else {
                log.drop_record(&record.id, &self.segment, MISSING_STRAIN);
                continue;
            };
            if rekeyed.contains_key(&strain) {
                log.drop_record(&record.id, &self.segment, DUPLICATE_STRAIN);
                continue;
            }
            record.id = strain.clone();
            rekeyed.insert(strain, record);
        }

        self.seqs = rekeyed;
        Ok(())
    }

    /// Normalise every record's date. With `prune`, records left without a
    /// resolved date are dropped as [`MISSING_DATE`]. Records resolved by an
    /// earlier call keep their date.
    pub fn parse_dates(
        &mut self,
        normalizer: &DateNormalizer,
        prune: bool,
        log: &mut dyn DropLog,
    ) {
        for record in self.seqs.values_mut() {
            normalizer.normalize(record);
        }
        if prune {
            self.filter_seqs(MISSING_DATE, |r| r.date.is_resolved(), log);
        }
    }

    /// Keep only the records satisfying `keep`; every removed id is reported
    /// with `reason`.
    pub fn filter_seqs<F>(&mut self, reason: &str, keep: F, log: &mut dyn DropLog)
    where
        F: Fn(&SequenceRecord) -> bool,
    {
        let (kept, dropped): (HashMap<_, _>, HashMap<_, _>) =
            self.seqs.drain().partition(|(_, r)| keep(r));
        self.seqs = kept;

        let mut names: Vec<String> = dropped.into_keys().collect();
        names.sort_unstable();
        for name in names {
            log.drop_record(&name, &self.segment, reason);
        }
    }

    /// Reduce the set with `config`; every removed id is reported as
    /// [`SUBSAMPLED`].
    pub fn subsample<K>(
        &mut self,
        config: &mut SubsampleConfig<K>,
        log: &mut dyn DropLog,
    ) -> SubsampleReport<K>
    where
        K: Hash + Eq + Clone,
    {
        let names_prior: HashSet<String> = self.seqs.keys().cloned().collect();
        // Priorities are drawn in id order.
        let mut records: Vec<SequenceRecord> = self.seqs.drain().map(|(_, r)| r).collect();
        records.sort_by(|a, b| a.id.cmp(&b.id));
        let (kept, report) = subsample::subsample(records, config);
        self.seqs = kept;

        log.notify(&format!(
            "Subsampling segment {}. n={} -> {}",
            self.segment, report.before, report.after
        ));
        let mut names: Vec<&String> = names_prior
            .iter()
            .filter(|name| !self.seqs.contains_key(*name))
            .collect();
        names.sort_unstable();
        for name in names {
            log.drop_record(name, &self.segment, SUBSAMPLED);
        }
        report
    }

    /// Distinct values of `trait_name` across records that carry it.
    pub fn trait_values(&self, trait_name: &str) -> BTreeSet<String> {
        self.seqs
            .values()
            .filter_map(|r| r.attribute(trait_name))
            .map(str::to_string)
            .collect()
    }

    pub(crate) fn seqs(&self) -> &HashMap<String, SequenceRecord> {
        &self.seqs
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

//! Loads input records and runs every stage of a [`SequenceSet`] in order.

use anyhow::Context;
use phylosample_core::config::Settings;
use phylosample_core::{CategoryKey, DropLog, SequenceRecord, SequenceSet, SubsampleReport};
use serde::Deserialize;
use std::io::Read;
use std::path::Path;

/// One already-split input record. `description` defaults to `name`.
#[derive(Debug, Clone, Deserialize)]
pub struct InputRecord {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub seq: String,
}

impl From<InputRecord> for SequenceRecord {
    fn from(input: InputRecord) -> Self {
        let description = input.description.unwrap_or_else(|| input.name.clone());
        SequenceRecord::new(input.name, input.seq).with_description(description)
    }
}

/// Read a JSON array of [`InputRecord`]s.
pub fn read_records<R: Read>(reader: R) -> anyhow::Result<Vec<SequenceRecord>> {
    let inputs: Vec<InputRecord> =
        serde_json::from_reader(reader).context("input is not a JSON array of records")?;
    Ok(inputs.into_iter().map(SequenceRecord::from).collect())
}

pub fn load_records(path: &Path) -> anyhow::Result<Vec<SequenceRecord>> {
    let file = std::fs::File::open(path)
        .with_context(|| format!("could not open {}", path.display()))?;
    read_records(std::io::BufReader::new(file))
        .with_context(|| format!("could not load sequences from {}", path.display()))
}

/// The finished set plus the subsampling bookkeeping.
#[derive(Debug)]
pub struct PipelineOutcome {
    pub set: SequenceSet,
    pub report: SubsampleReport<CategoryKey>,
}

/// Run headers → ungap → dates → subsample over `records`.
pub fn run(
    settings: &Settings,
    records: Vec<SequenceRecord>,
    log: &mut dyn DropLog,
) -> anyhow::Result<PipelineOutcome> {
    settings.validate().context("invalid configuration")?;
    let fields = settings.header_fields()?;

    let mut set = SequenceSet::new(settings.segment.clone(), records);
    log.notify(&format!("Loaded {} sequences", set.nstart()));

    set.parse_headers(&fields, &settings.header.separator, log)?;
    set.ungap();
    set.parse_dates(&settings.date_normalizer(), settings.dates.prune, log);

    let mut config = settings.subsample_config();
    let report = set.subsample(&mut config, log);
    for category in &report.categories {
        tracing::debug!(
            category = %category.category,
            size = category.size,
            kept = category.kept,
            under_sampling = category.under_sampling,
            "category sampled"
        );
    }

    Ok(PipelineOutcome { set, report })
}

//! Export — the structured output document for a finished [`SequenceSet`].
//!
//! Typed dates and transient sampling scores are not written; the original
//! date string survives as the `raw_date` attribute.

use crate::collection::SequenceSet;
use crate::error::Result;
use crate::types::DATE;
use serde::Serialize;
use std::collections::BTreeMap;
use std::io::Write;

/// Top-level output document.
#[derive(Debug, Clone, Serialize)]
pub struct SequenceDocument {
    #[serde(flatten)]
    pub extras: serde_json::Map<String, serde_json::Value>,
    pub info: DocumentInfo,
    pub sequences: BTreeMap<String, DocumentSequence>,
}

/// `info` block with summary counts.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DocumentInfo {
    pub segment: String,
    #[serde(rename = "n(starting)")]
    pub n_starting: usize,
    #[serde(rename = "n(final)")]
    pub n_final: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input_file: Option<String>,
}

/// One entry of the `sequences` map.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DocumentSequence {
    pub attributes: BTreeMap<String, String>,
    pub seq: String,
}

impl SequenceSet {
    /// Build the output document. `input_file` is recorded in `info` when given.
    pub fn to_document(&self, input_file: Option<&str>) -> SequenceDocument {
        let sequences = self
            .seqs()
            .iter()
            .map(|(id, record)| {
                let mut attributes = record.attributes.clone();
                attributes.remove(DATE);
                (
                    id.clone(),
                    DocumentSequence {
                        attributes,
                        seq: record.seq.clone(),
                    },
                )
            })
            .collect();

        SequenceDocument {
            extras: self.extras.clone(),
            info: DocumentInfo {
                segment: self.segment().to_string(),
                n_starting: self.nstart(),
                n_final: self.len(),
                input_file: input_file.map(str::to_string),
            },
            sequences,
        }
    }

    /// Serialise [`SequenceSet::to_document`] as pretty-printed JSON.
    pub fn write_json<W: Write>(&self, writer: W, input_file: Option<&str>) -> Result<()> {
        serde_json::to_writer_pretty(writer, &self.to_document(input_file))?;
        Ok(())
    }
}

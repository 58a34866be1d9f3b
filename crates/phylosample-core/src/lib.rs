//! phylosample-core — date normalisation and category-balanced subsampling
//! of sequence sets.
//!
//! This crate exposes the pipeline stages as public modules, plus the shared
//! types used across all stages.
//!
//! # Architecture
//!
//! ```text
//! loader ──► SequenceSet ──► parse_headers ──► parse_dates ──► subsample ──► export
//!                 │                                 │              │
//!                 └──────────── DropLog ◄───────────┴──────────────┘
//! ```
//!
//! Everything runs synchronously on the caller's thread. The set is owned by
//! the caller between stages.

pub mod collection;
pub mod config;
pub mod dates;
pub mod drops;
pub mod error;
pub mod export;
pub mod subsample;
pub mod types;

pub use collection::{HeaderFields, SequenceSet};
pub use dates::{DateFormat, DateNormalizer};
pub use drops::{DropLog, DropRecorder, TracingDropLog};
pub use error::{PipelineError, Result};
pub use subsample::{CategoryKey, SubsampleConfig, SubsampleReport, Threshold};
pub use types::{NumDate, RecordDate, SamplingState, SequenceRecord};

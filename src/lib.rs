//! phylosample — turn an unevenly sampled sequence dump into a balanced
//! dataset for phylogenetic analysis.
//!
//! The root crate re-exports [`phylosample_core`] and adds the [`pipeline`]
//! module, which loads pre-split records and drives every stage in order, so
//! that integration tests and the binary share one code path.
//!
//! # Architecture
//!
//! ```text
//! records.json ──► headers ──► ungap ──► dates (+prune) ──► subsample ──► document
//! ```

pub mod pipeline;

pub use phylosample_core::*;

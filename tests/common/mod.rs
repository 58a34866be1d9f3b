//! Shared test utilities for phylosample integration harnesses.
//!
//! Import everything you need via `mod common; use common::*;` at the top of
//! each harness file. Every helper is deterministic: dates are fixed, random
//! priorities are seeded or replaced by a score attribute.

pub mod assertions;
pub mod builders;
pub mod fixtures;

pub use assertions::*;
pub use builders::*;
pub use fixtures::*;

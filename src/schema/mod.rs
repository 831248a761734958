//! Upstream history schema
//!
//! Loosely-typed record collections as they arrive from the data service, plus
//! a validation pass that reports malformed records without rejecting them.

mod raw_history;
mod validation;

pub use raw_history::*;
pub use validation::*;

//! Per-source summaries and their reconciliation.
//!
//! Price and carbon series are summarized independently, carbon shift savings
//! are estimated from whichever resolution is available, and the results are
//! merged into one record per country.

pub mod carbon;
pub mod estimators;
pub mod merge;
pub mod prices;
pub mod types;
pub mod utility;

//! Flexibility-value data pipeline.
//!
//! Turns wholesale price and carbon-intensity exports into per-country
//! summaries of how much shifting demand out of peak hours is worth.

pub mod analyzers;
pub mod calculator;
pub mod grouping;
pub mod output;
pub mod pipeline;
pub mod reader;
pub mod reference;
pub mod stats;

//! tabprep: Tabular Data Preparation Library
//!
//! Mutation-tracked cleaning of tabular datasets, statistical outlier
//! flagging and random forest feature ranking.

pub mod cli;
pub mod error;
pub mod pipeline;
pub mod report;
pub mod utils;

pub use error::{PrepError, Result};

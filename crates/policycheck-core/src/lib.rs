//! policycheck-core
//!
//! Shared domain types, configuration, chunking and the static rule catalog
//! used by the index, judge and evaluation crates.
#![deny(warnings)]
#![deny(dead_code)]
#![deny(unused_variables)]
#![deny(unused_imports)]

pub mod config;
pub mod data_processor;
pub mod error;
pub mod rules;
pub mod samples;
pub mod traits;
pub mod types;

pub use error::{Error, JudgeError, Result};

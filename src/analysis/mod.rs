//! Analysis and result aggregation modules
//!
//! Packages the pipeline outputs into the final result:
//! - Result types and rounding
//! - Metadata and flags
//! - Confidence scoring

pub mod confidence;
pub mod metadata;
pub mod result;

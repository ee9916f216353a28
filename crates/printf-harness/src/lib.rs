//! Conformance testing harness for printf-core.
//!
//! This crate provides:
//! - Argument specs: build typed argument lists from `kind:value` text
//! - Section records: serializable views of decoded format sections
//! - Fixtures: JSON sets of format strings with their expected sections
//! - Runner: decode every fixture case and diff against expectations
//! - Structured logging: JSONL event records for decode and verify runs

#![forbid(unsafe_code)]

pub mod args;
pub mod decode;
pub mod fixtures;
pub mod runner;
pub mod structured_log;

pub use args::{ArgPack, ArgSpecError};
pub use decode::{SectionRecord, decode_sections};
pub use fixtures::{FixtureCase, FixtureError, FixtureSet};
pub use runner::{TestRunner, VerificationResult, VerificationSummary};

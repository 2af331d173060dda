//! Tooling harness for the homehosts backend.
//!
//! This crate provides:
//! - Lookups: run one query against a hosts file and decode the packed result
//! - Fixture verify: replay JSON fixture cases through the engine
//! - Structured logging: JSONL records for every lookup and fixture case
//! - Buffer dumps: hex/ASCII view of a packed `hostent` buffer

#![forbid(unsafe_code)]

pub mod dump;
pub mod error;
pub mod fixtures;
pub mod runner;
pub mod structured_log;

pub use error::HarnessError;
pub use fixtures::{FixtureCase, FixtureSet};
pub use runner::{LookupOutcome, TestRunner, VerificationResult, VerifyReport};

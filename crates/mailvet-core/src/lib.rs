//! # mailvet-core
//!
//! Core logic for the `mailvet` bulk email validator.
//!
//! This crate provides:
//! - Address extraction from free-form text
//! - Offline syntax and structure classification with typo suggestions
//! - Batched, concurrency-limited calls to a deliverability service
//! - Merging of offline and remote verdicts into final outcomes
//! - A TTL and capacity bounded result cache persisted to `SQLite`
//! - Filtering, statistics and CSV export of a result set

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

pub mod cache;
mod error;
pub mod report;
pub mod service;
pub mod storage;
pub mod validate;
pub mod verifier;

pub use cache::{CacheConfig, CacheEntry, LoadStatus, ResultCache};
pub use error::{Error, Result};
pub use report::{ExportScope, ResultFilter, Summary, to_csv};
pub use service::{
    BatchScheduler, Pipeline, PipelineConfig, Progress, RunSummary, ScheduleMode, ScheduleReport,
    SchedulerConfig,
};
pub use storage::{MemoryStorage, SqliteStorage, Storage};
pub use validate::{
    ExtractMode, Outcome, OutcomeStatus, RiskLevel, SyntaxVerdict, VerifierVerdict, classify,
    extract, merge,
};
pub use verifier::{HttpVerifier, Verifier, VerifierConfig, VerifyError};

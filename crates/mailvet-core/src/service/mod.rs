//! Validation services.
//!
//! This module provides the asynchronous layer that bridges the offline
//! checks with the deliverability service and the result cache.

pub mod pipeline;
pub mod scheduler;

pub use pipeline::{Pipeline, PipelineConfig, RunSummary};
pub use scheduler::{
    BatchScheduler, Progress, REASON_SERVER_ERROR, REASON_VERIFIER_UNAVAILABLE, ScheduleMode,
    ScheduleReport, SchedulerConfig, partition,
};

//! Command-line arguments.

use std::path::PathBuf;

use clap::Parser;
use mailvet_core::verifier::MAX_REQUEST_ADDRESSES;
use mailvet_core::{
    ExportScope, ExtractMode, PipelineConfig, ResultFilter, ScheduleMode, SchedulerConfig,
};
use tracing::warn;

use crate::settings::Settings;

/// Validate a list of email addresses against a deliverability service.
#[derive(Debug, Parser)]
#[command(name = "mailvet", author, version, about, long_about = None)]
pub struct Cli {
    /// File with addresses to validate (reads stdin when omitted)
    pub file: Option<PathBuf>,

    /// How addresses are picked out of the input: scan or tokens
    #[arg(long, default_value = "scan")]
    pub mode: ExtractMode,

    /// Only show outcomes of this kind: all, valid, deliverable or invalid
    #[arg(long, default_value = "all")]
    pub filter: ResultFilter,

    /// Only show addresses containing this text
    #[arg(long)]
    pub search: Option<String>,

    /// Write results as CSV to this file or directory
    #[arg(long)]
    pub export: Option<PathBuf>,

    /// Which outcomes the export contains: all or valid
    #[arg(long, default_value = "all")]
    pub export_scope: ExportScope,

    /// Empty the result cache before validating
    #[arg(long)]
    pub clear_cache: bool,

    /// Answer addresses with a fresh cached outcome without asking the service
    #[arg(long)]
    pub reuse_cached: bool,

    /// Deliverability service base URL
    #[arg(long)]
    pub backend_url: Option<String>,

    /// Bearer token for the deliverability service
    #[arg(long, env = "MAILVET_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Addresses per request, at most 1000
    #[arg(long)]
    pub batch_size: Option<usize>,

    /// Requests in flight
    #[arg(long)]
    pub concurrency: Option<usize>,

    /// Start a new request as soon as any finishes instead of in waves
    #[arg(long)]
    pub sliding: bool,

    /// Persist the effective settings
    #[arg(long)]
    pub save_settings: bool,
}

impl Cli {
    /// Applies command-line overrides to the stored settings.
    pub fn apply(&self, settings: &mut Settings) {
        if let Some(url) = &self.backend_url {
            settings.backend_url.clone_from(url);
        }
        if let Some(size) = self.batch_size {
            settings.batch_size = size;
        }
        if let Some(concurrency) = self.concurrency {
            settings.concurrency = concurrency;
        }
    }

    /// Pipeline configuration for this invocation.
    pub fn pipeline_config(&self, settings: &Settings) -> PipelineConfig {
        let mode = if self.sliding {
            ScheduleMode::SlidingWindow
        } else {
            ScheduleMode::Waves
        };
        let batch_size = if settings.batch_size > MAX_REQUEST_ADDRESSES {
            warn!(
                "Batch size {} exceeds the service limit, using {}",
                settings.batch_size, MAX_REQUEST_ADDRESSES
            );
            MAX_REQUEST_ADDRESSES
        } else {
            settings.batch_size
        };
        PipelineConfig::new()
            .extract_mode(self.mode)
            .reuse_cached(self.reuse_cached)
            .scheduler(
                SchedulerConfig::new()
                    .batch_size(batch_size)
                    .concurrency(settings.concurrency)
                    .mode(mode),
            )
    }
}

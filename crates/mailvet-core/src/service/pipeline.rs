//! End-to-end validation of pasted text.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use super::scheduler::{BatchScheduler, Progress, ScheduleReport, SchedulerConfig};
use crate::Result;
use crate::cache::ResultCache;
use crate::storage::Storage;
use crate::validate::{
    ExtractMode, Outcome, SyntaxVerdict, classify, extract_with, merge, unique,
};
use crate::verifier::Verifier;

/// Pipeline configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PipelineConfig {
    /// How candidates are extracted from the input.
    pub extract_mode: ExtractMode,
    /// Batch scheduling.
    pub scheduler: SchedulerConfig,
    /// Skip verification for addresses with a fresh cached outcome.
    pub reuse_cached: bool,
}

impl PipelineConfig {
    /// Creates a configuration with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the extraction mode.
    #[must_use]
    pub fn extract_mode(mut self, mode: ExtractMode) -> Self {
        self.extract_mode = mode;
        self
    }

    /// Sets the scheduler configuration.
    #[must_use]
    pub fn scheduler(mut self, scheduler: SchedulerConfig) -> Self {
        self.scheduler = scheduler;
        self
    }

    /// Enables or disables reuse of cached outcomes.
    #[must_use]
    pub fn reuse_cached(mut self, reuse: bool) -> Self {
        self.reuse_cached = reuse;
        self
    }
}

/// Statistics for one validation run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Unique candidates extracted.
    pub extracted: usize,
    /// Candidates that passed the offline checks.
    pub syntax_passed: usize,
    /// Addresses sent to the verifier.
    pub verified: usize,
    /// Batches whose verifier call failed.
    pub failed_batches: usize,
    /// Failed batches the service refused as unauthorized.
    pub unauthorized_batches: usize,
    /// Addresses answered from the cache.
    pub cache_hits: usize,
    /// Wall-clock duration of the run.
    pub elapsed: Duration,
}

impl RunSummary {
    /// Terminal notification text for the run.
    #[must_use]
    pub fn message(&self) -> String {
        if self.extracted == 0 {
            "Please enter some emails to validate".to_string()
        } else {
            format!(
                "Validated {} emails in {}ms",
                self.extracted,
                self.elapsed.as_millis()
            )
        }
    }
}

/// Extract → classify → verify → merge → cache.
///
/// The pipeline owns the result cache and writes it once per run, after all
/// outcomes are known.
#[derive(Debug)]
pub struct Pipeline<V, S> {
    verifier: Arc<V>,
    cache: ResultCache<S>,
    scheduler: BatchScheduler,
    config: PipelineConfig,
}

impl<V: Verifier, S: Storage> Pipeline<V, S> {
    /// Creates a pipeline.
    #[must_use]
    pub fn new(verifier: V, cache: ResultCache<S>, config: PipelineConfig) -> Self {
        Self::with_shared_verifier(Arc::new(verifier), cache, config)
    }

    /// Creates a pipeline around a verifier that is also used elsewhere.
    #[must_use]
    pub fn with_shared_verifier(
        verifier: Arc<V>,
        cache: ResultCache<S>,
        config: PipelineConfig,
    ) -> Self {
        Self {
            verifier,
            cache,
            scheduler: BatchScheduler::new(config.scheduler),
            config,
        }
    }

    /// Returns the configuration.
    #[must_use]
    pub const fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Returns the verifier.
    #[must_use]
    pub fn verifier(&self) -> &V {
        &self.verifier
    }

    /// Returns the result cache.
    #[must_use]
    pub const fn cache(&self) -> &ResultCache<S> {
        &self.cache
    }

    /// Empties the result cache, including its persisted copy.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage backend fails.
    pub async fn clear_cache(&mut self) -> Result<()> {
        self.cache.clear().await?;
        info!("Validation cache cleared");
        Ok(())
    }

    /// Validates every address found in `raw_text`.
    ///
    /// Never fails. Outcomes come back in extraction order.
    pub async fn validate(&mut self, raw_text: &str) -> Vec<Outcome> {
        self.validate_with_progress(raw_text, &mut |_| {}).await.0
    }

    /// Validates `raw_text`, reporting progress after every batch.
    pub async fn validate_with_progress(
        &mut self,
        raw_text: &str,
        on_progress: &mut (dyn FnMut(&Progress) + Send),
    ) -> (Vec<Outcome>, RunSummary) {
        let addresses = extract_with(raw_text, self.config.extract_mode);
        self.validate_addresses(&addresses, on_progress).await
    }

    /// Validates a list of addresses, skipping extraction.
    ///
    /// Addresses are normalized and deduplicated first, so outcomes come back
    /// lower-cased and once per distinct address.
    pub async fn validate_addresses(
        &mut self,
        candidates: &[String],
        on_progress: &mut (dyn FnMut(&Progress) + Send),
    ) -> (Vec<Outcome>, RunSummary) {
        let started = Instant::now();
        let addresses = unique(candidates.iter().map(String::as_str));
        let mut summary = RunSummary {
            extracted: addresses.len(),
            ..RunSummary::default()
        };

        if addresses.is_empty() {
            warn!("{}", summary.message());
            return (Vec::new(), summary);
        }

        let syntax: Vec<SyntaxVerdict> = addresses.iter().map(|a| classify(a)).collect();
        let passed: Vec<&String> = syntax
            .iter()
            .filter(|verdict| verdict.format_valid)
            .map(|verdict| &verdict.address)
            .collect();
        summary.syntax_passed = passed.len();

        let mut cached: HashMap<String, Outcome> = HashMap::new();
        let mut to_verify = Vec::with_capacity(passed.len());
        for address in passed {
            match self.cached_outcome(address) {
                Some(outcome) => {
                    cached.insert(address.clone(), outcome);
                }
                None => to_verify.push(address.clone()),
            }
        }
        summary.cache_hits = cached.len();
        summary.verified = to_verify.len();

        let report = if to_verify.is_empty() {
            debug!("Nothing to verify remotely");
            ScheduleReport::default()
        } else {
            self.scheduler
                .run_detailed(&to_verify, Arc::clone(&self.verifier), on_progress)
                .await
        };
        summary.failed_batches = report.failed_batches;
        summary.unauthorized_batches = report.unauthorized_batches;

        let mut outcomes = merge(&syntax, &report.verdicts);
        for outcome in &mut outcomes {
            match cached.remove(&outcome.address) {
                Some(hit) => *outcome = hit,
                None => self.cache.put(outcome.address.clone(), outcome.clone()),
            }
        }

        if let Err(e) = self.cache.save_to_storage().await {
            warn!("Failed to save validation cache: {}", e);
        }

        summary.elapsed = started.elapsed();
        info!(
            "{} ({} passed syntax, {} verified, {} cached, {} failed batches)",
            summary.message(),
            summary.syntax_passed,
            summary.verified,
            summary.cache_hits,
            summary.failed_batches
        );
        (outcomes, summary)
    }

    fn cached_outcome(&self, address: &str) -> Option<Outcome> {
        if !self.config.reuse_cached {
            return None;
        }
        self.cache.get(address).cloned()
    }
}

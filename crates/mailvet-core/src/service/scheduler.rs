//! Concurrency-bounded batch verification.
//!
//! Addresses are split into fixed-size batches and handed to a [`Verifier`]
//! with at most `concurrency` batches in flight. A batch that fails never
//! fails the run: its addresses receive synthesized failing verdicts.
//!
//! Two scheduling modes are available:
//!
//! - [`ScheduleMode::Waves`] launches up to `concurrency` batches and waits
//!   for all of them before launching the next group.
//! - [`ScheduleMode::SlidingWindow`] launches a new batch as soon as any
//!   in-flight batch completes.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::task::JoinSet;
use tracing::{debug, warn};

use crate::validate::{VerifierVerdict, normalize};
use crate::verifier::{Verifier, VerifyError};

/// Default number of addresses per batch.
pub const DEFAULT_BATCH_SIZE: usize = 50;

/// Default number of batches in flight.
pub const DEFAULT_CONCURRENCY: usize = 3;

/// Reason given to every address of a batch whose call failed.
pub const REASON_SERVER_ERROR: &str = "Server error - try again";

/// Reason given to an address the verifier left unanswered.
pub const REASON_VERIFIER_UNAVAILABLE: &str = "verifier unavailable";

/// How batches are launched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScheduleMode {
    /// Groups of `concurrency` batches, each group fully resolved before the next.
    #[default]
    Waves,
    /// Keep `concurrency` batches in flight at all times.
    SlidingWindow,
}

/// Scheduler configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchedulerConfig {
    /// Addresses per batch.
    pub batch_size: usize,
    /// Maximum batches in flight.
    pub concurrency: usize,
    /// Launch strategy.
    pub mode: ScheduleMode,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            concurrency: DEFAULT_CONCURRENCY,
            mode: ScheduleMode::Waves,
        }
    }
}

impl SchedulerConfig {
    /// Creates a configuration with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the batch size. Zero is treated as one.
    #[must_use]
    pub fn batch_size(mut self, size: usize) -> Self {
        self.batch_size = size.max(1);
        self
    }

    /// Sets the concurrency ceiling. Zero is treated as one.
    #[must_use]
    pub fn concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Sets the scheduling mode.
    #[must_use]
    pub fn mode(mut self, mode: ScheduleMode) -> Self {
        self.mode = mode;
        self
    }
}

/// Progress notification sent after each batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Progress {
    /// Addresses with a verdict so far.
    pub completed: usize,
    /// Addresses in the run.
    pub total: usize,
    /// Human-readable status.
    pub message: String,
}

impl Progress {
    /// Completion percentage, rounded down.
    #[must_use]
    pub fn percent(&self) -> usize {
        if self.total == 0 {
            100
        } else {
            self.completed * 100 / self.total
        }
    }
}

/// Result of a scheduler run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScheduleReport {
    /// One verdict per input address, grouped by batch in scheduling order.
    pub verdicts: Vec<VerifierVerdict>,
    /// Number of batches.
    pub batches: usize,
    /// Number of batches whose call failed.
    pub failed_batches: usize,
    /// Failed batches the service answered with 401.
    pub unauthorized_batches: usize,
}

/// Splits addresses into contiguous batches; the last may be shorter.
#[must_use]
pub fn partition(addresses: &[String], batch_size: usize) -> Vec<Vec<String>> {
    addresses
        .chunks(batch_size.max(1))
        .map(<[String]>::to_vec)
        .collect()
}

/// Runs batches through a verifier under a concurrency ceiling.
#[derive(Debug, Clone, Default)]
pub struct BatchScheduler {
    config: SchedulerConfig,
}

type BatchResult = (usize, Result<Vec<VerifierVerdict>, VerifyError>);

/// Mutable bookkeeping for one run.
struct RunState<'a> {
    batches: Vec<Vec<String>>,
    results: Vec<Option<Vec<VerifierVerdict>>>,
    completed: usize,
    total: usize,
    failed: usize,
    unauthorized: usize,
    on_progress: &'a mut (dyn FnMut(&Progress) + Send),
}

impl RunState<'_> {
    fn settle(&mut self, index: usize, result: Result<Vec<VerifierVerdict>, VerifyError>) {
        let batch = &self.batches[index];
        let verdicts = match result {
            Ok(verdicts) => reconcile(batch, verdicts),
            Err(e) => {
                warn!("Batch {} of {} failed: {}", index + 1, self.batches.len(), e);
                self.failed += 1;
                if e.is_unauthorized() {
                    self.unauthorized += 1;
                }
                synthesize(batch, REASON_SERVER_ERROR)
            }
        };
        self.completed += batch.len();
        self.results[index] = Some(verdicts);

        (self.on_progress)(&Progress {
            completed: self.completed,
            total: self.total,
            message: format!("Processing batch {}/{}", index + 1, self.batches.len()),
        });
    }

    /// Settles launched batches whose task died without reporting back.
    fn settle_lost(&mut self, launched: usize) {
        for index in 0..launched {
            if self.results[index].is_none() {
                self.settle(
                    index,
                    Err(VerifyError::Unavailable("verification task aborted".into())),
                );
            }
        }
    }
}

impl BatchScheduler {
    /// Creates a scheduler.
    #[must_use]
    pub fn new(config: SchedulerConfig) -> Self {
        Self {
            config: SchedulerConfig {
                batch_size: config.batch_size.max(1),
                concurrency: config.concurrency.max(1),
                mode: config.mode,
            },
        }
    }

    /// Returns the configuration.
    #[must_use]
    pub const fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    /// Verifies all addresses and returns one verdict per address.
    ///
    /// Verdicts are grouped by batch in scheduling order; callers should key
    /// them by address rather than rely on position.
    pub async fn run<V: Verifier>(
        &self,
        addresses: &[String],
        verifier: Arc<V>,
        on_progress: &mut (dyn FnMut(&Progress) + Send),
    ) -> Vec<VerifierVerdict> {
        self.run_detailed(addresses, verifier, on_progress)
            .await
            .verdicts
    }

    /// Like [`Self::run`], also reporting batch statistics.
    pub async fn run_detailed<V: Verifier>(
        &self,
        addresses: &[String],
        verifier: Arc<V>,
        on_progress: &mut (dyn FnMut(&Progress) + Send),
    ) -> ScheduleReport {
        let batches = partition(addresses, self.config.batch_size);
        let count = batches.len();
        debug!(
            "Verifying {} addresses in {} batches ({} in flight, {:?})",
            addresses.len(),
            count,
            self.config.concurrency,
            self.config.mode
        );

        let mut state = RunState {
            results: vec![None; count],
            batches,
            completed: 0,
            total: addresses.len(),
            failed: 0,
            unauthorized: 0,
            on_progress,
        };

        let mut tasks: JoinSet<BatchResult> = JoinSet::new();
        let mut next = 0;

        loop {
            let may_launch = match self.config.mode {
                ScheduleMode::Waves => tasks.is_empty(),
                ScheduleMode::SlidingWindow => true,
            };
            if may_launch {
                while next < count && tasks.len() < self.config.concurrency {
                    let batch = state.batches[next].clone();
                    let verifier = Arc::clone(&verifier);
                    let index = next;
                    tasks.spawn(async move { (index, verifier.verify(batch).await) });
                    next += 1;
                }
            }

            let Some(joined) = tasks.join_next().await else {
                break;
            };
            match joined {
                Ok((index, result)) => state.settle(index, result),
                Err(e) => warn!("Verification task failed: {}", e),
            }

            if tasks.is_empty() {
                state.settle_lost(next);
            }
        }

        let failed_batches = state.failed;
        let unauthorized_batches = state.unauthorized;
        let verdicts = state.results.into_iter().flatten().flatten().collect();
        ScheduleReport {
            verdicts,
            batches: count,
            failed_batches,
            unauthorized_batches,
        }
    }
}

/// Synthesizes failing verdicts for every address of a batch.
fn synthesize(batch: &[String], reason: &str) -> Vec<VerifierVerdict> {
    batch
        .iter()
        .map(|address| VerifierVerdict::failed(address.clone(), reason))
        .collect()
}

/// Matches service verdicts to the batch, one per requested address.
///
/// Verdicts for addresses that were not requested are dropped; requested
/// addresses without a verdict are marked unavailable.
fn reconcile(batch: &[String], verdicts: Vec<VerifierVerdict>) -> Vec<VerifierVerdict> {
    let mut by_address: HashMap<String, VerifierVerdict> = HashMap::with_capacity(verdicts.len());
    for verdict in verdicts {
        by_address.entry(normalize(&verdict.address)).or_insert(verdict);
    }

    batch
        .iter()
        .map(|address| match by_address.remove(address) {
            Some(mut verdict) => {
                verdict.address.clone_from(address);
                verdict
            }
            None => VerifierVerdict::failed(address.clone(), REASON_VERIFIER_UNAVAILABLE),
        })
        .collect()
}

//! End-to-end tests for the validation pipeline.
//!
//! These tests drive the pipeline with a scripted verifier and real
//! storage backends, without a running deliverability service.

#![allow(clippy::unwrap_used)]

use std::collections::HashSet;
use std::sync::Mutex;

use mailvet_core::report::{ExportScope, to_csv};
use mailvet_core::{
    CacheConfig, ExtractMode, LoadStatus, MemoryStorage, Pipeline, PipelineConfig, ResultCache,
    RiskLevel, ScheduleMode, SchedulerConfig, SqliteStorage, Summary, Verifier, VerifierVerdict,
    VerifyError,
};

/// Verifier that answers from a script and records every batch it sees.
#[derive(Default)]
struct ScriptedVerifier {
    /// Addresses reported deliverable. Everything else is valid only, with
    /// no reason of its own.
    deliverable: HashSet<String>,
    /// Batches containing this address fail as a whole.
    poison: Option<String>,
    /// Batches received, in call order.
    seen: Mutex<Vec<Vec<String>>>,
}

impl ScriptedVerifier {
    fn deliverable(addresses: &[&str]) -> Self {
        Self {
            deliverable: addresses.iter().map(ToString::to_string).collect(),
            ..Self::default()
        }
    }

    fn poisoned(address: &str) -> Self {
        Self {
            poison: Some(address.to_string()),
            ..Self::default()
        }
    }

    fn batches(&self) -> Vec<Vec<String>> {
        self.seen.lock().unwrap().clone()
    }
}

impl Verifier for ScriptedVerifier {
    async fn verify(&self, batch: Vec<String>) -> Result<Vec<VerifierVerdict>, VerifyError> {
        self.seen.lock().unwrap().push(batch.clone());
        if self.poison.as_ref().is_some_and(|p| batch.contains(p)) {
            return Err(VerifyError::status(503, "Service Unavailable"));
        }
        Ok(batch
            .into_iter()
            .map(|address| {
                let deliverable = self.deliverable.contains(&address);
                VerifierVerdict {
                    address,
                    deliverable,
                    valid: true,
                    reason: if deliverable {
                        "Mailbox Verified".into()
                    } else {
                        String::new()
                    },
                }
            })
            .collect())
    }
}

fn memory_pipeline(
    verifier: ScriptedVerifier,
    config: PipelineConfig,
) -> Pipeline<ScriptedVerifier, MemoryStorage> {
    let cache = ResultCache::new(MemoryStorage::new(), CacheConfig::default());
    Pipeline::new(verifier, cache, config)
}

const PASTED: &str = "A@B.com, A@b.com\nbad-email\nuser@gmail.co";

#[tokio::test]
async fn test_pasted_list_in_token_mode() {
    let config = PipelineConfig::new().extract_mode(ExtractMode::Tokens);
    let mut pipeline = memory_pipeline(ScriptedVerifier::deliverable(&["a@b.com"]), config);

    let outcomes = pipeline.validate(PASTED).await;

    let addresses: Vec<&str> = outcomes.iter().map(|o| o.address.as_str()).collect();
    assert_eq!(addresses, ["a@b.com", "bad-email", "user@gmail.co"]);

    assert!(outcomes[0].valid);
    assert!(outcomes[0].deliverable);
    assert_eq!(outcomes[0].reason, "Deliverable");

    assert!(!outcomes[1].valid);
    assert!(!outcomes[1].deliverable);
    assert_eq!(outcomes[1].reason, "Invalid format");

    assert!(outcomes[2].valid);
    assert!(!outcomes[2].deliverable);
    assert_eq!(outcomes[2].risk_level, RiskLevel::Medium);
    assert_eq!(outcomes[2].reason, "Did you mean @gmail.com?");

    // The malformed token never reaches the verifier.
    let sent: Vec<String> = pipeline_batches(&pipeline).concat();
    assert_eq!(sent, ["a@b.com", "user@gmail.co"]);
}

#[tokio::test]
async fn test_pasted_list_in_scan_mode() {
    let mut pipeline = memory_pipeline(
        ScriptedVerifier::deliverable(&["a@b.com"]),
        PipelineConfig::default(),
    );

    let outcomes = pipeline.validate(PASTED).await;

    let addresses: Vec<&str> = outcomes.iter().map(|o| o.address.as_str()).collect();
    assert_eq!(addresses, ["a@b.com", "user@gmail.co"]);
}

#[tokio::test]
async fn test_failed_batch_is_isolated() {
    let addresses: Vec<String> = (0..120).map(|i| format!("user{i}@example.com")).collect();
    let text = addresses.join("\n");
    let config =
        PipelineConfig::new().scheduler(SchedulerConfig::new().batch_size(50).concurrency(3));
    let mut pipeline = memory_pipeline(ScriptedVerifier::poisoned("user60@example.com"), config);

    let (outcomes, summary) = pipeline.validate_with_progress(&text, &mut |_| {}).await;

    assert_eq!(outcomes.len(), 120);
    assert_eq!(summary.failed_batches, 1);
    assert_eq!(summary.verified, 120);

    let failed: Vec<usize> = outcomes
        .iter()
        .enumerate()
        .filter(|(_, o)| o.reason == "Server error - try again")
        .map(|(i, _)| i)
        .collect();
    assert_eq!(failed, (50..100).collect::<Vec<_>>());
    assert!(
        outcomes
            .iter()
            .filter(|o| o.reason == "Server error - try again")
            .all(|o| !o.valid && !o.deliverable)
    );
    assert!(outcomes[..50].iter().all(|o| o.valid));
    assert!(outcomes[100..].iter().all(|o| o.valid));
}

#[tokio::test]
async fn test_progress_reaches_total() {
    let addresses: Vec<String> = (0..75).map(|i| format!("p{i}@example.org")).collect();
    let config = PipelineConfig::new().scheduler(
        SchedulerConfig::new()
            .batch_size(10)
            .concurrency(2)
            .mode(ScheduleMode::SlidingWindow),
    );
    let mut pipeline = memory_pipeline(ScriptedVerifier::default(), config);

    let mut reported = Vec::new();
    let (outcomes, _) = pipeline
        .validate_with_progress(&addresses.join(" "), &mut |p| {
            reported.push((p.completed, p.total));
        })
        .await;

    assert_eq!(outcomes.len(), 75);
    assert_eq!(reported.len(), 8);
    assert!(reported.windows(2).all(|w| w[0].0 <= w[1].0));
    assert_eq!(reported.last(), Some(&(75, 75)));
}

#[tokio::test]
async fn test_cache_survives_restart() {
    let storage = SqliteStorage::in_memory().await.unwrap();

    {
        let cache = ResultCache::new(storage.clone(), CacheConfig::default());
        let mut pipeline = Pipeline::new(
            ScriptedVerifier::deliverable(&["keep@example.com"]),
            cache,
            PipelineConfig::default(),
        );
        pipeline.validate("keep@example.com other@example.com").await;
    }

    let (cache, status) = ResultCache::open(storage.clone(), CacheConfig::default()).await;
    assert_eq!(status, LoadStatus::Loaded(2));
    assert!(cache.get("keep@example.com").unwrap().deliverable);

    let mut pipeline = Pipeline::new(
        ScriptedVerifier::default(),
        cache,
        PipelineConfig::new().reuse_cached(true),
    );
    let (outcomes, summary) = pipeline
        .validate_with_progress("KEEP@example.com", &mut |_| {})
        .await;
    assert_eq!(summary.cache_hits, 1);
    assert!(outcomes[0].deliverable);
    assert!(pipeline_batches(&pipeline).is_empty());
}

#[tokio::test]
async fn test_report_over_results() {
    let config = PipelineConfig::new().extract_mode(ExtractMode::Tokens);
    let mut pipeline = memory_pipeline(ScriptedVerifier::deliverable(&["a@b.com"]), config);
    let outcomes = pipeline.validate(PASTED).await;

    let summary = Summary::of(&outcomes);
    assert_eq!(summary.total, 3);
    assert_eq!(summary.invalid, 1);
    assert_eq!(summary.deliverable, 1);

    let csv = to_csv(ExportScope::Valid.select(&outcomes));
    let mut lines = csv.lines();
    assert_eq!(
        lines.next(),
        Some("\"Email\",\"Valid\",\"Deliverable\",\"Reason\"")
    );
    assert_eq!(
        lines.next(),
        Some("\"a@b.com\",\"Yes\",\"Yes\",\"Deliverable\"")
    );
    assert!(!csv.contains("bad-email"));
}

fn pipeline_batches<S: mailvet_core::Storage>(
    pipeline: &Pipeline<ScriptedVerifier, S>,
) -> Vec<Vec<String>> {
    pipeline.verifier().batches()
}

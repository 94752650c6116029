//! `mailvet` - bulk email address validator
//!
//! Extracts addresses from a file or stdin, checks them offline, verifies
//! the plausible ones against a deliverability service and prints or exports
//! the merged results.

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

mod cli;
mod output;
mod settings;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use tokio::io::AsyncReadExt;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use mailvet_core::report::{self, export_file_name};
use mailvet_core::{
    ExportScope, HttpVerifier, LoadStatus, Outcome, Pipeline, ResultCache, ResultFilter,
    SqliteStorage, Summary, VerifierConfig,
};

use cli::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "mailvet=info,mailvet_core=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    run(Cli::parse()).await
}

async fn run(cli: Cli) -> Result<()> {
    let mut settings = settings::load().await?;
    cli.apply(&mut settings);
    if cli.save_settings {
        settings::save(&settings).await?;
    }

    let db_path = settings::cache_db_path().await?;
    let storage = SqliteStorage::new(&db_path.to_string_lossy())
        .await
        .with_context(|| format!("opening cache at {}", db_path.display()))?;
    let (cache, status) = ResultCache::open(storage, settings.cache_config()?).await;
    match &status {
        LoadStatus::Reset { reason } => warn!("Validation cache reset: {}", reason),
        LoadStatus::Loaded(count) => info!("Loaded {} cached outcomes", count),
        LoadStatus::Empty => {}
    }

    let mut verifier_config =
        VerifierConfig::new(&settings.backend_url).with_timeout(settings.request_timeout());
    if let Some(token) = &cli.token {
        verifier_config = verifier_config.with_token(token);
    }
    let verifier = HttpVerifier::new(verifier_config)?;

    let mut pipeline = Pipeline::new(verifier, cache, cli.pipeline_config(&settings));

    if cli.clear_cache {
        pipeline.clear_cache().await?;
        if cli.file.is_none() {
            return Ok(());
        }
    }

    let text = read_input(cli.file.as_deref()).await?;
    let (outcomes, summary) = pipeline
        .validate_with_progress(&text, &mut |progress| {
            info!("{} ({}%)", progress.message, progress.percent());
        })
        .await;
    if summary.failed_batches > 0 {
        warn!(
            "{} batches failed; affected addresses are marked for retry",
            summary.failed_batches
        );
    }
    if summary.unauthorized_batches > 0 {
        warn!("The verification service rejected the token; check --token or MAILVET_TOKEN");
    }

    let shown = select(&outcomes, cli.filter, cli.search.as_deref());
    print!("{}", output::render_outcomes(&shown));
    if !outcomes.is_empty() {
        println!("{}", output::render_summary(&Summary::of(&outcomes)));
    }

    if let Some(target) = &cli.export {
        export(&outcomes, cli.export_scope, target).await?;
    }

    Ok(())
}

/// Reads the whole input from a file, or from stdin when no file is given.
async fn read_input(file: Option<&Path>) -> Result<String> {
    match file {
        Some(path) => tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("reading {}", path.display())),
        None => {
            let mut text = String::new();
            tokio::io::stdin()
                .read_to_string(&mut text)
                .await
                .context("reading stdin")?;
            Ok(text)
        }
    }
}

fn select<'a>(
    outcomes: &'a [Outcome],
    filter: ResultFilter,
    query: Option<&str>,
) -> Vec<&'a Outcome> {
    let filtered = report::filter(outcomes, filter);
    match query {
        Some(query) => report::search(filtered, query),
        None => filtered,
    }
}

/// Writes a CSV export. A directory target gets a timestamped file name.
async fn export(outcomes: &[Outcome], scope: ExportScope, target: &Path) -> Result<()> {
    let path: PathBuf = if tokio::fs::metadata(target)
        .await
        .is_ok_and(|meta| meta.is_dir())
    {
        target.join(export_file_name(
            scope,
            chrono::Utc::now().timestamp_millis(),
        ))
    } else {
        target.to_path_buf()
    };

    let selected = scope.select(outcomes);
    let count = selected.len();
    tokio::fs::write(&path, report::to_csv(selected))
        .await
        .with_context(|| format!("writing {}", path.display()))?;

    info!("Exported {} results to {:?}", count, path);
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use mailvet_core::RiskLevel;

    fn outcome(address: &str, valid: bool, deliverable: bool) -> Outcome {
        Outcome {
            address: address.into(),
            valid,
            deliverable,
            reason: String::new(),
            risk_level: RiskLevel::Low,
        }
    }

    #[test]
    fn test_select_combines_filter_and_search() {
        let outcomes = vec![
            outcome("alice@example.com", true, false),
            outcome("bob@example.com", true, false),
            outcome("alice@other.org", false, false),
        ];

        let shown = select(&outcomes, ResultFilter::Valid, Some("alice"));
        assert_eq!(shown.len(), 1);
        assert_eq!(shown[0].address, "alice@example.com");

        assert_eq!(select(&outcomes, ResultFilter::All, None).len(), 3);
    }

    #[tokio::test]
    async fn test_export_into_directory() {
        let dir = std::env::temp_dir().join(format!("mailvet-export-{}", std::process::id()));
        tokio::fs::create_dir_all(&dir).await.unwrap();
        let outcomes = vec![outcome("a@b.com", true, true), outcome("bad", false, false)];

        export(&outcomes, ExportScope::Valid, &dir).await.unwrap();

        let mut entries = tokio::fs::read_dir(&dir).await.unwrap();
        let entry = entries.next_entry().await.unwrap().unwrap();
        let name = entry.file_name().to_string_lossy().into_owned();
        assert!(name.starts_with("emails-valid-"));
        assert!(name.ends_with(".csv"));

        let csv = tokio::fs::read_to_string(entry.path()).await.unwrap();
        assert!(csv.contains("\"a@b.com\""));
        assert!(!csv.contains("\"bad\""));

        tokio::fs::remove_dir_all(&dir).await.unwrap();
    }

    #[tokio::test]
    async fn test_read_input_from_file() {
        let path = std::env::temp_dir().join(format!("mailvet-input-{}.txt", std::process::id()));
        tokio::fs::write(&path, "a@b.com\n").await.unwrap();
        assert_eq!(read_input(Some(&path)).await.unwrap(), "a@b.com\n");
        tokio::fs::remove_file(&path).await.unwrap();
        assert!(read_input(Some(&path)).await.is_err());
    }
}

// src/lib.rs
// Public library surface for the binary and integration tests.

pub mod aggregate;
pub mod classify;
pub mod config;
pub mod decay;
pub mod diary;
pub mod emotion;
pub mod error;
pub mod pipeline;
pub mod status;

// ---- Re-exports for stable public API ----
pub use crate::aggregate::{aggregate, aggregate_with, AggregateResult, Entry, WeightedResult};
pub use crate::classify::{ClassificationResult, EmotionClassifier};
pub use crate::decay::weight;
pub use crate::emotion::Emotion;
pub use crate::error::{AnalysisError, ClassifyError};
pub use crate::pipeline::{DiaryMoodAction, RunReport};

use tracing::info;

use crate::classify::build_classifier;
use crate::config::classifier::ClassifierConfig;
use crate::config::AppConfig;
use crate::diary::NotionDiaryClient;
use crate::status::{DryRunPublisher, GitHubStatusUpdater, StatusPublisher};

const NOTION_TIMEOUT_SECS: u64 = 15;

/// Wire the production components from config.
pub fn build_action(cfg: &AppConfig) -> anyhow::Result<DiaryMoodAction> {
    let classifier_cfg = ClassifierConfig::load_or_default(&cfg.classifier_config_path)?;
    // Safe diagnostics: only provider + key length
    info!(
        provider = ?classifier_cfg.provider,
        key_len = classifier_cfg.api_key.len(),
        daily_limit = classifier_cfg.daily_limit,
        "classifier config loaded"
    );
    let classifier = build_classifier(&classifier_cfg)?;

    let source = NotionDiaryClient::new(
        cfg.notion_token.clone(),
        cfg.notion_database_id.clone(),
        cfg.date_property.clone(),
    )
    .with_timeout(NOTION_TIMEOUT_SECS);

    let publisher: Box<dyn StatusPublisher> = if cfg.dry_run {
        Box::new(DryRunPublisher)
    } else {
        Box::new(GitHubStatusUpdater::new(cfg.github_token.clone()))
    };

    Ok(DiaryMoodAction::new(
        Box::new(source),
        classifier,
        publisher,
        cfg.entries_limit,
    ))
}

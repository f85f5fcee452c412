//! One run: fetch recent entries → aggregate → map to status → publish.

use anyhow::{Context, Result};
use metrics::{counter, describe_counter, describe_gauge, gauge};
use once_cell::sync::OnceCell;
use tracing::{info, warn};

use crate::aggregate::{aggregate_with, AggregateResult, Entry};
use crate::classify::DynClassifier;
use crate::diary::EntrySource;
use crate::status::{status_for, StatusPayload, StatusPublisher};

/// One-time metrics registration.
fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!(
            "diary_entries_fetched_total",
            "Diary entries returned by the entry source."
        );
        describe_counter!(
            "diary_classifications_total",
            "Entries classified, by classifier."
        );
        describe_counter!(
            "status_publish_total",
            "Status publish attempts, by outcome."
        );
        describe_gauge!(
            "diary_last_confidence",
            "Normalized confidence of the last aggregated emotion."
        );
    });
}

/// Outcome of [`DiaryMoodAction::run`].
#[derive(Debug, Clone, PartialEq)]
pub struct RunReport {
    pub entries: usize,
    /// `None` when there was nothing to aggregate.
    pub result: Option<AggregateResult>,
    pub status: Option<StatusPayload>,
    pub published: bool,
}

pub struct DiaryMoodAction {
    source: Box<dyn EntrySource>,
    classifier: DynClassifier,
    publisher: Box<dyn StatusPublisher>,
    entries_limit: usize,
}

impl DiaryMoodAction {
    pub fn new(
        source: Box<dyn EntrySource>,
        classifier: DynClassifier,
        publisher: Box<dyn StatusPublisher>,
        entries_limit: usize,
    ) -> Self {
        Self {
            source,
            classifier,
            publisher,
            entries_limit,
        }
    }

    pub async fn run(&self) -> Result<RunReport> {
        ensure_metrics_described();

        let diary = self
            .source
            .get_recent_entries(self.entries_limit)
            .await
            .with_context(|| format!("fetching entries from {}", self.source.name()))?;
        counter!("diary_entries_fetched_total").increment(diary.len() as u64);

        if diary.is_empty() {
            warn!(source = self.source.name(), "no diary entries, nothing to publish");
            return Ok(RunReport {
                entries: 0,
                result: None,
                status: None,
                published: false,
            });
        }

        let entries: Vec<Entry> = diary.iter().map(|d| d.to_entry()).collect();
        let result = aggregate_with(&entries, self.classifier.as_ref())
            .await
            .with_context(|| format!("aggregating with {}", self.classifier.name()))?;
        gauge!("diary_last_confidence").set(result.confidence);
        info!(
            emotion = %result.emotion,
            confidence = result.confidence,
            entries = entries.len(),
            classifier = self.classifier.name(),
            "dominant emotion"
        );

        let status = status_for(result.emotion);
        let published = match self.publisher.publish(&status).await {
            Ok(ok) => {
                let outcome = if ok { "ok" } else { "rejected" };
                counter!("status_publish_total", "outcome" => outcome).increment(1);
                ok
            }
            Err(e) => {
                counter!("status_publish_total", "outcome" => "error").increment(1);
                return Err(e.context(format!("publishing via {}", self.publisher.name())));
            }
        };
        info!(
            publisher = self.publisher.name(),
            published,
            emoji = %status.emoji,
            "status publish finished"
        );

        Ok(RunReport {
            entries: entries.len(),
            result: Some(result),
            status: Some(status),
            published,
        })
    }
}

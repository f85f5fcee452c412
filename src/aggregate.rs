//! # Weighted Emotion Aggregation
//! Pure reduction: per-entry classifications + recency weights → one
//! dominant emotion. No I/O beyond the injected classifier.
//!
//! Policy:
//! - every entry is classified and weighted against the newest entry
//!   ([`crate::decay::weight`]);
//! - each emotion collects `confidence * weight`; scores are divided by the
//!   total weight;
//! - the highest score wins, exact ties go to the earliest emotion in
//!   declaration order;
//! - if every score is zero (all confidences 0), the emotion with the most
//!   vote weight wins instead, so a lone entry keeps its own label.
//!
//! The returned confidence is a normalized weighted score, not a classifier
//! probability. Any failure aborts the whole batch.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::classify::{validate_text, ClassificationResult, EmotionClassifier};
use crate::decay;
use crate::emotion::Emotion;
use crate::error::{AnalysisError, ClassifyError};

/// One dated text. Caller-owned; never mutated here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    pub text: String,
    pub timestamp: DateTime<Utc>,
}

impl Entry {
    pub fn new(text: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            text: text.into(),
            timestamp,
        }
    }
}

/// A classification paired with its recency weight. Lives for one call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeightedResult {
    pub emotion: Emotion,
    pub confidence: f64,
    /// In `[decay::MIN_WEIGHT, decay::MAX_WEIGHT]`.
    pub weight: f64,
}

impl WeightedResult {
    pub fn new(result: ClassificationResult, weight: f64) -> Self {
        Self {
            emotion: result.emotion,
            confidence: result.confidence,
            weight,
        }
    }
}

/// Final output of an aggregation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AggregateResult {
    pub emotion: Emotion,
    /// Normalized weighted score in `[0, 1]`; not comparable to a single
    /// classifier confidence.
    pub confidence: f64,
}

/// Normalized per-emotion scores of one batch.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct EmotionScores {
    scores: [f64; Emotion::COUNT],
    /// Summed recency weight of the entries voting for each emotion.
    votes: [f64; Emotion::COUNT],
    total_weight: f64,
}

impl EmotionScores {
    /// Accumulate weighted votes and normalize by the total weight.
    pub fn from_weighted(results: &[WeightedResult]) -> Self {
        let mut scores = [0.0f64; Emotion::COUNT];
        let mut votes = [0.0f64; Emotion::COUNT];
        let mut total_weight = 0.0f64;

        for r in results {
            scores[r.emotion.index()] += r.confidence * r.weight;
            votes[r.emotion.index()] += r.weight;
            total_weight += r.weight;
        }

        // Unreachable while MIN_WEIGHT > 0, kept for a zero floor.
        if total_weight > 0.0 {
            for s in scores.iter_mut() {
                *s /= total_weight;
            }
        }

        Self {
            scores,
            votes,
            total_weight,
        }
    }

    pub fn get(&self, emotion: Emotion) -> f64 {
        self.scores[emotion.index()]
    }

    pub fn total_weight(&self) -> f64 {
        self.total_weight
    }

    /// `(emotion, score)` in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (Emotion, f64)> + '_ {
        Emotion::ALL.iter().map(move |&e| (e, self.get(e)))
    }

    /// Highest score; strict `>` keeps the earliest emotion on exact ties.
    /// All-zero scores fall back to the heaviest vote.
    pub fn dominant(&self) -> AggregateResult {
        let key = if self.scores.iter().all(|&s| s == 0.0) {
            self.votes
        } else {
            self.scores
        };
        let mut best = Emotion::ALL[0];
        for e in Emotion::ALL {
            if key[e.index()] > key[best.index()] {
                best = e;
            }
        }
        AggregateResult {
            emotion: best,
            confidence: self.get(best),
        }
    }
}

/// Newest timestamp of a non-empty batch.
fn latest_timestamp(entries: &[Entry]) -> Result<DateTime<Utc>, AnalysisError> {
    entries
        .iter()
        .map(|e| e.timestamp)
        .max()
        .ok_or(AnalysisError::InvalidInput("no entries provided"))
}

fn check_text(entry: &Entry) -> Result<&str, AnalysisError> {
    validate_text(&entry.text).map_err(AnalysisError::from)
}

/// Aggregate with a synchronous classification function.
///
/// `classify` is called exactly once per entry, with trimmed text.
/// Any blank text fails the batch with `InvalidInput` before `classify` is
/// called at all.
pub fn aggregate<F>(entries: &[Entry], mut classify: F) -> Result<AggregateResult, AnalysisError>
where
    F: FnMut(&str) -> Result<ClassificationResult, ClassifyError>,
{
    let latest = latest_timestamp(entries)?;

    for entry in entries {
        check_text(entry)?;
    }

    let mut weighted = Vec::with_capacity(entries.len());
    for entry in entries {
        let result = classify(entry.text.trim())?;
        weighted.push(WeightedResult::new(
            result,
            decay::weight(entry.timestamp, latest),
        ));
    }

    Ok(reduce(&weighted))
}

/// Aggregate with an async [`EmotionClassifier`].
///
/// Entries are classified one after another; the reduction does not depend
/// on call order.
pub async fn aggregate_with<C>(
    entries: &[Entry],
    classifier: &C,
) -> Result<AggregateResult, AnalysisError>
where
    C: EmotionClassifier + ?Sized,
{
    let latest = latest_timestamp(entries)?;

    // validate the whole batch before spending any classifier calls
    for entry in entries {
        check_text(entry)?;
    }

    let mut weighted = Vec::with_capacity(entries.len());
    for entry in entries {
        let result = classifier.classify(entry.text.trim()).await?;
        metrics::counter!("diary_classifications_total", "classifier" => classifier.name())
            .increment(1);
        tracing::debug!(
            emotion = %result.emotion,
            confidence = result.confidence,
            ts = %entry.timestamp,
            "entry classified"
        );
        weighted.push(WeightedResult::new(
            result,
            decay::weight(entry.timestamp, latest),
        ));
    }

    Ok(reduce(&weighted))
}

/// Weighted vote over already-classified entries.
pub fn reduce(weighted: &[WeightedResult]) -> AggregateResult {
    EmotionScores::from_weighted(weighted).dominant()
}

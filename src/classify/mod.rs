//! Classification capability: provider abstraction + concrete back-ends.
//!
//! The aggregator only ever sees `classify(text) -> ClassificationResult`.
//! Back-ends:
//! - `lexicon` : offline keyword-stem matcher (default)
//! - `openai`  : chat-completions call, wrapped with file cache + daily limit

pub mod cache;
pub mod lexicon;
pub mod openai;

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::config::classifier::{ClassifierConfig, ClassifierKind};
use crate::emotion::Emotion;
use crate::error::ClassifyError;

pub use cache::CachingClassifier;
pub use lexicon::LexiconClassifier;
pub use openai::OpenAiClassifier;

/// One text classified into one emotion.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClassificationResult {
    pub emotion: Emotion,
    /// In `[0, 1]`.
    pub confidence: f64,
}

impl ClassificationResult {
    /// Clamps confidence into `[0, 1]`; NaN becomes 0.
    pub fn new(emotion: Emotion, confidence: f64) -> Self {
        Self {
            emotion,
            confidence: clamp01(confidence),
        }
    }
}

#[async_trait::async_trait]
pub trait EmotionClassifier: Send + Sync {
    /// Classify one non-blank text.
    async fn classify(&self, text: &str) -> Result<ClassificationResult, ClassifyError>;
    /// Back-end name for logs.
    fn name(&self) -> &'static str;
}

/// Convenient alias used by callers.
pub type DynClassifier = Arc<dyn EmotionClassifier>;

/// Rejects blank text. Every back-end calls this first.
pub fn validate_text(text: &str) -> Result<&str, ClassifyError> {
    let t = text.trim();
    if t.is_empty() {
        Err(ClassifyError::EmptyText)
    } else {
        Ok(t)
    }
}

/// Factory: build a classifier according to config.
///
/// `openai` is always wrapped with the file cache + daily limit; the lexicon
/// runs locally and needs neither.
pub fn build_classifier(cfg: &ClassifierConfig) -> anyhow::Result<DynClassifier> {
    match cfg.provider {
        ClassifierKind::Lexicon => Ok(Arc::new(LexiconClassifier::new())),
        ClassifierKind::OpenAi => {
            let provider = OpenAiClassifier::new(cfg.api_key.clone(), cfg.model.as_deref())?;
            let client = CachingClassifier::new(provider, cfg.cache_dir.clone(), cfg.daily_limit);
            Ok(Arc::new(client))
        }
    }
}

fn clamp01(x: f64) -> f64 {
    if x.is_nan() {
        0.0
    } else {
        x.clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_text_is_rejected() {
        assert!(matches!(validate_text(""), Err(ClassifyError::EmptyText)));
        assert!(matches!(validate_text(" \n\t "), Err(ClassifyError::EmptyText)));
        assert_eq!(validate_text("  ok ").unwrap(), "ok");
    }

    #[test]
    fn confidence_is_clamped() {
        assert_eq!(ClassificationResult::new(Emotion::Joy, 1.7).confidence, 1.0);
        assert_eq!(ClassificationResult::new(Emotion::Joy, -0.2).confidence, 0.0);
        assert_eq!(ClassificationResult::new(Emotion::Joy, f64::NAN).confidence, 0.0);
    }

    #[test]
    fn default_config_builds_lexicon() {
        let c = build_classifier(&ClassifierConfig::default()).unwrap();
        assert_eq!(c.name(), "lexicon");
    }
}

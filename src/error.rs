//! Error types for classification and aggregation.

/// Failure reported by an [`EmotionClassifier`](crate::classify::EmotionClassifier).
#[derive(Debug, thiserror::Error)]
pub enum ClassifyError {
    #[error("empty text cannot be classified")]
    EmptyText,

    /// Back-end failure (HTTP, parse, daily limit, ...). Opaque to the aggregator.
    #[error(transparent)]
    Backend(#[from] anyhow::Error),
}

/// Failure of a whole aggregation call. No partial result is ever produced.
#[derive(Debug, thiserror::Error)]
pub enum AnalysisError {
    /// Caller contract violation: empty batch or blank entry text.
    #[error("invalid input: {0}")]
    InvalidInput(&'static str),

    #[error("classification failed")]
    Classification(#[source] anyhow::Error),
}

impl AnalysisError {
    pub fn is_invalid_input(&self) -> bool {
        matches!(self, AnalysisError::InvalidInput(_))
    }
}

impl From<ClassifyError> for AnalysisError {
    fn from(e: ClassifyError) -> Self {
        match e {
            ClassifyError::EmptyText => AnalysisError::InvalidInput("empty text"),
            ClassifyError::Backend(inner) => AnalysisError::Classification(inner),
        }
    }
}

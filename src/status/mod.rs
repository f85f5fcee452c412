pub mod github;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::emotion::Emotion;

pub use github::GitHubStatusUpdater;

/// What ends up on the profile: one emoji and a short message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusPayload {
    pub emoji: String,
    pub message: String,
}

impl StatusPayload {
    pub fn new(emoji: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            emoji: emoji.into(),
            message: message.into(),
        }
    }
}

/// Fixed emotion → status table.
pub fn status_for(emotion: Emotion) -> StatusPayload {
    let (emoji, message) = match emotion {
        Emotion::Joy => ("😄", "Been feeling pretty good lately!"),
        Emotion::Sadness => ("😢", "Going through some emotions..."),
        Emotion::Anger => ("😠", "Taking deep breaths"),
        Emotion::Fear => ("😨", "Dealing with some uncertainty"),
        Emotion::Surprise => ("😲", "Life's been full of surprises!"),
        Emotion::Disgust => ("🤢", "Need a change of pace"),
        Emotion::Neutral => ("😐", "Keeping it steady"),
    };
    StatusPayload::new(emoji, message)
}

/// Publishes a status somewhere visible.
///
/// `Ok(false)` means the remote side refused the update; `Err` means it
/// could not be reached at all.
#[async_trait::async_trait]
pub trait StatusPublisher: Send + Sync {
    async fn publish(&self, status: &StatusPayload) -> Result<bool>;
    fn name(&self) -> &'static str;
}

/// Logs instead of publishing. Used with `DRY_RUN=1`.
#[derive(Debug, Clone, Default)]
pub struct DryRunPublisher;

#[async_trait::async_trait]
impl StatusPublisher for DryRunPublisher {
    async fn publish(&self, status: &StatusPayload) -> Result<bool> {
        tracing::info!(emoji = %status.emoji, message = %status.message, "dry run: status not published");
        Ok(true)
    }

    fn name(&self) -> &'static str {
        "dry-run"
    }
}

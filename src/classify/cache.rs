//! File cache + daily call limit around a remote classifier.
//!
//! Diary runs re-read the same recent entries every time, so results are
//! cached on disk keyed by SHA-256 of `(provider, text)`. Only real back-end
//! calls count towards the daily limit; cache hits are free. Once the limit
//! is reached the wrapper fails instead of skipping the entry.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::anyhow;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::{validate_text, ClassificationResult, EmotionClassifier};
use crate::error::ClassifyError;

pub struct CachingClassifier<C: EmotionClassifier> {
    inner: C,
    cache_dir: PathBuf,
    daily_limit: u32,
    counter: Mutex<DailyCounter>,
}

impl<C: EmotionClassifier> CachingClassifier<C> {
    pub fn new(inner: C, cache_dir: PathBuf, daily_limit: u32) -> Self {
        if let Err(e) = fs::create_dir_all(&cache_dir) {
            tracing::warn!(error = %e, dir = %cache_dir.display(), "cannot create classifier cache dir");
        }
        let counter = match load_daily_counter(&cache_dir) {
            Ok(c) => c,
            Err(e) if e.kind() == io::ErrorKind::NotFound => DailyCounter::default(),
            Err(e) => {
                tracing::warn!(error = %e, dir = %cache_dir.display(), "daily counter unreadable, starting from zero");
                DailyCounter::default()
            }
        };
        Self {
            inner,
            cache_dir,
            daily_limit,
            counter: Mutex::new(counter),
        }
    }

    /// Real back-end calls made today.
    pub fn calls_today(&self) -> u32 {
        let g = self.counter.lock().unwrap_or_else(|p| p.into_inner());
        if g.is_expired() {
            0
        } else {
            g.count
        }
    }

    async fn classify_impl(&self, text: &str) -> Result<ClassificationResult, ClassifyError> {
        let text = validate_text(text)?;

        // 1) Cache lookup.
        let key = cache_key(self.inner.name(), text);
        if let Some(hit) = read_cache_file(&self.cache_dir, &key) {
            tracing::debug!(key = %key, "classifier cache hit");
            return Ok(hit);
        }

        // 2) Daily limit (cache hits above do not count).
        {
            let mut g = self.counter.lock().unwrap_or_else(|p| p.into_inner());
            if g.is_expired() {
                g.reset_to_today();
                if let Err(e) = save_daily_counter(&self.cache_dir, &g) {
                    tracing::warn!(error = %e, "daily counter write failed");
                }
            }
            if g.count >= self.daily_limit {
                return Err(ClassifyError::Backend(anyhow!(
                    "daily classification limit of {} reached for {}",
                    self.daily_limit,
                    self.inner.name()
                )));
            }
        }

        // 3) Real call.
        let fresh = self.inner.classify(text).await?;
        if let Err(e) = write_cache_file(&self.cache_dir, &key, &fresh) {
            tracing::warn!(error = %e, "classifier cache write failed");
        }
        let mut g = self.counter.lock().unwrap_or_else(|p| p.into_inner());
        g.count = g.count.saturating_add(1);
        if let Err(e) = save_daily_counter(&self.cache_dir, &g) {
            tracing::warn!(error = %e, "daily counter write failed");
        }
        Ok(fresh)
    }
}

#[async_trait::async_trait]
impl<C: EmotionClassifier> EmotionClassifier for CachingClassifier<C> {
    async fn classify(&self, text: &str) -> Result<ClassificationResult, ClassifyError> {
        self.classify_impl(text).await
    }

    fn name(&self) -> &'static str {
        self.inner.name()
    }
}

// ------------------------------------------------------------
// File cache helpers
// ------------------------------------------------------------

fn cache_key(provider: &str, text: &str) -> String {
    let mut h = Sha256::new();
    h.update(provider.as_bytes());
    h.update([0u8]);
    h.update(text.as_bytes());
    h.finalize().iter().map(|b| format!("{b:02x}")).collect()
}

fn cache_path(dir: &Path, key: &str) -> PathBuf {
    dir.join(format!("{key}.json"))
}

/// Entries with a confidence outside `[0, 1]` are treated as misses.
fn read_cache_file(dir: &Path, key: &str) -> Option<ClassificationResult> {
    let s = fs::read_to_string(cache_path(dir, key)).ok()?;
    let raw: ClassificationResult = serde_json::from_str(&s).ok()?;
    if !(0.0..=1.0).contains(&raw.confidence) {
        tracing::warn!(key = %key, confidence = raw.confidence, "discarding out-of-range cache entry");
        return None;
    }
    Some(ClassificationResult::new(raw.emotion, raw.confidence))
}

fn write_cache_file(dir: &Path, key: &str, value: &ClassificationResult) -> io::Result<()> {
    write_json_atomic(&cache_path(dir, key), value)
}

fn write_json_atomic<T: Serialize>(path: &Path, value: &T) -> io::Result<()> {
    let json = serde_json::to_string(value).map_err(io::Error::other)?;
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, json)?;
    fs::rename(tmp, path)
}

// ------------------------------------------------------------
// Daily counter helpers
// ------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
struct DailyCounter {
    date: String,
    count: u32,
}

impl Default for DailyCounter {
    fn default() -> Self {
        Self {
            date: today(),
            count: 0,
        }
    }
}

impl DailyCounter {
    fn is_expired(&self) -> bool {
        self.date != today()
    }
    fn reset_to_today(&mut self) {
        self.date = today();
        self.count = 0;
    }
}

fn today() -> String {
    chrono::Utc::now().date_naive().to_string()
}

fn counter_path(dir: &Path) -> PathBuf {
    dir.join("daily_count.json")
}

fn load_daily_counter(dir: &Path) -> io::Result<DailyCounter> {
    let s = fs::read_to_string(counter_path(dir))?;
    serde_json::from_str(&s).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
}

fn save_daily_counter(dir: &Path, dc: &DailyCounter) -> io::Result<()> {
    write_json_atomic(&counter_path(dir), dc)
}

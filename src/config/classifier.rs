// src/config/classifier.rs
use anyhow::{anyhow, bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::{env, fs, path::Path, path::PathBuf};

pub const DEFAULT_DAILY_LIMIT: u32 = 50;

fn default_daily_limit() -> u32 {
    DEFAULT_DAILY_LIMIT
}
fn default_cache_dir() -> PathBuf {
    PathBuf::from("cache/classifier")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClassifierKind {
    #[default]
    Lexicon,
    #[serde(alias = "open_ai")]
    OpenAi,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifierConfig {
    #[serde(default)]
    pub provider: ClassifierKind,
    /// Remote model name; provider default when absent.
    #[serde(default)]
    pub model: Option<String>,
    /// "ENV" means: read from OPENAI_API_KEY.
    #[serde(default)]
    pub api_key: String,
    /// Real remote calls per day; cache hits are free.
    #[serde(default = "default_daily_limit")]
    pub daily_limit: u32,
    #[serde(default = "default_cache_dir")]
    pub cache_dir: PathBuf,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            provider: ClassifierKind::Lexicon,
            model: None,
            api_key: String::new(),
            daily_limit: DEFAULT_DAILY_LIMIT,
            cache_dir: default_cache_dir(),
        }
    }
}

impl ClassifierConfig {
    /// Load JSON or TOML (by extension). Missing file → defaults (lexicon).
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            tracing::info!(path = %path.display(), "no classifier config, using offline lexicon");
            return Ok(Self::default());
        }
        Self::load_from_file(path)
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let data = fs::read_to_string(path)
            .with_context(|| format!("reading classifier config from {}", path.display()))?;
        let ext = path
            .extension()
            .and_then(|s| s.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();
        let cfg: ClassifierConfig = if ext == "toml" {
            toml::from_str(&data).context("parsing classifier config (toml)")?
        } else {
            serde_json::from_str(&data).context("parsing classifier config (json)")?
        };
        cfg.resolved(|k| env::var(k).ok())
    }

    /// Resolve `"ENV"` keys and sanitize limits.
    pub fn resolved(mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        if self.api_key.trim().eq_ignore_ascii_case("env") {
            self.api_key = match self.provider {
                ClassifierKind::OpenAi => lookup("OPENAI_API_KEY")
                    .ok_or_else(|| anyhow!("Missing OPENAI_API_KEY env var"))?,
                ClassifierKind::Lexicon => String::new(),
            };
        }
        if self.provider == ClassifierKind::OpenAi && self.api_key.trim().is_empty() {
            bail!("classifier provider openai needs api_key (or \"ENV\")");
        }
        if self.daily_limit == 0 {
            self.daily_limit = DEFAULT_DAILY_LIMIT;
        }
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_means_lexicon() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = ClassifierConfig::load_or_default(dir.path().join("nope.json")).unwrap();
        assert_eq!(cfg.provider, ClassifierKind::Lexicon);
        assert_eq!(cfg.daily_limit, DEFAULT_DAILY_LIMIT);
    }

    #[test]
    fn json_and_toml_are_both_accepted() {
        let dir = tempfile::tempdir().unwrap();
        let j = dir.path().join("c.json");
        fs::write(&j, r#"{"provider":"lexicon","daily_limit":7}"#).unwrap();
        assert_eq!(ClassifierConfig::load_from_file(&j).unwrap().daily_limit, 7);

        let t = dir.path().join("c.toml");
        fs::write(&t, "provider = \"lexicon\"\ncache_dir = \"tmp/c\"\n").unwrap();
        let cfg = ClassifierConfig::load_from_file(&t).unwrap();
        assert_eq!(cfg.cache_dir, PathBuf::from("tmp/c"));
    }

    #[test]
    fn env_key_is_resolved_for_openai() {
        let cfg: ClassifierConfig =
            serde_json::from_str(r#"{"provider":"openai","api_key":"ENV","daily_limit":0}"#).unwrap();
        let cfg = cfg
            .resolved(|k| (k == "OPENAI_API_KEY").then(|| "sk-test".to_string()))
            .unwrap();
        assert_eq!(cfg.api_key, "sk-test");
        assert_eq!(cfg.daily_limit, DEFAULT_DAILY_LIMIT);
    }

    #[test]
    fn openai_without_key_fails() {
        let cfg: ClassifierConfig =
            serde_json::from_str(r#"{"provider":"openai","api_key":"ENV"}"#).unwrap();
        assert!(cfg.resolved(|_| None).is_err());

        let cfg: ClassifierConfig = serde_json::from_str(r#"{"provider":"openai"}"#).unwrap();
        assert!(cfg.resolved(|_| None).is_err());
    }
}

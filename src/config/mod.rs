//! Runtime configuration from the environment (`.env` is loaded by the binary).
//!
//! Required: `NOTION_TOKEN`, `NOTION_DATABASE_ID`, `GITHUB_TOKEN`.
//! Optional: `ENTRIES_LIMIT` (10), `NOTION_DATE_PROPERTY` (`Date`),
//! `CLASSIFIER_CONFIG_PATH` (`config/classifier.json`), `DRY_RUN` (off).

pub mod classifier;

use anyhow::{bail, Context, Result};
use std::path::PathBuf;

use crate::diary::notion::MAX_PAGE_SIZE;

pub const DEFAULT_ENTRIES_LIMIT: usize = 10;
pub const DEFAULT_DATE_PROPERTY: &str = "Date";
pub const DEFAULT_CLASSIFIER_CONFIG_PATH: &str = "config/classifier.json";

const REQUIRED_VARS: [&str; 3] = ["NOTION_TOKEN", "NOTION_DATABASE_ID", "GITHUB_TOKEN"];

#[derive(Clone)]
pub struct AppConfig {
    pub notion_token: String,
    pub notion_database_id: String,
    pub github_token: String,
    pub entries_limit: usize,
    pub date_property: String,
    pub classifier_config_path: PathBuf,
    pub dry_run: bool,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("notion_token_len", &self.notion_token.len())
            .field("notion_database_id", &self.notion_database_id)
            .field("github_token_len", &self.github_token.len())
            .field("entries_limit", &self.entries_limit)
            .field("date_property", &self.date_property)
            .field("classifier_config_path", &self.classifier_config_path)
            .field("dry_run", &self.dry_run)
            .finish()
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|k| std::env::var(k).ok())
    }

    /// Same as [`from_env`](Self::from_env) with an explicit variable source.
    /// Blank values count as missing; all missing names are reported together.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |k: &str| lookup(k).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let missing: Vec<&str> = REQUIRED_VARS
            .iter()
            .copied()
            .filter(|k| get(*k).is_none())
            .collect();
        if !missing.is_empty() {
            bail!("Missing required environment variables: {}", missing.join(", "));
        }

        let entries_limit = match get("ENTRIES_LIMIT") {
            Some(v) => {
                let n: usize = v
                    .parse()
                    .with_context(|| format!("ENTRIES_LIMIT is not a number: {v:?}"))?;
                if !(1..=MAX_PAGE_SIZE).contains(&n) {
                    bail!("ENTRIES_LIMIT must be between 1 and {MAX_PAGE_SIZE}, got {n}");
                }
                n
            }
            None => DEFAULT_ENTRIES_LIMIT,
        };

        let dry_run = get("DRY_RUN")
            .map(|v| matches!(v.to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);

        Ok(Self {
            notion_token: get("NOTION_TOKEN").unwrap_or_default(),
            notion_database_id: get("NOTION_DATABASE_ID").unwrap_or_default(),
            github_token: get("GITHUB_TOKEN").unwrap_or_default(),
            entries_limit,
            date_property: get("NOTION_DATE_PROPERTY")
                .unwrap_or_else(|| DEFAULT_DATE_PROPERTY.to_string()),
            classifier_config_path: get("CLASSIFIER_CONFIG_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_CLASSIFIER_CONFIG_PATH)),
            dry_run,
        })
    }
}

//! Notion database as a diary source.
//!
//! One query (sorted by the date property, newest first, `page_size = limit`)
//! followed by one block-children fetch per page. Only `paragraph` blocks
//! contribute text. Pages without text or without a parseable date are
//! skipped; HTTP failures are errors.

use std::time::Duration;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde_json::{json, Value};

use super::{parse_entry_date, DiaryEntry, EntrySource};

const DEFAULT_BASE_URL: &str = "https://api.notion.com/v1";
const NOTION_VERSION: &str = "2022-06-28";

/// Notion caps `page_size` at 100.
pub const MAX_PAGE_SIZE: usize = 100;

#[derive(Clone)]
pub struct NotionDiaryClient {
    client: Client,
    token: String,
    database_id: String,
    date_property: String,
    base_url: String,
}

impl NotionDiaryClient {
    pub fn new(token: String, database_id: String, date_property: String) -> Self {
        Self {
            client: Client::new(),
            token,
            database_id,
            date_property,
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    /// Point at another endpoint (tests, proxies).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        if let Ok(c) = Client::builder().timeout(Duration::from_secs(secs)).build() {
            self.client = c;
        }
        self
    }

    async fn query_pages(&self, limit: usize) -> Result<Vec<Value>> {
        let body = json!({
            "sorts": [{ "property": self.date_property, "direction": "descending" }],
            "page_size": limit.clamp(1, MAX_PAGE_SIZE),
        });
        let url = format!("{}/databases/{}/query", self.base_url, self.database_id);
        let resp: Value = self
            .client
            .post(url)
            .bearer_auth(&self.token)
            .header("Notion-Version", NOTION_VERSION)
            .json(&body)
            .send()
            .await
            .context("notion database query")?
            .error_for_status()
            .context("notion database query non-2xx")?
            .json()
            .await
            .context("notion database query body")?;

        Ok(resp
            .get("results")
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default())
    }

    async fn page_content(&self, page_id: &str) -> Result<String> {
        let url = format!("{}/blocks/{}/children?page_size=100", self.base_url, page_id);
        let resp: Value = self
            .client
            .get(url)
            .bearer_auth(&self.token)
            .header("Notion-Version", NOTION_VERSION)
            .send()
            .await
            .context("notion block children")?
            .error_for_status()
            .context("notion block children non-2xx")?
            .json()
            .await
            .context("notion block children body")?;
        Ok(extract_paragraphs(&resp))
    }
}

#[async_trait::async_trait]
impl EntrySource for NotionDiaryClient {
    async fn get_recent_entries(&self, limit: usize) -> Result<Vec<DiaryEntry>> {
        let pages = self.query_pages(limit).await?;

        let mut entries = Vec::with_capacity(pages.len());
        for page in pages {
            let Some(page_id) = page.get("id").and_then(Value::as_str) else {
                continue;
            };
            let Some(date) = extract_date(&page, &self.date_property) else {
                tracing::debug!(page_id, "skipping page without a usable date");
                continue;
            };
            let content = self.page_content(page_id).await?;
            if content.trim().is_empty() {
                tracing::debug!(page_id, "skipping page without paragraph text");
                continue;
            }
            entries.push(DiaryEntry {
                content,
                date,
                page_id: page_id.to_string(),
            });
        }

        tracing::info!(
            fetched = entries.len(),
            limit,
            "diary entries loaded from notion"
        );
        Ok(entries)
    }

    fn name(&self) -> &'static str {
        "notion"
    }
}

/// `properties.<prop>.date.start` of a page.
pub fn extract_date(page: &Value, property: &str) -> Option<DateTime<Utc>> {
    page.get("properties")?
        .get(property)?
        .get("date")?
        .get("start")?
        .as_str()
        .and_then(parse_entry_date)
}

/// Plain text of all `paragraph` blocks, one line per block.
pub fn extract_paragraphs(children: &Value) -> String {
    let Some(blocks) = children.get("results").and_then(Value::as_array) else {
        return String::new();
    };

    let mut lines = Vec::new();
    for block in blocks {
        if block.get("type").and_then(Value::as_str) != Some("paragraph") {
            continue;
        }
        let line: String = block
            .pointer("/paragraph/rich_text")
            .and_then(Value::as_array)
            .map(|spans| {
                spans
                    .iter()
                    .filter_map(|s| s.get("plain_text").and_then(Value::as_str))
                    .collect()
            })
            .unwrap_or_default();
        if !line.is_empty() {
            lines.push(line);
        }
    }
    lines.join("\n")
}

// src/diary/mod.rs
pub mod notion;

use anyhow::Result;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::aggregate::Entry;

pub use notion::NotionDiaryClient;

/// A diary page as fetched from the document store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiaryEntry {
    pub content: String,
    pub date: DateTime<Utc>,
    pub page_id: String,
}

impl DiaryEntry {
    pub fn to_entry(&self) -> Entry {
        Entry::new(self.content.clone(), self.date)
    }
}

/// Anything that can hand out the most recent diary entries, newest first.
#[async_trait::async_trait]
pub trait EntrySource: Send + Sync {
    async fn get_recent_entries(&self, limit: usize) -> Result<Vec<DiaryEntry>>;
    fn name(&self) -> &'static str;
}

/// Accepts RFC 3339 timestamps or plain `YYYY-MM-DD` dates (midnight UTC).
pub fn parse_entry_date(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|ndt| ndt.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn parses_rfc3339_and_plain_dates() {
        let a = parse_entry_date("2024-02-28T00:00:00Z").unwrap();
        assert_eq!(a, Utc.with_ymd_and_hms(2024, 2, 28, 0, 0, 0).unwrap());

        let b = parse_entry_date("2024-02-28T09:00:00+09:00").unwrap();
        assert_eq!(b, a);

        let c = parse_entry_date(" 2024-02-28 ").unwrap();
        assert_eq!(c, a);

        assert!(parse_entry_date("yesterday").is_none());
    }
}

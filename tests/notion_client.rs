// tests/notion_client.rs
//
// NotionDiaryClient against a local mock of the two Notion endpoints it uses.

mod common;

use axum::{
    extract::Path,
    http::{HeaderMap, StatusCode},
    routing::{get, post},
    Json, Router,
};
use chrono::{TimeZone, Utc};
use diary_mood_status::diary::{EntrySource, NotionDiaryClient};
use serde_json::{json, Value};

async fn query(
    Path(db): Path<String>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Result<Json<Value>, StatusCode> {
    assert_eq!(db, "fake-db-id");
    assert_eq!(
        headers.get("authorization").and_then(|v| v.to_str().ok()),
        Some("Bearer fake-token")
    );
    assert!(headers.get("notion-version").is_some());
    assert_eq!(body["sorts"][0]["property"], "Date");
    assert_eq!(body["sorts"][0]["direction"], "descending");
    assert_eq!(body["page_size"], 3);

    Ok(Json(json!({
        "results": [
            { "id": "page1", "properties": { "Date": { "date": { "start": "2024-02-28T00:00:00Z" } } } },
            { "id": "page2", "properties": { "Date": { "date": { "start": "2024-02-27" } } } },
            { "id": "no-date", "properties": { "Date": { "date": null } } },
            { "id": "empty", "properties": { "Date": { "date": { "start": "2024-02-26" } } } }
        ]
    })))
}

async fn children(Path(page): Path<String>) -> Json<Value> {
    let text = match page.as_str() {
        "page1" => "Test diary entry",
        "page2" => "Another day",
        _ => "",
    };
    let results = if text.is_empty() {
        json!([])
    } else {
        json!([{ "type": "paragraph", "paragraph": { "rich_text": [{ "plain_text": text }] } }])
    };
    Json(json!({ "results": results }))
}

#[tokio::test]
async fn get_recent_entries_parses_pages() {
    let router = Router::new()
        .route("/databases/{id}/query", post(query))
        .route("/blocks/{id}/children", get(children));
    let base = common::spawn_server(router).await;

    let client = NotionDiaryClient::new("fake-token".into(), "fake-db-id".into(), "Date".into())
        .with_base_url(base);
    let entries = client.get_recent_entries(3).await.unwrap();

    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].page_id, "page1");
    assert_eq!(entries[0].content, "Test diary entry");
    assert_eq!(entries[0].date, Utc.with_ymd_and_hms(2024, 2, 28, 0, 0, 0).unwrap());
    assert_eq!(entries[1].date, Utc.with_ymd_and_hms(2024, 2, 27, 0, 0, 0).unwrap());
}

#[tokio::test]
async fn unauthorized_query_is_an_error() {
    let router = Router::new().route(
        "/databases/{id}/query",
        post(|| async { (StatusCode::UNAUTHORIZED, Json(json!({ "code": "unauthorized" }))) }),
    );
    let base = common::spawn_server(router).await;

    let client = NotionDiaryClient::new("bad".into(), "fake-db-id".into(), "Date".into())
        .with_base_url(base);
    let err = client.get_recent_entries(1).await.unwrap_err();
    assert!(format!("{err:#}").contains("401"), "{err:#}");
}

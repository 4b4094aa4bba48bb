use crate::domain::error::{AppError, ErrorCode};
use crate::domain::session::{AuthSession, AuthState};
use crate::domain::style::{BlogStyle, CafeStyle, Style};
use crate::domain::types::{
    ContentTarget, ItemDetail, ItemQuery, ItemUpdate, QueueEntry, Source, SourceCreate,
};
use crate::domain::writer::WriterState;

#[test]
fn test_content_target_serialization() {
    assert_eq!(serde_json::to_string(&ContentTarget::Blog).unwrap(), "\"blog\"");
    assert_eq!(
        serde_json::from_str::<ContentTarget>("\"cafe\"").unwrap(),
        ContentTarget::Cafe
    );
}

#[test]
fn test_style_serialization() {
    assert_eq!(
        serde_json::to_string(&Style::Blog(BlogStyle::Interview)).unwrap(),
        r#"{"target":"blog","style":"interview"}"#
    );
    assert_eq!(
        serde_json::from_str::<Style>(r#"{"target":"cafe","style":"viral"}"#).unwrap(),
        Style::Cafe(CafeStyle::Viral)
    );
}

#[test]
fn test_writer_state_serialization() {
    assert_eq!(
        serde_json::to_string(&WriterState::Rewriting).unwrap(),
        "\"rewriting\""
    );
}

#[test]
fn test_auth_state_serialization() {
    let json = serde_json::to_string(&AuthState::Expired {
        message: "expired".into(),
    })
    .unwrap();
    assert_eq!(json, r#"{"state":"expired","message":"expired"}"#);
    assert_eq!(
        serde_json::to_string(AuthSession::new().state()).unwrap(),
        r#"{"state":"anonymous"}"#
    );
}

#[test]
fn test_error_code_serialization() {
    let err = AppError::locked("locked");
    let json = serde_json::to_value(&err).unwrap();
    assert_eq!(json["code"], "E_LOCKED");
    assert_eq!(json["recoverable"], true);
    assert_eq!(ErrorCode::Unauthorized.as_str(), "E_UNAUTHORIZED");
}

#[test]
fn test_item_detail_deserialization_flattens_item() {
    let json = r#"{
        "id": 3, "source_id": 1, "source_name": "구청", "title": "공지",
        "published_at": null, "collected_at": "2025-01-15T10:30:00",
        "url": "https://example.com/3", "summary_text": null, "category": "공지",
        "source_type": "rss", "region": "중구", "tags": ["행사"], "status": "collected",
        "image_urls": null, "thumbnail_url": null,
        "source_url": "https://example.com", "raw_text": "본문",
        "source_item_id": "abc", "hash_content": null, "meta_json": {"k": 1},
        "score_priority": 5, "duplicates": []
    }"#;
    let detail: ItemDetail = serde_json::from_str(json).unwrap();
    assert_eq!(detail.item.id, 3);
    assert_eq!(detail.item.tags.as_deref(), Some(&["행사".to_string()][..]));
    assert_eq!(detail.raw_text.as_deref(), Some("본문"));
    assert_eq!(detail.score_priority, 5);
}

#[test]
fn test_item_update_skips_unset_fields() {
    let update = ItemUpdate {
        title: Some("새 제목".into()),
        ..Default::default()
    };
    assert_eq!(serde_json::to_string(&update).unwrap(), r#"{"title":"새 제목"}"#);
    assert!(ItemUpdate::default().is_empty());
}

#[test]
fn test_item_query_renames() {
    let query = ItemQuery {
        source_type: Some("rss".into()),
        search: Some("축제".into()),
        limit: Some(20),
        ..Default::default()
    };
    let json = serde_json::to_value(&query).unwrap();
    assert_eq!(json["type"], "rss");
    assert_eq!(json["q"], "축제");
    assert_eq!(json["limit"], 20);
    assert!(json.get("status").is_none());
}

#[test]
fn test_source_type_rename() {
    let create = SourceCreate {
        name: "시청".into(),
        source_type: "rss".into(),
        base_url: "https://example.com/rss".into(),
        collect_interval: 60,
        crawl_policy: None,
    };
    let json = serde_json::to_value(&create).unwrap();
    assert_eq!(json["type"], "rss");
    assert!(json.get("crawl_policy").is_none());

    let source: Source = serde_json::from_str(
        r#"{"id":1,"name":"시청","type":"rss","base_url":"u","enabled":true,"collect_interval":60}"#,
    )
    .unwrap();
    assert_eq!(source.source_type, "rss");
    assert!(source.last_collected_at.is_none());
}

#[test]
fn test_queue_entry_deserialization() {
    let entry: QueueEntry = serde_json::from_str(
        r#"{"id":4,"item_id":9,"scheduled_at":null,"approved_by":null,"approved_at":null,
            "note_editor":null,"export_format":"naver_cafe_markdown","item_title":"제목","item_category":null}"#,
    )
    .unwrap();
    assert_eq!(entry.item_id, 9);
    assert_eq!(entry.export_format, "naver_cafe_markdown");
}

use serde::{Deserialize, Serialize};

/// 書き出し先（スタイル語彙と画像マークアップが変わる）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentTarget {
    Blog,
    Cafe,
}

impl ContentTarget {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Blog => "blog",
            Self::Cafe => "cafe",
        }
    }
}

/// 収集アイテム（一覧用）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Item {
    pub id: i64,
    pub source_id: i64,
    pub source_name: Option<String>,
    pub title: String,
    pub published_at: Option<String>,
    pub collected_at: String,
    pub url: String,
    pub summary_text: Option<String>,
    pub category: Option<String>,
    pub source_type: Option<String>,
    pub region: Option<String>,
    pub tags: Option<Vec<String>>,
    pub status: String,
    pub image_urls: Option<Vec<String>>,
    #[serde(default)]
    pub thumbnail_url: Option<String>,
}

/// 収集アイテム詳細
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemDetail {
    #[serde(flatten)]
    pub item: Item,
    pub source_url: String,
    pub raw_text: Option<String>,
    pub source_item_id: Option<String>,
    pub hash_content: Option<String>,
    pub meta_json: Option<serde_json::Value>,
    pub score_priority: i64,
    #[serde(default)]
    pub duplicates: Vec<serde_json::Value>,
}

/// アイテム部分更新（None は送らない）
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ItemUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary_text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
}

impl ItemUpdate {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.summary_text.is_none()
            && self.category.is_none()
            && self.region.is_none()
            && self.tags.is_none()
    }
}

/// アイテム一覧のフィルタ
#[derive(Debug, Clone, Default, Serialize)]
pub struct ItemQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub source_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_id: Option<i64>,
    #[serde(rename = "q", skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skip: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
}

/// ダッシュボード統計（形はサーバー依存なので素通し）
pub type ItemStats = serde_json::Value;

/// 収集ソース
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Source {
    pub id: i64,
    pub name: String,
    #[serde(rename = "type")]
    pub source_type: String,
    pub base_url: String,
    pub enabled: bool,
    pub collect_interval: i64,
    #[serde(default)]
    pub last_collected_at: Option<String>,
    #[serde(default)]
    pub crawl_policy: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceCreate {
    pub name: String,
    #[serde(rename = "type")]
    pub source_type: String,
    pub base_url: String,
    pub collect_interval: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub crawl_policy: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SourceUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub source_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub collect_interval: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub crawl_policy: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
}

/// 手動収集の受付結果
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectionTriggered {
    pub message: String,
    pub source_id: i64,
    pub task_id: Option<String>,
}

/// 承認キューのエントリ
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueueEntry {
    pub id: i64,
    pub item_id: i64,
    pub scheduled_at: Option<String>,
    pub approved_by: Option<i64>,
    pub approved_at: Option<String>,
    pub note_editor: Option<String>,
    pub export_format: String,
    pub item_title: String,
    pub item_category: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApprovalResult {
    pub message: String,
    pub queue_id: i64,
    #[serde(default)]
    pub payload_text: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportPayload {
    pub queue_id: i64,
    pub payload_text: Option<String>,
    pub export_format: String,
}

/// 汎用 `{ "message": ... }` レスポンス
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

/// ログインユーザー
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub role: String,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub expires_at: Option<String>,
    #[serde(default)]
    pub last_login_at: Option<String>,
    #[serde(default)]
    pub login_count: Option<i64>,
    #[serde(default)]
    pub openai_api_key: Option<String>,
    #[serde(default)]
    pub gemini_api_key: Option<String>,
    #[serde(default)]
    pub perplexity_api_key: Option<String>,
}

impl User {
    pub fn is_admin(&self) -> bool {
        self.role == "admin"
    }
}

/// AI キー等のユーザー設定更新
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserSettingsUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub openai_api_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gemini_api_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub perplexity_api_key: Option<String>,
}

/// 管理者によるユーザー更新
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserAdminUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
}

/// 画像アップロード結果（url はサーバールート相対のことがある）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadedImage {
    pub url: String,
    #[serde(default)]
    pub filename: Option<String>,
}

/// ローカルに保存したリライト結果
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Draft {
    pub draft_id: String,
    pub item_id: Option<i64>,
    pub target: ContentTarget,
    pub style: String,
    pub provider: String,
    pub source_text: String,
    pub rewritten_text: String,
    pub created_at: String,
}

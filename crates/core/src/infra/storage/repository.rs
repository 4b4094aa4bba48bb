use rusqlite::{params, Connection, OptionalExtension};

use crate::domain::error::AppError;
use crate::domain::settings::ClientSettings;
use crate::domain::types::{ContentTarget, Draft};

/// トークンを置く settings キー
const TOKEN_KEY: &str = "auth_token";

/// SQLiteストレージ（settings + drafts）
pub struct Storage {
    conn: Connection,
}

impl Storage {
    /// 新規接続（ファイルパス指定）
    pub fn open(path: &str) -> Result<Self, AppError> {
        let conn = Connection::open(path)
            .map_err(|e| AppError::storage(format!("DB接続に失敗: {e}")))?;
        let storage = Self { conn };
        storage.migrate()?;
        Ok(storage)
    }

    /// in-memory DB（テスト用）
    pub fn open_in_memory() -> Result<Self, AppError> {
        let conn = Connection::open_in_memory()
            .map_err(|e| AppError::storage(format!("in-memory DB作成に失敗: {e}")))?;
        let storage = Self { conn };
        storage.migrate()?;
        Ok(storage)
    }

    #[cfg(test)]
    pub(crate) fn conn(&self) -> &Connection {
        &self.conn
    }

    /// スキーママイグレーション
    fn migrate(&self) -> Result<(), AppError> {
        self.conn
            .execute_batch(
                "
                CREATE TABLE IF NOT EXISTS settings (
                    key   TEXT PRIMARY KEY,
                    value TEXT NOT NULL
                );

                CREATE TABLE IF NOT EXISTS drafts (
                    draft_id       TEXT PRIMARY KEY,
                    item_id        INTEGER,
                    target         TEXT NOT NULL,
                    style          TEXT NOT NULL,
                    provider       TEXT NOT NULL,
                    source_text    TEXT NOT NULL,
                    rewritten_text TEXT NOT NULL,
                    created_at     TEXT NOT NULL
                );

                CREATE INDEX IF NOT EXISTS idx_drafts_created
                    ON drafts(created_at DESC);
                CREATE INDEX IF NOT EXISTS idx_drafts_item
                    ON drafts(item_id);
                ",
            )
            .map_err(|e| AppError::storage(format!("マイグレーション失敗: {e}")))?;
        Ok(())
    }

    // --- Settings ---

    pub fn get_settings(&self) -> Result<ClientSettings, AppError> {
        let mut stmt = self
            .conn
            .prepare("SELECT key, value FROM settings WHERE key != ?1")
            .map_err(|e| AppError::storage(format!("クエリ準備失敗: {e}")))?;

        let rows: Vec<(String, String)> = stmt
            .query_map(params![TOKEN_KEY], |row| Ok((row.get(0)?, row.get(1)?)))
            .map_err(|e| AppError::storage(format!("クエリ実行失敗: {e}")))?
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| AppError::storage(format!("行読み取り失敗: {e}")))?;

        if rows.is_empty() {
            return Ok(ClientSettings::default());
        }

        // key-value をJSONに組み立ててデシリアライズ
        let mut map = serde_json::Map::new();
        for (key, value) in &rows {
            // JSONとして解析可能ならそのまま、そうでなければ文字列として
            if let Ok(v) = serde_json::from_str(value) {
                map.insert(key.clone(), v);
            } else {
                map.insert(key.clone(), serde_json::Value::String(value.clone()));
            }
        }

        // 欠けたキーは既定値（ClientSettings は serde(default)）
        match serde_json::from_value::<ClientSettings>(serde_json::Value::Object(map)) {
            Ok(settings) => Ok(settings),
            Err(e) => {
                log::warn!("設定の読み込みに失敗、既定値を使用: {e}");
                Ok(ClientSettings::default())
            }
        }
    }

    pub fn save_settings(&self, settings: &ClientSettings) -> Result<(), AppError> {
        let json = serde_json::to_value(settings)
            .map_err(|e| AppError::internal(format!("settings serialize: {e}")))?;

        if let Some(obj) = json.as_object() {
            for (key, value) in obj {
                self.put_setting(key, &value.to_string())?;
            }
        }

        Ok(())
    }

    fn put_setting(&self, key: &str, value: &str) -> Result<(), AppError> {
        self.conn
            .execute(
                "INSERT INTO settings (key, value) VALUES (?1, ?2)
                 ON CONFLICT(key) DO UPDATE SET value = excluded.value",
                params![key, value],
            )
            .map_err(|e| AppError::storage(format!("設定保存失敗: {e}")))?;
        Ok(())
    }

    // --- Token ---

    pub fn load_token(&self) -> Result<Option<String>, AppError> {
        self.conn
            .query_row(
                "SELECT value FROM settings WHERE key = ?1",
                params![TOKEN_KEY],
                |row| row.get::<_, String>(0),
            )
            .optional()
            .map_err(|e| AppError::storage(format!("トークン読み込み失敗: {e}")))
    }

    pub fn save_token(&self, token: &str) -> Result<(), AppError> {
        self.put_setting(TOKEN_KEY, token)
    }

    pub fn clear_token(&self) -> Result<(), AppError> {
        self.conn
            .execute("DELETE FROM settings WHERE key = ?1", params![TOKEN_KEY])
            .map_err(|e| AppError::storage(format!("トークン削除失敗: {e}")))?;
        Ok(())
    }

    // --- Drafts ---

    pub fn insert_draft(&self, draft: &Draft) -> Result<(), AppError> {
        self.conn
            .execute(
                "INSERT INTO drafts (draft_id, item_id, target, style, provider, source_text, rewritten_text, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                params![
                    draft.draft_id,
                    draft.item_id,
                    draft.target.as_str(),
                    draft.style,
                    draft.provider,
                    draft.source_text,
                    draft.rewritten_text,
                    draft.created_at,
                ],
            )
            .map_err(|e| AppError::storage(format!("下書き挿入失敗: {e}")))?;
        Ok(())
    }

    pub fn get_draft(&self, draft_id: &str) -> Result<Option<Draft>, AppError> {
        self.conn
            .query_row(
                "SELECT draft_id, item_id, target, style, provider, source_text, rewritten_text, created_at
                 FROM drafts WHERE draft_id = ?1",
                params![draft_id],
                Self::map_draft_row,
            )
            .optional()
            .map_err(|e| AppError::storage(format!("下書き取得失敗: {e}")))
    }

    /// 新しい順
    pub fn list_drafts(&self, limit: u32) -> Result<Vec<Draft>, AppError> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT draft_id, item_id, target, style, provider, source_text, rewritten_text, created_at
                 FROM drafts ORDER BY created_at DESC, rowid DESC LIMIT ?1",
            )
            .map_err(|e| AppError::storage(format!("クエリ準備失敗: {e}")))?;

        let drafts = stmt
            .query_map(params![limit], Self::map_draft_row)
            .map_err(|e| AppError::storage(format!("クエリ実行失敗: {e}")))?
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| AppError::storage(format!("行読み取り失敗: {e}")))?;
        Ok(drafts)
    }

    pub fn delete_draft(&self, draft_id: &str) -> Result<bool, AppError> {
        let affected = self
            .conn
            .execute("DELETE FROM drafts WHERE draft_id = ?1", params![draft_id])
            .map_err(|e| AppError::storage(format!("下書き削除失敗: {e}")))?;
        Ok(affected > 0)
    }

    pub fn delete_old_drafts(&self, before_date: &str) -> Result<u32, AppError> {
        let affected = self
            .conn
            .execute(
                "DELETE FROM drafts WHERE created_at < ?1",
                params![before_date],
            )
            .map_err(|e| AppError::storage(format!("下書き削除失敗: {e}")))?;
        Ok(affected as u32)
    }

    fn map_draft_row(row: &rusqlite::Row) -> rusqlite::Result<Draft> {
        let target: String = row.get(2)?;
        Ok(Draft {
            draft_id: row.get(0)?,
            item_id: row.get(1)?,
            target: parse_target(&target),
            style: row.get(3)?,
            provider: row.get(4)?,
            source_text: row.get(5)?,
            rewritten_text: row.get(6)?,
            created_at: row.get(7)?,
        })
    }
}

fn parse_target(s: &str) -> ContentTarget {
    match s {
        "cafe" => ContentTarget::Cafe,
        _ => ContentTarget::Blog,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::provider::Provider;

    fn draft(id: &str, created_at: &str) -> Draft {
        Draft {
            draft_id: id.to_string(),
            item_id: Some(42),
            target: ContentTarget::Cafe,
            style: "viral".into(),
            provider: "gemini".into(),
            source_text: "원문".into(),
            rewritten_text: "결과".into(),
            created_at: created_at.to_string(),
        }
    }

    #[test]
    fn test_settings_default_when_empty() {
        let storage = Storage::open_in_memory().unwrap();
        assert_eq!(storage.get_settings().unwrap(), ClientSettings::default());
    }

    #[test]
    fn test_save_and_get_settings() {
        let storage = Storage::open_in_memory().unwrap();
        let settings = ClientSettings {
            api_base_url: "https://api.example.com".into(),
            timeout_secs: 30,
            default_target: ContentTarget::Cafe,
            default_provider: Provider::Perplexity,
            save_drafts: false,
            draft_ttl_days: 14,
        };
        storage.save_settings(&settings).unwrap();
        assert_eq!(storage.get_settings().unwrap(), settings);
    }

    #[test]
    fn test_token_lifecycle() {
        let storage = Storage::open_in_memory().unwrap();
        assert!(storage.load_token().unwrap().is_none());

        storage.save_token("jwt-1").unwrap();
        storage.save_token("jwt-2").unwrap();
        assert_eq!(storage.load_token().unwrap().as_deref(), Some("jwt-2"));

        storage.clear_token().unwrap();
        assert!(storage.load_token().unwrap().is_none());
    }

    #[test]
    fn test_token_does_not_leak_into_settings() {
        let storage = Storage::open_in_memory().unwrap();
        storage.save_token("jwt").unwrap();
        assert_eq!(storage.get_settings().unwrap(), ClientSettings::default());
    }

    #[test]
    fn test_insert_and_get_draft() {
        let storage = Storage::open_in_memory().unwrap();
        storage.insert_draft(&draft("d1", "2025-01-15T10:30:00Z")).unwrap();

        let got = storage.get_draft("d1").unwrap().unwrap();
        assert_eq!(got.item_id, Some(42));
        assert_eq!(got.target, ContentTarget::Cafe);
        assert_eq!(got.rewritten_text, "결과");
        assert!(storage.get_draft("missing").unwrap().is_none());
    }

    #[test]
    fn test_list_drafts_newest_first() {
        let storage = Storage::open_in_memory().unwrap();
        storage.insert_draft(&draft("old", "2025-01-10T00:00:00Z")).unwrap();
        storage.insert_draft(&draft("new", "2025-01-15T00:00:00Z")).unwrap();
        storage.insert_draft(&draft("mid", "2025-01-12T00:00:00Z")).unwrap();

        let ids: Vec<String> = storage
            .list_drafts(2)
            .unwrap()
            .into_iter()
            .map(|d| d.draft_id)
            .collect();
        assert_eq!(ids, vec!["new", "mid"]);
    }

    #[test]
    fn test_delete_draft() {
        let storage = Storage::open_in_memory().unwrap();
        storage.insert_draft(&draft("d1", "2025-01-15T10:30:00Z")).unwrap();
        assert!(storage.delete_draft("d1").unwrap());
        assert!(!storage.delete_draft("d1").unwrap());
    }

    #[test]
    fn test_delete_old_drafts() {
        let storage = Storage::open_in_memory().unwrap();
        storage.insert_draft(&draft("old", "2025-01-01T00:00:00Z")).unwrap();
        storage.insert_draft(&draft("new", "2025-02-01T00:00:00Z")).unwrap();

        let deleted = storage.delete_old_drafts("2025-01-15T00:00:00Z").unwrap();
        assert_eq!(deleted, 1);
        assert!(storage.get_draft("new").unwrap().is_some());
    }
}

use reqwest::Method;

use super::{ApiClient, ApiError};
use crate::domain::types::{CollectionTriggered, MessageResponse, Source, SourceCreate, SourceUpdate};

impl ApiClient {
    pub async fn list_sources(&self) -> Result<Vec<Source>, ApiError> {
        self.get_json("/api/sources").await
    }

    pub async fn create_source(&self, source: &SourceCreate) -> Result<Source, ApiError> {
        self.send_json(self.request(Method::POST, "/api/sources").json(source))
            .await
    }

    /// 有効/無効の切り替え（クエリパラメータ `enabled`）
    pub async fn toggle_source(&self, id: i64, enabled: bool) -> Result<MessageResponse, ApiError> {
        self.send_json(
            self.request(Method::PATCH, &format!("/api/sources/{id}"))
                .query(&[("enabled", enabled)]),
        )
        .await
    }

    pub async fn update_source(&self, id: i64, update: &SourceUpdate) -> Result<Source, ApiError> {
        self.send_json(
            self.request(Method::PATCH, &format!("/api/sources/{id}/update"))
                .json(update),
        )
        .await
    }

    pub async fn delete_source(&self, id: i64) -> Result<MessageResponse, ApiError> {
        self.send_json(self.request(Method::DELETE, &format!("/api/sources/{id}")))
            .await
    }

    /// 手動収集のトリガー
    pub async fn collect_source(&self, id: i64) -> Result<CollectionTriggered, ApiError> {
        self.send_json(self.request(Method::POST, &format!("/api/sources/{id}/collect")))
            .await
    }
}

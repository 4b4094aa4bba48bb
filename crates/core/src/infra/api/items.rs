use reqwest::Method;
use serde::Serialize;

use super::{ApiClient, ApiError};
use crate::domain::types::{Item, ItemDetail, ItemQuery, ItemStats, ItemUpdate, MessageResponse};

#[derive(Serialize)]
struct BulkDeleteRequest<'a> {
    item_ids: &'a [i64],
}

impl ApiClient {
    pub async fn list_items(&self, query: &ItemQuery) -> Result<Vec<Item>, ApiError> {
        self.send_json(self.request(Method::GET, "/api/items").query(query))
            .await
    }

    pub async fn item_stats(&self) -> Result<ItemStats, ApiError> {
        self.get_json("/api/items/stats").await
    }

    pub async fn get_item(&self, id: i64) -> Result<ItemDetail, ApiError> {
        self.get_json(&format!("/api/items/{id}")).await
    }

    pub async fn update_item(&self, id: i64, update: &ItemUpdate) -> Result<Item, ApiError> {
        self.send_json(
            self.request(Method::PATCH, &format!("/api/items/{id}"))
                .json(update),
        )
        .await
    }

    /// 承認キューへ追加
    pub async fn queue_item(&self, id: i64) -> Result<MessageResponse, ApiError> {
        self.send_json(self.request(Method::POST, &format!("/api/items/{id}/queue")))
            .await
    }

    pub async fn delete_item(&self, id: i64) -> Result<MessageResponse, ApiError> {
        self.send_json(self.request(Method::DELETE, &format!("/api/items/{id}")))
            .await
    }

    pub async fn bulk_delete_items(&self, ids: &[i64]) -> Result<MessageResponse, ApiError> {
        self.send_json(
            self.request(Method::POST, "/api/items/bulk-delete")
                .json(&BulkDeleteRequest { item_ids: ids }),
        )
        .await
    }

    pub async fn delete_all_items(&self) -> Result<MessageResponse, ApiError> {
        self.send_json(self.request(Method::POST, "/api/items/delete-all"))
            .await
    }
}

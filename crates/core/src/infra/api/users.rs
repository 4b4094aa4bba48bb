use reqwest::Method;

use super::{ApiClient, ApiError};
use crate::domain::types::{MessageResponse, User, UserAdminUpdate};

// 管理者専用エンドポイント
impl ApiClient {
    pub async fn list_users(&self) -> Result<Vec<User>, ApiError> {
        self.get_json("/api/users/").await
    }

    pub async fn update_user(&self, id: i64, update: &UserAdminUpdate) -> Result<User, ApiError> {
        self.send_json(
            self.request(Method::PATCH, &format!("/api/users/{id}"))
                .json(update),
        )
        .await
    }

    pub async fn delete_user(&self, id: i64) -> Result<MessageResponse, ApiError> {
        self.send_json(self.request(Method::DELETE, &format!("/api/users/{id}")))
            .await
    }
}

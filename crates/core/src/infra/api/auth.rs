use reqwest::Method;

use super::{ApiClient, ApiError};
use crate::domain::types::{MessageResponse, RegisterRequest, TokenResponse, User, UserSettingsUpdate};

impl ApiClient {
    /// `POST /api/auth/login`（OAuth2 パスワードフォーム）
    ///
    /// トークンの保持は呼び出し側（AppService）が行う。
    pub async fn login(&self, username: &str, password: &str) -> Result<TokenResponse, ApiError> {
        let form = [("username", username), ("password", password)];
        self.send_json(self.request(Method::POST, "/api/auth/login").form(&form))
            .await
    }

    pub async fn register(&self, req: &RegisterRequest) -> Result<MessageResponse, ApiError> {
        self.send_json(self.request(Method::POST, "/api/auth/register").json(req))
            .await
    }

    pub async fn me(&self) -> Result<User, ApiError> {
        self.get_json("/api/auth/me").await
    }

    /// AI キーの登録・更新
    pub async fn update_settings(&self, update: &UserSettingsUpdate) -> Result<User, ApiError> {
        self.send_json(self.request(Method::PATCH, "/api/auth/settings").json(update))
            .await
    }
}

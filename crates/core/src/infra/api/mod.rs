mod auth;
pub mod error;
mod items;
mod queue;
mod sources;
mod upload;
mod users;

pub use error::ApiError;
pub use upload::image_mime_for;

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;

use crate::domain::session::AuthSession;
use crate::domain::settings::ClientSettings;

/// バックエンド REST クライアント
///
/// すべてのリクエストにベアラートークンを付け、認証エラーを横取りして
/// セッションを破棄する。
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    session: Arc<Mutex<AuthSession>>,
}

impl ApiClient {
    pub fn new(
        settings: &ClientSettings,
        session: Arc<Mutex<AuthSession>>,
    ) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()
            .map_err(|e| ApiError::Client(e.to_string()))?;

        Ok(Self {
            http,
            base_url: settings.base_url().to_string(),
            session,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn session(&self) -> &Arc<Mutex<AuthSession>> {
        &self.session
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// サーバールート相対の URL にベース URL を前置する
    pub fn absolute_url(&self, url: &str) -> String {
        if url.starts_with("http://") || url.starts_with("https://") {
            url.to_string()
        } else if url.starts_with('/') {
            self.url(url)
        } else {
            format!("{}/{}", self.base_url, url)
        }
    }

    /// トークン付きリクエスト
    pub(crate) fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let builder = self.http.request(method, self.url(path));
        let token = self.session.lock().token().map(str::to_string);
        match token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// 送信し、非 2xx を ApiError に変換する
    pub(crate) async fn send(&self, builder: RequestBuilder) -> Result<Response, ApiError> {
        let response = builder.send().await.map_err(ApiError::from)?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let detail = error::extract_detail(&body)
            .unwrap_or_else(|| error::fallback_detail(status, &body));
        Err(self.intercept(status, detail))
    }

    pub(crate) async fn send_json<T: DeserializeOwned>(
        &self,
        builder: RequestBuilder,
    ) -> Result<T, ApiError> {
        let response = self.send(builder).await?;
        response
            .json::<T>()
            .await
            .map_err(|e| ApiError::Decode(e.to_string()))
    }

    pub(crate) async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.send_json(self.request(Method::GET, path)).await
    }

    /// 認証エラーの横取り: 401 と期限切れ 403 はセッションを破棄する
    fn intercept(&self, status: StatusCode, detail: String) -> ApiError {
        intercept_status(&self.session, status, detail)
    }
}

pub(crate) fn intercept_status(
    session: &Mutex<AuthSession>,
    status: StatusCode,
    detail: String,
) -> ApiError {
    match status {
        StatusCode::UNAUTHORIZED => {
            let t = session.lock().on_unauthorized();
            log::warn!("401 を受信、セッションを破棄: {} → {}", t.prev_state, t.new_state);
            ApiError::Unauthorized(detail)
        }
        StatusCode::FORBIDDEN => match session.lock().on_forbidden(&detail) {
            Some(t) => {
                log::warn!("利用期限切れ、強制ログアウト: {} → {}", t.prev_state, t.new_state);
                ApiError::Expired(detail)
            }
            None => ApiError::Status {
                status: status.as_u16(),
                detail,
            },
        },
        _ => {
            log::debug!("API エラー応答 {status}: {detail}");
            ApiError::Status {
                status: status.as_u16(),
                detail,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(base: &str) -> ApiClient {
        let settings = ClientSettings {
            api_base_url: base.to_string(),
            ..Default::default()
        };
        ApiClient::new(&settings, Arc::new(Mutex::new(AuthSession::new()))).unwrap()
    }

    #[test]
    fn test_absolute_url() {
        let api = client("http://localhost:8000/");
        assert_eq!(
            api.absolute_url("/static/uploads/a.png"),
            "http://localhost:8000/static/uploads/a.png"
        );
        assert_eq!(
            api.absolute_url("static/uploads/a.png"),
            "http://localhost:8000/static/uploads/a.png"
        );
        assert_eq!(api.absolute_url("https://cdn.example.com/a.png"), "https://cdn.example.com/a.png");
    }

    #[test]
    fn test_intercept_unauthorized_clears_session() {
        let session = Mutex::new(AuthSession::restore(Some("jwt".into())));
        let err = intercept_status(&session, StatusCode::UNAUTHORIZED, "Not authenticated".into());
        assert!(matches!(err, ApiError::Unauthorized(_)));
        assert!(!session.lock().is_authenticated());
    }

    #[test]
    fn test_intercept_forbidden_expired() {
        let session = Mutex::new(AuthSession::restore(Some("jwt".into())));
        let err = intercept_status(
            &session,
            StatusCode::FORBIDDEN,
            "Your account has expired".into(),
        );
        assert!(matches!(err, ApiError::Expired(_)));
        assert!(!session.lock().is_authenticated());
    }

    #[test]
    fn test_intercept_forbidden_permission_keeps_session() {
        let session = Mutex::new(AuthSession::restore(Some("jwt".into())));
        let err = intercept_status(&session, StatusCode::FORBIDDEN, "Permission denied".into());
        assert!(matches!(err, ApiError::Status { status: 403, .. }));
        assert!(session.lock().is_authenticated());
    }

    #[test]
    fn test_intercept_other_status() {
        let session = Mutex::new(AuthSession::restore(Some("jwt".into())));
        let err = intercept_status(&session, StatusCode::NOT_FOUND, "Item not found".into());
        assert_eq!(err.user_message(), "Item not found");
        assert!(session.lock().is_authenticated());
    }
}

mod api;
mod noop;
pub mod prompts;

pub use api::ApiRewriter;
pub use noop::NoopRewriter;

use async_trait::async_trait;
use serde::Serialize;

use crate::domain::error::AppError;
use crate::domain::provider::Provider;
use crate::infra::api::ApiError;

/// リライトエラー
#[derive(Debug, Clone, thiserror::Error)]
pub enum RewriteError {
    #[error("Rewriter not available: {0}")]
    NotAvailable(String),
    #[error("Rewrite failed: {0}")]
    Failed(String),
    #[error("Rewrite timeout")]
    Timeout,
    #[error(transparent)]
    Api(#[from] ApiError),
}

impl From<RewriteError> for AppError {
    fn from(e: RewriteError) -> Self {
        match e {
            // サーバーの detail をそのまま表示する
            RewriteError::Api(ApiError::Status { detail, .. }) => AppError::rewrite(detail),
            RewriteError::Api(ApiError::Timeout) | RewriteError::Timeout => {
                AppError::from(ApiError::Timeout)
            }
            RewriteError::Api(other) => AppError::from(other),
            RewriteError::NotAvailable(msg) | RewriteError::Failed(msg) => AppError::rewrite(msg),
        }
    }
}

/// `POST /api/ai/rewrite` のリクエスト本文
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RewriteRequest {
    pub text: String,
    pub provider: Provider,
    pub instruction: String,
    /// 未指定ならサーバー側に登録済みのキーを使う
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

/// リライター trait（バックエンド経由の実装とオフライン実装がある）
#[async_trait]
pub trait Rewriter: Send + Sync {
    async fn rewrite(&self, request: &RewriteRequest) -> Result<String, RewriteError>;

    fn name(&self) -> &str;
}

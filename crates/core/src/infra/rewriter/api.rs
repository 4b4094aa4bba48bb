use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Method;
use serde::Deserialize;

use super::{RewriteError, RewriteRequest, Rewriter};
use crate::infra::api::ApiClient;

/// バックエンドの `/api/ai/rewrite` を呼ぶリライター
pub struct ApiRewriter {
    api: Arc<ApiClient>,
}

#[derive(Deserialize)]
struct RewriteResponse {
    text: Option<String>,
}

impl ApiRewriter {
    pub fn new(api: Arc<ApiClient>) -> Self {
        Self { api }
    }
}

#[async_trait]
impl Rewriter for ApiRewriter {
    async fn rewrite(&self, request: &RewriteRequest) -> Result<String, RewriteError> {
        log::info!(
            "リライト要求: provider={} text={}文字",
            request.provider,
            request.text.chars().count()
        );

        let response: RewriteResponse = self
            .api
            .send_json(self.api.request(Method::POST, "/api/ai/rewrite").json(request))
            .await?;

        // 空文字列もそのまま結果として扱う
        response.text.ok_or_else(|| {
            RewriteError::Failed(format!("No text in response from {} provider", request.provider))
        })
    }

    fn name(&self) -> &str {
        "api"
    }
}

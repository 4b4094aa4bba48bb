use async_trait::async_trait;
use super::{RewriteError, RewriteRequest, Rewriter};

/// NoopRewriter: テキストをそのまま返すオフライン実装。
/// バックエンドに繋がずに書き出し経路を確認するときに使う。
pub struct NoopRewriter;

#[async_trait]
impl Rewriter for NoopRewriter {
    async fn rewrite(&self, request: &RewriteRequest) -> Result<String, RewriteError> {
        Ok(format!("[rewritten] {}", request.text))
    }

    fn name(&self) -> &str {
        "noop"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::provider::Provider;

    #[tokio::test]
    async fn test_noop_rewriter() {
        let rewriter = NoopRewriter;
        let request = RewriteRequest {
            text: "원문 텍스트".into(),
            provider: Provider::Gemini,
            instruction: "Rewrite this text.".into(),
            api_key: None,
            model: None,
        };
        let result = rewriter.rewrite(&request).await.unwrap();
        assert_eq!(result, "[rewritten] 원문 텍스트");
    }

    #[test]
    fn test_noop_name() {
        assert_eq!(NoopRewriter.name(), "noop");
    }
}

use std::sync::Arc;

use serde::Serialize;

use crate::domain::editor::EditTarget;
use crate::domain::error::AppError;
use crate::domain::provider::{Provider, ProviderCredentials};
use crate::domain::style::Style;
use crate::domain::writer::WriterDocument;
use crate::infra::rewriter::prompts::build_instruction;
use crate::infra::rewriter::{RewriteRequest, Rewriter};

/// リライト結果
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum RewriteOutcome {
    /// 原文が空のため何もしなかった
    Skipped,
    Rewritten {
        text: String,
        provider: Provider,
        style: Style,
    },
}

/// リライトの実行可否（トリガーボタンの有効状態）
pub fn can_rewrite(
    doc: &WriterDocument,
    credentials: &ProviderCredentials,
    provider: Provider,
) -> bool {
    !doc.is_busy() && !doc.pane(EditTarget::Source).is_blank() && credentials.is_configured(provider)
}

/// 実行中フラグを保持し、途中で future が破棄されても Idle に戻す
struct BusyGuard<'a> {
    doc: &'a mut WriterDocument,
    finished: bool,
}

impl<'a> BusyGuard<'a> {
    fn begin(doc: &'a mut WriterDocument) -> Result<Self, AppError> {
        doc.begin_rewrite()?;
        Ok(Self {
            doc,
            finished: false,
        })
    }

    fn finish(mut self, rewritten: Option<String>) {
        self.finished = true;
        self.doc.finish_rewrite(rewritten);
    }
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        if !self.finished {
            log::debug!("リライトが中断されました");
            self.doc.finish_rewrite(None);
        }
    }
}

/// リライトオーケストレーター
///
/// 原文・スタイル・プロバイダから指示文を組み立ててリライターを呼び、
/// 結果を書き換え文スロットに入れる。原文スロットには触れない。
pub struct RewriteOrchestrator {
    rewriter: Arc<dyn Rewriter>,
    model: Option<String>,
}

impl RewriteOrchestrator {
    pub fn new(rewriter: Arc<dyn Rewriter>) -> Self {
        Self {
            rewriter,
            model: None,
        }
    }

    /// サーバー既定以外のモデルを指定する
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// 送信前の検証をしてリクエストを組み立てる。原文が空なら None
    ///
    /// ネットワークには触れないので、画像アップロードなどの前段でも使える。
    pub fn prepare(
        &self,
        doc: &WriterDocument,
        style: Style,
        provider: Provider,
        custom_instruction: Option<&str>,
        credentials: &ProviderCredentials,
    ) -> Result<Option<RewriteRequest>, AppError> {
        if doc.is_busy() {
            return Err(AppError::invalid_state("リライト処理中です"));
        }
        if doc.pane(EditTarget::Source).is_blank() {
            return Ok(None);
        }
        if style.target() != doc.target() {
            return Err(AppError::validation(format!(
                "スタイル {} は書き出し先 {} では使えません",
                style.as_str(),
                doc.target().as_str()
            )));
        }
        if !credentials.is_configured(provider) {
            return Err(AppError::validation(format!(
                "{} の API キーが登録されていません",
                provider.display_name()
            )));
        }

        Ok(Some(RewriteRequest {
            text: doc.source_text().to_string(),
            provider,
            instruction: build_instruction(&style, custom_instruction)?,
            api_key: None,
            model: self.model.clone(),
        }))
    }

    pub async fn rewrite(
        &self,
        doc: &mut WriterDocument,
        style: Style,
        provider: Provider,
        custom_instruction: Option<&str>,
        credentials: &ProviderCredentials,
    ) -> Result<RewriteOutcome, AppError> {
        let Some(request) = self.prepare(doc, style, provider, custom_instruction, credentials)?
        else {
            log::debug!("原文が空のためリライトをスキップ");
            return Ok(RewriteOutcome::Skipped);
        };

        let guard = BusyGuard::begin(doc)?;
        match self.rewriter.rewrite(&request).await {
            Ok(text) => {
                guard.finish(Some(text.clone()));
                log::info!(
                    "リライト完了: provider={provider} style={} {}文字",
                    style.as_str(),
                    text.chars().count()
                );
                Ok(RewriteOutcome::Rewritten {
                    text,
                    provider,
                    style,
                })
            }
            Err(e) => {
                guard.finish(None);
                log::warn!("リライト失敗 ({}): {e}", self.rewriter.name());
                Err(AppError::from(e))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use parking_lot::Mutex;

    use crate::domain::editor::EditTarget;
    use crate::domain::error::ErrorCode;
    use crate::domain::style::{BlogStyle, CafeStyle};
    use crate::domain::types::ContentTarget;
    use crate::domain::writer::WriterState;
    use crate::infra::api::ApiError;
    use crate::infra::rewriter::prompts::{BLOG_STORY, GENERIC_INSTRUCTION};
    use crate::infra::rewriter::RewriteError;

    /// 呼び出しを記録するモック
    struct MockRewriter {
        calls: AtomicUsize,
        last: Mutex<Option<RewriteRequest>>,
        reply: Result<String, RewriteError>,
    }

    impl MockRewriter {
        fn ok(text: &str) -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                last: Mutex::new(None),
                reply: Ok(text.to_string()),
            })
        }

        fn failing(err: RewriteError) -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                last: Mutex::new(None),
                reply: Err(err),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl Rewriter for MockRewriter {
        async fn rewrite(&self, request: &RewriteRequest) -> Result<String, RewriteError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.last.lock() = Some(request.clone());
            self.reply.clone()
        }

        fn name(&self) -> &str {
            "mock"
        }
    }

    fn all_keys() -> ProviderCredentials {
        ProviderCredentials {
            openai: true,
            gemini: true,
            perplexity: true,
        }
    }

    #[tokio::test]
    async fn test_blank_source_is_noop() {
        let mock = MockRewriter::ok("unused");
        let orch = RewriteOrchestrator::new(mock.clone());
        let mut doc = WriterDocument::new(ContentTarget::Blog, "  \n\t ");
        doc.set_rewritten_text("이전 결과");

        let outcome = orch
            .rewrite(
                &mut doc,
                Style::Blog(BlogStyle::News),
                Provider::OpenAi,
                None,
                &all_keys(),
            )
            .await
            .unwrap();

        assert_eq!(outcome, RewriteOutcome::Skipped);
        assert_eq!(mock.calls(), 0);
        assert_eq!(doc.source_text(), "  \n\t ");
        assert_eq!(doc.rewritten_text(), "이전 결과");
    }

    #[tokio::test]
    async fn test_success_replaces_rewritten_only() {
        let mock = MockRewriter::ok("새 결과");
        let orch = RewriteOrchestrator::new(mock.clone());
        let mut doc = WriterDocument::new(ContentTarget::Blog, "원문");
        doc.set_rewritten_text("이전 결과는 통째로 바뀐다");

        let outcome = orch
            .rewrite(
                &mut doc,
                Style::Blog(BlogStyle::Story),
                Provider::Gemini,
                None,
                &all_keys(),
            )
            .await
            .unwrap();

        assert!(matches!(outcome, RewriteOutcome::Rewritten { ref text, .. } if text == "새 결과"));
        assert_eq!(doc.source_text(), "원문");
        assert_eq!(doc.rewritten_text(), "새 결과");
        assert_eq!(doc.active(), EditTarget::Rewritten);
        assert_eq!(doc.state(), WriterState::Idle);

        let sent = mock.last.lock().clone().unwrap();
        assert_eq!(sent.text, "원문");
        assert_eq!(sent.provider, Provider::Gemini);
        assert_eq!(sent.instruction, BLOG_STORY);
    }

    #[tokio::test]
    async fn test_failure_leaves_both_slots() {
        let mock = MockRewriter::failing(RewriteError::Api(ApiError::Status {
            status: 400,
            detail: "OpenAI API key not configured".into(),
        }));
        let orch = RewriteOrchestrator::new(mock.clone());
        let mut doc = WriterDocument::new(ContentTarget::Cafe, "원문");
        doc.set_rewritten_text("이전 결과");

        let err = orch
            .rewrite(
                &mut doc,
                Style::Cafe(CafeStyle::Info),
                Provider::OpenAi,
                None,
                &all_keys(),
            )
            .await
            .unwrap_err();

        assert_eq!(err.code, ErrorCode::Rewrite);
        assert_eq!(err.message, "OpenAI API key not configured");
        assert_eq!(doc.source_text(), "원문");
        assert_eq!(doc.rewritten_text(), "이전 결과");
        assert!(!doc.is_busy());
    }

    #[tokio::test]
    async fn test_busy_document_rejects_second_rewrite() {
        let mock = MockRewriter::ok("unused");
        let orch = RewriteOrchestrator::new(mock.clone());
        let mut doc = WriterDocument::new(ContentTarget::Blog, "원문");
        doc.begin_rewrite().unwrap();

        let err = orch
            .rewrite(
                &mut doc,
                Style::Blog(BlogStyle::News),
                Provider::OpenAi,
                None,
                &all_keys(),
            )
            .await
            .unwrap_err();

        assert_eq!(err.code, ErrorCode::InvalidState);
        assert_eq!(mock.calls(), 0);
    }

    #[tokio::test]
    async fn test_unconfigured_provider_rejected_before_call() {
        let mock = MockRewriter::ok("unused");
        let orch = RewriteOrchestrator::new(mock.clone());
        let mut doc = WriterDocument::new(ContentTarget::Blog, "원문");
        let creds = ProviderCredentials {
            openai: true,
            ..Default::default()
        };

        let err = orch
            .rewrite(
                &mut doc,
                Style::Blog(BlogStyle::News),
                Provider::Perplexity,
                None,
                &creds,
            )
            .await
            .unwrap_err();

        assert_eq!(err.code, ErrorCode::Validation);
        assert_eq!(mock.calls(), 0);
    }

    #[tokio::test]
    async fn test_blog_custom_without_instruction_never_calls() {
        let mock = MockRewriter::ok("unused");
        let orch = RewriteOrchestrator::new(mock.clone());
        let mut doc = WriterDocument::new(ContentTarget::Blog, "원문");

        let err = orch
            .rewrite(
                &mut doc,
                Style::Blog(BlogStyle::Custom),
                Provider::OpenAi,
                Some("  "),
                &all_keys(),
            )
            .await
            .unwrap_err();

        assert_eq!(err.code, ErrorCode::Validation);
        assert_eq!(mock.calls(), 0);
        assert!(!doc.is_busy());
    }

    #[tokio::test]
    async fn test_cafe_custom_falls_back_to_generic() {
        let mock = MockRewriter::ok("결과");
        let orch = RewriteOrchestrator::new(mock.clone());
        let mut doc = WriterDocument::new(ContentTarget::Cafe, "원문");

        orch.rewrite(
            &mut doc,
            Style::Cafe(CafeStyle::Custom),
            Provider::OpenAi,
            None,
            &all_keys(),
        )
        .await
        .unwrap();

        let sent = mock.last.lock().clone().unwrap();
        assert_eq!(sent.instruction, GENERIC_INSTRUCTION);
    }

    #[tokio::test]
    async fn test_custom_instruction_sent_verbatim() {
        let mock = MockRewriter::ok("결과");
        let orch = RewriteOrchestrator::new(mock.clone()).with_model("gpt-4o-mini");
        let mut doc = WriterDocument::new(ContentTarget::Blog, "원문");

        orch.rewrite(
            &mut doc,
            Style::Blog(BlogStyle::Custom),
            Provider::OpenAi,
            Some("세 문장으로 요약"),
            &all_keys(),
        )
        .await
        .unwrap();

        let sent = mock.last.lock().clone().unwrap();
        assert_eq!(sent.instruction, "세 문장으로 요약");
        assert_eq!(sent.model.as_deref(), Some("gpt-4o-mini"));
    }

    #[tokio::test]
    async fn test_style_from_other_target_rejected() {
        let mock = MockRewriter::ok("unused");
        let orch = RewriteOrchestrator::new(mock.clone());
        let mut doc = WriterDocument::new(ContentTarget::Blog, "원문");

        let err = orch
            .rewrite(
                &mut doc,
                Style::Cafe(CafeStyle::Viral),
                Provider::OpenAi,
                None,
                &all_keys(),
            )
            .await
            .unwrap_err();

        assert_eq!(err.code, ErrorCode::Validation);
        assert_eq!(mock.calls(), 0);
    }

    #[test]
    fn test_prepare_validates_without_calling() {
        let mock = MockRewriter::ok("unused");
        let orch = RewriteOrchestrator::new(mock.clone());
        let doc = WriterDocument::new(ContentTarget::Blog, "원문");

        let err = orch
            .prepare(
                &doc,
                Style::Blog(BlogStyle::Custom),
                Provider::OpenAi,
                None,
                &all_keys(),
            )
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::Validation);

        let request = orch
            .prepare(
                &doc,
                Style::Blog(BlogStyle::Custom),
                Provider::OpenAi,
                Some("짧게"),
                &all_keys(),
            )
            .unwrap()
            .unwrap();
        assert_eq!(request.text, "원문");
        assert_eq!(request.instruction, "짧게");

        let blank = WriterDocument::new(ContentTarget::Blog, "\n ");
        let none = orch
            .prepare(
                &blank,
                Style::Blog(BlogStyle::News),
                Provider::OpenAi,
                None,
                &ProviderCredentials::default(),
            )
            .unwrap();
        assert!(none.is_none());
        assert_eq!(mock.calls(), 0);
    }

    #[test]
    fn test_can_rewrite() {
        let creds = ProviderCredentials {
            gemini: true,
            ..Default::default()
        };
        let mut doc = WriterDocument::new(ContentTarget::Cafe, "원문");
        assert!(can_rewrite(&doc, &creds, Provider::Gemini));
        assert!(!can_rewrite(&doc, &creds, Provider::OpenAi));

        doc.begin_rewrite().unwrap();
        assert!(!can_rewrite(&doc, &creds, Provider::Gemini));

        let blank = WriterDocument::new(ContentTarget::Cafe, " ");
        assert!(!can_rewrite(&blank, &creds, Provider::Gemini));
    }
}

use crate::domain::error::AppError;
use crate::infra::post_processor::PostProcessor;
use super::OutputTarget;

/// クリップボード出力（HTML + プレーンテキスト）
///
/// HTML エディタに貼ると画像がそのまま表示される。
pub struct ClipboardOutput;

impl ClipboardOutput {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ClipboardOutput {
    fn default() -> Self {
        Self::new()
    }
}

impl OutputTarget for ClipboardOutput {
    fn deliver(&self, text: &str) -> Result<(), AppError> {
        let mut ctx = arboard::Clipboard::new()
            .map_err(|e| AppError::output(format!("クリップボード初期化失敗: {e}")))?;

        let html = PostProcessor::to_html(text);
        if let Err(e) = ctx.set_html(html.as_str(), Some(text)) {
            // HTML 非対応環境ではテキストのみ
            log::warn!("HTML 形式でのコピーに失敗、テキストで再試行: {e}");
            ctx.set_text(text)
                .map_err(|e| AppError::output(format!("クリップボード書き込み失敗: {e}")))?;
        }
        log::info!("クリップボードに出力: {} 文字", text.chars().count());
        Ok(())
    }

    fn name(&self) -> &str {
        "clipboard"
    }
}

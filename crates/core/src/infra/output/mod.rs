mod clipboard;

pub use clipboard::ClipboardOutput;

use crate::domain::error::AppError;

/// 出力先 trait
pub trait OutputTarget: Send + Sync {
    fn deliver(&self, text: &str) -> Result<(), AppError>;
    fn name(&self) -> &str;
}

/// 出力ルーター: 書き換え文を出力先へ配信
pub struct OutputRouter {
    clipboard: Box<dyn OutputTarget>,
}

impl OutputRouter {
    pub fn new() -> Self {
        Self::with_clipboard(Box::new(ClipboardOutput::new()))
    }

    /// 出力先の差し替え（テスト用）
    pub fn with_clipboard(clipboard: Box<dyn OutputTarget>) -> Self {
        Self { clipboard }
    }

    pub fn deliver_clipboard(&self, text: &str) -> Result<(), AppError> {
        if text.trim().is_empty() {
            return Err(AppError::validation("出力する本文がありません"));
        }
        self.clipboard.deliver(text)
    }
}

impl Default for OutputRouter {
    fn default() -> Self {
        Self::new()
    }
}

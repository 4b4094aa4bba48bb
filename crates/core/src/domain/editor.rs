use serde::{Deserialize, Serialize};

use super::error::AppError;
use super::types::ContentTarget;

/// 編集対象ペイン
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EditTarget {
    Source,
    Rewritten,
}

impl EditTarget {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Source => "source",
            Self::Rewritten => "rewritten",
        }
    }
}

/// 画像参照の書式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImageMarkup {
    /// カフェ/ブログの HTML エディタにそのまま貼れる `<img>` タグ
    Html,
    Markdown,
}

pub const IMAGE_STYLE: &str = "max-width: 100%; height: auto; display: block; margin: 10px 0;";
pub const IMAGE_ALT: &str = "이미지";

impl ImageMarkup {
    pub fn for_target(target: ContentTarget) -> Self {
        match target {
            ContentTarget::Cafe => Self::Html,
            ContentTarget::Blog => Self::Markdown,
        }
    }

    /// 前後に改行を付けた挿入テキスト
    pub fn render(&self, url: &str) -> String {
        match self {
            Self::Html => format!("\n<img src=\"{url}\" style=\"{IMAGE_STYLE}\" />\n"),
            Self::Markdown => format!("\n![{IMAGE_ALT}]({url})\n"),
        }
    }
}

/// テキストエリア1枚分の状態（本文 + 選択範囲）
///
/// 選択範囲は UTF-8 のバイトオフセット。`start == end` ならカーソル。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TextPane {
    text: String,
    selection_start: usize,
    selection_end: usize,
}

/// 挿入結果
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Insertion {
    pub target: EditTarget,
    pub offset: usize,
    pub inserted: String,
    /// 挿入後のカーソル位置（挿入テキストの直後）
    pub cursor: usize,
}

impl TextPane {
    /// カーソルは末尾に置く
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        let end = text.len();
        Self {
            text,
            selection_start: end,
            selection_end: end,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }

    pub fn selection(&self) -> (usize, usize) {
        (self.selection_start, self.selection_end)
    }

    pub fn cursor(&self) -> usize {
        self.selection_end
    }

    /// 本文を丸ごと置き換え、カーソルを末尾へ
    pub fn replace_all(&mut self, text: impl Into<String>) {
        *self = Self::new(text);
    }

    /// 範囲外は末尾に丸める。文字境界でなければエラー
    pub fn set_selection(&mut self, start: usize, end: usize) -> Result<(), AppError> {
        let len = self.text.len();
        let (mut start, mut end) = (start.min(len), end.min(len));
        if start > end {
            std::mem::swap(&mut start, &mut end);
        }
        if !self.text.is_char_boundary(start) || !self.text.is_char_boundary(end) {
            return Err(AppError::validation(format!(
                "選択位置 {start}..{end} が文字境界ではありません"
            )));
        }
        self.selection_start = start;
        self.selection_end = end;
        Ok(())
    }

    pub fn set_cursor(&mut self, offset: usize) -> Result<(), AppError> {
        self.set_selection(offset, offset)
    }

    /// 選択範囲を `snippet` で置き換え、カーソルを直後に移す
    pub fn insert_at_selection(&mut self, snippet: &str) -> (usize, usize) {
        let start = self.selection_start;
        let end = self.selection_end;
        self.text.replace_range(start..end, snippet);
        let cursor = start + snippet.len();
        self.selection_start = cursor;
        self.selection_end = cursor;
        (start, cursor)
    }
}

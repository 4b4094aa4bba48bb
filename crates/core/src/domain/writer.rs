use std::path::PathBuf;

use serde::Serialize;

use super::editor::{EditTarget, ImageMarkup, Insertion, TextPane};
use super::error::AppError;
use super::types::{ContentTarget, ItemDetail};

/// ライター状態
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WriterState {
    Idle,
    /// リライト要求の応答待ち（再送不可）
    Rewriting,
}

impl WriterState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Rewriting => "rewriting",
        }
    }
}

/// 添付画像
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImageRef {
    pub url: String,
    /// アップロード元のローカルファイル（収集済み画像は None）
    pub file: Option<PathBuf>,
}

/// リライト画面1枚分のドキュメント
///
/// 原文と書き換え文は別々に持ち、互いに上書きしない。
/// ロックは原文ペインにだけ効く。
#[derive(Debug, Clone)]
pub struct WriterDocument {
    item_id: Option<i64>,
    target: ContentTarget,
    source: TextPane,
    rewritten: TextPane,
    locked: bool,
    images: Vec<ImageRef>,
    active: EditTarget,
    state: WriterState,
}

impl WriterDocument {
    pub fn new(target: ContentTarget, source_text: impl Into<String>) -> Self {
        Self {
            item_id: None,
            target,
            source: TextPane::new(source_text),
            rewritten: TextPane::default(),
            locked: false,
            images: Vec::new(),
            active: EditTarget::Source,
            state: WriterState::Idle,
        }
    }

    /// アイテムから開く: 「タイトル\n\n本文\n\n」+ 収集済み画像
    pub fn from_item(target: ContentTarget, detail: &ItemDetail) -> Self {
        let mut text = format!("{}\n\n", detail.item.title);
        if let Some(raw) = detail.raw_text.as_deref() {
            text.push_str(raw);
            text.push_str("\n\n");
        }
        let mut doc = Self::new(target, text);
        doc.item_id = Some(detail.item.id);
        doc.images = detail
            .item
            .image_urls
            .iter()
            .flatten()
            .map(|url| ImageRef {
                url: url.clone(),
                file: None,
            })
            .collect();
        doc
    }

    pub fn item_id(&self) -> Option<i64> {
        self.item_id
    }

    pub fn target(&self) -> ContentTarget {
        self.target
    }

    pub fn source_text(&self) -> &str {
        self.source.text()
    }

    pub fn rewritten_text(&self) -> &str {
        self.rewritten.text()
    }

    pub fn pane(&self, target: EditTarget) -> &TextPane {
        match target {
            EditTarget::Source => &self.source,
            EditTarget::Rewritten => &self.rewritten,
        }
    }

    fn pane_mut(&mut self, target: EditTarget) -> &mut TextPane {
        match target {
            EditTarget::Source => &mut self.source,
            EditTarget::Rewritten => &mut self.rewritten,
        }
    }

    pub fn images(&self) -> &[ImageRef] {
        &self.images
    }

    pub fn active(&self) -> EditTarget {
        self.active
    }

    pub fn activate(&mut self, target: EditTarget) {
        self.active = target;
    }

    pub fn state(&self) -> WriterState {
        self.state
    }

    pub fn is_busy(&self) -> bool {
        self.state == WriterState::Rewriting
    }

    // ==================== Lock ====================

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    pub fn lock_source(&mut self) {
        self.locked = true;
    }

    pub fn unlock_source(&mut self) {
        self.locked = false;
    }

    /// 原文ロック中の原文ペインへの書き込みは E_LOCKED
    pub fn ensure_writable(&self, target: EditTarget) -> Result<(), AppError> {
        if target == EditTarget::Source && self.locked {
            return Err(AppError::locked(
                "原文はロックされています。編集するにはロックを解除してください",
            ));
        }
        Ok(())
    }

    // ==================== Editing ====================

    pub fn set_source_text(&mut self, text: impl Into<String>) -> Result<(), AppError> {
        self.ensure_writable(EditTarget::Source)?;
        self.source.replace_all(text);
        Ok(())
    }

    /// 書き換え文はロックの影響を受けない
    pub fn set_rewritten_text(&mut self, text: impl Into<String>) {
        self.rewritten.replace_all(text);
    }

    pub fn set_selection(
        &mut self,
        target: EditTarget,
        start: usize,
        end: usize,
    ) -> Result<(), AppError> {
        self.pane_mut(target).set_selection(start, end)
    }

    /// 画像参照をカーソル位置に挿入し、対象ペインをアクティブにする
    pub fn insert_image_reference(
        &mut self,
        target: EditTarget,
        url: &str,
    ) -> Result<Insertion, AppError> {
        self.ensure_writable(target)?;
        if url.trim().is_empty() {
            return Err(AppError::validation("画像 URL が空です"));
        }

        let snippet = ImageMarkup::for_target(self.target).render(url);
        let (offset, cursor) = self.pane_mut(target).insert_at_selection(&snippet);
        self.active = target;

        Ok(Insertion {
            target,
            offset,
            inserted: snippet,
            cursor,
        })
    }

    // ==================== Images ====================

    pub fn add_image(&mut self, image: ImageRef) {
        self.images.push(image);
    }

    pub fn remove_image(&mut self, index: usize) -> Option<ImageRef> {
        if index < self.images.len() {
            Some(self.images.remove(index))
        } else {
            None
        }
    }

    // ==================== Rewrite lifecycle ====================

    /// Idle→Rewriting
    pub fn begin_rewrite(&mut self) -> Result<(), AppError> {
        match self.state {
            WriterState::Idle => {
                self.state = WriterState::Rewriting;
                Ok(())
            }
            WriterState::Rewriting => Err(AppError::invalid_state("リライト処理中です")),
        }
    }

    /// Rewriting→Idle。成功時のみ書き換え文を丸ごと差し替えてアクティブにする
    pub fn finish_rewrite(&mut self, rewritten: Option<String>) {
        self.state = WriterState::Idle;
        if let Some(text) = rewritten {
            self.rewritten.replace_all(text);
            self.active = EditTarget::Rewritten;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::error::ErrorCode;
    use crate::domain::types::Item;

    fn detail(raw_text: Option<&str>) -> ItemDetail {
        ItemDetail {
            item: Item {
                id: 7,
                source_id: 1,
                source_name: Some("시청 공지".into()),
                title: "축제 안내".into(),
                published_at: None,
                collected_at: "2025-01-15T10:30:00".into(),
                url: "https://example.com/7".into(),
                summary_text: None,
                category: Some("축제".into()),
                source_type: None,
                region: None,
                tags: None,
                status: "collected".into(),
                image_urls: Some(vec!["https://example.com/a.jpg".into()]),
                thumbnail_url: None,
            },
            source_url: "https://example.com".into(),
            raw_text: raw_text.map(String::from),
            source_item_id: None,
            hash_content: None,
            meta_json: None,
            score_priority: 0,
            duplicates: vec![],
        }
    }

    #[test]
    fn test_from_item_initial_content() {
        let doc = WriterDocument::from_item(ContentTarget::Blog, &detail(Some("본문")));
        assert_eq!(doc.source_text(), "축제 안내\n\n본문\n\n");
        assert_eq!(doc.rewritten_text(), "");
        assert_eq!(doc.item_id(), Some(7));
        assert_eq!(doc.images().len(), 1);
        assert!(doc.images()[0].file.is_none());
    }

    #[test]
    fn test_from_item_without_raw_text() {
        let doc = WriterDocument::from_item(ContentTarget::Cafe, &detail(None));
        assert_eq!(doc.source_text(), "축제 안내\n\n");
    }

    #[test]
    fn test_locked_source_rejects_insertion() {
        let mut doc = WriterDocument::new(ContentTarget::Cafe, "원문");
        doc.lock_source();
        let err = doc
            .insert_image_reference(EditTarget::Source, "/static/a.png")
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::Locked);
        assert_eq!(doc.source_text(), "원문");
        assert!(doc.ensure_writable(EditTarget::Rewritten).is_ok());
    }

    #[test]
    fn test_rewritten_pane_ignores_lock() {
        let mut doc = WriterDocument::new(ContentTarget::Cafe, "원문");
        doc.set_rewritten_text("결과");
        doc.lock_source();
        let ins = doc
            .insert_image_reference(EditTarget::Rewritten, "/static/a.png")
            .unwrap();
        assert!(doc.rewritten_text().starts_with("결과\n<img src=\"/static/a.png\""));
        assert_eq!(ins.cursor, doc.rewritten_text().len());
        assert_eq!(doc.active(), EditTarget::Rewritten);
    }

    #[test]
    fn test_insertion_at_cursor_offset() {
        let mut doc = WriterDocument::new(ContentTarget::Blog, "abcdef");
        doc.set_selection(EditTarget::Source, 3, 3).unwrap();
        let ins = doc
            .insert_image_reference(EditTarget::Source, "u.png")
            .unwrap();
        assert_eq!(ins.offset, 3);
        assert_eq!(doc.source_text(), "abc\n![이미지](u.png)\ndef");
        assert_eq!(doc.pane(EditTarget::Source).cursor(), 3 + ins.inserted.len());
    }

    #[test]
    fn test_set_source_text_respects_lock() {
        let mut doc = WriterDocument::new(ContentTarget::Blog, "a");
        doc.lock_source();
        assert!(doc.set_source_text("b").is_err());
        doc.unlock_source();
        doc.set_source_text("b").unwrap();
        assert_eq!(doc.source_text(), "b");
    }

    #[test]
    fn test_rewrite_lifecycle() {
        let mut doc = WriterDocument::new(ContentTarget::Blog, "a");
        doc.begin_rewrite().unwrap();
        assert!(doc.is_busy());
        assert!(doc.begin_rewrite().is_err());

        doc.finish_rewrite(None);
        assert_eq!(doc.state(), WriterState::Idle);
        assert_eq!(doc.active(), EditTarget::Source);

        doc.begin_rewrite().unwrap();
        doc.finish_rewrite(Some("b".into()));
        assert_eq!(doc.rewritten_text(), "b");
        assert_eq!(doc.active(), EditTarget::Rewritten);
    }

    #[test]
    fn test_remove_image() {
        let mut doc = WriterDocument::new(ContentTarget::Blog, "a");
        doc.add_image(ImageRef { url: "1".into(), file: None });
        doc.add_image(ImageRef { url: "2".into(), file: None });
        assert_eq!(doc.remove_image(0).unwrap().url, "1");
        assert!(doc.remove_image(5).is_none());
        assert_eq!(doc.images().len(), 1);
    }
}

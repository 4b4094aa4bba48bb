use std::sync::OnceLock;

use regex::Regex;

use crate::domain::editor::IMAGE_STYLE;

/// 書き出し前のテキスト後処理: Markdown 画像 → `<img>`、改行 → `<br/>`
pub struct PostProcessor;

fn markdown_image_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"!\[(.*?)\]\((.*?)\)").expect("static regex"))
}

impl PostProcessor {
    /// 全パイプラインを適用: newlines_to_br → markdown_images_to_html
    pub fn to_html(text: &str) -> String {
        let html = Self::newlines_to_br(text);
        Self::markdown_images_to_html(&html)
    }

    /// 改行を `<br/>` に（CRLF も1つの改行として扱う）
    pub fn newlines_to_br(text: &str) -> String {
        text.replace("\r\n", "\n").replace('\n', "<br/>")
    }

    /// `![alt](url)` を HTML エディタ向けの `<img>` タグに
    pub fn markdown_images_to_html(text: &str) -> String {
        markdown_image_re()
            .replace_all(text, |caps: &regex::Captures| {
                format!(
                    "<img src=\"{}\" alt=\"{}\" style=\"{IMAGE_STYLE}\" />",
                    &caps[2], &caps[1]
                )
            })
            .into_owned()
    }
}

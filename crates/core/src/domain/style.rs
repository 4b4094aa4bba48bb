use std::fmt;

use serde::{Deserialize, Serialize};

use super::error::AppError;
use super::types::ContentTarget;

/// ブログ向けリライトスタイル
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlogStyle {
    News,
    Review,
    Guide,
    Story,
    Interview,
    Custom,
}

/// カフェ（コミュニティ投稿）向けリライトスタイル
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CafeStyle {
    Review,
    Info,
    Question,
    Viral,
    Custom,
}

/// 書き出し先ごとに閉じたスタイル選択
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "target", content = "style", rename_all = "snake_case")]
pub enum Style {
    Blog(BlogStyle),
    Cafe(CafeStyle),
}

impl Style {
    /// 書き出し先のスタイル語彙で解釈する。語彙外はエラー（既定値に落とさない）
    pub fn parse(target: ContentTarget, name: &str) -> Result<Self, AppError> {
        let name = name.trim().to_ascii_lowercase();
        let style = match target {
            ContentTarget::Blog => match name.as_str() {
                "news" => Style::Blog(BlogStyle::News),
                "review" => Style::Blog(BlogStyle::Review),
                "guide" => Style::Blog(BlogStyle::Guide),
                "story" => Style::Blog(BlogStyle::Story),
                "interview" => Style::Blog(BlogStyle::Interview),
                "custom" => Style::Blog(BlogStyle::Custom),
                _ => return Err(unknown_style(target, &name)),
            },
            ContentTarget::Cafe => match name.as_str() {
                "review" => Style::Cafe(CafeStyle::Review),
                "info" => Style::Cafe(CafeStyle::Info),
                "question" => Style::Cafe(CafeStyle::Question),
                "viral" => Style::Cafe(CafeStyle::Viral),
                "custom" => Style::Cafe(CafeStyle::Custom),
                _ => return Err(unknown_style(target, &name)),
            },
        };
        Ok(style)
    }

    /// 書き出し先ごとの既定スタイル（どちらも review）
    pub fn default_for(target: ContentTarget) -> Self {
        match target {
            ContentTarget::Blog => Style::Blog(BlogStyle::Review),
            ContentTarget::Cafe => Style::Cafe(CafeStyle::Review),
        }
    }

    pub fn target(&self) -> ContentTarget {
        match self {
            Style::Blog(_) => ContentTarget::Blog,
            Style::Cafe(_) => ContentTarget::Cafe,
        }
    }

    pub fn is_custom(&self) -> bool {
        matches!(self, Style::Blog(BlogStyle::Custom) | Style::Cafe(CafeStyle::Custom))
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Style::Blog(BlogStyle::News) => "news",
            Style::Blog(BlogStyle::Review) | Style::Cafe(CafeStyle::Review) => "review",
            Style::Blog(BlogStyle::Guide) => "guide",
            Style::Blog(BlogStyle::Story) => "story",
            Style::Blog(BlogStyle::Interview) => "interview",
            Style::Blog(BlogStyle::Custom) | Style::Cafe(CafeStyle::Custom) => "custom",
            Style::Cafe(CafeStyle::Info) => "info",
            Style::Cafe(CafeStyle::Question) => "question",
            Style::Cafe(CafeStyle::Viral) => "viral",
        }
    }

    /// 書き出し先で選べるスタイル名
    pub fn vocabulary(target: ContentTarget) -> &'static [&'static str] {
        match target {
            ContentTarget::Blog => &["news", "review", "guide", "story", "interview", "custom"],
            ContentTarget::Cafe => &["review", "info", "question", "viral", "custom"],
        }
    }
}

impl fmt::Display for Style {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn unknown_style(target: ContentTarget, name: &str) -> AppError {
    AppError::validation(format!(
        "{} では '{name}' スタイルは使えません（{}）",
        target.as_str(),
        Style::vocabulary(target).join(", ")
    ))
}

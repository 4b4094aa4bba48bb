//! スタイル別リライト指示テンプレート

use crate::domain::error::AppError;
use crate::domain::style::{BlogStyle, CafeStyle, Style};

/// カフェの custom 指示が空のときの指示
pub const GENERIC_INSTRUCTION: &str = "Rewrite this text.";

pub const BLOG_NEWS: &str = "\
Rewrite this as a formal News Article (뉴스 기사). Use objective tone, inverted pyramid \
structure, and professional vocabulary.";

pub const BLOG_REVIEW: &str = "\
Rewrite this as a detailed Review (리뷰). Include personal pros/cons, rating-like checks, \
and helpful advice for potential users.";

pub const BLOG_GUIDE: &str = "\
Rewrite this as a How-to Guide (가이드). Use step-by-step numbering, clear headings, \
and instructive tone.";

pub const BLOG_STORY: &str = "\
Rewrite this as a Story (스토리텔링). Use emotional, narrative driver tone, anecdotes, \
and first-person perspective.";

pub const BLOG_INTERVIEW: &str = "\
Rewrite this as an Interview (인터뷰). Format it as Q&A, with dialogue style and engaging \
conversational tone.";

pub const CAFE_REVIEW: &str = "\
Rewrite this as a GENUINE Cafe Review. Use informal, friendly Korean (polite 'haeyo' style \
or 'banmal' depending on target). Include emotions, emojis, and specific details that make \
it sound like a real user experience. Avoid overly marketing tone.";

pub const CAFE_INFO: &str = "\
Rewrite this as an Information Share post for a Cafe community. Be helpful, concise, and \
structure with bullet points. Tone should be expert yet approachable.";

pub const CAFE_QUESTION: &str = "\
Rewrite this as a Question/Discussion starter. Frame the content as 'I found this, what do \
you think?' to encourage comments.";

pub const CAFE_VIRAL: &str = "\
Rewrite this for Viral Marketing. Use catchy hooks, provocative questions, and emphasize \
'FOMO' (Fear Of Missing Out).";

/// 固定テンプレートを引く。custom は None
pub fn template_for(style: &Style) -> Option<&'static str> {
    match style {
        Style::Blog(BlogStyle::News) => Some(BLOG_NEWS),
        Style::Blog(BlogStyle::Review) => Some(BLOG_REVIEW),
        Style::Blog(BlogStyle::Guide) => Some(BLOG_GUIDE),
        Style::Blog(BlogStyle::Story) => Some(BLOG_STORY),
        Style::Blog(BlogStyle::Interview) => Some(BLOG_INTERVIEW),
        Style::Cafe(CafeStyle::Review) => Some(CAFE_REVIEW),
        Style::Cafe(CafeStyle::Info) => Some(CAFE_INFO),
        Style::Cafe(CafeStyle::Question) => Some(CAFE_QUESTION),
        Style::Cafe(CafeStyle::Viral) => Some(CAFE_VIRAL),
        Style::Blog(BlogStyle::Custom) | Style::Cafe(CafeStyle::Custom) => None,
    }
}

/// 送信する指示文を組み立てる
///
/// custom はユーザー指示をそのまま使う。ブログは空の指示を拒否し、
/// カフェは汎用指示に落とす。
pub fn build_instruction(style: &Style, custom: Option<&str>) -> Result<String, AppError> {
    if let Some(template) = template_for(style) {
        return Ok(template.to_string());
    }

    let custom = custom.filter(|c| !c.trim().is_empty());
    match (style, custom) {
        (_, Some(text)) => Ok(text.to_string()),
        (Style::Cafe(_), None) => Ok(GENERIC_INSTRUCTION.to_string()),
        (Style::Blog(_), None) => Err(AppError::validation(
            "custom スタイルにはリライト指示の入力が必要です",
        )),
    }
}

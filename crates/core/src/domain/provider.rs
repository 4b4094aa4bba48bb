use std::fmt;

use serde::{Deserialize, Serialize};

use super::error::AppError;
use super::types::User;

/// リライトに使う AI バックエンド
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Provider {
    #[serde(rename = "openai")]
    OpenAi,
    Gemini,
    Perplexity,
}

impl Provider {
    pub const ALL: [Provider; 3] = [Provider::OpenAi, Provider::Gemini, Provider::Perplexity];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OpenAi => "openai",
            Self::Gemini => "gemini",
            Self::Perplexity => "perplexity",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Self::OpenAi => "ChatGPT",
            Self::Gemini => "Gemini",
            Self::Perplexity => "Perplexity",
        }
    }

    pub fn parse(name: &str) -> Result<Self, AppError> {
        match name.trim().to_ascii_lowercase().as_str() {
            "openai" => Ok(Self::OpenAi),
            "gemini" => Ok(Self::Gemini),
            "perplexity" => Ok(Self::Perplexity),
            other => Err(AppError::validation(format!(
                "未対応のプロバイダです: {other}"
            ))),
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// プロバイダごとの API キー登録状況
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ProviderCredentials {
    pub openai: bool,
    pub gemini: bool,
    pub perplexity: bool,
}

impl ProviderCredentials {
    /// `/api/auth/me` の各キー欄が空でなければ登録済みとみなす
    pub fn from_user(user: &User) -> Self {
        fn present(v: &Option<String>) -> bool {
            v.as_deref().is_some_and(|s| !s.is_empty())
        }
        Self {
            openai: present(&user.openai_api_key),
            gemini: present(&user.gemini_api_key),
            perplexity: present(&user.perplexity_api_key),
        }
    }

    pub fn is_configured(&self, provider: Provider) -> bool {
        match provider {
            Provider::OpenAi => self.openai,
            Provider::Gemini => self.gemini,
            Provider::Perplexity => self.perplexity,
        }
    }
}

use serde::{Deserialize, Serialize};

use super::provider::Provider;
use super::types::ContentTarget;

pub const DEFAULT_API_URL: &str = "http://localhost:8000";

/// クライアント設定（ローカル SQLite に key-value で保存）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientSettings {
    /// バックエンドのベース URL（相対画像 URL の前置にも使う）
    pub api_base_url: String,
    /// HTTP タイムアウト（秒）
    pub timeout_secs: u64,
    /// 既定の書き出し先
    pub default_target: ContentTarget,
    /// 既定のプロバイダ
    pub default_provider: Provider,
    /// リライト成功時に下書きを保存するか
    pub save_drafts: bool,
    /// 下書き自動削除（日数、0=無期限）
    pub draft_ttl_days: u32,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_URL.to_string(),
            timeout_secs: 10,
            default_target: ContentTarget::Blog,
            default_provider: Provider::OpenAi,
            save_drafts: true,
            draft_ttl_days: 0,
        }
    }
}

impl ClientSettings {
    /// 環境変数 CA_API_URL があればベース URL を上書き
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(url) = std::env::var("CA_API_URL") {
            if !url.trim().is_empty() {
                self.api_base_url = url;
            }
        }
        self
    }

    /// 末尾スラッシュを除いたベース URL
    pub fn base_url(&self) -> &str {
        self.api_base_url.trim_end_matches('/')
    }
}

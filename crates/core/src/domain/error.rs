use serde::Serialize;

/// アプリケーション共通エラーコード
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ErrorCode {
    #[serde(rename = "E_VALIDATION")]
    Validation,
    #[serde(rename = "E_LOCKED")]
    Locked,
    #[serde(rename = "E_UNAUTHORIZED")]
    Unauthorized,
    #[serde(rename = "E_EXPIRED")]
    Expired,
    #[serde(rename = "E_NETWORK")]
    Network,
    #[serde(rename = "E_TIMEOUT")]
    Timeout,
    #[serde(rename = "E_SERVER")]
    Server,
    #[serde(rename = "E_REWRITE")]
    Rewrite,
    #[serde(rename = "E_INVALID_STATE")]
    InvalidState,
    #[serde(rename = "E_STORAGE")]
    Storage,
    #[serde(rename = "E_OUTPUT")]
    Output,
    #[serde(rename = "E_INTERNAL")]
    Internal,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Validation => "E_VALIDATION",
            Self::Locked => "E_LOCKED",
            Self::Unauthorized => "E_UNAUTHORIZED",
            Self::Expired => "E_EXPIRED",
            Self::Network => "E_NETWORK",
            Self::Timeout => "E_TIMEOUT",
            Self::Server => "E_SERVER",
            Self::Rewrite => "E_REWRITE",
            Self::InvalidState => "E_INVALID_STATE",
            Self::Storage => "E_STORAGE",
            Self::Output => "E_OUTPUT",
            Self::Internal => "E_INTERNAL",
        }
    }
}

/// アプリケーションエラー（CLI 表示兼用）
#[derive(Debug, Clone, Serialize)]
pub struct AppError {
    pub code: ErrorCode,
    pub message: String,
    pub recoverable: bool,
}

impl AppError {
    /// ネットワークに出る前に弾く入力エラー
    pub fn validation(msg: impl Into<String>) -> Self {
        Self {
            code: ErrorCode::Validation,
            message: msg.into(),
            recoverable: true,
        }
    }

    /// ロック中の原文ペインへの編集
    pub fn locked(msg: impl Into<String>) -> Self {
        Self {
            code: ErrorCode::Locked,
            message: msg.into(),
            recoverable: true,
        }
    }

    pub fn invalid_state(msg: impl Into<String>) -> Self {
        Self {
            code: ErrorCode::InvalidState,
            message: msg.into(),
            recoverable: true,
        }
    }

    pub fn rewrite(msg: impl Into<String>) -> Self {
        Self {
            code: ErrorCode::Rewrite,
            message: msg.into(),
            recoverable: true,
        }
    }

    pub fn output(msg: impl Into<String>) -> Self {
        Self {
            code: ErrorCode::Output,
            message: msg.into(),
            recoverable: true,
        }
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self {
            code: ErrorCode::Internal,
            message: msg.into(),
            recoverable: false,
        }
    }

    pub fn storage(msg: impl Into<String>) -> Self {
        Self {
            code: ErrorCode::Storage,
            message: msg.into(),
            recoverable: false,
        }
    }

    /// 認証系エラー（強制ログアウト対象）か
    pub fn is_auth(&self) -> bool {
        matches!(self.code, ErrorCode::Unauthorized | ErrorCode::Expired)
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for AppError {}

use serde_json::Value;

use crate::domain::error::{AppError, ErrorCode};

/// REST 呼び出しエラー
#[derive(Debug, Clone, thiserror::Error)]
pub enum ApiError {
    #[error("Unauthorized: {0}")]
    Unauthorized(String),
    /// 403 + 期限切れメッセージ
    #[error("Account expired: {0}")]
    Expired(String),
    #[error("HTTP {status}: {detail}")]
    Status { status: u16, detail: String },
    #[error("Request timeout")]
    Timeout,
    #[error("Network error: {0}")]
    Network(String),
    #[error("Response parse error: {0}")]
    Decode(String),
    #[error("HTTP client error: {0}")]
    Client(String),
}

impl ApiError {
    /// ユーザーに見せるメッセージ（サーバーの detail をそのまま）
    pub fn user_message(&self) -> String {
        match self {
            Self::Unauthorized(detail) | Self::Expired(detail) => detail.clone(),
            Self::Status { detail, .. } => detail.clone(),
            other => other.to_string(),
        }
    }

    pub fn is_auth(&self) -> bool {
        matches!(self, Self::Unauthorized(_) | Self::Expired(_))
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            ApiError::Timeout
        } else if e.is_decode() {
            ApiError::Decode(e.to_string())
        } else if e.is_builder() {
            ApiError::Client(e.to_string())
        } else {
            ApiError::Network(format!("HTTP request failed: {e}"))
        }
    }
}

impl From<ApiError> for AppError {
    fn from(e: ApiError) -> Self {
        let code = match &e {
            ApiError::Unauthorized(_) => ErrorCode::Unauthorized,
            ApiError::Expired(_) => ErrorCode::Expired,
            ApiError::Status { .. } => ErrorCode::Server,
            ApiError::Timeout => ErrorCode::Timeout,
            ApiError::Network(_) => ErrorCode::Network,
            ApiError::Decode(_) | ApiError::Client(_) => ErrorCode::Internal,
        };
        AppError {
            code,
            message: e.user_message(),
            recoverable: code != ErrorCode::Internal,
        }
    }
}

/// エラーレスポンス本文から `detail` を取り出す
///
/// `detail` は文字列か、`{ loc: [...], msg }` の配列（入力検証エラー）。
/// 配列は「field: msg, field: msg」に連結する。
pub fn extract_detail(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    match value.get("detail")? {
        Value::String(s) => Some(s.clone()),
        Value::Array(items) => {
            let parts: Vec<String> = items.iter().map(describe_field_error).collect();
            Some(parts.join(", "))
        }
        Value::Null => None,
        other => Some(other.to_string()),
    }
}

fn describe_field_error(v: &Value) -> String {
    let msg = v.get("msg").and_then(Value::as_str);
    let field = v
        .get("loc")
        .and_then(Value::as_array)
        .and_then(|loc| loc.last())
        .map(|f| match f {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        });
    match (field, msg) {
        (Some(field), Some(msg)) => format!("{field}: {msg}"),
        (None, Some(msg)) => msg.to_string(),
        _ => match v {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        },
    }
}

/// detail が無いときの表示用メッセージ
pub fn fallback_detail(status: reqwest::StatusCode, body: &str) -> String {
    let body = body.trim();
    if !body.is_empty() && body.len() <= 200 && !body.starts_with('<') {
        return body.to_string();
    }
    status
        .canonical_reason()
        .map(|r| r.to_string())
        .unwrap_or_else(|| format!("HTTP {}", status.as_u16()))
}

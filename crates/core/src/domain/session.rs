use serde::Serialize;

/// 認証状態
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum AuthState {
    Anonymous,
    Authenticated {
        #[serde(skip)]
        token: String,
    },
    /// 利用期限切れで強制ログアウトされた
    Expired { message: String },
}

impl AuthState {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Anonymous => "anonymous",
            Self::Authenticated { .. } => "authenticated",
            Self::Expired { .. } => "expired",
        }
    }
}

/// 期限切れを示す 403 detail のキーワード
const EXPIRED_MARKERS: [&str; 2] = ["expired", "만료"];

/// 403 の detail が利用期限切れを示しているか
pub fn is_expiry_detail(detail: &str) -> bool {
    EXPIRED_MARKERS.iter().any(|m| detail.contains(m))
}

/// 認証セッション（ベアラートークンのライフサイクル）
///
/// ログインで設定し、ログアウト・401・期限切れ 403 で破棄する。
#[derive(Debug, Clone)]
pub struct AuthSession {
    state: AuthState,
}

impl AuthSession {
    pub fn new() -> Self {
        Self {
            state: AuthState::Anonymous,
        }
    }

    /// 保存済みトークンから復元
    pub fn restore(token: Option<String>) -> Self {
        match token {
            Some(token) if !token.is_empty() => Self {
                state: AuthState::Authenticated { token },
            },
            _ => Self::new(),
        }
    }

    pub fn state(&self) -> &AuthState {
        &self.state
    }

    pub fn token(&self) -> Option<&str> {
        match &self.state {
            AuthState::Authenticated { token } => Some(token),
            _ => None,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.token().is_some()
    }

    fn transition(&mut self, next: AuthState) -> AuthTransition {
        let prev = self.state.as_str().to_string();
        self.state = next;
        AuthTransition {
            prev_state: prev,
            new_state: self.state.as_str().to_string(),
        }
    }

    /// ログイン成功: *→Authenticated
    pub fn login(&mut self, token: String) -> AuthTransition {
        self.transition(AuthState::Authenticated { token })
    }

    /// 明示的ログアウト: *→Anonymous
    pub fn logout(&mut self) -> AuthTransition {
        self.transition(AuthState::Anonymous)
    }

    /// 401 応答: *→Anonymous
    pub fn on_unauthorized(&mut self) -> AuthTransition {
        self.transition(AuthState::Anonymous)
    }

    /// 403 応答: 期限切れの場合のみ *→Expired
    pub fn on_forbidden(&mut self, detail: &str) -> Option<AuthTransition> {
        if is_expiry_detail(detail) {
            Some(self.transition(AuthState::Expired {
                message: detail.to_string(),
            }))
        } else {
            None
        }
    }
}

impl Default for AuthSession {
    fn default() -> Self {
        Self::new()
    }
}

/// 認証状態遷移
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthTransition {
    pub prev_state: String,
    pub new_state: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_sets_token() {
        let mut session = AuthSession::new();
        let t = session.login("jwt".into());
        assert_eq!(t.prev_state, "anonymous");
        assert_eq!(t.new_state, "authenticated");
        assert_eq!(session.token(), Some("jwt"));
    }

    #[test]
    fn test_logout_clears_token() {
        let mut session = AuthSession::restore(Some("jwt".into()));
        session.logout();
        assert!(!session.is_authenticated());
    }

    #[test]
    fn test_restore_ignores_empty_token() {
        assert!(!AuthSession::restore(Some(String::new())).is_authenticated());
        assert!(!AuthSession::restore(None).is_authenticated());
    }

    #[test]
    fn test_unauthorized_clears_token() {
        let mut session = AuthSession::restore(Some("jwt".into()));
        let t = session.on_unauthorized();
        assert_eq!(t.prev_state, "authenticated");
        assert_eq!(session.state(), &AuthState::Anonymous);
    }

    #[test]
    fn test_forbidden_expired_forces_logout() {
        let mut session = AuthSession::restore(Some("jwt".into()));
        let t = session
            .on_forbidden("사용 기간이 만료되었습니다. (Your account has expired.)")
            .unwrap();
        assert_eq!(t.new_state, "expired");
        assert!(session.token().is_none());
    }

    #[test]
    fn test_forbidden_other_keeps_session() {
        let mut session = AuthSession::restore(Some("jwt".into()));
        assert!(session.on_forbidden("Permission denied").is_none());
        assert_eq!(session.token(), Some("jwt"));
    }

    #[test]
    fn test_state_serialization_hides_token() {
        let session = AuthSession::restore(Some("secret".into()));
        let json = serde_json::to_string(session.state()).unwrap();
        assert_eq!(json, "{\"state\":\"authenticated\"}");
    }
}

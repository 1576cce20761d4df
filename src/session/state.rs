//! 会话状态
//! 显式持有的状态对象，所有字段只通过 SessionManager 变更

use crate::models::auth::TokenPair;
use crate::models::user::SessionUser;

/// 对外暴露的授权状态快照
#[derive(Debug, Clone, PartialEq)]
pub enum AuthState {
    /// 无会话
    Anonymous,
    /// 登录或启动恢复进行中，尚不能断定已登出
    Authenticating,
    /// 已认证
    Authenticated(SessionUser),
    /// 令牌刷新进行中
    Refreshing,
}

impl AuthState {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, AuthState::Authenticated(_))
    }
}

/// 当前生命周期阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum AuthPhase {
    Anonymous,
    Authenticating,
    Authenticated,
    Refreshing,
}

/// 会话管理器持有的内部状态
///
/// `epoch` 在每次会话作废（登出、刷新终止失败）时递增。进行中的
/// 网络操作在发起前记录 epoch，返回后只有 epoch 未变时才应用结果，
/// 保证登出之后到达的响应被丢弃而不是重新注入会话。
pub(crate) struct SessionState {
    pub tokens: Option<TokenPair>,
    pub user: Option<SessionUser>,
    pub phase: AuthPhase,
    pub epoch: u64,
}

impl SessionState {
    pub fn new() -> Self {
        Self {
            tokens: None,
            user: None,
            phase: AuthPhase::Anonymous,
            epoch: 0,
        }
    }

    /// 建立新会话：令牌对和用户快照一起写入
    pub fn establish(&mut self, tokens: TokenPair, user: SessionUser) {
        self.tokens = Some(tokens);
        self.user = Some(user);
        self.phase = AuthPhase::Authenticated;
    }

    /// 清除会话并递增 epoch
    pub fn invalidate(&mut self) {
        self.tokens = None;
        self.user = None;
        self.phase = AuthPhase::Anonymous;
        self.epoch += 1;
    }

    pub fn snapshot(&self) -> AuthState {
        match self.phase {
            AuthPhase::Anonymous => AuthState::Anonymous,
            AuthPhase::Authenticating => AuthState::Authenticating,
            AuthPhase::Refreshing => AuthState::Refreshing,
            AuthPhase::Authenticated => match &self.user {
                Some(user) => AuthState::Authenticated(user.clone()),
                None => AuthState::Anonymous,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::user::{UserRole, UserStatus};
    use chrono::Utc;
    use uuid::Uuid;

    fn test_user() -> SessionUser {
        SessionUser {
            id: Uuid::new_v4(),
            email: "amina@example.com".to_string(),
            first_name: "Amina".to_string(),
            last_name: "Diallo".to_string(),
            phone_number: None,
            role: UserRole::User,
            status: UserStatus::Active,
            email_verified: true,
            phone_verified: false,
            is_verified: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_establish_sets_both_tokens_and_user() {
        let mut state = SessionState::new();
        assert_eq!(state.snapshot(), AuthState::Anonymous);

        state.establish(
            TokenPair {
                access: "acc".to_string(),
                refresh: "ref".to_string(),
            },
            test_user(),
        );

        assert!(state.snapshot().is_authenticated());
        assert!(state.tokens.is_some());
    }

    #[test]
    fn test_invalidate_bumps_epoch() {
        let mut state = SessionState::new();
        let before = state.epoch;

        state.establish(
            TokenPair {
                access: "acc".to_string(),
                refresh: "ref".to_string(),
            },
            test_user(),
        );
        state.invalidate();

        assert_eq!(state.epoch, before + 1);
        assert_eq!(state.snapshot(), AuthState::Anonymous);
        assert!(state.tokens.is_none());
        assert!(state.user.is_none());
    }

    #[test]
    fn test_authenticating_phase_is_not_anonymous() {
        let mut state = SessionState::new();
        state.phase = AuthPhase::Authenticating;
        assert_eq!(state.snapshot(), AuthState::Authenticating);
        assert!(!state.snapshot().is_authenticated());
    }
}

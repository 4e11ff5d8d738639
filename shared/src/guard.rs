//! 路由守卫的决策逻辑
//!
//! 纯函数，不依赖 DOM。前端的 `RouteGuard` 组件只负责执行决策
//! （显示加载、触发一次校验、重定向或渲染）。

use std::time::Duration;

use crate::models::User;
use crate::role::Role;
use crate::session::SessionState;

/// 加载指示的最短显示时间，避免快速网络下的闪烁
pub const MIN_LOADING_DISPLAY: Duration = Duration::from_secs(1);

/// 授权结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Granted,
    /// 未登录 → 登录页
    Unauthenticated,
    /// 已登录但角色不在允许列表 → 根页面（静默）
    Forbidden,
}

/// 授权检查
///
/// 空的允许列表表示任意已认证角色。
pub fn authorize(user: Option<&User>, allowed: &[Role]) -> Access {
    match user {
        None => Access::Unauthenticated,
        Some(user) if allowed.is_empty() || allowed.contains(&user.role) => Access::Granted,
        Some(_) => Access::Forbidden,
    }
}

/// 单次令牌校验的进度
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Verification {
    #[default]
    NotAttempted,
    InFlight,
    Done,
}

/// 守卫需要执行的动作
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardDecision {
    /// 显示加载指示
    Loading,
    /// 有令牌但没有用户：发起一次校验
    Verify,
    RedirectToLogin,
    RedirectToRoot,
    /// 原样渲染受保护内容
    Render,
}

/// 每个守卫实例的本地状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GuardState {
    pub min_display_elapsed: bool,
    pub verification: Verification,
}

impl GuardState {
    pub fn new() -> Self {
        Self::default()
    }

    /// 根据会话状态做出决策
    ///
    /// 校验最多触发一次：一旦进入 `InFlight`/`Done`，即使仍然只有令牌也不会再次返回 `Verify`。
    pub fn decide(&self, session: &SessionState, allowed: &[Role]) -> GuardDecision {
        if session.loading || !self.min_display_elapsed {
            return GuardDecision::Loading;
        }

        if session.user.is_none() && session.has_token() {
            return match self.verification {
                Verification::NotAttempted => GuardDecision::Verify,
                Verification::InFlight => GuardDecision::Loading,
                Verification::Done => GuardDecision::RedirectToLogin,
            };
        }

        match authorize(session.user.as_ref(), allowed) {
            Access::Granted => GuardDecision::Render,
            Access::Unauthenticated => GuardDecision::RedirectToLogin,
            Access::Forbidden => GuardDecision::RedirectToRoot,
        }
    }

    pub fn mark_min_display_elapsed(&mut self) {
        self.min_display_elapsed = true;
    }

    /// 开始校验；已经开始过则返回 `false`
    pub fn begin_verification(&mut self) -> bool {
        if self.verification != Verification::NotAttempted {
            return false;
        }
        self.verification = Verification::InFlight;
        true
    }

    pub fn finish_verification(&mut self) {
        self.verification = Verification::Done;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(role: Role) -> User {
        User {
            id: 1,
            name: "Test".into(),
            email: "t@x.ph".into(),
            role,
            username: None,
        }
    }

    fn signed_in(role: Role) -> SessionState {
        SessionState {
            user: Some(user(role)),
            token: Some("tok".into()),
            loading: false,
        }
    }

    fn ready() -> GuardState {
        GuardState {
            min_display_elapsed: true,
            verification: Verification::NotAttempted,
        }
    }

    #[test]
    fn access_granted_iff_authenticated_and_role_allowed() {
        let lists: [&[Role]; 4] = [
            &[],
            &[Role::Admin],
            &[Role::SuperAdmin, Role::Admin],
            &[Role::SuperAdmin, Role::Admin, Role::Viewer],
        ];
        for allowed in lists {
            assert_eq!(authorize(None, allowed), Access::Unauthenticated);
            for role in Role::ALL {
                let expected = if allowed.is_empty() || allowed.contains(&role) {
                    Access::Granted
                } else {
                    Access::Forbidden
                };
                assert_eq!(authorize(Some(&user(role)), allowed), expected, "{role:?} {allowed:?}");
            }
        }
    }

    #[test]
    fn viewer_on_admin_route_is_sent_to_root() {
        let decision = ready().decide(&signed_in(Role::Viewer), &[Role::Admin]);
        assert_eq!(decision, GuardDecision::RedirectToRoot);
    }

    #[test]
    fn loading_until_session_ready_and_min_display_elapsed() {
        let mut session = signed_in(Role::Admin);
        session.loading = true;
        assert_eq!(ready().decide(&session, &[]), GuardDecision::Loading);

        session.loading = false;
        assert_eq!(GuardState::new().decide(&session, &[]), GuardDecision::Loading);
        assert_eq!(ready().decide(&session, &[]), GuardDecision::Render);
    }

    #[test]
    fn anonymous_is_sent_to_login() {
        let session = SessionState::default();
        assert_eq!(ready().decide(&session, &[]), GuardDecision::RedirectToLogin);
    }

    #[test]
    fn token_without_user_verifies_exactly_once() {
        let session = SessionState {
            user: None,
            token: Some("tok".into()),
            loading: false,
        };
        let mut guard = ready();
        assert_eq!(guard.decide(&session, &[]), GuardDecision::Verify);

        assert!(guard.begin_verification());
        assert!(!guard.begin_verification());
        assert_eq!(guard.decide(&session, &[]), GuardDecision::Loading);

        guard.finish_verification();
        assert_eq!(guard.decide(&session, &[]), GuardDecision::RedirectToLogin);
    }

    #[test]
    fn successful_verification_renders() {
        let mut guard = ready();
        guard.begin_verification();
        guard.finish_verification();
        assert_eq!(
            guard.decide(&signed_in(Role::Viewer), &[Role::Viewer]),
            GuardDecision::Render
        );
    }
}

//! 认证模块
//!
//! `AuthContext` 只持有会话状态信号；登录、注销、令牌校验的逻辑都在
//! 共享层的 `AuthSession` 中，这里负责注入浏览器实现并把结果写回信号。
//! 路由服务通过注入的认证信号感知状态，与本模块解耦。

use leptos::prelude::*;
use ongchad_shared::session::{AuthSession, LoginOutcome, SessionState};
use ongchad_shared::{ApiClient, ApiError, ApiErrorKind, ClientConfig, Role};

use crate::web::{BrowserStorage, FetchClient};

pub type Api = ApiClient<FetchClient>;

/// 认证上下文
#[derive(Clone, Copy)]
pub struct AuthContext {
    pub state: RwSignal<SessionState>,
}

impl AuthContext {
    /// 创建新的认证上下文（loading 状态，等待 `init_auth`）
    pub fn new() -> Self {
        Self {
            state: RwSignal::new(SessionState {
                loading: true,
                ..SessionState::default()
            }),
        }
    }

    /// 认证状态信号（用于路由服务注入）
    pub fn is_authenticated_signal(&self) -> Signal<bool> {
        let state = self.state;
        Signal::derive(move || state.with(SessionState::is_authenticated))
    }

    pub fn role(&self) -> Option<Role> {
        self.state.with(|s| s.user.as_ref().map(|u| u.role))
    }

    /// 当前用户是否可以执行增删改操作
    pub fn can_manage(&self) -> bool {
        self.role().is_some_and(|r| r.can_manage())
    }

    /// 带当前令牌的资源客户端
    pub fn api(&self) -> Api {
        let mut api = new_api();
        api.set_token(self.state.with_untracked(|s| s.token.clone()));
        api
    }

    fn session(&self) -> AuthSession<FetchClient, BrowserStorage> {
        AuthSession::with_state(new_api(), BrowserStorage, self.state.get_untracked())
    }

    fn commit(&self, session: AuthSession<FetchClient, BrowserStorage>) {
        // 组件树已卸载时静默丢弃
        let _ = self.state.try_set(session.into_state());
    }
}

impl Default for AuthContext {
    fn default() -> Self {
        Self::new()
    }
}

fn new_api() -> Api {
    ApiClient::new(FetchClient, ClientConfig::from_build_env())
}

/// 从 Context 获取认证上下文
pub fn use_auth() -> AuthContext {
    expect_context::<AuthContext>()
}

/// 启动时从 LocalStorage 同步水合会话
pub fn init_auth(ctx: &AuthContext) {
    let mut session = AuthSession::new(new_api(), BrowserStorage);
    session.initialize();
    tracing::debug!(
        authenticated = session.state().is_authenticated(),
        has_token = session.state().has_token(),
        "session hydrated"
    );
    ctx.commit(session);
}

/// 登录，失败以 `LoginOutcome::Failure` 返回
pub async fn login(ctx: &AuthContext, identifier: String, secret: String) -> LoginOutcome {
    let mut session = ctx.session();
    let outcome = session.login(&identifier, &secret).await;
    if outcome.is_success() {
        ctx.commit(session);
    }
    outcome
}

/// 注销并清除状态
///
/// 导航由受保护页面的守卫在状态变化后自动处理。
pub async fn logout(ctx: &AuthContext) {
    let mut session = ctx.session();
    session.logout().await;
    ctx.commit(session);
}

/// 校验存储的令牌（守卫在「有令牌无用户」时调用一次）
pub async fn verify_token(ctx: &AuthContext) -> bool {
    let mut session = ctx.session();
    let valid = session.verify_token().await;
    ctx.commit(session);
    valid
}

/// 资源请求返回 401 说明令牌已失效：清除会话，守卫随后重定向到登录页
pub fn expire_on_unauthorized(ctx: &AuthContext, err: &ApiError) {
    if err.kind() == ApiErrorKind::Unauthorized {
        tracing::info!("token rejected by api, clearing session");
        let ctx = *ctx;
        leptos::task::spawn_local(async move { logout(&ctx).await });
    }
}

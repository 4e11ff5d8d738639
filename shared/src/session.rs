//! 认证会话
//!
//! 「谁登录了、是什么角色」的唯一数据源。内存状态是显式的 `SessionState`
//! 上下文对象；持久化通过注入的 `KeyValueStore` 完成，刷新页面无需重新登录。
//!
//! 生命周期：`new`（loading）→ `initialize`（同步水合）→ `login` / `verify_token`
//! → `logout`（清空内存与存储）。

#[cfg(test)]
mod tests;

use crate::client::ApiClient;
use crate::http::HttpClient;
use crate::models::{LoginRequest, User};
use crate::storage::KeyValueStore;
use crate::{STORAGE_TOKEN_KEY, STORAGE_USER_KEY};

const GENERIC_LOGIN_FAILURE: &str = "Login failed. Please check your username and password.";
const MISSING_CREDENTIALS: &str = "Please enter both username and password.";

/// 会话状态
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SessionState {
    /// 已校验的用户
    pub user: Option<User>,
    /// Bearer 令牌
    pub token: Option<String>,
    /// 启动水合尚未完成
    pub loading: bool,
}

impl SessionState {
    /// 仅有令牌而没有已校验用户时不授予访问权限
    pub fn is_authenticated(&self) -> bool {
        self.user.is_some() && self.token.is_some()
    }

    pub fn has_token(&self) -> bool {
        self.token.as_deref().is_some_and(|t| !t.is_empty())
    }
}

/// 登录结果，失败以值返回而不是错误
#[derive(Debug, Clone, PartialEq)]
pub enum LoginOutcome {
    Success { user: User, token: String },
    Failure { message: String },
}

impl LoginOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, LoginOutcome::Success { .. })
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            LoginOutcome::Failure { message } => Some(message),
            LoginOutcome::Success { .. } => None,
        }
    }
}

pub struct AuthSession<C, S> {
    api: ApiClient<C>,
    storage: S,
    state: SessionState,
}

impl<C: HttpClient, S: KeyValueStore> AuthSession<C, S> {
    /// 新建会话，处于 loading 状态，需调用 `initialize`
    pub fn new(api: ApiClient<C>, storage: S) -> Self {
        Self {
            api,
            storage,
            state: SessionState {
                loading: true,
                ..SessionState::default()
            },
        }
    }

    /// 以已有的内存状态恢复会话（状态由外部上下文持有时使用）
    pub fn with_state(mut api: ApiClient<C>, storage: S, state: SessionState) -> Self {
        api.set_token(state.token.clone());
        Self {
            api,
            storage,
            state,
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn into_state(self) -> SessionState {
        self.state
    }

    pub fn api(&self) -> &ApiClient<C> {
        &self.api
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// 启动时同步水合
    ///
    /// 存储损坏（用户 JSON 无法解析）视为「无会话」，清除两个键，不报错。
    pub fn initialize(&mut self) {
        let token = self
            .storage
            .get(STORAGE_TOKEN_KEY)
            .filter(|t| !t.trim().is_empty());
        let user = match self.storage.get(STORAGE_USER_KEY) {
            Some(raw) => match serde_json::from_str::<User>(&raw) {
                Ok(user) => Some(user),
                Err(e) => {
                    tracing::warn!(error = %e, "stored session is corrupted, clearing it");
                    self.clear_storage();
                    self.set_state(None, None);
                    self.state.loading = false;
                    return;
                }
            },
            None => None,
        };

        match (user, token) {
            (Some(user), Some(token)) => self.set_state(Some(user), Some(token)),
            (None, Some(token)) => {
                // 只有令牌：保留，由路由守卫触发一次校验
                self.set_state(None, Some(token));
            }
            (Some(_), None) => {
                self.storage.remove(STORAGE_USER_KEY);
                self.set_state(None, None);
            }
            (None, None) => self.set_state(None, None),
        }
        self.state.loading = false;
    }

    /// 登录
    ///
    /// 成功：持久化用户与令牌并更新内存；失败：不触碰已存储的状态。
    pub async fn login(&mut self, identifier: &str, secret: &str) -> LoginOutcome {
        let username = identifier.trim();
        if username.is_empty() || secret.is_empty() {
            return LoginOutcome::Failure {
                message: MISSING_CREDENTIALS.to_string(),
            };
        }

        let request = LoginRequest {
            username: username.to_string(),
            password: secret.to_string(),
        };

        match self.api.login(&request).await {
            Ok(resp) if !resp.token.is_empty() => {
                let stored_user = match serde_json::to_string(&resp.user) {
                    Ok(json) => json,
                    Err(e) => {
                        tracing::warn!(error = %e, "failed to serialize user for storage");
                        return LoginOutcome::Failure {
                            message: GENERIC_LOGIN_FAILURE.to_string(),
                        };
                    }
                };
                self.storage.set(STORAGE_USER_KEY, &stored_user);
                self.storage.set(STORAGE_TOKEN_KEY, &resp.token);
                self.set_state(Some(resp.user.clone()), Some(resp.token.clone()));
                tracing::info!(user_id = resp.user.id, role = %resp.user.role, "login succeeded");
                LoginOutcome::Success {
                    user: resp.user,
                    token: resp.token,
                }
            }
            Ok(_) => {
                tracing::warn!("login response did not include a token");
                LoginOutcome::Failure {
                    message: GENERIC_LOGIN_FAILURE.to_string(),
                }
            }
            Err(e) => {
                tracing::warn!(status = ?e.status, error = %e, "login failed");
                let message = if e.status.is_some_and(|s| (400..500).contains(&s)) {
                    e.message
                } else {
                    GENERIC_LOGIN_FAILURE.to_string()
                };
                LoginOutcome::Failure { message }
            }
        }
    }

    /// 注销
    ///
    /// 尽力通知后端（失败只记录日志），然后无条件清空内存与存储。可重复调用。
    pub async fn logout(&mut self) {
        if self.state.has_token() {
            if let Err(e) = self.api.logout().await {
                tracing::warn!(error = %e, "logout notification failed");
            }
        }
        self.clear_storage();
        self.set_state(None, None);
    }

    /// 校验已存储的令牌
    ///
    /// 无令牌、非 2xx 或网络失败均视为会话无效：清除并返回 `false`，不重试。
    pub async fn verify_token(&mut self) -> bool {
        let token = self
            .storage
            .get(STORAGE_TOKEN_KEY)
            .filter(|t| !t.trim().is_empty());
        let Some(token) = token else {
            self.clear_storage();
            self.set_state(None, None);
            return false;
        };

        self.api.set_token(Some(token.clone()));
        match self.api.current_user().await {
            Ok(user) => {
                match serde_json::to_string(&user) {
                    Ok(json) => {
                        self.storage.set(STORAGE_USER_KEY, &json);
                    }
                    Err(e) => tracing::warn!(error = %e, "failed to persist verified user"),
                }
                self.set_state(Some(user), Some(token));
                true
            }
            Err(e) => {
                tracing::info!(status = ?e.status, error = %e, "token verification failed");
                self.clear_storage();
                self.set_state(None, None);
                false
            }
        }
    }

    fn set_state(&mut self, user: Option<User>, token: Option<String>) {
        self.api.set_token(token.clone());
        self.state.user = user;
        self.state.token = token;
    }

    fn clear_storage(&self) {
        self.storage.remove(STORAGE_USER_KEY);
        self.storage.remove(STORAGE_TOKEN_KEY);
    }
}

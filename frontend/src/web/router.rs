//! 路由服务模块 - 核心引擎
//!
//! 封装了 web_sys 的 History API，所有对 window.history 的操作都集中在此模块。
//! 角色授权不在这里做，由包裹每个页面的 `RouteGuard` 负责；
//! 路由服务只处理「已登录用户访问登录页」的跳转。

use leptos::prelude::*;
use wasm_bindgen::prelude::*;

use super::route::AppRoute;

/// 获取当前浏览器路径
fn current_path() -> String {
    web_sys::window()
        .and_then(|w| w.location().pathname().ok())
        .unwrap_or_else(|| "/".to_string())
}

/// 推送 History 状态
fn push_history_state(path: &str) {
    if let Some(history) = web_sys::window().and_then(|w| w.history().ok()) {
        if let Err(e) = history.push_state_with_url(&JsValue::NULL, "", Some(path)) {
            tracing::warn!(path, error = ?e, "pushState failed");
        }
    }
}

/// 替换 History 状态（用于重定向，不留下历史记录）
fn replace_history_state(path: &str) {
    if let Some(history) = web_sys::window().and_then(|w| w.history().ok()) {
        if let Err(e) = history.replace_state_with_url(&JsValue::NULL, "", Some(path)) {
            tracing::warn!(path, error = ?e, "replaceState failed");
        }
    }
}

/// 路由器服务
///
/// 通过 Signal 驱动界面更新，认证状态以注入的信号传入。
#[derive(Clone, Copy)]
pub struct RouterService {
    current_route: ReadSignal<AppRoute>,
    set_route: WriteSignal<AppRoute>,
    is_authenticated: Signal<bool>,
}

impl RouterService {
    fn new(is_authenticated: Signal<bool>) -> Self {
        let initial_route = AppRoute::from_path(&current_path());
        let (current_route, set_route) = signal(initial_route);

        Self {
            current_route,
            set_route,
            is_authenticated,
        }
    }

    /// 获取当前路由信号
    pub fn current_route(&self) -> ReadSignal<AppRoute> {
        self.current_route
    }

    /// 导航到指定路由（pushState）
    pub fn navigate(&self, route: AppRoute) {
        self.go(route, true);
    }

    /// 重定向（replaceState），守卫使用，避免后退键回到被拒绝的页面
    pub fn redirect(&self, route: AppRoute) {
        self.go(route, false);
    }

    fn go(&self, target: AppRoute, use_push: bool) {
        let target = if target.should_redirect_when_authenticated()
            && self.is_authenticated.get_untracked()
        {
            tracing::debug!("already authenticated, leaving login page");
            AppRoute::root()
        } else {
            target
        };

        if self.current_route.get_untracked() == target {
            return;
        }

        let path = target.to_path();
        tracing::debug!(%path, push = use_push, "navigate");
        if use_push {
            push_history_state(&path);
        } else {
            replace_history_state(&path);
        }
        self.set_route.set(target);
    }

    /// 浏览器后退/前进按钮监听
    fn init_popstate_listener(&self) {
        let set_route = self.set_route;

        let closure = Closure::<dyn Fn()>::new(move || {
            let route = AppRoute::from_path(&current_path());
            tracing::debug!(%route, "popstate");
            set_route.set(route);
        });

        if let Some(window) = web_sys::window() {
            if let Err(e) = window
                .add_event_listener_with_callback("popstate", closure.as_ref().unchecked_ref())
            {
                tracing::warn!(error = ?e, "failed to register popstate listener");
            }
        }

        // 监听器与应用同生命周期
        closure.forget();
    }

    /// 登录成功后离开登录页
    fn setup_auth_redirect(&self) {
        let router = *self;

        Effect::new(move |_| {
            let is_auth = router.is_authenticated.get();
            if is_auth
                && router
                    .current_route
                    .get_untracked()
                    .should_redirect_when_authenticated()
            {
                tracing::info!("auth state changed: logged in, redirecting to dashboard");
                router.redirect(AppRoute::root());
            }
        });
    }
}

/// 提供路由服务到 Context 并初始化
fn provide_router(is_authenticated: Signal<bool>) -> RouterService {
    let router = RouterService::new(is_authenticated);

    router.init_popstate_listener();
    router.setup_auth_redirect();

    provide_context(router);
    router
}

/// 从 Context 获取路由服务
pub fn use_router() -> RouterService {
    expect_context::<RouterService>()
}

// ============================================================================
// UI 组件
// ============================================================================

/// 路由器根组件
#[component]
pub fn Router(
    /// 认证状态信号
    is_authenticated: Signal<bool>,
    children: Children,
) -> impl IntoView {
    provide_router(is_authenticated);

    children()
}

/// 路由出口组件
///
/// 根据当前路由状态渲染对应的组件。
#[component]
pub fn RouterOutlet(
    /// 路由匹配函数：接收当前路由，返回对应视图
    matcher: fn(AppRoute) -> AnyView,
) -> impl IntoView {
    let router = use_router();

    move || matcher(router.current_route().get())
}

/// 站内链接：拦截点击，走 History API 而不是整页刷新
#[component]
pub fn Link(
    route: AppRoute,
    #[prop(into, optional)] class: String,
    children: Children,
) -> impl IntoView {
    let router = use_router();
    let href = route.to_path();

    let on_click = move |ev: web_sys::MouseEvent| {
        ev.prevent_default();
        router.navigate(route.clone());
    };

    view! {
        <a href=href class=class on:click=on_click>
            {children()}
        </a>
    }
}

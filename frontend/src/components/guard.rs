use leptos::prelude::*;
use leptos::task::spawn_local;
use ongchad_shared::Role;
use ongchad_shared::guard::{GuardDecision, GuardState, MIN_LOADING_DISPLAY};

use crate::auth::{use_auth, verify_token};
use crate::web::route::AppRoute;
use crate::web::router::use_router;
use crate::web::timer::sleep;

/// 全屏加载指示
#[component]
pub fn LoadingScreen() -> impl IntoView {
    view! {
        <div class="flex items-center justify-center min-h-screen bg-base-200">
            <span class="loading loading-spinner loading-lg text-primary"></span>
        </div>
    }
}

/// 路由守卫
///
/// 决策由共享层的 `GuardState::decide` 给出，这里只负责执行：
/// 最短加载显示、一次性令牌校验、重定向或渲染受保护内容。
#[component]
pub fn RouteGuard(
    /// 角色允许列表，空表示任意已认证角色
    allowed: &'static [Role],
    children: ChildrenFn,
) -> impl IntoView {
    let auth = use_auth();
    let router = use_router();
    let guard = RwSignal::new(GuardState::new());

    spawn_local(async move {
        sleep(MIN_LOADING_DISPLAY).await;
        let _ = guard.try_update(GuardState::mark_min_display_elapsed);
    });

    let decision = Memo::new(move |_| guard.with(|g| auth.state.with(|s| g.decide(s, allowed))));

    Effect::new(move |_| match decision.get() {
        GuardDecision::Verify => {
            if guard.try_update(GuardState::begin_verification).unwrap_or(false) {
                spawn_local(async move {
                    let valid = verify_token(&auth).await;
                    tracing::debug!(valid, "stored token verified");
                    let _ = guard.try_update(GuardState::finish_verification);
                });
            }
        }
        GuardDecision::RedirectToLogin => {
            tracing::info!("no authenticated user, redirecting to login");
            router.redirect(AppRoute::auth_failure_redirect());
        }
        GuardDecision::RedirectToRoot => {
            tracing::info!(?allowed, "role not allowed, redirecting to root");
            router.redirect(AppRoute::root());
        }
        GuardDecision::Loading | GuardDecision::Render => {}
    });

    view! {
        <Show
            when=move || decision.get() == GuardDecision::Render
            fallback=|| view! { <LoadingScreen /> }
        >
            {children()}
        </Show>
    }
}

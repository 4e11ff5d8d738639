//! Ongchad Bills 前端应用
//!
//! 采用 Context-Driven 的高内聚低耦合架构：
//! - `web::route`: 路由定义与角色允许列表（领域模型）
//! - `web::router`: 路由服务（核心引擎）
//! - `auth`: 认证状态管理，业务逻辑委托给 `ongchad_shared::session`
//! - `theme`: 暗色模式与侧边栏状态
//! - `components`: UI 组件层

mod auth;
mod components {
    pub mod accounts;
    pub mod bills;
    pub mod dashboard;
    pub mod guard;
    mod icons;
    pub mod layout;
    pub mod list;
    pub mod login;
    pub mod payments;
    pub mod readings;
    pub mod tenant_bills;
    pub mod units;
}
mod theme;

use crate::auth::{AuthContext, init_auth};
use crate::components::accounts::AccountsPage;
use crate::components::bills::BillsPage;
use crate::components::dashboard::DashboardPage;
use crate::components::guard::RouteGuard;
use crate::components::layout::AppLayout;
use crate::components::login::LoginPage;
use crate::components::payments::PaymentsPage;
use crate::components::readings::ReadingsPage;
use crate::components::tenant_bills::TenantBillsPage;
use crate::components::units::UnitsPage;
use crate::theme::{SidebarContext, ThemeContext};

use leptos::prelude::*;

// 浏览器适配层：共享层接缝（HTTP、存储）的实现与 History API 封装
pub(crate) mod web {
    pub mod http;
    pub mod route;
    pub mod router;
    mod storage;
    pub mod timer;

    pub use http::FetchClient;
    pub use storage::BrowserStorage;
}

use web::route::AppRoute;
use web::router::{Link, Router, RouterOutlet};

/// 受保护页面：守卫 + 布局外壳
fn protected(route: &AppRoute, page: fn() -> AnyView) -> AnyView {
    view! {
        <RouteGuard allowed=route.allowed_roles()>
            <AppLayout>{page()}</AppLayout>
        </RouteGuard>
    }
    .into_any()
}

/// 路由匹配函数
///
/// 根据 AppRoute 枚举返回对应的视图组件。
fn route_matcher(route: AppRoute) -> AnyView {
    match route {
        AppRoute::Login => view! { <LoginPage /> }.into_any(),
        AppRoute::Dashboard => protected(&route, || view! { <DashboardPage /> }.into_any()),
        AppRoute::Units => protected(&route, || view! { <UnitsPage /> }.into_any()),
        AppRoute::UnitReadings { unit_id } => view! {
            <RouteGuard allowed=route.allowed_roles()>
                <AppLayout>
                    <ReadingsPage unit_id=unit_id />
                </AppLayout>
            </RouteGuard>
        }
        .into_any(),
        AppRoute::Accounts => protected(&route, || view! { <AccountsPage /> }.into_any()),
        AppRoute::Bills => protected(&route, || view! { <BillsPage /> }.into_any()),
        AppRoute::MonthlyBills { month } => view! {
            <RouteGuard allowed=route.allowed_roles()>
                <AppLayout>
                    <TenantBillsPage month=month />
                </AppLayout>
            </RouteGuard>
        }
        .into_any(),
        AppRoute::Payments => protected(&route, || view! { <PaymentsPage /> }.into_any()),
        AppRoute::NotFound => view! {
            <div class="flex items-center justify-center min-h-screen bg-base-200">
                <div class="text-center">
                    <h1 class="text-6xl font-bold text-error">"404"</h1>
                    <p class="text-xl mt-4">"Page not found"</p>
                    <Link route=AppRoute::root() class="btn btn-primary mt-6">
                        "Back to dashboard"
                    </Link>
                </div>
            </div>
        }
        .into_any(),
    }
}

#[component]
pub fn App() -> impl IntoView {
    // 1. 创建认证上下文
    let auth_ctx = AuthContext::new();
    provide_context(auth_ctx);

    // 2. 从 LocalStorage 水合会话（无网络请求）
    init_auth(&auth_ctx);

    // 3. 主题与侧边栏
    provide_context(ThemeContext::new());
    provide_context(SidebarContext::new());

    // 4. 获取认证状态信号，用于注入路由服务（解耦！）
    let is_authenticated = auth_ctx.is_authenticated_signal();

    view! {
        // 5. 路由器组件：注入认证信号实现守卫
        <Router is_authenticated=is_authenticated>
            <RouterOutlet matcher=route_matcher />
        </Router>
    }
}

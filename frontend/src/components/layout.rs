use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::auth::{logout, use_auth};
use crate::components::icons::{LogOut, Menu, Moon, Sun, Zap};
use crate::theme::{use_sidebar, use_theme};
use crate::web::route::AppRoute;
use crate::web::router::{Link, use_router};

/// 已登录页面的外壳：顶栏 + 侧边栏
#[component]
pub fn AppLayout(children: Children) -> impl IntoView {
    let auth = use_auth();
    let router = use_router();
    let theme = use_theme();
    let sidebar = use_sidebar();

    let display_name = move || {
        auth.state.with(|s| {
            s.user
                .as_ref()
                .map(|u| u.display_name().to_string())
                .unwrap_or_default()
        })
    };
    let role_label = move || auth.role().map(|r| r.label()).unwrap_or_default();
    let title = move || router.current_route().with(AppRoute::title);

    let on_logout = move |_| {
        spawn_local(async move {
            logout(&auth).await;
            tracing::info!("logged out");
        });
    };

    view! {
        <div class="drawer lg:drawer-open min-h-screen bg-base-200">
            <input
                id="app-sidebar"
                type="checkbox"
                class="drawer-toggle"
                prop:checked=move || sidebar.open.get()
                on:change=move |_| sidebar.toggle()
            />
            <div class="drawer-content flex flex-col">
                <div class="navbar bg-base-100 shadow-sm px-4">
                    <div class="flex-none lg:hidden">
                        <button class="btn btn-ghost btn-square" on:click=move |_| sidebar.toggle()>
                            <Menu attr:class="h-5 w-5" />
                        </button>
                    </div>
                    <div class="flex-1">
                        <h1 class="text-xl font-semibold">{title}</h1>
                    </div>
                    <div class="flex-none gap-2 items-center">
                        <button
                            class="btn btn-ghost btn-circle"
                            title="Toggle theme"
                            on:click=move |_| theme.toggle()
                        >
                            {move || {
                                if theme.dark.get() {
                                    view! { <Sun attr:class="h-5 w-5" /> }.into_any()
                                } else {
                                    view! { <Moon attr:class="h-5 w-5" /> }.into_any()
                                }
                            }}
                        </button>
                        <div class="hidden md:flex flex-col items-end leading-tight mr-2">
                            <span class="font-medium">{display_name}</span>
                            <span class="text-xs opacity-60">{role_label}</span>
                        </div>
                        <button on:click=on_logout class="btn btn-outline btn-error btn-sm gap-2">
                            <LogOut attr:class="h-4 w-4" />
                            "Logout"
                        </button>
                    </div>
                </div>
                <main class="p-4 md:p-8 max-w-7xl w-full mx-auto space-y-6">{children()}</main>
            </div>
            <div class="drawer-side z-40">
                <label
                    for="app-sidebar"
                    class="drawer-overlay"
                    on:click=move |_| sidebar.close()
                ></label>
                <Sidebar />
            </div>
        </div>
    }
}

#[component]
fn Sidebar() -> impl IntoView {
    let auth = use_auth();
    let router = use_router();
    let sidebar = use_sidebar();

    let items = move || {
        let role = auth.role();
        AppRoute::navigation()
            .into_iter()
            .filter(|route| role.is_some_and(|r| route.visible_to(r)))
            .collect::<Vec<_>>()
    };

    view! {
        <aside class="bg-base-100 w-64 min-h-full border-r border-base-300">
            <div class="flex items-center gap-2 px-6 py-5">
                <div class="p-2 bg-primary/10 rounded-xl text-primary">
                    <Zap attr:class="h-6 w-6" />
                </div>
                <span class="text-lg font-bold">"Ongchad Bills"</span>
            </div>
            <ul class="menu px-4 gap-1" on:click=move |_| sidebar.close()>
                <For
                    each=items
                    key=|route| route.to_path()
                    children=move |route| {
                        let active = {
                            let route = route.clone();
                            move || {
                                let current = router.current_route().get();
                                current == route
                                    || matches!(
                                        (&current, &route),
                                        (AppRoute::UnitReadings { .. }, AppRoute::Units)
                                            | (AppRoute::MonthlyBills { .. }, AppRoute::Bills)
                                    )
                            }
                        };
                        let label = route.title();
                        view! {
                            <li>
                                <Link
                                    route=route
                                    class=""
                                >
                                    <span class:font-semibold=active>{label}</span>
                                </Link>
                            </li>
                        }
                    }
                />
            </ul>
        </aside>
    }
}

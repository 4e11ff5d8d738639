//! 列表页公共部件
//!
//! 加载/重试/逐行变更的异步驱动，以及搜索框、过滤下拉、排序表头、空状态等控件。
//! 异步结果一律通过 `try_update` 写回，组件卸载后到达的响应被静默丢弃。

use std::future::Future;

use leptos::html;
use leptos::prelude::*;
use leptos::task::spawn_local;
use ongchad_shared::ApiResult;
use ongchad_shared::forms::inline_message;
use ongchad_shared::listing::{EmptyState, FILTER_ALL, ListMutation, ListPage, ListQuery, SortOrder};
use ongchad_shared::models::{Identified, RecordId};

use crate::auth::{Api, AuthContext, expire_on_unauthorized};
use crate::components::icons::{AlertCircle, ArrowUpDown, ChevronDown, ChevronUp, RefreshCw, Search};

// =========================================================
// 异步驱动
// =========================================================

fn spawn_fetch<R, F, Fut>(auth: AuthContext, page: RwSignal<ListPage<R>>, fetch: F)
where
    R: Identified + Clone + Send + Sync + 'static,
    F: FnOnce(Api) -> Fut + 'static,
    Fut: Future<Output = ApiResult<Vec<R>>> + 'static,
{
    let api = auth.api();
    spawn_local(async move {
        let result = fetch(api).await;
        if let Err(e) = &result {
            tracing::warn!(status = ?e.status, error = %e, "list load failed");
            expire_on_unauthorized(&auth, e);
        }
        let _ = page.try_update(|p| p.finish_load(result.map_err(|e| inline_message(&e))));
    });
}

/// 首次加载（`Idle` / `Loaded` → `Loading`）
pub fn start_load<R, F, Fut>(auth: AuthContext, page: RwSignal<ListPage<R>>, fetch: F)
where
    R: Identified + Clone + Send + Sync + 'static,
    F: FnOnce(Api) -> Fut + 'static,
    Fut: Future<Output = ApiResult<Vec<R>>> + 'static,
{
    if page.try_update(|p| p.begin_load()).unwrap_or(false) {
        spawn_fetch(auth, page, fetch);
    }
}

/// 显式重试，仅在 `Failed` 时生效
pub fn retry_load<R, F, Fut>(auth: AuthContext, page: RwSignal<ListPage<R>>, fetch: F)
where
    R: Identified + Clone + Send + Sync + 'static,
    F: FnOnce(Api) -> Fut + 'static,
    Fut: Future<Output = ApiResult<Vec<R>>> + 'static,
{
    if page.try_update(|p| p.retry()).unwrap_or(false) {
        spawn_fetch(auth, page, fetch);
    }
}

/// 行内变更（删除、状态变更）
///
/// 同一行已有请求在途时直接忽略；失败只写入该行的内联错误。
pub fn spawn_mutation<R, F, Fut>(
    auth: AuthContext,
    page: RwSignal<ListPage<R>>,
    id: RecordId,
    run: F,
) where
    R: Identified + Clone + Send + Sync + 'static,
    F: FnOnce(Api) -> Fut + 'static,
    Fut: Future<Output = ApiResult<ListMutation<R>>> + 'static,
{
    if !page.try_update(|p| p.begin_mutation(id)).unwrap_or(false) {
        tracing::debug!(id, "mutation already in flight");
        return;
    }
    let api = auth.api();
    spawn_local(async move {
        let result = run(api).await;
        if let Err(e) = &result {
            tracing::warn!(id, status = ?e.status, error = %e, "row mutation failed");
            expire_on_unauthorized(&auth, e);
        }
        let _ = page.try_update(|p| p.finish_mutation(id, result.map_err(|e| inline_message(&e))));
    });
}

// =========================================================
// 查询控件
// =========================================================

#[component]
pub fn SearchBox(query: RwSignal<ListQuery>, #[prop(into)] placeholder: String) -> impl IntoView {
    view! {
        <label class="input input-bordered input-sm flex items-center gap-2 w-full md:w-64">
            <Search attr:class="h-4 w-4 opacity-60" />
            <input
                type="search"
                class="grow"
                placeholder=placeholder
                prop:value=move || query.with(|q| q.search_term.clone())
                on:input=move |ev| {
                    let term = event_target_value(&ev);
                    query.update(|q| q.search_term = term);
                }
            />
        </label>
    }
}

/// 过滤下拉，第一项总是「全部」
#[component]
pub fn FilterSelect(
    query: RwSignal<ListQuery>,
    #[prop(into)] all_label: String,
    options: Vec<(String, String)>,
) -> impl IntoView {
    view! {
        <select
            class="select select-bordered select-sm"
            prop:value=move || query.with(|q| q.filter_value.clone())
            on:change=move |ev| {
                let value = event_target_value(&ev);
                query.update(|q| q.filter_value = value);
            }
        >
            <option value=FILTER_ALL>{all_label}</option>
            {options
                .into_iter()
                .map(|(value, label)| view! { <option value=value>{label}</option> })
                .collect_view()}
        </select>
    }
}

/// 可排序的表头：同一列翻转方向，换列重置为升序
#[component]
pub fn SortHeader(
    query: RwSignal<ListQuery>,
    key: &'static str,
    label: &'static str,
    #[prop(optional)] class: &'static str,
) -> impl IntoView {
    let indicator = move || {
        query.with(|q| {
            if q.sort_by != key {
                view! { <ArrowUpDown attr:class="h-3 w-3 opacity-40" /> }.into_any()
            } else if q.sort_order == SortOrder::Asc {
                view! { <ChevronUp attr:class="h-3 w-3" /> }.into_any()
            } else {
                view! { <ChevronDown attr:class="h-3 w-3" /> }.into_any()
            }
        })
    };

    view! {
        <th class=class>
            <button
                type="button"
                class="flex items-center gap-1 hover:text-primary"
                on:click=move |_| query.update(|q| q.toggle_sort(key))
            >
                {label}
                {indicator}
            </button>
        </th>
    }
}

// =========================================================
// 状态展示
// =========================================================

#[component]
pub fn LoadingRow(colspan: u32) -> impl IntoView {
    view! {
        <tr>
            <td colspan=colspan.to_string() class="text-center py-8 text-base-content/50">
                <span class="loading loading-spinner loading-md"></span>
                " Loading..."
            </td>
        </tr>
    }
}

/// 空状态：区分「没有数据」与「没有匹配结果」
#[component]
pub fn EmptyRow(
    colspan: u32,
    state: EmptyState,
    #[prop(into)] no_data: String,
    #[prop(optional)] action: Option<AnyView>,
) -> impl IntoView {
    let message = match state {
        EmptyState::NoData => no_data,
        EmptyState::NoMatches => "No results match your search or filter.".to_string(),
    };
    let show_action = state == EmptyState::NoData;

    view! {
        <tr>
            <td colspan=colspan.to_string() class="text-center py-10 text-base-content/50">
                <p>{message}</p>
                {show_action.then_some(action).flatten().map(|a| view! { <div class="mt-4">{a}</div> })}
            </td>
        </tr>
    }
}

/// 加载失败与重试入口
#[component]
pub fn LoadFailed(#[prop(into)] message: String, on_retry: Callback<()>) -> impl IntoView {
    view! {
        <div role="alert" class="alert alert-error">
            <AlertCircle attr:class="h-5 w-5" />
            <span>{message}</span>
            <button class="btn btn-sm gap-1" on:click=move |_| on_retry.run(())>
                <RefreshCw attr:class="h-4 w-4" />
                "Retry"
            </button>
        </div>
    }
}

/// 行旁的可关闭错误提示
#[component]
pub fn RowError(message: String, on_dismiss: Callback<()>) -> impl IntoView {
    view! {
        <div class="text-error text-xs flex items-center gap-1 mt-1">
            <span>{message}</span>
            <button class="btn btn-ghost btn-xs" on:click=move |_| on_dismiss.run(())>
                "✕"
            </button>
        </div>
    }
}

/// 表单提交区的通用错误横幅
#[component]
pub fn FormBanner(message: Signal<Option<String>>) -> impl IntoView {
    view! {
        <Show when=move || message.with(Option::is_some)>
            <div role="alert" class="alert alert-error text-sm py-2">
                <AlertCircle attr:class="h-5 w-5" />
                <span>{move || message.get().unwrap_or_default()}</span>
            </div>
        </Show>
    }
}

// =========================================================
// 模态框
// =========================================================

#[component]
pub fn Modal(
    open: Signal<bool>,
    on_close: Callback<()>,
    #[prop(into)] title: Signal<String>,
    children: Children,
) -> impl IntoView {
    let dialog_ref = NodeRef::<html::Dialog>::new();

    Effect::new(move |_| {
        let Some(dialog) = dialog_ref.get() else {
            return;
        };
        if open.get() {
            if !dialog.open() {
                if let Err(e) = dialog.show_modal() {
                    tracing::warn!(error = ?e, "failed to open dialog");
                }
            }
        } else if dialog.open() {
            dialog.close();
        }
    });

    view! {
        <dialog class="modal" node_ref=dialog_ref on:close=move |_| on_close.run(())>
            <div class="modal-box">
                <h3 class="font-bold text-lg mb-4">{move || title.get()}</h3>
                {children()}
            </div>
            <form method="dialog" class="modal-backdrop">
                <button>"close"</button>
            </form>
        </dialog>
    }
}

/// 表单输入项：标签 + 输入框 + 字段错误
#[component]
pub fn Field(
    #[prop(into)] label: String,
    error: Signal<Option<String>>,
    children: Children,
) -> impl IntoView {
    view! {
        <div class="form-control w-full">
            <label class="label">
                <span class="label-text">{label}</span>
            </label>
            {children()}
            <Show when=move || error.with(Option::is_some)>
                <label class="label">
                    <span class="label-text-alt text-error">{move || error.get().unwrap_or_default()}</span>
                </label>
            </Show>
        </div>
    }
}

/// 金额显示（₱，两位小数，千分位）
pub fn peso(amount: f64) -> String {
    let formatted = format!("{:.2}", amount.abs());
    let (whole, fraction) = formatted.split_once('.').unwrap_or((formatted.as_str(), "00"));
    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    let sign = if amount < 0.0 { "-" } else { "" };
    format!("{}₱{}.{}", sign, grouped, fraction)
}

pub fn kwh(value: f64) -> String {
    format!("{:.2} kWh", value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn peso_groups_thousands() {
        assert_eq!(peso(0.0), "₱0.00");
        assert_eq!(peso(950.5), "₱950.50");
        assert_eq!(peso(15230.5), "₱15,230.50");
        assert_eq!(peso(1234567.891), "₱1,234,567.89");
        assert_eq!(peso(-1200.0), "-₱1,200.00");
    }
}

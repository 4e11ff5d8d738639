use leptos::prelude::*;
use leptos::task::spawn_local;
use ongchad_shared::date::current_year;
use ongchad_shared::listing::specs::ReadingList;
use ongchad_shared::listing::{ListPage, ListQuery};
use ongchad_shared::models::RecordId;
use ongchad_shared::stats::ReadingSummary;
use ongchad_shared::{BillStatus, BillingMonth, Reading, Unit};

use crate::auth::{expire_on_unauthorized, use_auth};
use crate::components::dashboard::status_badge;
use crate::components::icons::{ChevronLeft, ChevronRight};
use crate::components::list::{EmptyRow, LoadFailed, LoadingRow, SortHeader, kwh, peso, retry_load, start_load};
use crate::web::route::AppRoute;
use crate::web::router::Link;

const COLUMNS: u32 = 6;

/// 单个单元的逐月读数历史
#[component]
pub fn ReadingsPage(unit_id: RecordId) -> impl IntoView {
    let auth = use_auth();
    let year = RwSignal::new(current_year());
    let unit = RwSignal::new(Option::<Unit>::None);

    // 单元信息只用于标题，失败时退回显示编号
    let api = auth.api();
    spawn_local(async move {
        match api.get_unit(unit_id).await {
            Ok(found) => {
                let _ = unit.try_set(Some(found));
            }
            Err(e) => {
                tracing::warn!(unit_id, error = %e, "failed to load unit");
                expire_on_unauthorized(&auth, &e);
            }
        }
    });

    let heading = move || {
        unit.with(|u| match u {
            Some(u) => match u.tenant_name.as_deref().filter(|n| !n.trim().is_empty()) {
                Some(tenant) => format!("Unit {} · {}", u.unit_number, tenant),
                None => format!("Unit {}", u.unit_number),
            },
            None => format!("Unit #{}", unit_id),
        })
    };

    view! {
        <div class="flex flex-col md:flex-row md:items-center justify-between gap-4">
            <div>
                <Link route=AppRoute::Units class="link link-hover text-sm opacity-70">
                    "← Units"
                </Link>
                <h2 class="text-2xl font-bold">{heading}</h2>
            </div>
            <div class="join">
                <button class="btn btn-sm join-item" on:click=move |_| year.update(|y| *y -= 1)>
                    <ChevronLeft attr:class="h-4 w-4" />
                </button>
                <span class="btn btn-sm join-item no-animation">{move || year.get()}</span>
                <button
                    class="btn btn-sm join-item"
                    disabled=move || year.get() >= current_year()
                    on:click=move |_| year.update(|y| *y += 1)
                >
                    <ChevronRight attr:class="h-4 w-4" />
                </button>
            </div>
        </div>
        {move || {
            let year = year.get();
            view! { <ReadingTable unit_id=unit_id year=year /> }
        }}
    }
}

#[component]
fn ReadingTable(unit_id: RecordId, year: i32) -> impl IntoView {
    let auth = use_auth();
    let page = RwSignal::new(ListPage::<Reading>::new());
    let query = RwSignal::new(ListQuery::new("month"));

    let fetch = move |api: crate::auth::Api| async move { api.reading_history(unit_id, year).await };
    start_load(auth, page, fetch);

    let visible = Memo::new(move |_| page.with(|p| query.with(|q| p.project(q, &ReadingList))));
    let summary = Memo::new(move |_| visible.with(|v| ReadingSummary::from_readings(v)));

    view! {
        {move || {
            page.with(|p| p.load.error().map(str::to_string))
                .map(|message| {
                    view! {
                        <LoadFailed
                            message=message
                            on_retry=Callback::new(move |_| retry_load(auth, page, fetch))
                        />
                    }
                })
        }}

        <div class="stats shadow w-full stats-vertical md:stats-horizontal bg-base-100">
            <div class="stat">
                <div class="stat-title">"Total consumption"</div>
                <div class="stat-value text-2xl">{move || summary.with(|s| kwh(s.total_kwh))}</div>
                <div class="stat-desc">{move || summary.with(|s| format!("{} months", s.months))}</div>
            </div>
            <div class="stat">
                <div class="stat-title">"Monthly average"</div>
                <div class="stat-value text-2xl">{move || summary.with(|s| kwh(s.average_kwh()))}</div>
            </div>
            <div class="stat">
                <div class="stat-title">"Total billed"</div>
                <div class="stat-value text-2xl">{move || summary.with(|s| peso(s.total_amount))}</div>
            </div>
        </div>

        <div class="card bg-base-100 shadow-xl">
            <div class="overflow-x-auto w-full">
                <table class="table table-zebra w-full">
                    <thead>
                        <tr>
                            <SortHeader query=query key="month" label="Month" />
                            <SortHeader query=query key="previous_reading" label="Previous" class="hidden md:table-cell" />
                            <SortHeader query=query key="current_reading" label="Current" class="hidden md:table-cell" />
                            <SortHeader query=query key="kwh_used" label="kWh used" />
                            <SortHeader query=query key="amount" label="Amount" />
                            <th>"Status"</th>
                        </tr>
                    </thead>
                    <tbody>
                        {move || {
                            if page.with(|p| p.load.is_loading()) {
                                return Some(view! { <LoadingRow colspan=COLUMNS /> }.into_any());
                            }
                            let loaded = page.with(|p| p.load.error().is_none());
                            page.with(|p| p.empty_state(visible.with(Vec::len)))
                                .filter(|_| loaded)
                                .map(|state| {
                                    view! {
                                        <EmptyRow colspan=COLUMNS state=state no_data=format!("No readings recorded in {}.", year) />
                                    }
                                    .into_any()
                                })
                        }}
                        // 旧接口的读数可能没有 id，按月份区分
                        <For
                            each=move || visible.get()
                            key=|r| (r.id, r.month.clone())
                            children=move |reading| {
                                let label = reading
                                    .month
                                    .parse::<BillingMonth>()
                                    .map(|m| m.label())
                                    .unwrap_or_else(|_| reading.month.clone());
                                let status = reading.status.unwrap_or(BillStatus::Unknown);
                                view! {
                                    <tr>
                                        <td class="font-medium">{label}</td>
                                        <td class="hidden md:table-cell font-mono">{format!("{:.2}", reading.previous_reading)}</td>
                                        <td class="hidden md:table-cell font-mono">{format!("{:.2}", reading.current_reading)}</td>
                                        <td>{kwh(reading.kwh_used)}</td>
                                        <td>{peso(reading.amount)}</td>
                                        <td>
                                            {reading.status.map(|_| {
                                                view! { <span class=format!("badge {}", status_badge(status))>{status.label()}</span> }
                                            })}
                                        </td>
                                    </tr>
                                }
                            }
                        />
                    </tbody>
                </table>
            </div>
        </div>
    }
}

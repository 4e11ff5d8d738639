use leptos::prelude::*;
use leptos::task::spawn_local;
use ongchad_shared::forms::inline_message;
use ongchad_shared::listing::LoadState;
use ongchad_shared::{BillStatus, BillingMonth, DashboardSummary};

use crate::auth::{expire_on_unauthorized, use_auth};
use crate::components::icons::RefreshCw;
use crate::components::list::{LoadFailed, kwh, peso};
use crate::web::route::AppRoute;
use crate::web::router::Link;

#[component]
pub fn DashboardPage() -> impl IntoView {
    let auth = use_auth();

    let summary = RwSignal::new(DashboardSummary::default());
    let load = RwSignal::new(LoadState::Idle);

    let fetch = move || {
        if load.with_untracked(LoadState::is_loading) {
            return;
        }
        load.set(LoadState::Loading);
        let api = auth.api();
        spawn_local(async move {
            match api.dashboard().await {
                Ok(data) => {
                    let _ = summary.try_set(data);
                    let _ = load.try_set(LoadState::Loaded);
                }
                Err(e) => {
                    tracing::warn!(error = %e, "failed to load dashboard");
                    expire_on_unauthorized(&auth, &e);
                    let _ = load.try_set(LoadState::Failed(inline_message(&e)));
                }
            }
        });
    };

    fetch();

    let current_month = BillingMonth::current();
    let occupancy = move || summary.with(|s| format!("{:.0}%", s.occupancy_rate() * 100.0));

    view! {
        <div class="flex items-center justify-between">
            <div>
                <h2 class="text-2xl font-bold">"Overview"</h2>
                <p class="text-base-content/70 text-sm">
                    "Last calculated: "
                    {move || summary.with(|s| s.last_calculated.clone().unwrap_or_else(|| "—".into()))}
                </p>
            </div>
            <button
                on:click=move |_| fetch()
                disabled=move || load.with(LoadState::is_loading)
                class="btn btn-ghost btn-circle"
            >
                <RefreshCw attr:class=move || {
                    if load.with(LoadState::is_loading) { "h-5 w-5 animate-spin" } else { "h-5 w-5" }
                } />
            </button>
        </div>

        {move || {
            load.with(|l| l.error().map(str::to_string))
                .map(|message| {
                    view! {
                        <LoadFailed
                            message=message
                            on_retry=Callback::new(move |_| {
                                load.set(LoadState::Idle);
                                fetch();
                            })
                        />
                    }
                })
        }}

        <div class="stats shadow w-full stats-vertical md:stats-horizontal bg-base-100">
            <div class="stat">
                <div class="stat-title">"Pending bills"</div>
                <div class="stat-value text-warning">{move || summary.with(|s| s.pending)}</div>
            </div>
            <div class="stat">
                <div class="stat-title">"Sent bills"</div>
                <div class="stat-value text-info">{move || summary.with(|s| s.sent)}</div>
            </div>
            <div class="stat">
                <div class="stat-title">"Skipped"</div>
                <div class="stat-value">{move || summary.with(|s| s.skipped)}</div>
            </div>
            <div class="stat">
                <div class="stat-title">"Unpaid total"</div>
                <div class="stat-value text-error text-2xl">
                    {move || summary.with(|s| peso(s.unpaid_total_amount))}
                </div>
            </div>
        </div>

        <div class="stats shadow w-full bg-base-100">
            <div class="stat">
                <div class="stat-title">"Occupied units"</div>
                <div class="stat-value text-primary">
                    {move || summary.with(|s| format!("{} / {}", s.active_tenants, s.total_tenants))}
                </div>
                <div class="stat-desc">{occupancy} " occupancy"</div>
            </div>
            <div class="stat">
                <div class="stat-title">"This month"</div>
                <div class="stat-value text-2xl">{current_month.label()}</div>
                <div class="stat-desc">
                    <Link route=AppRoute::MonthlyBills { month: current_month } class="link link-primary">
                        "View tenant bills"
                    </Link>
                </div>
            </div>
        </div>

        <div class="card bg-base-100 shadow-xl">
            <div class="card-body p-0">
                <div class="p-6 pb-2">
                    <h3 class="card-title">"Submeters"</h3>
                    <p class="text-base-content/70 text-sm">"Latest reading per unit."</p>
                </div>
                <div class="overflow-x-auto w-full">
                    <table class="table table-zebra w-full">
                        <thead>
                            <tr>
                                <th>"Unit"</th>
                                <th>"Tenant"</th>
                                <th>"Current reading"</th>
                                <th>"Consumption"</th>
                                <th>"Status"</th>
                            </tr>
                        </thead>
                        <tbody>
                            <Show when=move || summary.with(|s| s.submeters.is_empty())>
                                <tr>
                                    <td colspan="5" class="text-center py-8 text-base-content/50">
                                        "No submeter readings yet."
                                    </td>
                                </tr>
                            </Show>
                            <For
                                each=move || summary.with(|s| s.submeters.clone())
                                key=|m| (m.id, m.unit_number.clone())
                                children=move |meter| {
                                    let status = meter.status.unwrap_or(BillStatus::Unknown);
                                    view! {
                                        <tr>
                                            <td class="font-mono font-bold">{meter.unit_number.clone()}</td>
                                            <td>{meter.tenant_name.clone().unwrap_or_else(|| "Vacant".into())}</td>
                                            <td>{meter.current_reading.map(|r| format!("{:.2}", r)).unwrap_or_else(|| "—".into())}</td>
                                            <td>{meter.kwh_used.map(kwh).unwrap_or_else(|| "—".into())}</td>
                                            <td>
                                                <span class=format!("badge {}", status_badge(status))>
                                                    {status.label()}
                                                </span>
                                            </td>
                                        </tr>
                                    }
                                }
                            />
                        </tbody>
                    </table>
                </div>
            </div>
        </div>
    }
}

/// 状态徽章样式
pub fn status_badge(status: BillStatus) -> &'static str {
    match status {
        BillStatus::Pending => "badge-warning",
        BillStatus::Sent => "badge-info",
        BillStatus::Paid => "badge-success",
        BillStatus::Skipped => "badge-ghost",
        BillStatus::Unknown => "badge-outline",
    }
}

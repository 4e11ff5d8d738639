use leptos::prelude::*;
use ongchad_shared::listing::specs::PaymentList;
use ongchad_shared::listing::{ListPage, ListQuery, SortOrder};
use ongchad_shared::stats::BillSummary;
use ongchad_shared::{BillingMonth, TenantBill};

use crate::auth::use_auth;
use crate::components::icons::{ChevronLeft, ChevronRight};
use crate::components::list::{
    EmptyRow, FilterSelect, LoadFailed, LoadingRow, SearchBox, SortHeader, kwh, peso, retry_load,
    start_load,
};
use crate::components::tenant_bills::PAYMENT_METHODS;

const COLUMNS: u32 = 6;

/// 付款记录：所选月份中已付的租户账单
#[component]
pub fn PaymentsPage() -> impl IntoView {
    let month = RwSignal::new(BillingMonth::current());

    view! {
        <div class="flex items-center justify-between">
            <button class="btn btn-ghost btn-sm gap-1" on:click=move |_| month.update(|m| *m = m.previous())>
                <ChevronLeft attr:class="h-4 w-4" />
                "Previous"
            </button>
            <h2 class="text-2xl font-bold">{move || month.get().label()}</h2>
            <button class="btn btn-ghost btn-sm gap-1" on:click=move |_| month.update(|m| *m = m.next())>
                "Next"
                <ChevronRight attr:class="h-4 w-4" />
            </button>
        </div>
        // 每个月份一份独立的列表状态
        {move || {
            let month = month.get();
            view! { <PaymentsTable month=month /> }
        }}
    }
}

#[component]
fn PaymentsTable(month: BillingMonth) -> impl IntoView {
    let auth = use_auth();
    let page = RwSignal::new(ListPage::<TenantBill>::new());
    let query = RwSignal::new(ListQuery::new("payment_date").with_order(SortOrder::Desc));

    let fetch = move |api: crate::auth::Api| async move {
        api.tenant_bills_for_month(month)
            .await
            .map(|bills| PaymentList::paid_only(&bills))
    };
    start_load(auth, page, fetch);

    let visible = Memo::new(move |_| page.with(|p| query.with(|q| p.project(q, &PaymentList))));
    let summary = Memo::new(move |_| visible.with(|v| BillSummary::from_bills(v)));

    let method_options = PAYMENT_METHODS
        .into_iter()
        .map(|m| (m.to_string(), m.to_string()))
        .collect::<Vec<_>>();

    view! {
        <div class="flex flex-wrap gap-2">
            <SearchBox query=query placeholder="Search unit, tenant, method..." />
            <FilterSelect query=query all_label="All methods" options=method_options />
        </div>

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

        <div class="card bg-base-100 shadow-xl">
            <div class="overflow-x-auto w-full">
                <table class="table table-zebra w-full">
                    <thead>
                        <tr>
                            <SortHeader query=query key="payment_date" label="Paid on" />
                            <SortHeader query=query key="unit_number" label="Unit" />
                            <SortHeader query=query key="tenant_name" label="Tenant" />
                            <SortHeader query=query key="payment_method" label="Method" />
                            <SortHeader query=query key="amount" label="Amount" />
                            <th class="hidden md:table-cell">"Proof"</th>
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
                                        <EmptyRow colspan=COLUMNS state=state no_data="No payments recorded for this month." />
                                    }
                                    .into_any()
                                })
                        }}
                        <For
                            each=move || visible.get()
                            key=|b| b.id
                            children=move |bill| {
                                view! {
                                    <tr>
                                        <td>{bill.payment_date.clone().unwrap_or_else(|| "—".into())}</td>
                                        <td class="font-mono font-bold">{bill.unit_number.clone()}</td>
                                        <td>{bill.tenant_name.clone().unwrap_or_else(|| "—".into())}</td>
                                        <td>
                                            <span class="badge badge-outline">
                                                {bill.payment_method.clone().unwrap_or_else(|| "—".into())}
                                            </span>
                                        </td>
                                        <td>{peso(bill.amount)}</td>
                                        <td class="hidden md:table-cell">
                                            {bill.receipt_url.clone().map(|url| {
                                                view! {
                                                    <a href=url target="_blank" rel="noopener" class="link link-primary">
                                                        "View"
                                                    </a>
                                                }
                                            })}
                                        </td>
                                    </tr>
                                }
                            }
                        />
                    </tbody>
                </table>
            </div>
            <div class="px-6 py-3 text-sm text-base-content/70 flex gap-4">
                <span>{move || format!("{} payments", summary.with(|s| s.count))}</span>
                <span>{move || summary.with(|s| peso(s.paid_amount))}</span>
                <span>{move || summary.with(|s| kwh(s.total_kwh))}</span>
            </div>
        </div>
    }
}

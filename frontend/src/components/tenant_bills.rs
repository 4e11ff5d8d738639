use leptos::html;
use leptos::prelude::*;
use leptos::task::spawn_local;
use ongchad_shared::date::today_iso;
use ongchad_shared::forms::{FormErrors, STATUS_FIELDS, validate_status_update};
use ongchad_shared::listing::specs::TenantBillList;
use ongchad_shared::listing::{ListMutation, ListPage, ListQuery};
use ongchad_shared::stats::BillSummary;
use ongchad_shared::{BillStatus, BillingMonth, TenantBill};

use crate::auth::{expire_on_unauthorized, use_auth};
use crate::components::dashboard::status_badge;
use crate::components::icons::{ChevronLeft, ChevronRight};
use crate::components::list::{
    EmptyRow, Field, FilterSelect, FormBanner, LoadFailed, LoadingRow, Modal, RowError, SearchBox,
    SortHeader, kwh, peso, retry_load, spawn_mutation, start_load,
};
use crate::web::http::read_file;
use crate::web::route::AppRoute;
use crate::web::router::use_router;

const COLUMNS: u32 = 7;

/// 付款方式选项
pub const PAYMENT_METHODS: [&str; 3] = ["Cash", "GCash", "Bank Transfer"];

/// 某月的租户账单，支持逐行变更状态
#[component]
pub fn TenantBillsPage(month: BillingMonth) -> impl IntoView {
    let auth = use_auth();
    let router = use_router();
    let page = RwSignal::new(ListPage::<TenantBill>::new());
    let query = RwSignal::new(ListQuery::new("unit_number"));
    let paying = RwSignal::new(Option::<TenantBill>::None);

    let fetch = move |api: crate::auth::Api| async move { api.tenant_bills_for_month(month).await };
    start_load(auth, page, fetch);

    let visible = Memo::new(move |_| page.with(|p| query.with(|q| p.project(q, &TenantBillList))));
    let summary = Memo::new(move |_| visible.with(|v| BillSummary::from_bills(v)));
    let can_manage = move || auth.can_manage();

    // 非「已付」状态直接提交；「已付」需要填写付款信息
    let change_status = move |bill: TenantBill, status: BillStatus| {
        if status == bill.status {
            return;
        }
        if status == BillStatus::Paid {
            paying.set(Some(bill));
            return;
        }
        let id = bill.id;
        match validate_status_update(id, status, Some(month), "", "", None) {
            Ok(update) => spawn_mutation(auth, page, id, move |api| async move {
                api.update_bill_status(&update)
                    .await
                    .map(|_| ListMutation::Replace(update.apply_to(&bill)))
            }),
            Err(e) => {
                let message = e.general().or_else(|| e.field("status")).unwrap_or_default().to_string();
                page.update(|p| p.set_row_error(id, message));
            }
        }
    };

    let status_options = BillStatus::SELECTABLE
        .iter()
        .map(|s| (s.as_str().to_string(), s.label().to_string()))
        .collect::<Vec<_>>();

    view! {
        <div class="flex items-center justify-between">
            <button
                class="btn btn-ghost btn-sm gap-1"
                on:click=move |_| router.navigate(AppRoute::MonthlyBills { month: month.previous() })
            >
                <ChevronLeft attr:class="h-4 w-4" />
                {month.previous().label()}
            </button>
            <h2 class="text-2xl font-bold">{month.label()}</h2>
            <button
                class="btn btn-ghost btn-sm gap-1"
                on:click=move |_| router.navigate(AppRoute::MonthlyBills { month: month.next() })
            >
                {month.next().label()}
                <ChevronRight attr:class="h-4 w-4" />
            </button>
        </div>

        <div class="stats shadow w-full stats-vertical md:stats-horizontal bg-base-100">
            <div class="stat">
                <div class="stat-title">"Total billed"</div>
                <div class="stat-value text-2xl">{move || summary.with(|s| peso(s.total_amount))}</div>
                <div class="stat-desc">{move || summary.with(|s| kwh(s.total_kwh))}</div>
            </div>
            <div class="stat">
                <div class="stat-title">"Collected"</div>
                <div class="stat-value text-2xl text-success">{move || summary.with(|s| peso(s.paid_amount))}</div>
                <div class="stat-desc">
                    {move || summary.with(|s| format!("{:.0}% collected", s.collection_rate() * 100.0))}
                </div>
            </div>
            <div class="stat">
                <div class="stat-title">"Unpaid"</div>
                <div class="stat-value text-2xl text-error">{move || summary.with(|s| peso(s.unpaid_amount))}</div>
                <div class="stat-desc">
                    {move || {
                        summary.with(|s| {
                            format!(
                                "{} pending, {} sent",
                                s.count_of(BillStatus::Pending),
                                s.count_of(BillStatus::Sent),
                            )
                        })
                    }}
                </div>
            </div>
        </div>

        <div class="flex flex-wrap gap-2">
            <SearchBox query=query placeholder="Search unit or tenant..." />
            <FilterSelect query=query all_label="All statuses" options=status_options />
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
                            <SortHeader query=query key="unit_number" label="Unit" />
                            <SortHeader query=query key="tenant_name" label="Tenant" />
                            <th class="hidden md:table-cell">"Readings"</th>
                            <SortHeader query=query key="kwh_used" label="kWh" />
                            <SortHeader query=query key="amount" label="Amount" />
                            <SortHeader query=query key="status" label="Status" />
                            <SortHeader query=query key="payment_date" label="Paid on" class="hidden md:table-cell" />
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
                                        <EmptyRow colspan=COLUMNS state=state no_data="No tenant bills for this month." />
                                    }
                                    .into_any()
                                })
                        }}
                        <For
                            each=move || visible.get()
                            key=|b| (b.id, b.status, b.payment_date.clone(), b.payment_method.clone())
                            children=move |bill| {
                                let id = bill.id;
                                let status = bill.status;
                                let row = bill.clone();
                                view! {
                                    <tr>
                                        <td class="font-mono font-bold">{bill.unit_number.clone()}</td>
                                        <td>{bill.tenant_name.clone().unwrap_or_else(|| "—".into())}</td>
                                        <td class="hidden md:table-cell font-mono text-xs">
                                            {format!("{:.2} → {:.2}", bill.previous_reading, bill.current_reading)}
                                        </td>
                                        <td>{kwh(bill.kwh_used)}</td>
                                        <td>{peso(bill.amount)}</td>
                                        <td>
                                            <Show
                                                when=can_manage
                                                fallback=move || {
                                                    view! {
                                                        <span class=format!("badge {}", status_badge(status))>{status.label()}</span>
                                                    }
                                                }
                                            >
                                                {
                                                    let row = row.clone();
                                                    view! {
                                                        <select
                                                            class="select select-bordered select-xs"
                                                            prop:value=status.as_str()
                                                            disabled=move || page.with(|p| p.is_mutating(id))
                                                            on:change=move |ev| {
                                                                if let Some(next) = BillStatus::parse(&event_target_value(&ev)) {
                                                                    // 「已付」在弹窗确认前保持原值
                                                                    if next == BillStatus::Paid {
                                                                        event_target::<leptos::web_sys::HtmlSelectElement>(&ev)
                                                                            .set_value(status.as_str());
                                                                    }
                                                                    change_status(row.clone(), next);
                                                                }
                                                            }
                                                        >
                                                            {BillStatus::SELECTABLE
                                                                .into_iter()
                                                                .map(|s| {
                                                                    view! {
                                                                        <option value=s.as_str() selected=s == status>{s.label()}</option>
                                                                    }
                                                                })
                                                                .collect_view()}
                                                        </select>
                                                    }
                                                }
                                            </Show>
                                            {move || {
                                                page.with(|p| p.row_error(id).map(str::to_string))
                                                    .map(|message| {
                                                        view! {
                                                            <RowError
                                                                message=message
                                                                on_dismiss=Callback::new(move |_| page.update(|p| p.clear_row_error(id)))
                                                            />
                                                        }
                                                    })
                                            }}
                                        </td>
                                        <td class="hidden md:table-cell">
                                            {bill.payment_date.clone().unwrap_or_default()}
                                            {bill.payment_method.clone().map(|m| view! { <span class="opacity-60">" · " {m}</span> })}
                                        </td>
                                    </tr>
                                }
                            }
                        />
                    </tbody>
                </table>
            </div>
        </div>

        <PaymentForm paying=paying page=page month=month />
    }
}

/// 标记为已付：付款方式、日期与可选凭证
#[component]
fn PaymentForm(
    paying: RwSignal<Option<TenantBill>>,
    page: RwSignal<ListPage<TenantBill>>,
    month: BillingMonth,
) -> impl IntoView {
    let auth = use_auth();

    let method = RwSignal::new(PAYMENT_METHODS[0].to_string());
    let payment_date = RwSignal::new(String::new());
    let errors = RwSignal::new(FormErrors::new());
    let submitting = RwSignal::new(false);
    let file_input = NodeRef::<html::Input>::new();

    Effect::new(move |_| {
        if paying.with(Option::is_some) {
            method.set(PAYMENT_METHODS[0].to_string());
            payment_date.set(today_iso());
            errors.set(FormErrors::new());
            if let Some(input) = file_input.get_untracked() {
                input.set_value("");
            }
        }
    });

    let on_submit = move |ev: leptos::web_sys::SubmitEvent| {
        ev.prevent_default();
        let Some(bill) = paying.get_untracked() else {
            return;
        };
        if submitting.get_untracked() || !page.try_update(|p| p.begin_mutation(bill.id)).unwrap_or(false) {
            return;
        }
        let selected = file_input
            .get_untracked()
            .and_then(|input| input.files())
            .and_then(|files| files.get(0));

        submitting.set(true);
        let method = method.get_untracked();
        let payment_date = payment_date.get_untracked();
        let api = auth.api();
        spawn_local(async move {
            let receipt = match selected {
                Some(file) => match read_file(file).await {
                    Ok(upload) => Some(upload),
                    Err(e) => {
                        tracing::warn!(error = %e, "failed to read payment receipt");
                        None
                    }
                },
                None => None,
            };

            let result = match validate_status_update(
                bill.id,
                BillStatus::Paid,
                Some(month),
                &method,
                &payment_date,
                receipt,
            ) {
                Ok(update) => api
                    .update_bill_status(&update)
                    .await
                    .map(|_| update.apply_to(&bill))
                    .map_err(|e| {
                        expire_on_unauthorized(&auth, &e);
                        FormErrors::from_api_error(&e, STATUS_FIELDS)
                    }),
                Err(e) => Err(e),
            };

            match result {
                Ok(updated) => {
                    tracing::info!(id = bill.id, "bill marked as paid");
                    let _ = page.try_update(|p| {
                        p.finish_mutation(bill.id, Ok(ListMutation::Replace(updated)))
                    });
                    let _ = paying.try_set(None);
                }
                Err(e) => {
                    let _ = page.try_update(|p| p.cancel_mutation(bill.id));
                    let _ = errors.try_set(e);
                }
            }
            let _ = submitting.try_set(false);
        });
    };

    let field_error = move |field: &'static str| {
        Signal::derive(move || errors.with(|e| e.field(field).map(str::to_string)))
    };
    let title = Signal::derive(move || {
        paying.with(|b| {
            b.as_ref()
                .map(|b| format!("Record payment · Unit {}", b.unit_number))
                .unwrap_or_default()
        })
    });

    view! {
        <Modal
            open=Signal::derive(move || paying.with(Option::is_some))
            on_close=Callback::new(move |_| paying.set(None))
            title=title
        >
            <form class="space-y-2" on:submit=on_submit>
                <FormBanner message=Signal::derive(move || errors.with(|e| e.general().map(str::to_string))) />
                <p class="text-sm opacity-70">
                    {move || paying.with(|b| b.as_ref().map(|b| peso(b.amount)).unwrap_or_default())}
                </p>
                <Field label="Payment method" error=field_error("method")>
                    <select
                        class="select select-bordered w-full"
                        prop:value=method
                        on:change=move |ev| {
                            method.set(event_target_value(&ev));
                            errors.update(|e| e.clear_field("method"));
                        }
                    >
                        {PAYMENT_METHODS
                            .into_iter()
                            .map(|m| view! { <option value=m>{m}</option> })
                            .collect_view()}
                    </select>
                </Field>
                <Field label="Payment date" error=field_error("payment_date")>
                    <input
                        type="date"
                        class="input input-bordered w-full"
                        prop:value=payment_date
                        on:input=move |ev| {
                            payment_date.set(event_target_value(&ev));
                            errors.update(|e| e.clear_field("payment_date"));
                        }
                    />
                </Field>
                <Field label="Proof of payment (optional)" error=field_error("receipt")>
                    <input
                        type="file"
                        accept="image/*,application/pdf"
                        class="file-input file-input-bordered w-full"
                        node_ref=file_input
                    />
                </Field>
                <div class="modal-action">
                    <button type="button" class="btn btn-ghost" on:click=move |_| paying.set(None)>
                        "Cancel"
                    </button>
                    <button type="submit" class="btn btn-success" disabled=move || submitting.get()>
                        {move || if submitting.get() { "Saving..." } else { "Mark as paid" }}
                    </button>
                </div>
            </form>
        </Modal>
    }
}

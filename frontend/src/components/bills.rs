use std::collections::BTreeSet;

use leptos::html;
use leptos::prelude::*;
use leptos::task::spawn_local;
use ongchad_shared::forms::{FormErrors, RECEIPT_FIELDS, validate_receipt_upload};
use ongchad_shared::listing::specs::BillReceiptList;
use ongchad_shared::listing::{ListMutation, ListPage, ListQuery, SortOrder};
use ongchad_shared::stats::ReceiptSummary;
use ongchad_shared::{BillReceipt, BillingMonth};

use crate::auth::{expire_on_unauthorized, use_auth};
use crate::components::icons::Upload;
use crate::components::list::{
    EmptyRow, Field, FilterSelect, FormBanner, LoadFailed, LoadingRow, Modal, SearchBox, SortHeader,
    kwh, peso, retry_load, start_load,
};
use crate::web::http::read_file;
use crate::web::route::AppRoute;
use crate::web::router::Link;

const COLUMNS: u32 = 6;

/// 主电表账单（收据）列表与上传
#[component]
pub fn BillsPage() -> impl IntoView {
    let auth = use_auth();
    let page = RwSignal::new(ListPage::<BillReceipt>::new());
    let query = RwSignal::new(ListQuery::new("month").with_order(SortOrder::Desc));
    let uploading = RwSignal::new(false);

    let fetch = |api: crate::auth::Api| async move { api.list_bill_receipts().await };
    start_load(auth, page, fetch);

    let visible = Memo::new(move |_| page.with(|p| query.with(|q| p.project(q, &BillReceiptList))));
    let summary = Memo::new(move |_| visible.with(|v| ReceiptSummary::from_receipts(v)));
    let can_manage = move || auth.can_manage();

    // 年份过滤项来自已加载的数据
    let year_options = Memo::new(move |_| {
        page.with(|p| {
            p.records
                .iter()
                .filter_map(BillReceipt::billing_month)
                .map(|m| m.year())
                .collect::<BTreeSet<_>>()
                .into_iter()
                .rev()
                .map(|y| (y.to_string(), y.to_string()))
                .collect::<Vec<_>>()
        })
    });

    view! {
        <div class="flex flex-col md:flex-row md:items-center justify-between gap-4">
            <div class="flex flex-wrap gap-2">
                <SearchBox query=query placeholder="Search month..." />
                {move || view! { <FilterSelect query=query all_label="All years" options=year_options.get() /> }}
            </div>
            <Show when=can_manage>
                <button class="btn btn-primary btn-sm gap-2" on:click=move |_| uploading.set(true)>
                    <Upload attr:class="h-4 w-4" />
                    "Upload bill"
                </button>
            </Show>
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
                            <SortHeader query=query key="month" label="Month" />
                            <SortHeader query=query key="total_amount" label="Total amount" />
                            <SortHeader query=query key="total_kwh" label="Total kWh" />
                            <SortHeader query=query key="rate" label="Rate / kWh" class="hidden md:table-cell" />
                            <th class="hidden md:table-cell">"Receipt"</th>
                            <th></th>
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
                                    view! { <EmptyRow colspan=COLUMNS state=state no_data="No bills uploaded yet." /> }
                                        .into_any()
                                })
                        }}
                        <For
                            each=move || visible.get()
                            key=|r| (r.id, r.month.clone())
                            children=move |receipt| {
                                let month = receipt.billing_month();
                                let label = month.map(|m| m.label()).unwrap_or_else(|| receipt.month.clone());
                                let rate = receipt
                                    .effective_rate()
                                    .map(|r| format!("₱{:.4}", r))
                                    .unwrap_or_else(|| "—".into());
                                view! {
                                    <tr>
                                        <td class="font-medium">{label}</td>
                                        <td>{peso(receipt.total_amount)}</td>
                                        <td>{kwh(receipt.total_kwh)}</td>
                                        <td class="hidden md:table-cell font-mono">{rate}</td>
                                        <td class="hidden md:table-cell">
                                            {receipt.receipt_url.clone().map(|url| {
                                                view! {
                                                    <a href=url target="_blank" rel="noopener" class="link link-primary">
                                                        "View"
                                                    </a>
                                                }
                                            })}
                                        </td>
                                        <td class="text-right">
                                            {month.map(|month| {
                                                view! {
                                                    <Link route=AppRoute::MonthlyBills { month } class="btn btn-ghost btn-xs">
                                                        "Tenant bills"
                                                    </Link>
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
                <span>{move || format!("{} bills", summary.with(|s| s.count))}</span>
                <span>{move || summary.with(|s| peso(s.total_amount))}</span>
                <span>{move || summary.with(|s| kwh(s.total_kwh))}</span>
            </div>
        </div>

        <UploadForm open=uploading page=page />
    }
}

#[component]
fn UploadForm(open: RwSignal<bool>, page: RwSignal<ListPage<BillReceipt>>) -> impl IntoView {
    let auth = use_auth();

    let month = RwSignal::new(String::new());
    let total_amount = RwSignal::new(String::new());
    let total_kwh = RwSignal::new(String::new());
    let errors = RwSignal::new(FormErrors::new());
    let submitting = RwSignal::new(false);
    let file_input = NodeRef::<html::Input>::new();

    Effect::new(move |_| {
        if open.get() {
            month.set(BillingMonth::current().to_string());
            total_amount.set(String::new());
            total_kwh.set(String::new());
            errors.set(FormErrors::new());
            if let Some(input) = file_input.get_untracked() {
                input.set_value("");
            }
        }
    });

    let on_submit = move |ev: leptos::web_sys::SubmitEvent| {
        ev.prevent_default();
        if submitting.get_untracked() {
            return;
        }
        let selected = file_input
            .get_untracked()
            .and_then(|input| input.files())
            .and_then(|files| files.get(0));

        submitting.set(true);
        let month = month.get_untracked();
        let total_amount = total_amount.get_untracked();
        let total_kwh = total_kwh.get_untracked();
        let api = auth.api();
        spawn_local(async move {
            let receipt = match selected {
                Some(file) => match read_file(file).await {
                    Ok(upload) => Some(upload),
                    Err(e) => {
                        tracing::warn!(error = %e, "failed to read receipt file");
                        None
                    }
                },
                None => None,
            };

            let upload = match validate_receipt_upload(&month, &total_amount, &total_kwh, receipt) {
                Ok(upload) => upload,
                Err(e) => {
                    let _ = errors.try_set(e);
                    let _ = submitting.try_set(false);
                    return;
                }
            };

            match api.upload_bill_receipt(&upload).await {
                Ok(receipt) => {
                    tracing::info!(month = %upload.month, "bill receipt uploaded");
                    let _ = page.try_update(|p| p.apply(ListMutation::Insert(receipt)));
                    let _ = open.try_set(false);
                }
                Err(e) => {
                    expire_on_unauthorized(&auth, &e);
                    let _ = errors.try_set(FormErrors::from_api_error(&e, RECEIPT_FIELDS));
                }
            }
            let _ = submitting.try_set(false);
        });
    };

    let field_error = move |field: &'static str| {
        Signal::derive(move || errors.with(|e| e.field(field).map(str::to_string)))
    };

    view! {
        <Modal open=open.into() on_close=Callback::new(move |_| open.set(false)) title="Upload electricity bill">
            <form class="space-y-2" on:submit=on_submit>
                <FormBanner message=Signal::derive(move || errors.with(|e| e.general().map(str::to_string))) />
                <Field label="Billing month" error=field_error("month")>
                    <input
                        type="month"
                        class="input input-bordered w-full"
                        prop:value=month
                        on:input=move |ev| {
                            month.set(event_target_value(&ev));
                            errors.update(|e| e.clear_field("month"));
                        }
                    />
                </Field>
                <div class="grid grid-cols-2 gap-4">
                    <Field label="Total amount (₱)" error=field_error("total_amount")>
                        <input
                            inputmode="decimal"
                            class="input input-bordered w-full"
                            prop:value=total_amount
                            on:input=move |ev| {
                                total_amount.set(event_target_value(&ev));
                                errors.update(|e| e.clear_field("total_amount"));
                            }
                        />
                    </Field>
                    <Field label="Total kWh" error=field_error("total_kwh")>
                        <input
                            inputmode="decimal"
                            class="input input-bordered w-full"
                            prop:value=total_kwh
                            on:input=move |ev| {
                                total_kwh.set(event_target_value(&ev));
                                errors.update(|e| e.clear_field("total_kwh"));
                            }
                        />
                    </Field>
                </div>
                <Field label="Receipt" error=field_error("receipt")>
                    <input
                        type="file"
                        accept="image/*,application/pdf"
                        class="file-input file-input-bordered w-full"
                        node_ref=file_input
                        on:change=move |_| errors.update(|e| e.clear_field("receipt"))
                    />
                </Field>
                <div class="modal-action">
                    <button type="button" class="btn btn-ghost" on:click=move |_| open.set(false)>
                        "Cancel"
                    </button>
                    <button type="submit" class="btn btn-primary" disabled=move || submitting.get()>
                        {move || if submitting.get() { "Uploading..." } else { "Upload" }}
                    </button>
                </div>
            </form>
        </Modal>
    }
}

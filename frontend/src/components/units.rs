use leptos::prelude::*;
use leptos::task::spawn_local;
use ongchad_shared::forms::{FormErrors, UNIT_FIELDS, validate_unit};
use ongchad_shared::listing::specs::{FILTER_OCCUPIED, FILTER_VACANT, UnitList};
use ongchad_shared::listing::{ListMutation, ListPage, ListQuery};
use ongchad_shared::stats::UnitSummary;
use ongchad_shared::{Unit, UnitPayload};

use crate::auth::{expire_on_unauthorized, use_auth};
use crate::components::icons::{Pencil, Plus, Trash2};
use crate::components::list::{
    EmptyRow, Field, FilterSelect, FormBanner, LoadFailed, LoadingRow, Modal, RowError, SearchBox,
    SortHeader, retry_load, spawn_mutation, start_load,
};
use crate::web::route::AppRoute;
use crate::web::router::Link;

const COLUMNS: u32 = 6;

/// 编辑目标：新建或已有单元
#[derive(Debug, Clone, PartialEq)]
enum Editing {
    New,
    Existing(Unit),
}

#[component]
pub fn UnitsPage() -> impl IntoView {
    let auth = use_auth();
    let page = RwSignal::new(ListPage::<Unit>::new());
    let query = RwSignal::new(ListQuery::new("unit_number"));
    let editing = RwSignal::new(Option::<Editing>::None);

    let fetch = |api: crate::auth::Api| async move { api.list_units().await };
    start_load(auth, page, fetch);

    let visible = Memo::new(move |_| page.with(|p| query.with(|q| p.project(q, &UnitList))));
    let summary = Memo::new(move |_| visible.with(|v| UnitSummary::from_units(v)));
    let can_manage = move || auth.can_manage();

    let on_delete = move |id: u64| {
        spawn_mutation(auth, page, id, move |api| async move {
            api.delete_unit(id).await.map(|_| ListMutation::Remove(id))
        });
    };

    let add_button = move || {
        view! {
            <button class="btn btn-primary btn-sm gap-2" on:click=move |_| editing.set(Some(Editing::New))>
                <Plus attr:class="h-4 w-4" />
                "Add unit"
            </button>
        }
    };

    view! {
        <div class="flex flex-col md:flex-row md:items-center justify-between gap-4">
            <div class="flex flex-wrap gap-2">
                <SearchBox query=query placeholder="Search unit, tenant, meter..." />
                <FilterSelect
                    query=query
                    all_label="All units"
                    options=vec![
                        (FILTER_OCCUPIED.to_string(), "Occupied".to_string()),
                        (FILTER_VACANT.to_string(), "Vacant".to_string()),
                    ]
                />
            </div>
            <Show when=can_manage>{add_button()}</Show>
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
                            <SortHeader query=query key="submeter_number" label="Submeter" class="hidden md:table-cell" />
                            <th class="hidden md:table-cell">"Contact"</th>
                            <SortHeader query=query key="move_in_date" label="Move-in" class="hidden md:table-cell" />
                            <th></th>
                        </tr>
                    </thead>
                    <tbody>
                        {move || {
                            if page.with(|p| p.load.is_loading()) {
                                return Some(view! { <LoadingRow colspan=COLUMNS /> }.into_any());
                            }
                            let loaded = page.with(|p| p.load.error().is_none());
                            let state = page.with(|p| p.empty_state(visible.with(Vec::len)));
                            state.filter(|_| loaded).map(|state| {
                                let action = can_manage().then(|| add_button().into_any());
                                match action {
                                    Some(action) => view! {
                                        <EmptyRow colspan=COLUMNS state=state no_data="No units yet." action=action />
                                    }
                                    .into_any(),
                                    None => view! {
                                        <EmptyRow colspan=COLUMNS state=state no_data="No units yet." />
                                    }
                                    .into_any(),
                                }
                            })
                        }}
                        <For
                            each=move || visible.get()
                            key=|u| {
                                (
                                    u.id,
                                    u.unit_number.clone(),
                                    u.tenant_name.clone(),
                                    u.submeter_number.clone(),
                                    u.contact_number.clone(),
                                    u.move_in_date.clone(),
                                )
                            }
                            children=move |unit| {
                                let id = unit.id;
                                let edit_target = unit.clone();
                                view! {
                                    <tr>
                                        <td class="font-mono font-bold">{unit.unit_number.clone()}</td>
                                        <td>
                                            {match unit.tenant_name.clone().filter(|n| !n.trim().is_empty()) {
                                                Some(name) => view! { <span>{name}</span> }.into_any(),
                                                None => view! { <span class="badge badge-ghost">"Vacant"</span> }.into_any(),
                                            }}
                                        </td>
                                        <td class="hidden md:table-cell font-mono">{unit.submeter_number.clone().unwrap_or_default()}</td>
                                        <td class="hidden md:table-cell">{unit.contact_number.clone().unwrap_or_default()}</td>
                                        <td class="hidden md:table-cell">{unit.move_in_date.clone().unwrap_or_default()}</td>
                                        <td class="text-right">
                                            <div class="flex justify-end gap-1">
                                                <Link route=AppRoute::UnitReadings { unit_id: id } class="btn btn-ghost btn-xs">
                                                    "Readings"
                                                </Link>
                                                <Show when=can_manage>
                                                    {
                                                        let edit_target = edit_target.clone();
                                                        view! {
                                                            <button
                                                                class="btn btn-ghost btn-xs"
                                                                on:click=move |_| editing.set(Some(Editing::Existing(edit_target.clone())))
                                                            >
                                                                <Pencil attr:class="h-4 w-4" />
                                                            </button>
                                                            <button
                                                                class="btn btn-ghost btn-xs text-error"
                                                                disabled=move || page.with(|p| p.is_mutating(id))
                                                                on:click=move |_| on_delete(id)
                                                            >
                                                                <Trash2 attr:class="h-4 w-4" />
                                                            </button>
                                                        }
                                                    }
                                                </Show>
                                            </div>
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
                                    </tr>
                                }
                            }
                        />
                    </tbody>
                </table>
            </div>
            <div class="px-6 py-3 text-sm text-base-content/70 flex gap-4">
                <span>{move || format!("{} units", summary.get().total)}</span>
                <span>{move || format!("{} occupied", summary.get().occupied)}</span>
                <span>{move || format!("{} vacant", summary.get().vacant)}</span>
            </div>
        </div>

        <UnitForm editing=editing page=page />
    }
}

/// 新建/编辑单元的模态表单
#[component]
fn UnitForm(editing: RwSignal<Option<Editing>>, page: RwSignal<ListPage<Unit>>) -> impl IntoView {
    let auth = use_auth();

    let unit_number = RwSignal::new(String::new());
    let tenant_name = RwSignal::new(String::new());
    let submeter_number = RwSignal::new(String::new());
    let contact_number = RwSignal::new(String::new());
    let move_in_date = RwSignal::new(String::new());
    let errors = RwSignal::new(FormErrors::new());
    let submitting = RwSignal::new(false);

    // 打开时用编辑目标填充表单
    Effect::new(move |_| {
        let source = match editing.get() {
            Some(Editing::Existing(unit)) => UnitPayload::from(&unit),
            Some(Editing::New) => UnitPayload::default(),
            None => return,
        };
        unit_number.set(source.unit_number);
        tenant_name.set(source.tenant_name.unwrap_or_default());
        submeter_number.set(source.submeter_number.unwrap_or_default());
        contact_number.set(source.contact_number.unwrap_or_default());
        move_in_date.set(source.move_in_date.unwrap_or_default());
        errors.set(FormErrors::new());
    });

    let optional = |value: String| {
        let trimmed = value.trim().to_string();
        (!trimmed.is_empty()).then_some(trimmed)
    };

    let on_submit = move |ev: leptos::web_sys::SubmitEvent| {
        ev.prevent_default();
        if submitting.get_untracked() {
            return;
        }
        let payload = UnitPayload {
            unit_number: unit_number.get_untracked().trim().to_string(),
            tenant_name: optional(tenant_name.get_untracked()),
            submeter_number: optional(submeter_number.get_untracked()),
            contact_number: optional(contact_number.get_untracked()),
            move_in_date: optional(move_in_date.get_untracked()),
        };
        if let Err(e) = validate_unit(&payload) {
            errors.set(e);
            return;
        }

        let target = editing.get_untracked();
        submitting.set(true);
        let api = auth.api();
        spawn_local(async move {
            let result = match &target {
                Some(Editing::Existing(unit)) => api
                    .update_unit(unit.id, &payload)
                    .await
                    .map(ListMutation::Replace),
                _ => api.create_unit(&payload).await.map(ListMutation::Insert),
            };
            match result {
                Ok(mutation) => {
                    tracing::info!(unit = %payload.unit_number, "unit saved");
                    let _ = page.try_update(|p| p.apply(mutation));
                    let _ = editing.try_set(None);
                }
                Err(e) => {
                    expire_on_unauthorized(&auth, &e);
                    let _ = errors.try_set(FormErrors::from_api_error(&e, UNIT_FIELDS));
                }
            }
            let _ = submitting.try_set(false);
        });
    };

    let field_error = move |name: &'static str| {
        Signal::derive(move || errors.with(|e| e.field(name).map(str::to_string)))
    };
    let title = Signal::derive(move || match editing.get() {
        Some(Editing::Existing(_)) => "Edit unit".to_string(),
        _ => "Add unit".to_string(),
    });

    view! {
        <Modal
            open=Signal::derive(move || editing.with(Option::is_some))
            on_close=Callback::new(move |_| editing.set(None))
            title=title
        >
            <form class="space-y-2" on:submit=on_submit>
                <FormBanner message=Signal::derive(move || errors.with(|e| e.general().map(str::to_string))) />
                <Field label="Unit number" error=field_error("unit_number")>
                    <input
                        class="input input-bordered w-full"
                        prop:value=unit_number
                        on:input=move |ev| {
                            unit_number.set(event_target_value(&ev));
                            errors.update(|e| e.clear_field("unit_number"));
                        }
                    />
                </Field>
                <Field label="Tenant name" error=field_error("tenant_name")>
                    <input
                        class="input input-bordered w-full"
                        placeholder="Leave blank if vacant"
                        prop:value=tenant_name
                        on:input=move |ev| tenant_name.set(event_target_value(&ev))
                    />
                </Field>
                <div class="grid grid-cols-2 gap-4">
                    <Field label="Submeter number" error=field_error("submeter_number")>
                        <input
                            class="input input-bordered w-full"
                            prop:value=submeter_number
                            on:input=move |ev| submeter_number.set(event_target_value(&ev))
                        />
                    </Field>
                    <Field label="Contact number" error=field_error("contact_number")>
                        <input
                            class="input input-bordered w-full"
                            prop:value=contact_number
                            on:input=move |ev| {
                                contact_number.set(event_target_value(&ev));
                                errors.update(|e| e.clear_field("contact_number"));
                            }
                        />
                    </Field>
                </div>
                <Field label="Move-in date" error=field_error("move_in_date")>
                    <input
                        type="date"
                        class="input input-bordered w-full"
                        prop:value=move_in_date
                        on:input=move |ev| {
                            move_in_date.set(event_target_value(&ev));
                            errors.update(|e| e.clear_field("move_in_date"));
                        }
                    />
                </Field>
                <div class="modal-action">
                    <button type="button" class="btn btn-ghost" on:click=move |_| editing.set(None)>
                        "Cancel"
                    </button>
                    <button type="submit" class="btn btn-primary" disabled=move || submitting.get()>
                        {move || if submitting.get() { "Saving..." } else { "Save" }}
                    </button>
                </div>
            </form>
        </Modal>
    }
}

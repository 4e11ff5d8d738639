use std::time::Duration;

use leptos::prelude::*;
use leptos::task::spawn_local;
use ongchad_shared::forms::{ACCOUNT_FIELDS, FormErrors, UsernameCheck, username_format_error, validate_account};
use ongchad_shared::listing::specs::AccountList;
use ongchad_shared::listing::{ListMutation, ListPage, ListQuery};
use ongchad_shared::stats::AccountSummary;
use ongchad_shared::{Account, AccountPayload, Role};

use crate::auth::{expire_on_unauthorized, use_auth};
use crate::components::icons::{Pencil, Plus, Trash2};
use crate::components::list::{
    EmptyRow, Field, FilterSelect, FormBanner, LoadFailed, LoadingRow, Modal, RowError, SearchBox,
    SortHeader, retry_load, spawn_mutation, start_load,
};
use crate::web::timer::sleep;

const COLUMNS: u32 = 5;
/// 用户名输入停止后多久发起可用性检查
const USERNAME_CHECK_DEBOUNCE: Duration = Duration::from_millis(400);

#[derive(Debug, Clone, PartialEq)]
enum Editing {
    New,
    Existing(Account),
}

fn role_badge(role: Role) -> &'static str {
    match role {
        Role::SuperAdmin => "badge-primary",
        Role::Admin => "badge-secondary",
        Role::Viewer => "badge-ghost",
        Role::Accountant => "badge-accent",
    }
}

#[component]
pub fn AccountsPage() -> impl IntoView {
    let auth = use_auth();
    let page = RwSignal::new(ListPage::<Account>::new());
    let query = RwSignal::new(ListQuery::new("name"));
    let editing = RwSignal::new(Option::<Editing>::None);

    let fetch = |api: crate::auth::Api| async move { api.list_accounts().await };
    start_load(auth, page, fetch);

    let visible = Memo::new(move |_| page.with(|p| query.with(|q| p.project(q, &AccountList))));
    let summary = Memo::new(move |_| page.with(|p| AccountSummary::from_accounts(&p.records)));
    let can_manage = move || auth.can_manage();
    let own_id = move || auth.state.with(|s| s.user.as_ref().map(|u| u.id));

    let on_delete = move |id: u64| {
        spawn_mutation(auth, page, id, move |api| async move {
            api.delete_account(id).await.map(|_| ListMutation::Remove(id))
        });
    };

    let role_options = Role::ALL
        .iter()
        .map(|r| (r.as_str().to_string(), r.label().to_string()))
        .collect::<Vec<_>>();

    view! {
        <div class="flex flex-col md:flex-row md:items-center justify-between gap-4">
            <div class="flex flex-wrap gap-2">
                <SearchBox query=query placeholder="Search name, username, email..." />
                <FilterSelect query=query all_label="All roles" options=role_options />
            </div>
            <Show when=can_manage>
                <button class="btn btn-primary btn-sm gap-2" on:click=move |_| editing.set(Some(Editing::New))>
                    <Plus attr:class="h-4 w-4" />
                    "Add account"
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
                            <SortHeader query=query key="name" label="Name" />
                            <SortHeader query=query key="username" label="Username" />
                            <SortHeader query=query key="email" label="Email" class="hidden md:table-cell" />
                            <SortHeader query=query key="role" label="Role" />
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
                                    view! { <EmptyRow colspan=COLUMNS state=state no_data="No accounts yet." /> }
                                        .into_any()
                                })
                        }}
                        <For
                            each=move || visible.get()
                            key=|a| (a.id, a.name.clone(), a.username.clone(), a.email.clone(), a.role)
                            children=move |account| {
                                let id = account.id;
                                let edit_target = account.clone();
                                let is_self = move || own_id() == Some(id);
                                view! {
                                    <tr>
                                        <td class="font-medium">{account.name.clone()}</td>
                                        <td class="font-mono">{account.username.clone()}</td>
                                        <td class="hidden md:table-cell">{account.email.clone()}</td>
                                        <td>
                                            <span class=format!("badge {}", role_badge(account.role))>
                                                {account.role.label()}
                                            </span>
                                        </td>
                                        <td class="text-right">
                                            <Show when=can_manage>
                                                {
                                                    let edit_target = edit_target.clone();
                                                    view! {
                                                        <div class="flex justify-end gap-1">
                                                            <button
                                                                class="btn btn-ghost btn-xs"
                                                                on:click=move |_| editing.set(Some(Editing::Existing(edit_target.clone())))
                                                            >
                                                                <Pencil attr:class="h-4 w-4" />
                                                            </button>
                                                            // 不能删除自己
                                                            <button
                                                                class="btn btn-ghost btn-xs text-error"
                                                                disabled=move || is_self() || page.with(|p| p.is_mutating(id))
                                                                on:click=move |_| on_delete(id)
                                                            >
                                                                <Trash2 attr:class="h-4 w-4" />
                                                            </button>
                                                        </div>
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
                                    </tr>
                                }
                            }
                        />
                    </tbody>
                </table>
            </div>
            <div class="px-6 py-3 text-sm text-base-content/70 flex flex-wrap gap-4">
                <span>{move || format!("{} accounts", summary.with(|s| s.total))}</span>
                {Role::ALL
                    .into_iter()
                    .map(|role| {
                        view! {
                            <span>{move || format!("{} {}", summary.with(|s| s.count_of(role)), role.label())}</span>
                        }
                    })
                    .collect_view()}
            </div>
        </div>

        <AccountForm editing=editing page=page />
    }
}

/// 新建/编辑账户的模态表单，含用户名实时可用性检查
#[component]
fn AccountForm(editing: RwSignal<Option<Editing>>, page: RwSignal<ListPage<Account>>) -> impl IntoView {
    let auth = use_auth();

    let name = RwSignal::new(String::new());
    let username = RwSignal::new(String::new());
    let email = RwSignal::new(String::new());
    let role = RwSignal::new(Role::Viewer);
    let password = RwSignal::new(String::new());
    let password_confirmation = RwSignal::new(String::new());
    let errors = RwSignal::new(FormErrors::new());
    let submitting = RwSignal::new(false);
    let username_check = RwSignal::new(UsernameCheck::Idle);
    // 每次输入递增，过期的检查结果直接丢弃
    let check_generation = RwSignal::new(0u64);

    let original_username = move || match editing.get_untracked() {
        Some(Editing::Existing(account)) => Some(account.username),
        _ => None,
    };
    let creating = move || !matches!(editing.get_untracked(), Some(Editing::Existing(_)));

    Effect::new(move |_| {
        let source = match editing.get() {
            Some(Editing::Existing(account)) => account,
            Some(Editing::New) => {
                name.set(String::new());
                username.set(String::new());
                email.set(String::new());
                role.set(Role::Viewer);
                password.set(String::new());
                password_confirmation.set(String::new());
                errors.set(FormErrors::new());
                username_check.set(UsernameCheck::Idle);
                return;
            }
            None => return,
        };
        name.set(source.name);
        username.set(source.username);
        email.set(source.email);
        role.set(source.role);
        password.set(String::new());
        password_confirmation.set(String::new());
        errors.set(FormErrors::new());
        username_check.set(UsernameCheck::Idle);
    });

    let on_username_input = move |value: String| {
        username.set(value.clone());
        errors.update(|e| e.clear_field("username"));
        let generation = check_generation.get_untracked() + 1;
        check_generation.set(generation);

        if original_username().is_some_and(|original| original == value.trim()) {
            username_check.set(UsernameCheck::Idle);
            return;
        }
        if let Some(message) = username_format_error(&value) {
            username_check.set(UsernameCheck::Invalid(message));
            return;
        }

        username_check.set(UsernameCheck::Checking);
        let api = auth.api();
        spawn_local(async move {
            sleep(USERNAME_CHECK_DEBOUNCE).await;
            if check_generation.try_get_untracked() != Some(generation) {
                return;
            }
            let outcome = match api.check_username(&value).await {
                Ok(true) => UsernameCheck::Available,
                Ok(false) => UsernameCheck::Taken,
                Err(e) => {
                    tracing::warn!(error = %e, "username check failed");
                    expire_on_unauthorized(&auth, &e);
                    UsernameCheck::Unknown
                }
            };
            if check_generation.try_get_untracked() == Some(generation) {
                let _ = username_check.try_set(outcome);
            }
        });
    };

    let on_submit = move |ev: leptos::web_sys::SubmitEvent| {
        ev.prevent_default();
        if submitting.get_untracked() || username_check.with_untracked(UsernameCheck::blocks_submit) {
            return;
        }
        let secret = password.get_untracked();
        let payload = AccountPayload {
            name: name.get_untracked().trim().to_string(),
            username: username.get_untracked().trim().to_string(),
            email: email.get_untracked().trim().to_string(),
            role: role.get_untracked(),
            password: (!secret.is_empty()).then_some(secret),
            password_confirmation: Some(password_confirmation.get_untracked())
                .filter(|c| !c.is_empty()),
        };
        if let Err(e) = validate_account(&payload, creating()) {
            errors.set(e);
            return;
        }

        let target = editing.get_untracked();
        submitting.set(true);
        let api = auth.api();
        spawn_local(async move {
            let result = match &target {
                Some(Editing::Existing(account)) => api
                    .update_account(account.id, &payload)
                    .await
                    .map(ListMutation::Replace),
                _ => api.create_account(&payload).await.map(ListMutation::Insert),
            };
            match result {
                Ok(mutation) => {
                    tracing::info!(username = %payload.username, "account saved");
                    let _ = page.try_update(|p| p.apply(mutation));
                    let _ = editing.try_set(None);
                }
                Err(e) => {
                    expire_on_unauthorized(&auth, &e);
                    let _ = errors.try_set(FormErrors::from_api_error(&e, ACCOUNT_FIELDS));
                }
            }
            let _ = submitting.try_set(false);
        });
    };

    let field_error = move |field: &'static str| {
        Signal::derive(move || errors.with(|e| e.field(field).map(str::to_string)))
    };
    // 字段错误优先，其次是实时检查结果
    let username_error = Signal::derive(move || {
        errors
            .with(|e| e.field("username").map(str::to_string))
            .or_else(|| match username_check.get() {
                UsernameCheck::Taken => Some("Username is already taken.".to_string()),
                UsernameCheck::Invalid(message) => Some(message.to_string()),
                _ => None,
            })
    });
    let username_hint = move || match username_check.get() {
        UsernameCheck::Checking => Some(view! { <span class="loading loading-spinner loading-xs"></span> }.into_any()),
        UsernameCheck::Available => Some(view! { <span class="text-success text-xs">"Available"</span> }.into_any()),
        UsernameCheck::Unknown => Some(view! { <span class="text-warning text-xs">"Could not check availability"</span> }.into_any()),
        _ => None,
    };
    let title = Signal::derive(move || match editing.get() {
        Some(Editing::Existing(_)) => "Edit account".to_string(),
        _ => "Add account".to_string(),
    });

    view! {
        <Modal
            open=Signal::derive(move || editing.with(Option::is_some))
            on_close=Callback::new(move |_| editing.set(None))
            title=title
        >
            <form class="space-y-2" on:submit=on_submit>
                <FormBanner message=Signal::derive(move || errors.with(|e| e.general().map(str::to_string))) />
                <Field label="Full name" error=field_error("name")>
                    <input
                        class="input input-bordered w-full"
                        prop:value=name
                        on:input=move |ev| {
                            name.set(event_target_value(&ev));
                            errors.update(|e| e.clear_field("name"));
                        }
                    />
                </Field>
                <Field label="Username" error=username_error>
                    <div class="flex items-center gap-2">
                        <input
                            class="input input-bordered w-full"
                            autocomplete="off"
                            prop:value=username
                            on:input=move |ev| on_username_input(event_target_value(&ev))
                        />
                        {username_hint}
                    </div>
                </Field>
                <Field label="Email" error=field_error("email")>
                    <input
                        type="email"
                        class="input input-bordered w-full"
                        prop:value=email
                        on:input=move |ev| {
                            email.set(event_target_value(&ev));
                            errors.update(|e| e.clear_field("email"));
                        }
                    />
                </Field>
                <Field label="Role" error=field_error("role")>
                    <select
                        class="select select-bordered w-full"
                        prop:value=move || role.get().as_str()
                        on:change=move |ev| {
                            if let Some(selected) = Role::normalize(&event_target_value(&ev)) {
                                role.set(selected);
                            }
                        }
                    >
                        {Role::ALL
                            .into_iter()
                            .map(|r| view! { <option value=r.as_str()>{r.label()}</option> })
                            .collect_view()}
                    </select>
                </Field>
                <div class="grid grid-cols-2 gap-4">
                    <Field label="Password" error=field_error("password")>
                        <input
                            type="password"
                            autocomplete="new-password"
                            class="input input-bordered w-full"
                            placeholder=move || {
                                if matches!(editing.get(), Some(Editing::Existing(_))) { "Leave blank to keep" } else { "" }
                            }
                            prop:value=password
                            on:input=move |ev| {
                                password.set(event_target_value(&ev));
                                errors.update(|e| e.clear_field("password"));
                            }
                        />
                    </Field>
                    <Field label="Confirm password" error=field_error("password_confirmation")>
                        <input
                            type="password"
                            autocomplete="new-password"
                            class="input input-bordered w-full"
                            prop:value=password_confirmation
                            on:input=move |ev| {
                                password_confirmation.set(event_target_value(&ev));
                                errors.update(|e| e.clear_field("password_confirmation"));
                            }
                        />
                    </Field>
                </div>
                <div class="modal-action">
                    <button type="button" class="btn btn-ghost" on:click=move |_| editing.set(None)>
                        "Cancel"
                    </button>
                    <button
                        type="submit"
                        class="btn btn-primary"
                        disabled=move || submitting.get() || username_check.with(UsernameCheck::blocks_submit)
                    >
                        {move || if submitting.get() { "Saving..." } else { "Save" }}
                    </button>
                </div>
            </form>
        </Modal>
    }
}

use leptos::prelude::*;
use leptos::task::spawn_local;
use ongchad_shared::session::LoginOutcome;

use crate::auth::{login, use_auth};
use crate::components::icons::{AlertCircle, Zap};
use crate::components::guard::LoadingScreen;

#[component]
pub fn LoginPage() -> impl IntoView {
    let auth = use_auth();

    let (username, set_username) = signal(String::new());
    let (password, set_password) = signal(String::new());
    let (is_submitting, set_is_submitting) = signal(false);
    let (error_msg, set_error_msg) = signal(Option::<String>::None);

    let is_loading = move || auth.state.with(|s| s.loading);

    // 登录成功后的跳转由路由服务监听认证状态完成
    let on_submit = move |ev: leptos::web_sys::SubmitEvent| {
        ev.prevent_default();
        if is_submitting.get_untracked() {
            return;
        }

        set_is_submitting.set(true);
        set_error_msg.set(None);

        let identifier = username.get_untracked();
        let secret = password.get_untracked();
        spawn_local(async move {
            let outcome = login(&auth, identifier, secret).await;
            if let LoginOutcome::Failure { message } = outcome {
                let _ = set_error_msg.try_set(Some(message));
            }
            let _ = set_is_submitting.try_set(false);
        });
    };

    view! {
        <Show when=move || !is_loading() fallback=|| view! { <LoadingScreen /> }>
            <div class="hero min-h-screen bg-base-200">
                <div class="hero-content flex-col w-full max-w-md">
                    <div class="text-center mb-4">
                        <div class="flex flex-col items-center gap-2">
                            <div class="p-3 bg-primary/10 rounded-2xl text-primary">
                                <Zap attr:class="h-8 w-8" />
                            </div>
                            <h1 class="text-3xl font-bold">"Ongchad Bills"</h1>
                            <p class="text-base-content/70">
                                "Sign in to manage apartment electricity billing"
                            </p>
                        </div>
                    </div>

                    <div class="card shrink-0 w-full shadow-2xl bg-base-100">
                        <form class="card-body" on:submit=on_submit>
                            <Show when=move || error_msg.with(Option::is_some)>
                                <div role="alert" class="alert alert-error text-sm py-2">
                                    <AlertCircle attr:class="h-5 w-5" />
                                    <span>{move || error_msg.get().unwrap_or_default()}</span>
                                </div>
                            </Show>

                            <div class="form-control">
                                <label class="label" for="username">
                                    <span class="label-text">"Username"</span>
                                </label>
                                <input
                                    id="username"
                                    type="text"
                                    autocomplete="username"
                                    on:input=move |ev| set_username.set(event_target_value(&ev))
                                    prop:value=username
                                    class="input input-bordered"
                                    required
                                />
                            </div>
                            <div class="form-control">
                                <label class="label" for="password">
                                    <span class="label-text">"Password"</span>
                                </label>
                                <input
                                    id="password"
                                    type="password"
                                    autocomplete="current-password"
                                    placeholder="••••••••"
                                    on:input=move |ev| set_password.set(event_target_value(&ev))
                                    prop:value=password
                                    class="input input-bordered"
                                    required
                                />
                            </div>
                            <div class="form-control mt-6">
                                <button class="btn btn-primary" disabled=move || is_submitting.get()>
                                    {move || {
                                        if is_submitting.get() {
                                            view! {
                                                <span class="loading loading-spinner"></span>
                                                "Signing in..."
                                            }
                                                .into_any()
                                        } else {
                                            "Sign in".into_any()
                                        }
                                    }}
                                </button>
                            </div>
                        </form>
                    </div>
                </div>
            </div>
        </Show>
    }
}

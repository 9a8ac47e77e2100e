use crate::api::ApiErrorKind;
use crate::board::BookmarkBoard;
use crate::components::board::{AddBookmarkModal, BookmarkList, ConfirmDeleteModal, Navbar};
use crate::components::ui::{
    Alert, AlertDescription, Button, ButtonSize, Card, CardContent, CardDescription, CardHeader,
    CardTitle, Input, Label, Spinner,
};
use crate::realtime::RealtimeSubscription;
use crate::state::AppContext;
use crate::storage::save_user_to_storage;
use leptos::logging::warn;
use leptos::prelude::*;
use leptos::task::spawn_local;

#[component]
pub(crate) fn LoginPage() -> impl IntoView {
    let email: RwSignal<String> = RwSignal::new(String::new());
    let password: RwSignal<String> = RwSignal::new(String::new());
    let error: RwSignal<Option<String>> = RwSignal::new(None);
    let loading: RwSignal<bool> = RwSignal::new(false);

    let app_state = expect_context::<AppContext>();

    // Already signed in: away from the login view.
    Effect::new(move |_| {
        if app_state.0.api_client.get().is_authenticated() {
            let _ = window().location().set_href("/");
        }
    });

    let on_submit = move |ev: web_sys::SubmitEvent| {
        ev.prevent_default();

        let email_val = email.get();
        let password_val = password.get();

        if email_val.trim().is_empty() || password_val.is_empty() {
            error.set(Some("Email and password are required".to_string()));
            return;
        }

        let mut api_client = app_state.0.api_client.get_untracked();

        loading.set(true);
        error.set(None);

        spawn_local(async move {
            match api_client.sign_in(&email_val, &password_val).await {
                Ok(response) => {
                    api_client.set_token(response.access_token);
                    api_client.save_to_storage();
                    save_user_to_storage(&response.user);
                    app_state.0.api_client.set(api_client);
                    app_state.0.current_user.set(Some(response.user));
                    let _ = window().location().set_href("/");
                }
                Err(e) => {
                    error.set(Some(e.to_string()));
                }
            }
            loading.set(false);
        });
    };

    view! {
        <div class="min-h-screen bg-zinc-100 transition-colors dark:bg-zinc-950">
            <div class="mx-auto flex min-h-screen w-full max-w-md flex-col justify-center px-4 py-12">
                <div class="mb-6">
                    <a href="/" class="text-sm font-medium text-zinc-900 dark:text-white">"SmartMark"</a>
                    <div class="text-xs text-zinc-500 dark:text-zinc-400">"Your bookmarks, everywhere."</div>
                </div>

                <Card>
                    <CardHeader>
                        <CardTitle class="text-xl">"Sign in"</CardTitle>
                        <CardDescription>
                            "Welcome back. Use your SmartMark account to continue."
                        </CardDescription>
                    </CardHeader>

                    <CardContent>
                        <form class="flex flex-col gap-4" on:submit=on_submit>
                            <div class="flex flex-col gap-2">
                                <Label html_for="email">"Email"</Label>
                                <Input
                                    id="email"
                                    r#type="email"
                                    placeholder="you@example.com"
                                    bind_value=email
                                    required=true
                                />
                            </div>

                            <div class="flex flex-col gap-2">
                                <Label html_for="password">"Password"</Label>
                                <Input
                                    id="password"
                                    r#type="password"
                                    placeholder="••••••••"
                                    bind_value=password
                                    required=true
                                />
                            </div>

                            <Show when=move || error.get().is_some() fallback=|| ().into_view()>
                                {move || error.get().map(|e| view! {
                                    <Alert class="border-red-500/30">
                                        <AlertDescription class="text-red-600 dark:text-red-400">{e}</AlertDescription>
                                    </Alert>
                                })}
                            </Show>

                            <Button
                                class="w-full"
                                size=ButtonSize::Lg
                                attr:disabled=move || loading.get()
                            >
                                <span class="inline-flex items-center gap-2">
                                    <Show when=move || loading.get() fallback=|| ().into_view()>
                                        <Spinner />
                                    </Show>
                                    {move || if loading.get() { "Signing in..." } else { "Sign in" }}
                                </span>
                            </Button>
                        </form>
                    </CardContent>
                </Card>
            </div>
        </div>
    }
}

#[component]
pub(crate) fn DashboardPage() -> impl IntoView {
    let app_state = expect_context::<AppContext>();

    // Board state lives for exactly this mount; a reload reseeds it.
    let board: RwSignal<BookmarkBoard> = RwSignal::new(BookmarkBoard::new());
    let loading: RwSignal<bool> = RwSignal::new(true);
    let load_error: RwSignal<Option<String>> = RwSignal::new(None);
    let op_error: RwSignal<Option<String>> = RwSignal::new(None);
    let add_open: RwSignal<bool> = RwSignal::new(false);

    let subscription = StoredValue::new_local(None::<RealtimeSubscription>);

    // One-shot on mount: seed from the snapshot, then open the change feed.
    // Everything here reads untracked, so the effect does not re-run.
    Effect::new(move |_| {
        let Some(user) = app_state.0.current_user.get_untracked() else {
            // Token without a stored identity; force a clean re-auth.
            app_state.0.clear_session();
            let _ = window().location().set_href("/login");
            return;
        };
        let user_id = user.id.clone();

        let api_client = app_state.0.api_client.get_untracked();
        {
            let api_client = api_client.clone();
            let user_id = user_id.clone();
            spawn_local(async move {
                match api_client.fetch_bookmarks(&user_id).await {
                    Ok(rows) => {
                        board.update(|b| b.seed(rows));
                    }
                    Err(e) => {
                        if e.kind == ApiErrorKind::Unauthorized {
                            app_state.0.clear_session();
                            let _ = window().location().set_href("/login");
                        } else {
                            load_error.set(Some(e.to_string()));
                        }
                    }
                }
                loading.set(false);
            });
        }

        if let Some(token) = api_client.get_auth_token() {
            let result = RealtimeSubscription::subscribe(
                &api_client.base_url,
                &api_client.anon_key,
                &user_id,
                &token,
                move |event| board.update(|b| b.apply(event)),
            );
            match result {
                Ok(sub) => subscription.set_value(Some(sub)),
                Err(e) => warn!("{e}"),
            }
        }
    });

    // The feed must not outlive this view: tear the socket down on unmount so
    // no late callback can touch disposed signals.
    on_cleanup(move || {
        subscription.update_value(|s| {
            if let Some(sub) = s.take() {
                sub.unsubscribe();
            }
        });
    });

    let on_request_delete = Callback::new(move |id: String| {
        board.update(|b| b.request_delete(id));
    });

    view! {
        <div class="relative min-h-screen bg-zinc-100 transition-colors dark:bg-zinc-950">
            <div class="pointer-events-none absolute inset-0">
                <div class="absolute -top-40 -left-40 h-[37.5rem] w-[37.5rem] rounded-full bg-indigo-500/20 blur-[120px]" />
                <div class="absolute right-0 bottom-0 h-[31.25rem] w-[31.25rem] rounded-full bg-purple-500/20 blur-[120px]" />
            </div>

            <Navbar />

            <div class="relative px-6 pt-32 pb-20">
                <div class="mx-auto max-w-5xl space-y-4">
                    <Show when=move || load_error.get().is_some() fallback=|| ().into_view()>
                        {move || load_error.get().map(|e| view! {
                            <Alert class="border-red-500/30">
                                <AlertDescription class="text-red-600 dark:text-red-400">{e}</AlertDescription>
                            </Alert>
                        })}
                    </Show>

                    <Show when=move || op_error.get().is_some() fallback=|| ().into_view()>
                        {move || op_error.get().map(|e| view! {
                            <Alert class="border-red-500/30">
                                <AlertDescription class="text-red-600 dark:text-red-400">{e}</AlertDescription>
                            </Alert>
                        })}
                    </Show>

                    <Card class="p-10">
                        <Show
                            when=move || !loading.get()
                            fallback=|| view! {
                                <div class="flex items-center gap-2 py-8 text-sm text-zinc-500 dark:text-zinc-400">
                                    <Spinner />
                                    "Loading bookmarks…"
                                </div>
                            }
                        >
                            <BookmarkList board=board on_request_delete=on_request_delete />
                        </Show>
                    </Card>
                </div>
            </div>

            // Floating add button
            <button
                class="fixed right-8 bottom-8 flex h-16 w-16 items-center justify-center rounded-full bg-indigo-600 text-3xl text-white shadow-2xl transition hover:scale-110 active:scale-95"
                on:click=move |_| add_open.set(true)
            >
                "+"
            </button>

            <AddBookmarkModal open=add_open board=board />
            <ConfirmDeleteModal board=board error=op_error />
        </div>
    }
}

#[component]
pub(crate) fn RootAuthed(children: ChildrenFn) -> impl IntoView {
    let app_state = expect_context::<AppContext>();
    let is_authenticated = move || app_state.0.api_client.get().is_authenticated();

    // Store children so the view macro sees an `Fn` (not an `FnOnce`).
    let children = StoredValue::new(children);

    view! {
        <Show when=is_authenticated fallback=move || view! { <LoginPage /> }>
            {move || children.with_value(|c| c())}
        </Show>
    }
}

#[component]
pub(crate) fn RootPage() -> impl IntoView {
    view! {
        <RootAuthed>
            <DashboardPage />
        </RootAuthed>
    }
}

//! Presentation pieces for the bookmark board: navbar, list rows (with local
//! drag reorder), add modal, delete confirmation. All bookmark state flows
//! through the `BookmarkBoard` signal owned by the dashboard page.

use crate::api::ApiErrorKind;
use crate::board::{BookmarkBoard, ChangeEvent};
use crate::components::ui::{
    Alert, AlertDescription, Button, ButtonSize, ButtonVariant, Input, Spinner,
};
use crate::state::AppContext;
use icons::{LogOut, Moon, Sun, X};
use leptos::prelude::*;
use leptos::task::spawn_local;
use wasm_bindgen::JsCast;

#[component]
pub(crate) fn Navbar() -> impl IntoView {
    let app_state = expect_context::<AppContext>();

    let on_toggle_theme = move |_| app_state.0.toggle_theme();

    let on_sign_out = move |_| {
        let api_client = app_state.0.api_client.get_untracked();
        spawn_local(async move {
            // Best effort; the local session is cleared regardless.
            let _ = api_client.sign_out().await;
            app_state.0.clear_session();
            let _ = window().location().set_href("/login");
        });
    };

    let is_dark = move || app_state.0.theme.get().is_dark();

    view! {
        <div class="fixed top-6 left-1/2 z-50 flex -translate-x-1/2 items-center gap-6 rounded-full border border-white/20 bg-white/70 px-6 py-3 shadow-xl backdrop-blur-xl dark:border-zinc-700/40 dark:bg-zinc-900/70">
            <span class="font-semibold">"SmartMark"</span>

            <Button
                variant=ButtonVariant::Ghost
                size=ButtonSize::Icon
                attr:title="Toggle theme"
                on:click=on_toggle_theme
            >
                <Show when=is_dark fallback=|| view! { <Moon class="size-4" /> }>
                    <Sun class="size-4" />
                </Show>
            </Button>

            <Button
                variant=ButtonVariant::Ghost
                size=ButtonSize::Icon
                attr:title="Sign out"
                on:click=on_sign_out
            >
                <LogOut class="size-4" />
            </Button>
        </div>
    }
}

/// The reconciled list. Rows are draggable; a drop re-sequences the board in
/// memory only (there is no ordering column to persist to).
#[component]
pub(crate) fn BookmarkList(
    board: RwSignal<BookmarkBoard>,
    on_request_delete: Callback<String>,
) -> impl IntoView {
    view! {
        <Show
            when=move || !board.get().is_empty()
            fallback=|| view! {
                <div class="py-8 text-center text-sm text-zinc-500 dark:text-zinc-400">
                    "No bookmarks yet. Add your first one."
                </div>
            }
        >
            <div class="space-y-4">
                {move || {
                    board
                        .get()
                        .items()
                        .to_vec()
                        .into_iter()
                        .map(|b| {
                            let id_sv = StoredValue::new(b.id.clone());
                            let favicon = format!(
                                "https://www.google.com/s2/favicons?domain={}",
                                urlencoding::encode(&b.url)
                            );
                            let href = b.url.clone();
                            let url_text = b.url.clone();

                            view! {
                                <div
                                    class="flex items-center justify-between rounded-2xl border border-zinc-200 bg-zinc-100 p-6 transition hover:shadow-lg dark:border-zinc-700 dark:bg-zinc-800"
                                    draggable="true"
                                    on:dragstart=move |ev: web_sys::DragEvent| {
                                        if let Some(dt) = ev.data_transfer() {
                                            let _ = dt.set_data("text/plain", &id_sv.get_value());
                                            dt.set_drop_effect("move");
                                        }
                                    }
                                    on:dragover=move |ev: web_sys::DragEvent| {
                                        ev.prevent_default();
                                        if let Some(dt) = ev.data_transfer() {
                                            dt.set_drop_effect("move");
                                        }
                                    }
                                    on:drop=move |ev: web_sys::DragEvent| {
                                        ev.prevent_default();

                                        let dragged_id = ev
                                            .data_transfer()
                                            .and_then(|dt| dt.get_data("text/plain").ok())
                                            .unwrap_or_default();
                                        if dragged_id.trim().is_empty() {
                                            return;
                                        }

                                        let target_id = id_sv.get_value();
                                        if dragged_id == target_id {
                                            return;
                                        }

                                        // Decide before/after by cursor position inside target row.
                                        let insert_after = ev
                                            .current_target()
                                            .and_then(|t| t.dyn_into::<web_sys::Element>().ok())
                                            .map(|el| el.get_bounding_client_rect())
                                            .map(|rect| {
                                                let mid = rect.top() + rect.height() / 2.0;
                                                (ev.client_y() as f64) >= mid
                                            })
                                            .unwrap_or(true);

                                        board.update(|b| {
                                            let Some(from) = b.position_of(&dragged_id) else {
                                                return;
                                            };
                                            let Some(target_pos) = b.position_of(&target_id) else {
                                                return;
                                            };

                                            let mut to =
                                                if insert_after { target_pos + 1 } else { target_pos };
                                            if from < to {
                                                to -= 1;
                                            }
                                            b.reorder(from, to);
                                        });
                                    }
                                >
                                    <div class="flex min-w-0 items-center gap-4">
                                        <div class="cursor-grab text-zinc-400 hover:text-zinc-600 dark:hover:text-zinc-300">
                                            "☰"
                                        </div>

                                        <img src=favicon class="h-6 w-6" alt="" />

                                        <div class="min-w-0">
                                            <div class="truncate font-medium text-zinc-900 dark:text-white">
                                                {b.title}
                                            </div>
                                            <a
                                                href=href
                                                target="_blank"
                                                rel="noopener noreferrer"
                                                class="block truncate text-sm text-indigo-600 hover:underline dark:text-indigo-400"
                                            >
                                                {url_text}
                                            </a>
                                        </div>
                                    </div>

                                    <button
                                        class="shrink-0 text-red-500 transition hover:text-red-600"
                                        on:click=move |_| on_request_delete.run(id_sv.get_value())
                                    >
                                        "Delete"
                                    </button>
                                </div>
                            }
                        })
                        .collect_view()
                }}
            </div>
        </Show>
    }
}

/// Modal form for a new bookmark. On success the created row goes through the
/// board's idempotent Insert, so the feed's own INSERT echo de-duplicates.
#[component]
pub(crate) fn AddBookmarkModal(open: RwSignal<bool>, board: RwSignal<BookmarkBoard>) -> impl IntoView {
    let app_state = expect_context::<AppContext>();

    let title: RwSignal<String> = RwSignal::new(String::new());
    let url: RwSignal<String> = RwSignal::new(String::new());
    let loading: RwSignal<bool> = RwSignal::new(false);
    let error: RwSignal<Option<String>> = RwSignal::new(None);

    let on_submit = move |_| {
        let title_val = title.get_untracked();
        let url_val = url.get_untracked();

        if title_val.trim().is_empty() || url_val.trim().is_empty() {
            error.set(Some("Title and URL are both required".to_string()));
            return;
        }

        let Some(user) = app_state.0.current_user.get_untracked() else {
            return;
        };
        let api_client = app_state.0.api_client.get_untracked();

        loading.set(true);
        error.set(None);

        spawn_local(async move {
            match api_client
                .insert_bookmark(title_val.trim(), url_val.trim(), &user.id)
                .await
            {
                Ok(row) => {
                    board.update(|b| b.apply(ChangeEvent::Insert(row)));
                    title.set(String::new());
                    url.set(String::new());
                    open.set(false);
                }
                Err(e) => {
                    if e.kind == ApiErrorKind::Unauthorized {
                        app_state.0.clear_session();
                        let _ = window().location().set_href("/login");
                    } else {
                        error.set(Some(e.to_string()));
                    }
                }
            }
            loading.set(false);
        });
    };

    view! {
        <Show when=move || open.get() fallback=|| ().into_view()>
            <div class="fixed inset-0 z-50 flex items-center justify-center bg-black/40 px-4 backdrop-blur-sm">
                <div class="relative w-full max-w-md space-y-4 rounded-3xl border border-white/40 bg-white/70 p-8 shadow-2xl backdrop-blur-xl dark:border-zinc-800 dark:bg-zinc-900/70">
                    <button
                        class="absolute top-4 right-4 text-zinc-500 transition hover:text-red-500"
                        on:click=move |_| {
                            error.set(None);
                            open.set(false);
                        }
                    >
                        <X class="size-5" />
                    </button>

                    <h2 class="text-xl font-semibold text-zinc-900 dark:text-white">
                        "Add Bookmark"
                    </h2>

                    <Input placeholder="Title" bind_value=title />
                    <Input r#type="url" placeholder="Enter URL (e.g. https://example.com)" bind_value=url />

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
                        on:click=on_submit
                    >
                        <span class="inline-flex items-center gap-2">
                            <Show when=move || loading.get() fallback=|| ().into_view()>
                                <Spinner />
                            </Show>
                            {move || if loading.get() { "Adding..." } else { "Add Bookmark" }}
                        </span>
                    </Button>
                </div>
            </div>
        </Show>
    }
}

/// Confirmation gate for deletion. Cancel clears the intent with no remote
/// call; Delete issues exactly one remote delete for the pending id and the
/// intent is cleared either way. The row disappears when the feed's Delete
/// event lands, not here.
#[component]
pub(crate) fn ConfirmDeleteModal(
    board: RwSignal<BookmarkBoard>,
    error: RwSignal<Option<String>>,
) -> impl IntoView {
    let app_state = expect_context::<AppContext>();

    let on_cancel = move |_| board.update(|b| b.cancel_delete());

    let on_confirm = move |_| {
        let mut pending = None;
        board.update(|b| pending = b.take_pending_delete());
        let Some(id) = pending else {
            return;
        };

        let api_client = app_state.0.api_client.get_untracked();
        spawn_local(async move {
            if let Err(e) = api_client.delete_bookmark(&id).await {
                if e.kind == ApiErrorKind::Unauthorized {
                    app_state.0.clear_session();
                    let _ = window().location().set_href("/login");
                } else {
                    error.set(Some(e.to_string()));
                }
            }
        });
    };

    view! {
        <Show when=move || board.get().pending_delete().is_some() fallback=|| ().into_view()>
            <div class="fixed inset-0 z-50 flex items-center justify-center bg-black/30 px-4 backdrop-blur-[2px]">
                <div class="w-[320px] max-w-[90vw] overflow-hidden rounded-2xl bg-white/90 shadow-2xl ring-1 ring-black/5 backdrop-blur-xl dark:bg-zinc-800/90 dark:ring-white/10">
                    <div class="flex flex-col items-center p-6 text-center">
                        <h2 class="text-lg font-semibold text-zinc-900 dark:text-white">
                            "Delete Item"
                        </h2>
                        <p class="mt-2 text-[15px] leading-snug text-zinc-500 dark:text-zinc-400">
                            "Are you sure? This action cannot be undone."
                        </p>
                    </div>

                    <div class="grid grid-cols-2 divide-x divide-zinc-900/10 border-t border-zinc-900/10 bg-zinc-50/50 dark:divide-white/10 dark:border-white/10 dark:bg-black/20">
                        <button
                            class="h-12 w-full text-[17px] font-medium text-blue-600 transition-colors hover:bg-zinc-100 dark:text-blue-400 dark:hover:bg-white/5"
                            on:click=on_cancel
                        >
                            "Cancel"
                        </button>
                        <button
                            class="h-12 w-full text-[17px] font-semibold text-red-600 transition-colors hover:bg-red-50 dark:text-red-500 dark:hover:bg-red-900/20"
                            on:click=on_confirm
                        >
                            "Delete"
                        </button>
                    </div>
                </div>
            </div>
        </Show>
    }
}

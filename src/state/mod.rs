use crate::api::ApiClient;
use crate::models::{SessionUser, Theme};
use crate::storage::{apply_theme_to_document, load_theme, load_user_from_storage, save_theme};
use leptos::prelude::*;

/// Process-wide reactive state, provided as explicit context at the app root.
/// Session and theme live here rather than in ambient globals, so their
/// lifecycle is tied to the component tree.
///
/// `Copy` (signals are arena handles), so event handlers stay `Copy` and can
/// live inside `<Show>` children.
#[derive(Clone, Copy)]
pub(crate) struct AppState {
    pub api_client: RwSignal<ApiClient>,
    pub current_user: RwSignal<Option<SessionUser>>,
    pub theme: RwSignal<Theme>,
}

impl AppState {
    pub fn new() -> Self {
        let stored_client = ApiClient::load_from_storage();
        let stored_user = load_user_from_storage();
        let theme = load_theme();
        apply_theme_to_document(theme);

        Self {
            api_client: RwSignal::new(stored_client),
            current_user: RwSignal::new(stored_user),
            theme: RwSignal::new(theme),
        }
    }

    pub fn toggle_theme(&self) {
        let next = self.theme.get_untracked().toggled();
        self.theme.set(next);
        save_theme(next);
        apply_theme_to_document(next);
    }

    /// Drop the local session (token + stored user) and reset signals.
    pub fn clear_session(&self) {
        let mut client = self.api_client.get_untracked();
        client.logout();
        self.api_client.set(client);
        self.current_user.set(None);
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Clone, Copy)]
pub(crate) struct AppContext(pub AppState);

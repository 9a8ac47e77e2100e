use crate::models::{SessionUser, Theme};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

pub(crate) const TOKEN_KEY: &str = "smartmark_token";
pub(crate) const USER_KEY: &str = "smartmark_user";
pub(crate) const THEME_KEY: &str = "smartmark_theme";

fn local_storage() -> Option<web_sys::Storage> {
    web_sys::window().and_then(|w| w.local_storage().ok().flatten())
}

pub(crate) fn save_user_to_storage(user: &SessionUser) {
    save_json_to_storage(USER_KEY, user);
}

pub(crate) fn load_user_from_storage() -> Option<SessionUser> {
    load_json_from_storage(USER_KEY)
}

pub(crate) fn load_json_from_storage<T: for<'de> Deserialize<'de>>(key: &str) -> Option<T> {
    let json = local_storage()?.get_item(key).ok().flatten()?;
    serde_json::from_str(&json).ok()
}

pub(crate) fn save_json_to_storage<T: Serialize>(key: &str, value: &T) {
    if let Ok(json) = serde_json::to_string(value) {
        if let Some(storage) = local_storage() {
            let _ = storage.set_item(key, &json);
        }
    }
}

pub(crate) fn save_theme(theme: Theme) {
    if let Some(storage) = local_storage() {
        let _ = storage.set_item(THEME_KEY, &theme.to_string());
    }
}

/// Stored preference wins; otherwise fall back to the OS color scheme.
pub(crate) fn load_theme() -> Theme {
    if let Some(storage) = local_storage() {
        if let Ok(Some(v)) = storage.get_item(THEME_KEY) {
            if let Ok(theme) = Theme::from_str(&v) {
                return theme;
            }
        }
    }

    let prefers_dark = web_sys::window()
        .and_then(|w| w.match_media("(prefers-color-scheme: dark)").ok().flatten())
        .map(|m| m.matches())
        .unwrap_or(false);

    if prefers_dark {
        Theme::Dark
    } else {
        Theme::Light
    }
}

/// Sync the `dark` class on `<html>` with the given theme.
pub(crate) fn apply_theme_to_document(theme: Theme) {
    let Some(root) = web_sys::window()
        .and_then(|w| w.document())
        .and_then(|d| d.document_element())
    else {
        return;
    };

    let classes = root.class_list();
    if theme.is_dark() {
        let _ = classes.add_1("dark");
    } else {
        let _ = classes.remove_1("dark");
    }
}

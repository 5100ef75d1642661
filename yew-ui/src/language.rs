// SPDX-License-Identifier: MIT OR Apache-2.0

//! Persistent language preference.
//!
//! Unlike the tab-scoped session credentials, the language choice survives
//! the tab: it lives in `localStorage` under a single key.

const LANGUAGE_KEY: &str = "language";
const DEFAULT_LANGUAGE: &str = "en";

fn storage() -> Option<web_sys::Storage> {
    gloo_utils::window().local_storage().ok().flatten()
}

/// The saved language code, defaulting to English.
pub fn current_language() -> String {
    storage()
        .and_then(|s| s.get_item(LANGUAGE_KEY).ok().flatten())
        .unwrap_or_else(|| DEFAULT_LANGUAGE.to_string())
}

/// Persist a language choice across sessions and tabs.
pub fn set_language(code: &str) {
    if let Some(storage) = storage() {
        let _ = storage.set_item(LANGUAGE_KEY, code);
    }
}

/*
 * Copyright 2025 Security Union LLC
 *
 * Licensed under either of
 *
 * * Apache License, Version 2.0
 *   (http://www.apache.org/licenses/LICENSE-2.0)
 * * MIT license
 *   (http://opensource.org/licenses/MIT)
 *
 * at your option.
 */

//! Tab-scoped session credential storage.
//!
//! Each browser tab holds its own `(access_token, session_id)` pair; the
//! matching refresh token lives in an HttpOnly cookie scoped by that session
//! id and is never visible to this code. Nothing here synchronizes across
//! tabs — every tab authenticates independently.

use std::cell::RefCell;

use crate::constants::{ACCESS_TOKEN_KEY, SESSION_ID_KEY};

/// The client-held credential pair created by a successful login.
///
/// The pair is indivisible: a store that can only produce one half reports
/// itself as unauthenticated.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionCredentials {
    pub access_token: String,
    pub session_id: String,
}

/// Where the current tab keeps its credential pair.
///
/// Implementations are not thread-safe by contract; all access happens on
/// the single UI thread.
pub trait SessionStore {
    /// The stored access token, if any.
    fn access_token(&self) -> Option<String>;

    /// The stored session id, if any.
    fn session_id(&self) -> Option<String>;

    /// Store a freshly issued credential pair, replacing whatever was there.
    fn store(&self, credentials: &SessionCredentials);

    /// Replace only the access token after a successful refresh.
    fn update_access_token(&self, access_token: &str);

    /// Delete both credentials. Idempotent.
    fn clear(&self);

    /// The credential pair, or `None` unless **both** halves are present.
    fn credentials(&self) -> Option<SessionCredentials> {
        match (self.access_token(), self.session_id()) {
            (Some(access_token), Some(session_id)) => Some(SessionCredentials {
                access_token,
                session_id,
            }),
            _ => None,
        }
    }
}

/// In-memory store for native hosts and tests.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    access_token: RefCell<Option<String>>,
    session_id: RefCell<Option<String>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for MemorySessionStore {
    fn access_token(&self) -> Option<String> {
        self.access_token.borrow().clone()
    }

    fn session_id(&self) -> Option<String> {
        self.session_id.borrow().clone()
    }

    fn store(&self, credentials: &SessionCredentials) {
        *self.access_token.borrow_mut() = Some(credentials.access_token.clone());
        *self.session_id.borrow_mut() = Some(credentials.session_id.clone());
    }

    fn update_access_token(&self, access_token: &str) {
        *self.access_token.borrow_mut() = Some(access_token.to_string());
    }

    fn clear(&self) {
        *self.access_token.borrow_mut() = None;
        *self.session_id.borrow_mut() = None;
    }
}

/// Browser store backed by `window.sessionStorage`, which the browser scopes
/// to the tab — exactly the isolation the per-tab session model needs.
#[derive(Debug, Default)]
pub struct WebSessionStore;

impl WebSessionStore {
    pub fn new() -> Self {
        Self
    }

    fn storage() -> Option<web_sys::Storage> {
        gloo_utils::window().session_storage().ok().flatten()
    }
}

impl SessionStore for WebSessionStore {
    fn access_token(&self) -> Option<String> {
        Self::storage()?.get_item(ACCESS_TOKEN_KEY).ok().flatten()
    }

    fn session_id(&self) -> Option<String> {
        Self::storage()?.get_item(SESSION_ID_KEY).ok().flatten()
    }

    fn store(&self, credentials: &SessionCredentials) {
        if let Some(storage) = Self::storage() {
            let _ = storage.set_item(ACCESS_TOKEN_KEY, &credentials.access_token);
            let _ = storage.set_item(SESSION_ID_KEY, &credentials.session_id);
        }
    }

    fn update_access_token(&self, access_token: &str) {
        if let Some(storage) = Self::storage() {
            let _ = storage.set_item(ACCESS_TOKEN_KEY, access_token);
        }
    }

    fn clear(&self) {
        if let Some(storage) = Self::storage() {
            let _ = storage.remove_item(ACCESS_TOKEN_KEY);
            let _ = storage.remove_item(SESSION_ID_KEY);
        }
    }
}

/// Invoked when the session is unrecoverable (refresh rejected or no session
/// id to refresh with). The only user-visible behavior is an abrupt return
/// to the login entry point.
pub trait LogoutHandler {
    fn on_forced_logout(&self);
}

/// Browser handler: hard-navigate to the login entry point.
#[derive(Debug, Default)]
pub struct RedirectToLogin;

impl LogoutHandler for RedirectToLogin {
    fn on_forced_logout(&self) {
        let _ = gloo_utils::window().location().set_href("/");
    }
}

/// No-op handler for native hosts; tests install a recording handler.
#[derive(Debug, Default)]
pub struct NoopLogout;

impl LogoutHandler for NoopLogout {
    fn on_forced_logout(&self) {}
}

#[cfg(all(test, target_arch = "wasm32"))]
mod wasm_tests {
    use super::*;
    use wasm_bindgen_test::wasm_bindgen_test;

    wasm_bindgen_test::wasm_bindgen_test_configure!(run_in_browser);

    #[wasm_bindgen_test]
    fn web_store_round_trips_the_pair() {
        let store = WebSessionStore::new();
        store.clear();
        store.store(&SessionCredentials {
            access_token: "tok".to_string(),
            session_id: "sid".to_string(),
        });
        assert_eq!(store.credentials().unwrap().session_id, "sid");
        store.clear();
        assert!(store.credentials().is_none());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn credentials_require_both_halves() {
        let store = MemorySessionStore::new();
        assert!(store.credentials().is_none());

        store.update_access_token("tok");
        // Only one half present: still unauthenticated.
        assert!(store.credentials().is_none());

        store.store(&SessionCredentials {
            access_token: "tok".to_string(),
            session_id: "sid".to_string(),
        });
        let creds = store.credentials().unwrap();
        assert_eq!(creds.access_token, "tok");
        assert_eq!(creds.session_id, "sid");
    }

    #[test]
    fn clear_removes_both_halves() {
        let store = MemorySessionStore::new();
        store.store(&SessionCredentials {
            access_token: "tok".to_string(),
            session_id: "sid".to_string(),
        });
        store.clear();
        assert!(store.access_token().is_none());
        assert!(store.session_id().is_none());
        // Idempotent.
        store.clear();
        assert!(store.credentials().is_none());
    }

    #[test]
    fn refresh_replaces_only_the_access_token() {
        let store = MemorySessionStore::new();
        store.store(&SessionCredentials {
            access_token: "old".to_string(),
            session_id: "sid".to_string(),
        });
        store.update_access_token("new");
        let creds = store.credentials().unwrap();
        assert_eq!(creds.access_token, "new");
        assert_eq!(creds.session_id, "sid");
    }
}

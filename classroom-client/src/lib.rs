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

//! This crate provides a client-side (browser) interface to the classroom
//! LMS: the access-token lifecycle for its REST backend and the camera-backed
//! face-attendance capture loop against the recognition service.
//!
//! This crate intends to make no assumptions about the UI or the HTML of the
//! client app. The only DOM data the capture side needs is the ID of the
//! `HtmlVideoElement` showing the camera preview.
//!
//! # Outline of usage
//!
//! ## Client creation:
//! ```no_run
//! # use std::rc::Rc;
//! # use classroom_client::{ApiClient, MemorySessionStore};
//! let store = Rc::new(MemorySessionStore::new());
//! let client = ApiClient::new("http://localhost:8000/api", "http://localhost:5000", store);
//! ```
//!
//! Every backend call goes out with `Authorization: Bearer <token>` and the
//! tab's `X-Session-ID` header. A 401 triggers exactly one refresh (shared
//! across however many requests failed at once) and one replay of each failed
//! request; an unrecoverable refresh clears the tab's credentials and returns
//! the user to the login entry point.
//!
//! ## Attendance capture:
//! ```ignore
//! let engine = AttendanceEngine::new(options); // callbacks + injected I/O
//! engine.camera_ready();
//! engine.start();   // polls every 2s, up to 20 attempts
//! engine.stop();
//! ```

pub mod api;
pub mod attendance;
pub mod constants;
pub mod error;
pub mod platform;
pub mod refresh;
pub mod session;

pub use attendance::{
    AttendanceEngine, AttendanceEngineOptions, AttendanceSuccess, CameraDriver, CaptureConfig,
    CaptureFailure, CaptureState, CaptureStatus, FrameSource,
};
pub use error::ApiError;
pub use refresh::RefreshCoordinator;
pub use session::{
    LogoutHandler, MemorySessionStore, NoopLogout, RedirectToLogin, SessionCredentials,
    SessionStore, WebSessionStore,
};

use std::rc::Rc;

use log::{debug, warn};
use reqwest::{Client, Method};
use serde_json::Value;

use crate::constants::{REFRESH_PATH, SESSION_ID_HEADER};
use crate::refresh::RefreshCoordinator as Coordinator;

/// A typed REST client for the LMS backend and the face-recognition service.
///
/// Cloning is cheap and clones share the session store and the refresh
/// coordinator, so concurrent requests from different clones still perform at
/// most one refresh between them.
#[derive(Clone)]
pub struct ApiClient {
    base_url: String,
    face_url: String,
    http: Client,
    store: Rc<dyn SessionStore>,
    refresh: Coordinator,
    logout_handler: Rc<dyn LogoutHandler>,
}

impl ApiClient {
    /// Create a new client.
    ///
    /// # Arguments
    ///
    /// * `base_url` - LMS backend, e.g. `"http://localhost:8000/api"`
    /// * `face_url` - face-recognition service, e.g. `"http://localhost:5000"`
    /// * `store` - where this tab keeps its credential pair
    pub fn new(base_url: &str, face_url: &str, store: Rc<dyn SessionStore>) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            face_url: face_url.trim_end_matches('/').to_string(),
            http: Client::new(),
            store,
            refresh: Coordinator::new(),
            logout_handler: default_logout_handler(),
        }
    }

    /// Replace the forced-logout hook (the browser default hard-navigates to
    /// the login entry point).
    pub fn with_logout_handler(mut self, handler: Rc<dyn LogoutHandler>) -> Self {
        self.logout_handler = handler;
        self
    }

    /// The session store backing this client.
    pub fn store(&self) -> &Rc<dyn SessionStore> {
        &self.store
    }

    /// Advisory check of the stored access token's `exp` claim against the
    /// current time. Never gates requests — the backend's 401 is the
    /// authoritative signal.
    pub fn access_token_expired(&self) -> bool {
        classroom_types::token::is_expired(
            self.store.access_token().as_deref(),
            platform::now_secs(),
        )
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub(crate) fn face_endpoint(&self, path: &str) -> String {
        format!("{}{}", self.face_url, path)
    }

    pub(crate) fn http(&self) -> &Client {
        &self.http
    }

    /// Build one attempt at a backend request, decorated with whatever
    /// credentials the tab currently holds. Missing credentials are not an
    /// error here — the request goes out bare and the backend decides.
    fn build_request(
        &self,
        method: &Method,
        path: &str,
        body: Option<&Value>,
        token_override: Option<&str>,
    ) -> reqwest::RequestBuilder {
        let mut builder = self.http.request(method.clone(), self.url(path));
        builder = with_cookies(builder);

        let token = token_override
            .map(str::to_string)
            .or_else(|| self.store.access_token());
        if let Some(token) = token {
            builder = builder.header(reqwest::header::AUTHORIZATION, format!("Bearer {token}"));
        }
        if let Some(session_id) = self.store.session_id() {
            builder = builder.header(SESSION_ID_HEADER, session_id);
        }
        if let Some(body) = body {
            builder = builder.json(body);
        }
        builder
    }

    /// Send a backend request, transparently recovering from access-token
    /// expiry exactly once.
    ///
    /// On a 401 the request joins the (single-flight) refresh and is replayed
    /// with the new token. A 401 on the replay is surfaced as
    /// [`ApiError::NotAuthenticated`] — a logical request is never retried
    /// twice. The refresh endpoint itself never goes through here, so its
    /// 401 cannot re-enter this path.
    pub(crate) async fn send_with_refresh(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<reqwest::Response, ApiError> {
        let response = self
            .build_request(&method, path, body.as_ref(), None)
            .send()
            .await?;
        if response.status().as_u16() != 401 {
            return Ok(response);
        }

        debug!("401 on {method} {path}, entering refresh");
        let token = self.refresh_access_token().await?;

        let retried = self
            .build_request(&method, path, body.as_ref(), Some(&token))
            .send()
            .await?;
        if retried.status().as_u16() == 401 {
            warn!("{method} {path} still unauthorized after refresh");
            return Err(ApiError::NotAuthenticated);
        }
        Ok(retried)
    }

    /// Send a backend POST with no credential decoration and no 401
    /// recovery. Only pre-authentication calls (login) use this.
    pub(crate) async fn send_unauthenticated<B: serde::Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<reqwest::Response, ApiError> {
        let builder = self.http.post(self.url(path)).json(body);
        Ok(with_cookies(builder).send().await?)
    }

    /// Obtain a fresh access token through the coordinator. The closure runs
    /// only in the single leader; its terminal failure handling (clear
    /// credentials, force navigation to login) therefore also runs only once
    /// no matter how many requests piled up.
    async fn refresh_access_token(&self) -> Result<String, ApiError> {
        let client = self.clone();
        self.refresh
            .run(move || async move {
                match client.call_refresh_endpoint().await {
                    Ok(token) => {
                        client.store.update_access_token(&token);
                        Ok(token)
                    }
                    Err(err) => {
                        warn!("token refresh failed: {err}");
                        client.store.clear();
                        client.logout_handler.on_forced_logout();
                        Err(err)
                    }
                }
            })
            .await
    }

    /// One call to `POST /token/refresh/`. Authenticates by session id; the
    /// actual refresh secret rides in the `refresh_token_{session_id}` cookie
    /// the browser attaches on its own. Every failure mode is terminal.
    async fn call_refresh_endpoint(&self) -> Result<String, ApiError> {
        let Some(session_id) = self.store.session_id() else {
            return Err(ApiError::SessionMissing);
        };

        let builder = self
            .http
            .post(self.url(REFRESH_PATH))
            .header(SESSION_ID_HEADER, &session_id)
            .json(&serde_json::json!({}));
        let response = with_cookies(builder)
            .send()
            .await
            .map_err(|_| ApiError::RefreshFailed)?;

        if !response.status().is_success() {
            return Err(ApiError::RefreshFailed);
        }

        let refreshed: classroom_types::RefreshResponse =
            response.json().await.map_err(|_| ApiError::RefreshFailed)?;
        debug!("access token refreshed for session {session_id}");
        Ok(refreshed.access)
    }
}

/// Include cookies on WASM so the same-site refresh-token cookie is
/// delivered; native `reqwest` sends nothing extra.
fn with_cookies(builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
    #[cfg(target_arch = "wasm32")]
    {
        builder.fetch_credentials_include()
    }
    #[cfg(not(target_arch = "wasm32"))]
    {
        builder
    }
}

/// Parse a backend response into `T`, mapping non-2xx statuses to
/// [`ApiError`]. 401 never reaches here — [`ApiClient::send_with_refresh`]
/// consumes it first.
pub(crate) async fn parse_json_response<T: serde::de::DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T, ApiError> {
    let status = response.status().as_u16();
    match status {
        200..=299 => Ok(response.json().await?),
        401 => Err(ApiError::NotAuthenticated),
        400..=499 => {
            let text = response.text().await.unwrap_or_default();
            Err(ApiError::Validation(extract_error_message(&text)))
        }
        _ => {
            let body = response.text().await.unwrap_or_default();
            Err(ApiError::Server { status, body })
        }
    }
}

/// Pull the human-readable message out of a structured 4xx body, falling
/// back to the raw text.
fn extract_error_message(body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<Value>(body) {
        for key in ["error", "detail", "message"] {
            if let Some(message) = value.get(key).and_then(Value::as_str) {
                return message.to_string();
            }
        }
    }
    body.to_string()
}

fn default_logout_handler() -> Rc<dyn LogoutHandler> {
    #[cfg(target_arch = "wasm32")]
    {
        Rc::new(RedirectToLogin)
    }
    #[cfg(not(target_arch = "wasm32"))]
    {
        Rc::new(NoopLogout)
    }
}

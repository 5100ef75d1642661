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

//! Authentication endpoints: `/login/`, `/logout/`.

use classroom_types::requests::{LoginRequest, LogoutRequest};
use classroom_types::LoginResponse;
use log::{info, warn};
use reqwest::Method;

use crate::error::ApiError;
use crate::session::SessionCredentials;
use crate::{parse_json_response, ApiClient};

impl ApiClient {
    /// Log in and store the resulting credential pair in this tab.
    ///
    /// Calls `POST /login/`. The response's refresh token never reaches this
    /// code — the backend sets it as an HttpOnly cookie scoped to the new
    /// session id.
    pub async fn login(
        &self,
        email: &str,
        password: &str,
        remember_me: bool,
    ) -> Result<LoginResponse, ApiError> {
        let request = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
            remember_me,
        };

        // Deliberately bypasses the 401/refresh machinery: a 401 here means
        // wrong credentials, not an expired token.
        let response = self.send_unauthenticated("/login/", &request).await?;
        if response.status().as_u16() == 401 {
            return Err(ApiError::Validation("Invalid credentials".to_string()));
        }

        let login: LoginResponse = parse_json_response(response).await?;
        self.store().store(&SessionCredentials {
            access_token: login.access.clone(),
            session_id: login.session_id.clone(),
        });
        info!(
            "user {} ({}) logged in, session {}",
            login.user.username, login.user.role, login.session_id
        );
        Ok(login)
    }

    /// Log out: tell the backend to close this session, then drop the tab's
    /// credentials no matter what the backend said.
    ///
    /// Calls `POST /logout/` with the session id so the backend can close
    /// the login-history row and delete the per-session refresh cookie.
    pub async fn logout(&self) -> Result<(), ApiError> {
        let result = match self.store().session_id() {
            Some(session_id) => {
                let body = serde_json::to_value(LogoutRequest { session_id })
                    .map_err(|e| ApiError::Validation(e.to_string()))?;
                self.send_with_refresh(Method::POST, "/logout/", Some(body))
                    .await
                    .map(|_| ())
            }
            None => Ok(()),
        };

        self.store().clear();
        if let Err(ref err) = result {
            warn!("logout request failed, credentials cleared anyway: {err}");
        }
        result
    }
}

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

//! Error types for the classroom API client.

use thiserror::Error;

/// Errors returned by [`ApiClient`](crate::ApiClient) methods.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The backend rejected the request with 401 and the single allowed
    /// retry was already spent.
    #[error("Not authenticated. Please log in.")]
    NotAuthenticated,

    /// The access token is expired according to its own `exp` claim.
    /// Advisory only — the client never refuses to send a request because
    /// of it; the backend's 401 stays authoritative.
    #[error("Access token is expired.")]
    TokenExpired,

    /// The refresh endpoint rejected the refresh or could not be reached.
    /// Terminal: credentials are cleared and the user is sent back to login.
    #[error("Session refresh failed. Please log in again.")]
    RefreshFailed,

    /// A refresh was needed but no session id is stored in this tab.
    /// Terminal, same consequence as [`ApiError::RefreshFailed`].
    #[error("No session found for this tab.")]
    SessionMissing,

    /// The server reported a 4xx with a human-readable message; surfaced
    /// verbatim to the user.
    #[error("{0}")]
    Validation(String),

    /// A server error with status code and body.
    #[error("Server error ({status}): {body}")]
    Server { status: u16, body: String },

    /// A network or transport error.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
}

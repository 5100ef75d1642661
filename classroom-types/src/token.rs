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

//! Access token (JWT) claims and advisory expiry checking.
//!
//! The backend signs the access token; the client never verifies the
//! signature — it only peeks at the payload to report *advisory* expiry for
//! diagnostics and UI. The authoritative signal remains the backend's 401.

use serde::{Deserialize, Serialize};

/// Safety margin applied when checking expiry: a token within 60 seconds of
/// its `exp` claim is already reported as expired, so a request started now
/// is unlikely to outlive it.
pub const EXPIRY_MARGIN_SECS: i64 = 60;

/// JWT payload of an access token issued by `POST /login/`.
///
/// Only the claims the client cares about are modeled; unknown claims are
/// ignored during decoding.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AccessTokenClaims {
    /// Expiration timestamp (Unix seconds).
    pub exp: i64,

    #[serde(default)]
    pub user_id: Option<i64>,

    #[serde(default)]
    pub role: Option<String>,
}

/// Decode the claims from an access token **without** signature verification.
///
/// Returns `None` when the token is not a three-segment JWT, the payload is
/// not valid base64url, or the JSON does not carry an `exp` claim.
pub fn decode_unverified(token: &str) -> Option<AccessTokenClaims> {
    use base64::engine::general_purpose::URL_SAFE_NO_PAD;
    use base64::Engine;

    let mut parts = token.split('.');
    let payload_b64 = match (parts.next(), parts.next(), parts.next(), parts.next()) {
        (Some(_), Some(payload), Some(_), None) => payload,
        _ => return None,
    };

    let payload = URL_SAFE_NO_PAD.decode(payload_b64).ok()?;
    serde_json::from_slice(&payload).ok()
}

/// Advisory expiry check: `true` when the token is absent, malformed, or
/// within [`EXPIRY_MARGIN_SECS`] of its `exp` claim at `now_secs`.
pub fn is_expired(token: Option<&str>, now_secs: i64) -> bool {
    let Some(token) = token else {
        return true;
    };
    match decode_unverified(token) {
        Some(claims) => claims.exp < now_secs + EXPIRY_MARGIN_SECS,
        None => true,
    }
}

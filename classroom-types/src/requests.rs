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

//! Request types for the LMS backend and face-recognition service.
//!
//! These types define the shape of request bodies. They are serialized by the
//! client; the backend and the recognition service deserialize them.

use serde::{Deserialize, Serialize};

/// Request body for `POST /login/`.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,

    /// Extends the refresh-token cookie lifetime when set.
    #[serde(default)]
    pub remember_me: bool,
}

/// Request body for `POST /logout/`.
///
/// The session id tells the backend which login-history row to close and
/// which per-session refresh cookie to delete.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct LogoutRequest {
    pub session_id: String,
}

/// Request body for `POST /api/recognize` on the face-recognition service.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct RecognizeRequest {
    /// Base64-encoded JPEG frame, without the `data:image/jpeg;base64,` prefix.
    pub image: String,

    /// The class session being attended.
    pub session_id: i64,

    /// Similarity cutoff; a face farther than this distance is not a match.
    pub threshold: f64,
}

/// Request body for `POST /attendances/mark-with-face/`.
///
/// Sent after a successful recognition, bearer-authenticated. The confidence
/// and distance are forwarded verbatim from the recognition result so the
/// backend can store them on the attendance record.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct MarkAttendanceRequest {
    pub session_id: i64,
    pub user_id: i64,
    pub confidence: f64,
    pub distance: f64,
}

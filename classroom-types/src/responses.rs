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

//! Response types for the LMS backend and face-recognition service.

use serde::{Deserialize, Serialize};

/// The authenticated user, as returned by `POST /login/`.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct UserSummary {
    pub id: i64,
    pub username: String,
    pub email: String,
    /// `"admin"`, `"lecturer"` or `"student"`.
    pub role: String,
}

/// Response payload for `POST /login/`.
///
/// The refresh token never appears here — it travels as an HttpOnly cookie
/// named `refresh_token_{session_id}` set by the backend on this response.
///
/// # Example payload
///
/// ```json
/// {
///   "access": "eyJhbGciOi...",
///   "session_id": "8d2f1c9e-4b7a-4f10-9c3e-0a1b2c3d4e5f",
///   "user": { "id": 42, "username": "alice", "email": "alice@uni.edu", "role": "student" },
///   "expires_in": 2700
/// }
/// ```
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct LoginResponse {
    /// Short-lived bearer token (JWT).
    pub access: String,

    /// Correlates this tab with its server-side refresh-token cookie.
    pub session_id: String,

    pub user: UserSummary,

    /// Access-token lifetime in seconds.
    #[serde(default)]
    pub expires_in: Option<i64>,
}

/// Response payload for `POST /token/refresh/`.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct RefreshResponse {
    /// The replacement access token.
    pub access: String,
}

/// Response payload for `POST /api/recognize` on the face-recognition service.
///
/// The service answers `{ "success": false, "error": ... }` on malformed input
/// or internal failure, and `{ "success": true, "recognized": false, ... }`
/// when no face in the frame matched. On a match, `user_id`, `confidence`,
/// `distance` and `is_real` are all present.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct RecognizeResponse {
    pub success: bool,

    #[serde(default)]
    pub recognized: bool,

    #[serde(default)]
    pub user_id: Option<i64>,

    /// Match confidence, 0–100.
    #[serde(default)]
    pub confidence: Option<f64>,

    /// Embedding distance to the best match; lower is closer.
    #[serde(default)]
    pub distance: Option<f64>,

    /// Liveness verdict. `false` means the frame looks like a photo or replay.
    #[serde(default)]
    pub is_real: Option<bool>,

    #[serde(default)]
    pub liveness_confidence: Option<f64>,

    #[serde(default)]
    pub error: Option<String>,
}

impl RecognizeResponse {
    /// Whether the service positively matched a live or spoofed face.
    pub fn is_match(&self) -> bool {
        self.success && self.recognized
    }

    /// Whether the liveness check rejected the frame. Only meaningful on a match.
    pub fn liveness_failed(&self) -> bool {
        self.is_real == Some(false)
    }
}

/// Response payload for `POST /attendances/mark-with-face/`.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct MarkAttendanceResponse {
    pub success: bool,

    #[serde(default)]
    pub user: Option<UserSummary>,

    /// RFC 3339 timestamp at which the attendance was recorded.
    #[serde(default)]
    pub joined_time: Option<String>,

    #[serde(default)]
    pub error: Option<String>,
}

/// A class, as listed on the dashboards.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ClassSummary {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub lecturer: UserSummary,
    #[serde(default)]
    pub student_count: Option<i64>,
}

/// A class session, as shown on the session detail page.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SessionDetail {
    pub id: i64,
    pub class_id: i64,
    pub title: String,
    pub start_time: String,
    pub end_time: String,
    #[serde(default)]
    pub is_active: bool,
}

/// A server-owned attendance record; the client creates it via
/// [`MarkAttendanceRequest`](crate::requests::MarkAttendanceRequest) and
/// otherwise only observes it.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AttendanceRecord {
    pub id: i64,
    pub session_id: i64,
    pub user: UserSummary,
    pub joined_time: String,
    #[serde(default)]
    pub confidence: Option<f64>,
    #[serde(default)]
    pub distance: Option<f64>,
    #[serde(default)]
    pub is_verified: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recognize_response_parses_no_match_shape() {
        let json = r#"{ "success": true, "recognized": false, "error": "No face detected" }"#;
        let resp: RecognizeResponse = serde_json::from_str(json).unwrap();
        assert!(!resp.is_match());
        assert!(!resp.liveness_failed());
        assert_eq!(resp.error.as_deref(), Some("No face detected"));
    }

    #[test]
    fn recognize_response_parses_match_shape() {
        let json = r#"{
            "success": true, "recognized": true, "user_id": 42,
            "confidence": 91.2, "distance": 0.18, "is_real": true,
            "liveness_confidence": 88.5
        }"#;
        let resp: RecognizeResponse = serde_json::from_str(json).unwrap();
        assert!(resp.is_match());
        assert!(!resp.liveness_failed());
        assert_eq!(resp.user_id, Some(42));
        assert_eq!(resp.confidence, Some(91.2));
    }

    #[test]
    fn recognize_response_parses_spoof_shape() {
        let json = r#"{
            "success": true, "recognized": true, "is_real": false,
            "liveness_confidence": 31.0, "error": "Fake face detected"
        }"#;
        let resp: RecognizeResponse = serde_json::from_str(json).unwrap();
        assert!(resp.liveness_failed());
    }

    #[test]
    fn recognize_response_parses_service_failure_shape() {
        let json = r#"{ "success": false, "error": "boom" }"#;
        let resp: RecognizeResponse = serde_json::from_str(json).unwrap();
        assert!(!resp.is_match());
    }
}

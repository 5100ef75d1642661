// SPDX-License-Identifier: MIT OR Apache-2.0

//! Compile-time configuration.
//!
//! Service URLs are read at compile time; restart the build watcher after
//! changing them.

/// LMS backend base URL, including the `/api` prefix.
pub fn api_base_url() -> String {
    option_env!("API_BASE_URL")
        .unwrap_or("http://localhost:8000/api")
        .to_string()
}

/// Face-recognition service base URL.
pub fn face_api_url() -> String {
    option_env!("FACE_API_URL")
        .unwrap_or("http://localhost:5000")
        .to_string()
}

/// DOM id of the attendance camera preview element.
pub const ATTENDANCE_VIDEO_ELEMENT_ID: &str = "face-attendance-video";

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

/// Header carrying the tab's session id on every backend request.
pub const SESSION_ID_HEADER: &str = "X-Session-ID";

/// Tab-scoped storage key for the access token.
pub const ACCESS_TOKEN_KEY: &str = "access_token";

/// Tab-scoped storage key for the session id.
pub const SESSION_ID_KEY: &str = "session_id";

/// Path of the token refresh endpoint on the backend.
pub const REFRESH_PATH: &str = "/token/refresh/";

/// Polling period of the attendance capture loop.
pub const CAPTURE_INTERVAL_MS: u32 = 2000;

/// Polling ticks before the capture loop gives up.
pub const MAX_CAPTURE_ATTEMPTS: u32 = 20;

/// Similarity cutoff submitted to the recognition service.
pub const RECOGNITION_THRESHOLD: f64 = 0.30;

/// Delay before the camera is released after a successful capture, so the
/// user sees the success state before the preview goes dark.
pub const CAMERA_RELEASE_DELAY_MS: u32 = 3000;

/// JPEG quality used when encoding captured frames for transport.
pub const FRAME_JPEG_QUALITY: f64 = 0.8;

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

//! Shared API types for the classroom LMS backend and face-recognition service.
//!
//! This crate defines the wire contract between the browser client and its two
//! external collaborators: the LMS REST backend (login, refresh, attendance,
//! class/session reads) and the face-recognition service (frame recognition).
//! It is intentionally framework-agnostic — no yew, no reqwest, no browser types.

pub mod requests;
pub mod responses;
pub mod token;

pub use responses::{LoginResponse, MarkAttendanceResponse, RecognizeResponse, RefreshResponse};
pub use token::AccessTokenClaims;

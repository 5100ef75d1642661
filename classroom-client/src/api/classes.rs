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

//! Class and session read endpoints backing the attendance screens.

use classroom_types::responses::{AttendanceRecord, ClassSummary, SessionDetail};
use reqwest::Method;

use crate::error::ApiError;
use crate::{parse_json_response, ApiClient};

impl ApiClient {
    /// List the classes visible to the current user.
    ///
    /// Calls `GET /classes/`.
    pub async fn list_classes(&self) -> Result<Vec<ClassSummary>, ApiError> {
        let response = self
            .send_with_refresh(Method::GET, "/classes/", None)
            .await?;
        parse_json_response(response).await
    }

    /// Get one class.
    ///
    /// Calls `GET /classes/{class_id}/`.
    pub async fn get_class(&self, class_id: i64) -> Result<ClassSummary, ApiError> {
        let path = format!("/classes/{class_id}/");
        let response = self.send_with_refresh(Method::GET, &path, None).await?;
        parse_json_response(response).await
    }

    /// Get one class session.
    ///
    /// Calls `GET /sessions/{session_id}/`.
    pub async fn get_session(&self, session_id: i64) -> Result<SessionDetail, ApiError> {
        let path = format!("/sessions/{session_id}/");
        let response = self.send_with_refresh(Method::GET, &path, None).await?;
        parse_json_response(response).await
    }

    /// List who has already been marked present in a session.
    ///
    /// Calls `GET /sessions/{session_id}/attendances/`.
    pub async fn list_session_attendance(
        &self,
        session_id: i64,
    ) -> Result<Vec<AttendanceRecord>, ApiError> {
        let path = format!("/sessions/{session_id}/attendances/");
        let response = self.send_with_refresh(Method::GET, &path, None).await?;
        parse_json_response(response).await
    }
}

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

//! Face-recognition and attendance endpoints.

use classroom_types::requests::{MarkAttendanceRequest, RecognizeRequest};
use classroom_types::{MarkAttendanceResponse, RecognizeResponse};
use log::debug;
use reqwest::Method;

use crate::error::ApiError;
use crate::ApiClient;

impl ApiClient {
    /// Submit one captured frame to the face-recognition service.
    ///
    /// Calls `POST {face_url}/api/recognize`. The service is a separate
    /// deployment with no bearer auth; its 401s (if any) are plain errors,
    /// not a trigger for token refresh.
    pub async fn recognize_face(
        &self,
        image: String,
        session_id: i64,
        threshold: f64,
    ) -> Result<RecognizeResponse, ApiError> {
        let request = RecognizeRequest {
            image,
            session_id,
            threshold,
        };
        let response = self
            .http()
            .post(self.face_endpoint("/api/recognize"))
            .json(&request)
            .send()
            .await?;

        // The service reports its own failures inside the body with
        // `success: false`; parse whatever JSON came back, any status.
        let recognition: RecognizeResponse = response.json().await?;
        debug!(
            "recognition: success={} recognized={} user_id={:?}",
            recognition.success, recognition.recognized, recognition.user_id
        );
        Ok(recognition)
    }

    /// Persist an attendance record for a recognized user.
    ///
    /// Calls `POST /attendances/mark-with-face/`, bearer-authenticated, so
    /// an expired access token is refreshed transparently before the caller
    /// sees a result.
    pub async fn mark_attendance(
        &self,
        request: &MarkAttendanceRequest,
    ) -> Result<MarkAttendanceResponse, ApiError> {
        let body = serde_json::to_value(request).map_err(|e| ApiError::Validation(e.to_string()))?;
        let response = self
            .send_with_refresh(Method::POST, "/attendances/mark-with-face/", Some(body))
            .await?;

        // The backend carries business failures ("already marked", "not
        // enrolled") in the body with `success: false` and a 4xx status;
        // both shapes deserialize into MarkAttendanceResponse.
        let status = response.status().as_u16();
        match response.json::<MarkAttendanceResponse>().await {
            Ok(marked) => Ok(marked),
            Err(_) if (400..500).contains(&status) => {
                Err(ApiError::Validation("Could not mark attendance".to_string()))
            }
            Err(err) => Err(ApiError::Network(err)),
        }
    }
}

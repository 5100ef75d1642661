// SPDX-License-Identifier: MIT OR Apache-2.0

pub mod face_attendance;
pub mod login;

use std::rc::Rc;

use classroom_client::{ApiClient, WebSessionStore};

use crate::constants::{api_base_url, face_api_url};

/// Build the API client for a component. Every client in the tab reads the
/// same `sessionStorage`-backed credential pair.
pub(crate) fn api_client() -> ApiClient {
    ApiClient::new(
        &api_base_url(),
        &face_api_url(),
        Rc::new(WebSessionStore::new()),
    )
}

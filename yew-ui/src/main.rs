// SPDX-License-Identifier: MIT OR Apache-2.0

//! Application shell: login screen, then the attendance screen.

use classroom_client::{AttendanceSuccess, SessionStore, WebSessionStore};
use classroom_types::LoginResponse;
use classroom_ui::components::face_attendance::FaceAttendance;
use classroom_ui::components::login::Login;
use classroom_ui::language::current_language;
use yew::prelude::*;

#[function_component(AttendancePage)]
fn attendance_page() -> Html {
    let session_id = session_id_from_query().unwrap_or(1);

    let on_success = Callback::from(|success: AttendanceSuccess| {
        log::info!(
            "attendance recorded for {:?} at {:.1}%",
            success.user.as_ref().map(|u| u.id),
            success.confidence
        );
    });
    let on_error = Callback::from(|message: String| {
        log::warn!("attendance failed: {message}");
    });

    html! {
        <div class="attendance-page">
            <h2>{ format!("Session {session_id}") }</h2>
            <FaceAttendance {session_id} {on_success} {on_error} />
        </div>
    }
}

#[function_component(App)]
fn app() -> Html {
    // A credential pair already in this tab means the user is logged in;
    // a stale pair resolves itself through the 401/refresh path.
    let logged_in = use_state(|| WebSessionStore::new().credentials().is_some());

    let on_login = {
        let logged_in = logged_in.clone();
        Callback::from(move |response: LoginResponse| {
            log::info!("logged in as {} ({})", response.user.username, response.user.role);
            logged_in.set(true);
        })
    };

    if *logged_in {
        html! { <AttendancePage /> }
    } else {
        html! { <Login {on_login} /> }
    }
}

/// Session selected via `?session=<id>`.
fn session_id_from_query() -> Option<i64> {
    let search = gloo_utils::window().location().search().ok()?;
    let params = web_sys::UrlSearchParams::new_with_str(&search).ok()?;
    params.get("session")?.parse().ok()
}

fn main() {
    console_error_panic_hook::set_once();
    console_log::init_with_level(log::Level::Debug).expect("failed to initialize logger");
    log::info!("classroom-ui starting, language {}", current_language());
    yew::Renderer::<App>::new().render();
}

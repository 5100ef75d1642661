// SPDX-License-Identifier: MIT OR Apache-2.0

//! Face-attendance capture screen.
//!
//! Owns a [`CameraDriver`] for the live preview and an [`AttendanceEngine`]
//! for the polling loop; everything stateful about the loop itself lives in
//! the engine, this component only translates its callbacks into messages
//! and renders status.

use futures::FutureExt;
use std::rc::Rc;

use classroom_client::attendance::{MarkFn, RecognizeFn};
use classroom_client::{
    AttendanceEngine, AttendanceEngineOptions, AttendanceSuccess, CameraDriver, CaptureConfig,
    CaptureFailure, CaptureStatus,
};
use log::{info, warn};
use yew::prelude::*;

use super::api_client;
use crate::constants::ATTENDANCE_VIDEO_ELEMENT_ID;

pub enum Msg {
    StartCamera,
    CameraStarted,
    CameraFailed(String),
    StartCapture,
    StopCapture,
    StopCamera,
    Progress(CaptureStatus),
    Succeeded(AttendanceSuccess),
    Failed(CaptureFailure),
}

#[derive(Properties, PartialEq)]
pub struct FaceAttendanceProps {
    /// The class session being attended.
    pub session_id: i64,

    /// Fired once when attendance is on record.
    #[prop_or_default]
    pub on_success: Callback<AttendanceSuccess>,

    /// Fired once per failed capture run with a displayable message.
    #[prop_or_default]
    pub on_error: Callback<String>,
}

pub struct FaceAttendance {
    camera: CameraDriver,
    engine: AttendanceEngine,
    status: Option<String>,
    error: Option<String>,
    camera_on: bool,
    capturing: bool,
}

impl Component for FaceAttendance {
    type Message = Msg;
    type Properties = FaceAttendanceProps;

    fn create(ctx: &Context<Self>) -> Self {
        let client = api_client();
        let camera = CameraDriver::new(ATTENDANCE_VIDEO_ELEMENT_ID);

        let recognize_client = client.clone();
        let recognize: RecognizeFn = Box::new(move |frame, session_id, threshold| {
            let client = recognize_client.clone();
            async move { client.recognize_face(frame, session_id, threshold).await }.boxed_local()
        });

        let mark_client = client;
        let mark: MarkFn = Box::new(move |request| {
            let client = mark_client.clone();
            async move { client.mark_attendance(&request).await }.boxed_local()
        });

        let release_camera = {
            let camera = camera.clone();
            Rc::new(move || camera.release())
        };

        let status_link = ctx.link().clone();
        let success_link = ctx.link().clone();
        let error_link = ctx.link().clone();

        let engine = AttendanceEngine::new(AttendanceEngineOptions {
            config: CaptureConfig::for_session(ctx.props().session_id),
            frames: Box::new(camera.clone()),
            recognize,
            mark,
            release_camera,
            on_status: Rc::new(move |status| status_link.send_message(Msg::Progress(status))),
            on_success: Rc::new(move |success| success_link.send_message(Msg::Succeeded(success))),
            on_error: Rc::new(move |failure| error_link.send_message(Msg::Failed(failure))),
        });

        Self {
            camera,
            engine,
            status: None,
            error: None,
            camera_on: false,
            capturing: false,
        }
    }

    fn update(&mut self, ctx: &Context<Self>, msg: Self::Message) -> bool {
        match msg {
            Msg::StartCamera => {
                self.error = None;
                self.status = Some("Starting camera...".to_string());
                let camera = self.camera.clone();
                ctx.link().send_future(async move {
                    match camera.start().await {
                        Ok(()) => Msg::CameraStarted,
                        Err(err) => Msg::CameraFailed(format!("{err:?}")),
                    }
                });
                true
            }
            Msg::CameraStarted => {
                self.camera_on = true;
                self.engine.camera_ready();
                self.status =
                    Some("Camera ready. Press \"Start attendance\" to continue.".to_string());
                true
            }
            Msg::CameraFailed(detail) => {
                warn!("webcam error: {detail}");
                self.status = None;
                self.error =
                    Some("Could not access the camera. Please check permissions.".to_string());
                true
            }
            Msg::StartCapture => {
                self.error = None;
                self.status = Some("Scanning face...".to_string());
                self.capturing = true;
                self.engine.start();
                true
            }
            Msg::StopCapture => {
                self.engine.stop();
                self.capturing = false;
                self.status = Some("Scanning stopped".to_string());
                true
            }
            Msg::StopCamera => {
                self.engine.reset();
                self.camera.release();
                self.camera_on = false;
                self.capturing = false;
                self.status = None;
                true
            }
            Msg::Progress(progress) => {
                self.status = Some(progress_text(&progress));
                true
            }
            Msg::Succeeded(success) => {
                info!(
                    "attendance marked at {:.1}% confidence",
                    success.confidence
                );
                self.capturing = false;
                self.status = Some("Attendance recorded!".to_string());
                ctx.props().on_success.emit(success);
                true
            }
            Msg::Failed(failure) => {
                self.capturing = false;
                self.status = None;
                let message = failure.to_string();
                self.error = Some(message.clone());
                ctx.props().on_error.emit(message);
                true
            }
        }
    }

    fn view(&self, ctx: &Context<Self>) -> Html {
        let link = ctx.link();
        html! {
            <div class="face-attendance">
                <h3>{ "Face Attendance" }</h3>

                <div class="face-attendance-preview">
                    // Mirrored so the preview behaves like a mirror.
                    <video
                        id={ATTENDANCE_VIDEO_ELEMENT_ID}
                        autoplay=true
                        muted=true
                        playsinline=true
                        style="transform: scaleX(-1);"
                    ></video>
                </div>

                if let Some(status) = &self.status {
                    <div class="face-attendance-status">{ status }</div>
                }
                if let Some(error) = &self.error {
                    <div class="face-attendance-error">{ error }</div>
                }

                <div class="face-attendance-controls">
                    if !self.camera_on {
                        <button onclick={link.callback(|_| Msg::StartCamera)}>
                            { "Start camera" }
                        </button>
                    } else if self.capturing {
                        <button onclick={link.callback(|_| Msg::StopCapture)}>
                            { "Stop" }
                        </button>
                    } else {
                        <>
                            <button onclick={link.callback(|_| Msg::StartCapture)}>
                                { "Start attendance" }
                            </button>
                            <button onclick={link.callback(|_| Msg::StopCamera)}>
                                { "Turn off camera" }
                            </button>
                        </>
                    }
                </div>

                <div class="face-attendance-help">
                    <p>{ "How it works:" }</p>
                    <ol>
                        <li>{ "Start the camera and allow webcam access." }</li>
                        <li>{ "Keep your face inside the frame." }</li>
                        <li>{ "Press \"Start attendance\"; recognition runs automatically." }</li>
                        <li>{ "Use your real face, not a photo on a phone." }</li>
                    </ol>
                </div>
            </div>
        }
    }

    fn destroy(&mut self, _ctx: &Context<Self>) {
        // Component teardown must never leak the camera.
        self.camera.release();
    }
}

fn progress_text(status: &CaptureStatus) -> String {
    match status {
        CaptureStatus::Capturing {
            attempt,
            max_attempts,
        } => format!("Capturing... ({attempt}/{max_attempts})"),
        CaptureStatus::Recognizing {
            attempt,
            max_attempts,
        } => format!("Recognizing face... ({attempt}/{max_attempts})"),
        CaptureStatus::Searching {
            attempt,
            max_attempts,
        } => format!("Looking for a face... ({attempt}/{max_attempts})"),
        CaptureStatus::Recognized {
            user_id,
            confidence,
        } => format!("Recognized user {user_id} ({confidence:.1}%)"),
        CaptureStatus::Marked => "Attendance recorded!".to_string(),
    }
}

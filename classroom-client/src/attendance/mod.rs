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

//! The face-attendance capture loop: camera in, recognition out.

mod camera;
mod engine;

pub use camera::CameraDriver;
pub use engine::{
    AttendanceEngine, AttendanceEngineOptions, AttendanceSuccess, CaptureConfig, CaptureFailure,
    CaptureState, CaptureStatus, FrameSource, MarkFn, RecognizeFn,
};

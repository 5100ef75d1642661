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

//! Camera acquisition and frame capture for the attendance loop.
//!
//! [`CameraDriver`] owns the `MediaStream` exclusively: it binds the stream
//! to the caller's `HtmlVideoElement` for live preview and stops every track
//! on [`release()`](CameraDriver::release), which must run on every exit
//! path — success, stop, or component teardown.

use std::cell::RefCell;
use std::rc::Rc;

use gloo_utils::window;
use js_sys::Reflect;
use log::error;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys::{
    CanvasRenderingContext2d, HtmlCanvasElement, HtmlVideoElement, MediaStream,
    MediaStreamConstraints, MediaStreamTrack,
};

use super::engine::FrameSource;
use crate::constants::FRAME_JPEG_QUALITY;

/// Owns the camera stream for one capture component instance.
#[derive(Clone)]
pub struct CameraDriver {
    video_elem_id: String,
    stream: Rc<RefCell<Option<MediaStream>>>,
}

impl CameraDriver {
    /// * `video_elem_id` - ID of the `HtmlVideoElement` used as live
    ///   preview. It does not need to exist yet.
    pub fn new(video_elem_id: &str) -> Self {
        Self {
            video_elem_id: video_elem_id.to_string(),
            stream: Rc::new(RefCell::new(None)),
        }
    }

    /// Request the camera (front-facing preferred, 1280x720 ideal) and bind
    /// the granted stream to the preview element.
    ///
    /// On denial or device error the driver stays without a stream and the
    /// error is returned for the UI to surface.
    pub async fn start(&self) -> Result<(), JsValue> {
        let navigator = window().navigator();
        let media_devices = navigator.media_devices()?;

        let video_constraints = js_sys::Object::new();
        Reflect::set(&video_constraints, &"width".into(), &ideal(1280.0)?)?;
        Reflect::set(&video_constraints, &"height".into(), &ideal(720.0)?)?;
        Reflect::set(&video_constraints, &"facingMode".into(), &"user".into())?;

        let constraints = MediaStreamConstraints::new();
        constraints.set_video(&video_constraints.into());
        constraints.set_audio(&JsValue::from_bool(false));

        let promise = media_devices.get_user_media_with_constraints(&constraints)?;
        let stream: MediaStream = JsFuture::from(promise).await?.unchecked_into();

        if let Some(video) = self.video_element() {
            video.set_src_object(Some(&stream));
        }
        *self.stream.borrow_mut() = Some(stream);
        Ok(())
    }

    /// Whether a stream is currently bound.
    pub fn is_active(&self) -> bool {
        self.stream.borrow().is_some()
    }

    /// Stop every media track and unbind the preview. Idempotent; safe to
    /// call from any state.
    pub fn release(&self) {
        if let Some(stream) = self.stream.borrow_mut().take() {
            for track in stream.get_tracks().iter() {
                track.unchecked_into::<MediaStreamTrack>().stop();
            }
        }
        if let Some(video) = self.video_element() {
            video.set_src_object(None);
        }
    }

    fn video_element(&self) -> Option<HtmlVideoElement> {
        window()
            .document()?
            .get_element_by_id(&self.video_elem_id)
            .map(|elem| elem.unchecked_into())
    }

    fn capture_frame(&self) -> Option<String> {
        if self.stream.borrow().is_none() {
            return None;
        }

        let video = self.video_element()?;
        let width = video.video_width();
        let height = video.video_height();
        if width == 0 || height == 0 {
            // The preview has not rendered a frame yet.
            return None;
        }

        let document = window().document()?;
        let canvas: HtmlCanvasElement = document
            .create_element("canvas")
            .ok()?
            .unchecked_into();
        canvas.set_width(width);
        canvas.set_height(height);

        let context: CanvasRenderingContext2d =
            canvas.get_context("2d").ok()??.unchecked_into();
        if let Err(err) = context.draw_image_with_html_video_element(&video, 0.0, 0.0) {
            error!("failed to draw video frame: {err:?}");
            return None;
        }

        let data_url = canvas
            .to_data_url_with_type_and_encoder_options(
                "image/jpeg",
                &JsValue::from_f64(FRAME_JPEG_QUALITY),
            )
            .ok()?;
        // Strip the `data:image/jpeg;base64,` prefix; the services want raw base64.
        data_url.split_once(',').map(|(_, b64)| b64.to_string())
    }
}

impl FrameSource for CameraDriver {
    fn grab_frame(&self) -> Option<String> {
        self.capture_frame()
    }
}

fn ideal(value: f64) -> Result<JsValue, JsValue> {
    let constraint = js_sys::Object::new();
    Reflect::set(&constraint, &"ideal".into(), &JsValue::from_f64(value))?;
    Ok(constraint.into())
}

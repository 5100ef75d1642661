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

//! Platform abstraction layer for classroom-client.
//!
//! Cross-platform primitives abstracting over WASM (browser) and native
//! (test/server) environments:
//!
//! - **`now_secs()`** — current Unix time in seconds
//! - **`IntervalHandle`** — a repeating timer that fires a callback at a fixed interval
//! - browser-only task/delay helpers used by the capture loop's driver
//!
//! The implementation is selected at compile time via `cfg(target_arch = "wasm32")`.

#[cfg(not(target_arch = "wasm32"))]
mod native;
#[cfg(target_arch = "wasm32")]
mod web;

#[cfg(not(target_arch = "wasm32"))]
pub use native::*;
#[cfg(target_arch = "wasm32")]
pub use web::*;

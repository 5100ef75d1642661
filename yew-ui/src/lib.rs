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

//! classroom-ui library root.
//!
//! Re-exports public modules so the binary entry-point in `main.rs` stays
//! small. Page composition is deliberately thin: a login form and the
//! face-attendance screen are all this shell hosts.

pub mod components;
pub mod constants;
pub mod language;

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

//! WASM (browser) platform primitives, built on `js-sys`, `gloo` and
//! `wasm-bindgen-futures`.

use std::future::Future;

/// Current Unix time in seconds, from `Date.now()`.
pub fn now_secs() -> i64 {
    (js_sys::Date::now() / 1000.0) as i64
}

/// A repeating timer that fires a callback at a fixed interval.
///
/// Wraps `gloo::timers::callback::Interval`; the timer is cancelled when the
/// handle is dropped.
pub struct IntervalHandle {
    _interval: gloo::timers::callback::Interval,
}

impl IntervalHandle {
    pub fn new<F: Fn() + 'static>(period_ms: u32, callback: F) -> Self {
        Self {
            _interval: gloo::timers::callback::Interval::new(period_ms, callback),
        }
    }
}

/// Run `callback` once after `delay_ms`. The task keeps itself alive; there
/// is no handle to cancel it.
pub fn delay(delay_ms: u32, callback: impl FnOnce() + 'static) {
    gloo::timers::callback::Timeout::new(delay_ms, callback).forget();
}

/// Spawn an async task on the browser's microtask queue. The future does not
/// need to be `Send` because WASM is single-threaded.
pub fn spawn_local<F: Future<Output = ()> + 'static>(future: F) {
    wasm_bindgen_futures::spawn_local(future);
}

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

//! Native (test / server) platform primitives, built on `std::time` and
//! `tokio`.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

/// Current Unix time in seconds.
pub fn now_secs() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs() as i64
}

/// A repeating timer that fires a callback at a fixed interval.
///
/// Spawns a `tokio` task that sleeps in a loop; cancelled when the handle is
/// dropped. A tokio runtime must be active when this is constructed.
pub struct IntervalHandle {
    quit: Arc<AtomicBool>,
    handle: Option<tokio::task::JoinHandle<()>>,
}

impl IntervalHandle {
    pub fn new<F: Fn() + Send + 'static>(period_ms: u32, callback: F) -> Self {
        let quit = Arc::new(AtomicBool::new(false));
        let quit_clone = quit.clone();
        let period = std::time::Duration::from_millis(period_ms as u64);

        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            // Skip the immediate first tick so behaviour matches
            // gloo::Interval, which does not fire at time zero.
            interval.tick().await;

            loop {
                interval.tick().await;
                if quit_clone.load(Ordering::Relaxed) {
                    break;
                }
                callback();
            }
        });

        Self {
            quit,
            handle: Some(handle),
        }
    }
}

impl Drop for IntervalHandle {
    fn drop(&mut self) {
        self.quit.store(true, Ordering::Relaxed);
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}

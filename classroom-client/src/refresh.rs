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

//! Single-flight coordination of access-token refreshes.
//!
//! Any number of requests can hit a 401 at roughly the same moment; only the
//! first of them may actually call the refresh endpoint. The rest park on a
//! oneshot channel and are woken with the new token — or dropped, which they
//! observe as a failed refresh.
//!
//! One coordinator lives inside each [`ApiClient`](crate::ApiClient); clones
//! of the client share it.

use std::cell::RefCell;
use std::rc::Rc;

use futures::channel::oneshot;
use futures::Future;
use log::debug;

use crate::error::ApiError;

#[derive(Default)]
struct CoordinatorState {
    in_flight: bool,
    waiters: Vec<oneshot::Sender<String>>,
}

/// Ensures at most one refresh call is in flight per client, broadcasting
/// the resulting token to every caller that piled up behind it.
#[derive(Clone, Default)]
pub struct RefreshCoordinator {
    state: Rc<RefCell<CoordinatorState>>,
}

impl RefreshCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    /// True while a refresh call is outstanding.
    pub fn is_refreshing(&self) -> bool {
        self.state.borrow().in_flight
    }

    /// Obtain a fresh access token, either by performing the refresh or by
    /// joining one already in flight.
    ///
    /// `refresh_fn` is invoked at most once across all concurrent callers.
    /// The in-flight flag is raised *before* the returned future is first
    /// polled, so a 401 arriving in the same event-loop turn still joins as
    /// a waiter instead of starting a second refresh.
    ///
    /// On failure every parked waiter fails too: the leader returns the
    /// error from `refresh_fn`, waiters get [`ApiError::RefreshFailed`].
    pub async fn run<F, Fut>(&self, refresh_fn: F) -> Result<String, ApiError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<String, ApiError>>,
    {
        let waiter = {
            let mut state = self.state.borrow_mut();
            if state.in_flight {
                let (tx, rx) = oneshot::channel();
                state.waiters.push(tx);
                Some(rx)
            } else {
                state.in_flight = true;
                None
            }
        };

        if let Some(rx) = waiter {
            debug!("refresh already in flight, waiting for its token");
            return match rx.await {
                Ok(token) => Ok(token),
                // The leader dropped our sender: the refresh failed.
                Err(oneshot::Canceled) => Err(ApiError::RefreshFailed),
            };
        }

        let result = refresh_fn().await;

        let waiters = {
            let mut state = self.state.borrow_mut();
            state.in_flight = false;
            std::mem::take(&mut state.waiters)
        };

        match result {
            Ok(token) => {
                debug!("refresh succeeded, waking {} waiter(s)", waiters.len());
                for tx in waiters {
                    let _ = tx.send(token.clone());
                }
                Ok(token)
            }
            Err(err) => {
                // Dropping the senders fails every waiter.
                drop(waiters);
                Err(err)
            }
        }
    }
}

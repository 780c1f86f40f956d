// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! The shared completion state of the software execution timeline.

use kyklos_core::gpu::api::FenceValue;
use std::sync::{Condvar, Mutex};
use std::time::{Duration, Instant};

/// The fence value the timeline has reached, plus the condition variable
/// waiters park on.
///
/// Waiters never busy-spin: a thread waiting for a value the timeline has
/// not reached parks on the condvar and is woken by [`publish`].
///
/// [`publish`]: TimelineState::publish
#[derive(Debug, Default)]
pub(crate) struct TimelineState {
    completed: Mutex<FenceValue>,
    condvar: Condvar,
}

impl TimelineState {
    /// Non-blocking snapshot of the last value reached.
    pub(crate) fn completed(&self) -> FenceValue {
        *self
            .completed
            .lock()
            .expect("software timeline mutex poisoned")
    }

    /// Advances the timeline to `value` and wakes every waiter.
    ///
    /// Values are published in signal order, so the stored value never
    /// decreases.
    pub(crate) fn publish(&self, value: FenceValue) {
        let mut completed = self
            .completed
            .lock()
            .expect("software timeline mutex poisoned");
        debug_assert!(
            value >= *completed,
            "timeline values must be non-decreasing ({} -> {})",
            *completed,
            value
        );
        if value > *completed {
            *completed = value;
            self.condvar.notify_all();
        }
    }

    /// Parks the calling thread until the timeline reaches `value`.
    ///
    /// With no timeout the wait is unbounded. On timeout expiry the last
    /// reached value is returned as the error, for the caller's diagnostics.
    pub(crate) fn wait_reached(
        &self,
        value: FenceValue,
        timeout: Option<Duration>,
    ) -> Result<(), FenceValue> {
        let mut completed = self
            .completed
            .lock()
            .expect("software timeline mutex poisoned");

        match timeout {
            None => {
                while *completed < value {
                    completed = self
                        .condvar
                        .wait(completed)
                        .expect("software timeline mutex poisoned");
                }
                Ok(())
            }
            Some(timeout) => {
                let deadline = Instant::now() + timeout;
                while *completed < value {
                    let remaining = deadline.saturating_duration_since(Instant::now());
                    if remaining.is_zero() {
                        return Err(*completed);
                    }
                    let (guard, result) = self
                        .condvar
                        .wait_timeout(completed, remaining)
                        .expect("software timeline mutex poisoned");
                    completed = guard;
                    if result.timed_out() && *completed < value {
                        return Err(*completed);
                    }
                }
                Ok(())
            }
        }
    }
}

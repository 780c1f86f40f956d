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

//! The CPU-visible fence of the software execution timeline.

use crate::gpu::software::timeline::TimelineState;
use kyklos_core::gpu::api::FenceValue;
use kyklos_core::gpu::error::SyncError;
use kyklos_core::gpu::traits::FrameFence;
use std::sync::Arc;
use std::time::Duration;

/// A [`FrameFence`] observing the software timeline.
///
/// Cloneable and cheap to share: all clones observe the same timeline.
#[derive(Debug, Clone)]
pub struct SoftwareFence {
    timeline: Arc<TimelineState>,
}

impl SoftwareFence {
    pub(crate) fn new(timeline: Arc<TimelineState>) -> Self {
        Self { timeline }
    }
}

impl FrameFence for SoftwareFence {
    fn completed_value(&self) -> FenceValue {
        self.timeline.completed()
    }

    fn wait_until(&self, value: FenceValue, timeout: Option<Duration>) -> Result<(), SyncError> {
        // Idempotent fast path: a value already reached creates no wait
        // object at all.
        if self.timeline.completed() >= value {
            return Ok(());
        }

        self.timeline.wait_reached(value, timeout).map_err(|completed| {
            log::error!(
                "SoftwareFence: timeline stalled at {completed} while waiting for {value}; \
                 treating the device as lost"
            );
            SyncError::DeviceLost {
                target: value,
                completed,
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn completed_value_tracks_the_timeline() {
        let timeline = Arc::new(TimelineState::default());
        let fence = SoftwareFence::new(Arc::clone(&timeline));

        assert_eq!(fence.completed_value(), 0);
        timeline.publish(7);
        assert_eq!(fence.completed_value(), 7);
    }

    #[test]
    fn wait_on_reached_value_is_idempotent() {
        let timeline = Arc::new(TimelineState::default());
        let fence = SoftwareFence::new(Arc::clone(&timeline));
        timeline.publish(2);

        // Must return immediately, even with a zero timeout.
        assert!(fence.wait_until(2, Some(Duration::ZERO)).is_ok());
        assert!(fence.wait_until(1, None).is_ok());
    }

    #[test]
    fn expired_wait_is_surfaced_as_device_loss() {
        let timeline = Arc::new(TimelineState::default());
        let fence = SoftwareFence::new(timeline);

        let result = fence.wait_until(1, Some(Duration::from_millis(10)));
        assert!(matches!(
            result,
            Err(SyncError::DeviceLost {
                target: 1,
                completed: 0
            })
        ));
    }
}

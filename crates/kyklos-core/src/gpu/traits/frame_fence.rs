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

use crate::gpu::api::FenceValue;
use crate::gpu::error::SyncError;
use std::fmt::Debug;
use std::time::Duration;

/// The CPU-visible side of a GPU fence.
///
/// A fence lets the CPU observe GPU progress without polling hardware state:
/// [`completed_value`](FrameFence::completed_value) is a wait-free snapshot,
/// [`wait_until`](FrameFence::wait_until) parks the calling thread until a
/// value is reached.
pub trait FrameFence: Send + Sync + Debug {
    /// Non-blocking read of the last fence value the timeline has reached.
    fn completed_value(&self) -> FenceValue;

    /// Blocks the calling thread until the timeline reaches `value`.
    ///
    /// Must be idempotent: when the value is already reached this returns
    /// immediately without creating a wait object. Implementations must park
    /// the thread rather than busy-spin.
    ///
    /// With `timeout: None` the wait is unbounded, the literal contract of
    /// the original pattern. When a timeout is given and expires, the fence
    /// is considered hung and the error is
    /// [`SyncError::DeviceLost`](crate::gpu::error::SyncError::DeviceLost):
    /// a fence that never advances means the device is gone, not busy.
    fn wait_until(&self, value: FenceValue, timeout: Option<Duration>) -> Result<(), SyncError>;
}

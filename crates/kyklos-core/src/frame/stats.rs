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

//! Per-ring pipelining statistics.

use crate::gpu::api::FenceValue;
use serde::{Deserialize, Serialize};

/// A collection of counters describing how the ring has been pacing.
///
/// A rising `stalled_frames` share means the CPU is outrunning the GPU and
/// spending time parked in the fence wait; zero stalls with a deep ring means
/// the GPU is keeping up.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct FrameStats {
    /// A sequential counter of completed `begin`/`end` cycles.
    pub frame_number: u64,
    /// How many frames had to park in the fence wait before their slot
    /// became reusable.
    pub stalled_frames: u64,
    /// Total time spent parked in the fence wait.
    pub stall_time_ms: f32,
    /// The most recently signaled fence value.
    pub last_signaled_fence: FenceValue,
}

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

//! Configuration of the frame ring.

use crate::frame::resource::FrameResourceDesc;
use crate::gpu::error::ResourceError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// The default ring depth.
///
/// Three slots tolerate one frame of GPU backlog without stalling the CPU;
/// two is the minimum that overlaps CPU and GPU work at all.
pub const DEFAULT_FRAMES_IN_FLIGHT: u32 = 3;

/// A collection of settings governing the frame ring.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrameSettings {
    /// Ring depth N: how many frames the CPU may run ahead of the GPU.
    pub frames_in_flight: u32,
    /// Bound on the per-frame fence wait, in milliseconds.
    ///
    /// `None` keeps the wait unbounded. When set, expiry is treated as
    /// device loss: a fatal condition, not a retryable one.
    pub wait_timeout_ms: Option<u64>,
    /// Capacities of each slot's upload buffers.
    pub resources: FrameResourceDesc,
}

impl Default for FrameSettings {
    fn default() -> Self {
        Self {
            frames_in_flight: DEFAULT_FRAMES_IN_FLIGHT,
            wait_timeout_ms: None,
            resources: FrameResourceDesc::default(),
        }
    }
}

impl FrameSettings {
    /// Validates the settings before any backend allocation happens.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::InvalidDescriptor`] for a ring depth of zero.
    pub fn validate(&self) -> Result<(), ResourceError> {
        if self.frames_in_flight == 0 {
            return Err(ResourceError::InvalidDescriptor(
                "frames_in_flight must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// The configured wait bound as a [`Duration`].
    pub fn wait_timeout(&self) -> Option<Duration> {
        self.wait_timeout_ms.map(Duration::from_millis)
    }
}

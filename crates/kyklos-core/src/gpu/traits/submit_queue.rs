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

use crate::gpu::api::{CommandBufferId, FenceValue};
use crate::gpu::error::SyncError;
use std::fmt::Debug;

/// A GPU submission queue consuming work strictly in submission order.
///
/// Neither operation blocks the caller; both are plain enqueues onto the
/// device's execution timeline.
pub trait SubmitQueue: Send + Sync + Debug {
    /// Submits a batch of recorded command buffers as one atomic unit of
    /// ordered work.
    fn submit(&self, commands: &[CommandBufferId]) -> Result<(), SyncError>;

    /// Enqueues a fence signal: once all previously submitted work completes,
    /// the queue's fence becomes observable at `value`.
    ///
    /// Callers must pass strictly increasing values over the queue's
    /// lifetime; the frame ring's fence counter enforces this.
    fn signal(&self, value: FenceValue) -> Result<(), SyncError>;
}

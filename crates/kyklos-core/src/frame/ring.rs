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

//! The fixed-size rotating ring of frame resources and its fence protocol.

use crate::frame::resource::FrameResource;
use crate::frame::settings::FrameSettings;
use crate::frame::stats::FrameStats;
use crate::gpu::api::{CommandBufferId, FenceValue};
use crate::gpu::error::{FrameError, ResourceError};
use crate::gpu::traits::{FrameFence, SubmitQueue, UploadDevice};
use std::time::{Duration, Instant};

/// A fixed ring of [`FrameResource`] slots cycled under an explicit fence
/// handshake.
///
/// Each frame follows the same protocol:
///
/// 1. [`begin_frame`](FrameRing::begin_frame) advances the cursor and blocks
///    (the one designed blocking point in the whole system) until the GPU
///    has finished the fence value previously recorded for the new slot,
///    then resets the slot's command allocator.
/// 2. The caller rewrites the slot's upload buffers and records commands
///    against them.
/// 3. [`end_frame`](FrameRing::end_frame) submits, bumps the fence counter by
///    exactly one, records the new value into the slot, and signals it on
///    the queue.
///
/// The wait in step 1 is the sole guarantee that a slot's upload buffers are
/// never written while a previous submission against that slot might still
/// be executing. No lock is involved: exclusion is enforced in time.
///
/// # Example
///
/// ```ignore
/// let mut ring = FrameRing::new(device, &FrameSettings::default())?;
///
/// loop {
///     ring.begin_frame(device, fence)?;
///     let frame = ring.current();
///     frame.pass_constants().copy_data(device, 0, &pass)?;
///     upload_object_constants(device, frame, &mut items)?;
///     // ... record commands against frame's buffers ...
///     ring.end_frame(queue, &commands)?;
/// }
/// ```
#[derive(Debug)]
pub struct FrameRing {
    slots: Vec<FrameResource>,
    current_index: usize,
    /// The most recently signaled fence value; the next submission uses +1.
    current_fence: FenceValue,
    wait_timeout: Option<Duration>,
    frame_open: bool,
    stats: FrameStats,
}

impl FrameRing {
    /// Creates the ring and allocates every slot's resources up front.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::InvalidDescriptor`] for a ring depth of zero
    /// and propagates any slot allocation failure (fatal, never retried).
    pub fn new(device: &dyn UploadDevice, settings: &FrameSettings) -> Result<Self, ResourceError> {
        settings.validate()?;

        if settings.frames_in_flight == 1 {
            log::warn!(
                "FrameRing: a single frame in flight fully serializes CPU and GPU; \
                 every frame will stall on the fence"
            );
        }

        let mut slots = Vec::with_capacity(settings.frames_in_flight as usize);
        for slot in 0..settings.frames_in_flight as usize {
            slots.push(FrameResource::new(device, slot, &settings.resources)?);
        }

        log::debug!(
            "FrameRing: created {} slots ({} objects, {} materials per slot)",
            slots.len(),
            settings.resources.object_count,
            settings.resources.material_count
        );

        Ok(Self {
            slots,
            current_index: 0,
            current_fence: 0,
            wait_timeout: settings.wait_timeout(),
            frame_open: false,
            stats: FrameStats::default(),
        })
    }

    /// Advances to the next slot and makes it writable.
    ///
    /// Blocks until the slot's pending fence value has been reached by the
    /// GPU. A slot that was never submitted is ready immediately, so a fresh
    /// ring of depth N runs its first N frames without ever blocking.
    ///
    /// # Errors
    ///
    /// [`SyncError::DeviceLost`](crate::gpu::error::SyncError::DeviceLost)
    /// when a configured wait bound expires, or the backend's error from
    /// resetting the slot's command allocator.
    pub fn begin_frame(
        &mut self,
        device: &dyn UploadDevice,
        fence: &dyn FrameFence,
    ) -> Result<(), FrameError> {
        debug_assert!(
            !self.frame_open,
            "begin_frame called twice without an intervening end_frame"
        );

        self.current_index = (self.current_index + 1) % self.slots.len();
        let slot = &self.slots[self.current_index];

        if !slot.is_ready(fence) {
            let started = Instant::now();
            fence.wait_until(slot.pending_fence(), self.wait_timeout)?;
            let stalled_for = started.elapsed();
            self.stats.stalled_frames += 1;
            self.stats.stall_time_ms += stalled_for.as_secs_f32() * 1000.0;
            log::trace!(
                "FrameRing: slot {} stalled {:?} waiting for fence {}",
                self.current_index,
                stalled_for,
                slot.pending_fence()
            );
        }

        slot.reset_command_allocator(device)?;
        self.frame_open = true;
        Ok(())
    }

    /// The slot currently writable by the CPU.
    pub fn current(&self) -> &FrameResource {
        &self.slots[self.current_index]
    }

    /// The index of the current slot (for telemetry).
    pub fn current_index(&self) -> usize {
        self.current_index
    }

    /// The ring depth N.
    pub fn frames_in_flight(&self) -> usize {
        self.slots.len()
    }

    /// Submits the frame's commands and closes the handshake for this slot.
    ///
    /// Bumps the fence counter by exactly one, records the new value as the
    /// slot's pending fence and signals it on the queue, in that order, so
    /// the signal is queue-ordered behind the submitted work.
    ///
    /// # Errors
    ///
    /// Propagates queue submission or signal failures.
    pub fn end_frame(
        &mut self,
        queue: &dyn SubmitQueue,
        commands: &[CommandBufferId],
    ) -> Result<FenceValue, FrameError> {
        debug_assert!(
            self.frame_open,
            "end_frame called without a matching begin_frame"
        );

        queue.submit(commands)?;

        self.current_fence += 1;
        let value = self.current_fence;
        self.slots[self.current_index].record_pending_fence(value);
        queue.signal(value)?;

        self.frame_open = false;
        self.stats.frame_number += 1;
        self.stats.last_signaled_fence = value;
        Ok(value)
    }

    /// Drains the queue: signals a fresh fence value and waits for it.
    ///
    /// After this returns, every previously submitted frame has finished and
    /// every slot is reusable, the precondition for tearing resources down.
    pub fn flush(
        &mut self,
        queue: &dyn SubmitQueue,
        fence: &dyn FrameFence,
    ) -> Result<(), FrameError> {
        self.current_fence += 1;
        let value = self.current_fence;
        queue.signal(value)?;
        fence.wait_until(value, self.wait_timeout)?;
        self.stats.last_signaled_fence = value;
        Ok(())
    }

    /// The ring's pacing statistics.
    pub fn stats(&self) -> &FrameStats {
        &self.stats
    }

    /// Destroys every slot's backend resources.
    ///
    /// The queue must have been flushed first.
    pub fn destroy(&self, device: &dyn UploadDevice) {
        for slot in &self.slots {
            slot.destroy(device);
        }
    }
}

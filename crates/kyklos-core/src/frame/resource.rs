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

//! One slot of the frame ring: a command allocator, the slot's upload
//! buffers, and the fence value that marks the slot reusable.

use crate::frame::upload_buffer::UploadBuffer;
use crate::gpu::api::{
    CommandAllocatorId, FenceValue, FrameVertex, MaterialConstants, ObjectConstants,
    PassConstants, UploadKind, FENCE_NEVER_SUBMITTED,
};
use crate::gpu::error::ResourceError;
use crate::gpu::traits::{FrameFence, UploadDevice};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;

/// Capacities of a frame slot's upload buffers.
///
/// Buffers are sized once for the maximum counts the scene will ever need;
/// there is no growth after construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrameResourceDesc {
    /// Number of render passes per frame.
    pub pass_count: u32,
    /// Maximum number of render items.
    pub object_count: u32,
    /// Maximum number of materials.
    pub material_count: u32,
    /// Capacity of the dynamic vertex buffer; `0` disables it.
    pub dynamic_vertex_count: u32,
}

impl Default for FrameResourceDesc {
    fn default() -> Self {
        Self {
            pass_count: 1,
            object_count: 256,
            material_count: 64,
            dynamic_vertex_count: 0,
        }
    }
}

/// One cycle's worth of CPU-writable GPU state, tagged with the fence value
/// that will mark its last submission complete.
///
/// A frame slot is constructed once at startup and lives until shutdown; its
/// command allocator is reset, not recreated, every cycle the slot is
/// reused. The slot's upload buffers are independent copies of the same
/// logical data: each slot must observe a write before the GPU reads it,
/// which is what [`DirtyFrames`](crate::frame::render_item::DirtyFrames)
/// tracks per render item.
#[derive(Debug)]
pub struct FrameResource {
    command_allocator: CommandAllocatorId,
    pass_constants: UploadBuffer<PassConstants>,
    object_constants: UploadBuffer<ObjectConstants>,
    material_constants: UploadBuffer<MaterialConstants>,
    dynamic_vertices: Option<UploadBuffer<FrameVertex>>,
    pending_fence: FenceValue,
}

impl FrameResource {
    /// Allocates the slot's command allocator and upload buffers.
    ///
    /// # Errors
    ///
    /// Propagates the backend's allocation failure; construction is
    /// all-or-nothing and never retried.
    pub fn new(
        device: &dyn UploadDevice,
        slot: usize,
        desc: &FrameResourceDesc,
    ) -> Result<Self, ResourceError> {
        let label = |base: &'static str| -> Cow<'static, str> {
            match slot {
                0 => Cow::Borrowed(base),
                _ => Cow::Owned(format!("{base} [slot {slot}]")),
            }
        };

        let command_allocator = device.create_command_allocator()?;
        let pass_constants = UploadBuffer::new(
            device,
            desc.pass_count,
            UploadKind::Constant,
            label("PassConstants"),
        )?;
        let object_constants = UploadBuffer::new(
            device,
            desc.object_count,
            UploadKind::Constant,
            label("ObjectConstants"),
        )?;
        let material_constants = UploadBuffer::new(
            device,
            desc.material_count,
            UploadKind::Constant,
            label("MaterialConstants"),
        )?;
        let dynamic_vertices = if desc.dynamic_vertex_count > 0 {
            Some(UploadBuffer::new(
                device,
                desc.dynamic_vertex_count,
                UploadKind::Vertex,
                label("DynamicVertices"),
            )?)
        } else {
            None
        };

        Ok(Self {
            command_allocator,
            pass_constants,
            object_constants,
            material_constants,
            dynamic_vertices,
            pending_fence: FENCE_NEVER_SUBMITTED,
        })
    }

    /// Stores the fence value that will be signaled once this slot's
    /// just-submitted GPU work finishes.
    ///
    /// Called exactly once per frame the slot is used, after submission.
    pub fn record_pending_fence(&mut self, value: FenceValue) {
        debug_assert!(
            value > self.pending_fence,
            "pending fence values must be strictly increasing per slot ({} -> {})",
            self.pending_fence,
            value
        );
        self.pending_fence = value;
    }

    /// Returns `true` when the slot is safe to rewrite: either it was never
    /// submitted, or the GPU has reached its recorded fence value.
    pub fn is_ready(&self, fence: &dyn FrameFence) -> bool {
        self.pending_fence == FENCE_NEVER_SUBMITTED
            || fence.completed_value() >= self.pending_fence
    }

    /// The fence value recorded at the slot's last submission, or
    /// [`FENCE_NEVER_SUBMITTED`].
    pub fn pending_fence(&self) -> FenceValue {
        self.pending_fence
    }

    /// The slot's private command allocator.
    pub fn command_allocator(&self) -> CommandAllocatorId {
        self.command_allocator
    }

    /// Resets the slot's command allocator for the coming cycle.
    pub fn reset_command_allocator(&self, device: &dyn UploadDevice) -> Result<(), ResourceError> {
        device.reset_command_allocator(self.command_allocator)
    }

    /// The slot's per-pass constant buffer.
    pub fn pass_constants(&self) -> &UploadBuffer<PassConstants> {
        &self.pass_constants
    }

    /// The slot's per-object constant buffer.
    pub fn object_constants(&self) -> &UploadBuffer<ObjectConstants> {
        &self.object_constants
    }

    /// The slot's per-material constant buffer.
    pub fn material_constants(&self) -> &UploadBuffer<MaterialConstants> {
        &self.material_constants
    }

    /// The slot's dynamic vertex buffer, when one was configured.
    pub fn dynamic_vertices(&self) -> Option<&UploadBuffer<FrameVertex>> {
        self.dynamic_vertices.as_ref()
    }

    /// Destroys all backend resources owned by this slot.
    ///
    /// Called during shutdown, after the queue has been flushed.
    pub fn destroy(&self, device: &dyn UploadDevice) {
        self.pass_constants.destroy(device);
        self.object_constants.destroy(device);
        self.material_constants.destroy(device);
        if let Some(vertices) = &self.dynamic_vertices {
            vertices.destroy(device);
        }
        if let Err(e) = device.destroy_command_allocator(self.command_allocator) {
            log::warn!("FrameResource: Failed to destroy command allocator: {:?}", e);
        }
    }
}

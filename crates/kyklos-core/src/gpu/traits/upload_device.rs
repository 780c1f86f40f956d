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

use crate::gpu::api::{CommandAllocatorId, UploadBufferDescriptor, UploadBufferId};
use crate::gpu::error::ResourceError;
use std::fmt::Debug;

/// The device-side contract consumed by the frame pipelining core.
///
/// Implemented by a concrete backend (e.g. the software execution timeline in
/// `kyklos-infra`). All resources are referenced by opaque IDs; the backend
/// owns the actual allocations and their mappings.
pub trait UploadDevice: Send + Sync + Debug {
    /// Creates a persistently mapped upload buffer.
    /// ## Arguments
    /// * `descriptor` - A reference to an `UploadBufferDescriptor` containing the size, kind and label.
    /// ## Returns
    /// A `Result` containing the ID of the created buffer or an error if the creation fails.
    /// ## Errors
    /// * `ResourceError::AllocationFailed` - If the upload heap cannot provide the allocation.
    ///   This is fatal at this layer; there is no retry or degraded mode.
    fn create_upload_buffer(
        &self,
        descriptor: &UploadBufferDescriptor,
    ) -> Result<UploadBufferId, ResourceError>;

    /// Writes data into an upload buffer's persistent mapping.
    ///
    /// The write is coherent: no flush is needed, but the caller must
    /// guarantee that no in-flight GPU read may still touch the destination
    /// range. The frame ring's fence wait is what provides that guarantee.
    /// ## Arguments
    /// * `id` - The ID of the buffer to write to.
    /// * `offset` - The byte offset at which the data will be written.
    /// * `data` - A slice of bytes containing the data to be written.
    /// ## Returns
    /// A `Result` indicating success or failure of the operation.
    fn write_upload_buffer(
        &self,
        id: UploadBufferId,
        offset: u64,
        data: &[u8],
    ) -> Result<(), ResourceError>;

    /// Destroys an upload buffer, unmapping its memory.
    /// ## Arguments
    /// * `id` - The ID of the buffer to be destroyed.
    /// ## Returns
    /// A `Result` indicating success or failure of the operation.
    fn destroy_upload_buffer(&self, id: UploadBufferId) -> Result<(), ResourceError>;

    /// Creates a command allocator.
    /// ## Returns
    /// A `Result` containing the ID of the created allocator or an error if the creation fails.
    /// ## Errors
    /// * `ResourceError::AllocationFailed` - If the allocator cannot be created. Fatal at startup.
    fn create_command_allocator(&self) -> Result<CommandAllocatorId, ResourceError>;

    /// Resets a command allocator, reclaiming the memory of commands recorded
    /// through it. Must only be called once the GPU has finished executing
    /// those commands, which the frame ring guarantees before reusing a slot.
    /// ## Arguments
    /// * `id` - The ID of the allocator to reset.
    /// ## Returns
    /// A `Result` indicating success or failure of the operation.
    fn reset_command_allocator(&self, id: CommandAllocatorId) -> Result<(), ResourceError>;

    /// Destroys a command allocator.
    /// ## Arguments
    /// * `id` - The ID of the allocator to be destroyed.
    /// ## Returns
    /// A `Result` indicating success or failure of the operation.
    fn destroy_command_allocator(&self, id: CommandAllocatorId) -> Result<(), ResourceError>;
}

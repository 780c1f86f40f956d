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

//! Opaque handles for resources owned by a graphics backend.

/// A point on the GPU execution timeline.
///
/// Fence values are strictly non-decreasing over the process lifetime; each
/// submission bumps the CPU-side counter by exactly one before signaling, so
/// `completed >= v` is a race-free test for "everything submitted up to and
/// including the work tagged `v` has finished".
pub type FenceValue = u64;

/// The initial pending-fence value of a frame slot, meaning "never submitted".
///
/// A slot carrying this value is always safe to write; real fence values
/// start at 1.
pub const FENCE_NEVER_SUBMITTED: FenceValue = 0;

/// An opaque handle to a CPU-writable, GPU-readable upload buffer.
///
/// Returned by [`UploadDevice::create_upload_buffer`] and used to reference
/// the buffer in all subsequent operations.
///
/// [`UploadDevice::create_upload_buffer`]: crate::gpu::traits::UploadDevice::create_upload_buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UploadBufferId(pub usize);

/// An opaque handle to a command allocator.
///
/// Exactly one allocator is owned by each frame slot; it is reset (not
/// recreated) every cycle the slot is reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CommandAllocatorId(pub usize);

/// An opaque handle to a recorded command buffer, ready for submission.
///
/// Command *recording* is outside this crate's scope; the core only requires
/// that a submitted batch be a single atomic unit of ordered work whose
/// completion a fence can observably track.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CommandBufferId(pub u64);

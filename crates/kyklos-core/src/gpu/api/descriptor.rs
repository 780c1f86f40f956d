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

//! Descriptors and alignment helpers for upload-heap allocations.

use std::borrow::Cow;

/// Minimum alignment required for constant-buffer elements.
///
/// Graphics APIs require each constant-buffer view to start on a 256-byte
/// boundary, so element strides round up to this when a buffer is consumed
/// as shader constants.
pub const MIN_CONSTANT_ALIGNMENT: u32 = 256;

/// How an upload buffer's elements will be consumed by the GPU.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UploadKind {
    /// Elements are bound as shader constants; the element stride rounds up
    /// to [`MIN_CONSTANT_ALIGNMENT`].
    Constant,
    /// Elements are consumed as vertex data; the element stride is the plain
    /// element size.
    Vertex,
}

/// A descriptor used to create an [`UploadBufferId`].
///
/// The backing memory is allocated in an upload-type heap and persistently
/// mapped: mapped once at creation, unmapped when the buffer is destroyed,
/// never partially in between. Upload-heap memory is coherent, so writes need
/// no explicit flush; only the ring's fence handshake stands between a CPU
/// write and an in-flight GPU read.
///
/// [`UploadBufferId`]: crate::gpu::api::UploadBufferId
#[derive(Debug, Clone)]
pub struct UploadBufferDescriptor<'a> {
    /// An optional debug label for the buffer.
    pub label: Option<Cow<'a, str>>,
    /// The total size of the buffer in bytes.
    pub size: u64,
    /// How the buffer's elements will be consumed.
    pub kind: UploadKind,
}

/// Rounds `size` up to the next multiple of `alignment`.
///
/// `alignment` must be a power of two.
pub const fn align_up(size: u32, alignment: u32) -> u32 {
    (size + alignment - 1) & !(alignment - 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn align_up_rounds_to_constant_alignment() {
        assert_eq!(align_up(1, MIN_CONSTANT_ALIGNMENT), 256);
        assert_eq!(align_up(255, MIN_CONSTANT_ALIGNMENT), 256);
        assert_eq!(align_up(256, MIN_CONSTANT_ALIGNMENT), 256);
        assert_eq!(align_up(257, MIN_CONSTANT_ALIGNMENT), 512);
    }

    #[test]
    fn align_up_is_identity_on_multiples() {
        assert_eq!(align_up(0, 16), 0);
        assert_eq!(align_up(64, 16), 64);
        assert_eq!(align_up(1024, 256), 1024);
    }
}

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

//! A typed, indexable, overwrite-only view over a persistently mapped upload
//! allocation.

use crate::gpu::api::{
    align_up, UploadBufferDescriptor, UploadBufferId, UploadKind, MIN_CONSTANT_ALIGNMENT,
};
use crate::gpu::error::ResourceError;
use crate::gpu::traits::UploadDevice;
use bytemuck::Pod;
use std::borrow::Cow;
use std::marker::PhantomData;

/// An array of fixed-stride elements in CPU-writable, GPU-readable memory.
///
/// The element stride is `size_of::<T>()` rounded up to
/// [`MIN_CONSTANT_ALIGNMENT`] for [`UploadKind::Constant`] buffers and the
/// plain element size otherwise. `element_count` is fixed at construction;
/// there is no growth.
///
/// Every indexed access is bounds-checked: an out-of-range index is a
/// contract violation rejected with [`ResourceError::OutOfBounds`], never a
/// silent write past the allocation.
///
/// # Example
///
/// ```ignore
/// let buffer = UploadBuffer::<ObjectConstants>::new(
///     device,
///     max_objects,
///     UploadKind::Constant,
///     "ObjectConstants",
/// )?;
///
/// // Each frame, for every dirty item:
/// buffer.copy_data(device, item.constant_index, &item.object_constants)?;
/// ```
#[derive(Debug)]
pub struct UploadBuffer<T: Pod> {
    buffer: UploadBufferId,
    element_count: u32,
    element_stride: u32,
    label: Cow<'static, str>,
    _marker: PhantomData<T>,
}

impl<T: Pod> UploadBuffer<T> {
    /// Allocates `element_stride * element_count` bytes of persistently
    /// mapped upload memory.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::InvalidDescriptor`] for a zero element count
    /// and propagates the backend's [`ResourceError::AllocationFailed`]
    /// unchanged; allocation failure is fatal at this layer, with no retry.
    pub fn new(
        device: &dyn UploadDevice,
        element_count: u32,
        kind: UploadKind,
        label: impl Into<Cow<'static, str>>,
    ) -> Result<Self, ResourceError> {
        let label = label.into();
        if element_count == 0 {
            return Err(ResourceError::InvalidDescriptor(format!(
                "UploadBuffer({label}): element_count must be non-zero"
            )));
        }

        let element_stride = match kind {
            UploadKind::Constant => {
                align_up(std::mem::size_of::<T>() as u32, MIN_CONSTANT_ALIGNMENT)
            }
            UploadKind::Vertex => std::mem::size_of::<T>() as u32,
        };

        let buffer = device.create_upload_buffer(&UploadBufferDescriptor {
            label: Some(label.clone()),
            size: element_stride as u64 * element_count as u64,
            kind,
        })?;

        Ok(Self {
            buffer,
            element_count,
            element_stride,
            label,
            _marker: PhantomData,
        })
    }

    /// Overwrites the element at `index` with `value`.
    ///
    /// The write lands in coherent upload memory immediately; whether the GPU
    /// may observe it is governed entirely by the frame ring's fence
    /// handshake, which guarantees no in-flight read still targets this slot.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::OutOfBounds`] when `index >= element_count`.
    pub fn copy_data(
        &self,
        device: &dyn UploadDevice,
        index: u32,
        value: &T,
    ) -> Result<(), ResourceError> {
        if index >= self.element_count {
            return Err(ResourceError::OutOfBounds {
                index,
                count: self.element_count,
            });
        }

        device.write_upload_buffer(
            self.buffer,
            index as u64 * self.element_stride as u64,
            bytemuck::bytes_of(value),
        )
    }

    /// Returns the byte offset of the element at `index`, for binding the
    /// element when commands are recorded.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::OutOfBounds`] when `index >= element_count`.
    pub fn element_offset(&self, index: u32) -> Result<u64, ResourceError> {
        if index >= self.element_count {
            return Err(ResourceError::OutOfBounds {
                index,
                count: self.element_count,
            });
        }
        Ok(index as u64 * self.element_stride as u64)
    }

    /// Returns the backend handle of the underlying allocation.
    pub fn id(&self) -> UploadBufferId {
        self.buffer
    }

    /// Returns the number of elements.
    pub fn element_count(&self) -> u32 {
        self.element_count
    }

    /// Returns the aligned stride between consecutive elements in bytes.
    pub fn element_stride(&self) -> u32 {
        self.element_stride
    }

    /// Destroys the underlying allocation, unmapping its memory.
    ///
    /// Must only be called once no in-flight GPU work references the buffer;
    /// the ring's `flush` provides that guarantee at shutdown.
    pub fn destroy(&self, device: &dyn UploadDevice) {
        if let Err(e) = device.destroy_upload_buffer(self.buffer) {
            log::warn!(
                "UploadBuffer({}): Failed to destroy buffer: {:?}",
                self.label,
                e
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gpu::api::{CommandAllocatorId, ObjectConstants};
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// A mock upload device backing each buffer with plain heap memory,
    /// readable back for verification.
    #[derive(Debug)]
    struct MockUploadDevice {
        regions: Mutex<HashMap<UploadBufferId, Vec<u8>>>,
        next_id: AtomicUsize,
    }

    impl MockUploadDevice {
        fn new() -> Self {
            Self {
                regions: Mutex::new(HashMap::new()),
                next_id: AtomicUsize::new(1),
            }
        }

        fn read(&self, id: UploadBufferId, offset: usize, len: usize) -> Vec<u8> {
            let regions = self.regions.lock().unwrap();
            regions[&id][offset..offset + len].to_vec()
        }
    }

    impl UploadDevice for MockUploadDevice {
        fn create_upload_buffer(
            &self,
            descriptor: &UploadBufferDescriptor,
        ) -> Result<UploadBufferId, ResourceError> {
            let id = UploadBufferId(self.next_id.fetch_add(1, Ordering::Relaxed));
            self.regions
                .lock()
                .unwrap()
                .insert(id, vec![0; descriptor.size as usize]);
            Ok(id)
        }

        fn write_upload_buffer(
            &self,
            id: UploadBufferId,
            offset: u64,
            data: &[u8],
        ) -> Result<(), ResourceError> {
            let mut regions = self.regions.lock().unwrap();
            let region = regions.get_mut(&id).ok_or(ResourceError::InvalidHandle)?;
            region[offset as usize..offset as usize + data.len()].copy_from_slice(data);
            Ok(())
        }

        fn destroy_upload_buffer(&self, id: UploadBufferId) -> Result<(), ResourceError> {
            self.regions
                .lock()
                .unwrap()
                .remove(&id)
                .map(|_| ())
                .ok_or(ResourceError::InvalidHandle)
        }

        fn create_command_allocator(&self) -> Result<CommandAllocatorId, ResourceError> {
            Ok(CommandAllocatorId(self.next_id.fetch_add(1, Ordering::Relaxed)))
        }

        fn reset_command_allocator(&self, _id: CommandAllocatorId) -> Result<(), ResourceError> {
            Ok(())
        }

        fn destroy_command_allocator(&self, _id: CommandAllocatorId) -> Result<(), ResourceError> {
            Ok(())
        }
    }

    #[repr(C)]
    #[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
    struct SmallConstant {
        value: [f32; 4],
    }

    #[test]
    fn constant_stride_rounds_up_to_256() {
        let device = MockUploadDevice::new();
        let buffer =
            UploadBuffer::<SmallConstant>::new(&device, 4, UploadKind::Constant, "Test").unwrap();

        assert_eq!(buffer.element_stride(), 256);
        assert_eq!(buffer.element_count(), 4);
    }

    #[test]
    fn vertex_stride_is_unrounded() {
        let device = MockUploadDevice::new();
        let buffer =
            UploadBuffer::<SmallConstant>::new(&device, 4, UploadKind::Vertex, "Test").unwrap();

        assert_eq!(buffer.element_stride(), 16);
    }

    #[test]
    fn copy_data_round_trips_through_mapped_memory() {
        let device = MockUploadDevice::new();
        let buffer =
            UploadBuffer::<ObjectConstants>::new(&device, 8, UploadKind::Constant, "Objects")
                .unwrap();

        let mut constants = ObjectConstants::default();
        constants.world[3][0] = 7.5;
        buffer.copy_data(&device, 3, &constants).unwrap();

        let offset = buffer.element_offset(3).unwrap() as usize;
        let bytes = device.read(buffer.id(), offset, std::mem::size_of::<ObjectConstants>());
        assert_eq!(bytes, bytemuck::bytes_of(&constants));
    }

    #[test]
    fn copy_data_rejects_index_at_element_count() {
        let device = MockUploadDevice::new();
        let buffer =
            UploadBuffer::<SmallConstant>::new(&device, 16, UploadKind::Constant, "Test").unwrap();

        let result = buffer.copy_data(&device, 16, &SmallConstant { value: [0.0; 4] });
        assert!(matches!(
            result,
            Err(ResourceError::OutOfBounds {
                index: 16,
                count: 16
            })
        ));
    }

    #[test]
    fn element_offset_uses_aligned_stride() {
        let device = MockUploadDevice::new();
        let buffer =
            UploadBuffer::<SmallConstant>::new(&device, 4, UploadKind::Constant, "Test").unwrap();

        assert_eq!(buffer.element_offset(0).unwrap(), 0);
        assert_eq!(buffer.element_offset(2).unwrap(), 512);
        assert!(buffer.element_offset(4).is_err());
    }

    #[test]
    fn zero_element_count_is_rejected() {
        let device = MockUploadDevice::new();
        let result = UploadBuffer::<SmallConstant>::new(&device, 0, UploadKind::Constant, "Test");
        assert!(matches!(result, Err(ResourceError::InvalidDescriptor(_))));
    }
}

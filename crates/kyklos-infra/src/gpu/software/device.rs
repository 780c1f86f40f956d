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

//! The resource side of the software backend: upload regions and command
//! allocators.

use kyklos_core::gpu::api::{CommandAllocatorId, UploadBufferDescriptor, UploadBufferId};
use kyklos_core::gpu::error::ResourceError;
use kyklos_core::gpu::traits::UploadDevice;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// A persistently "mapped" upload allocation: the region exists, writable,
/// from creation until destruction, never partially mapped in between.
#[derive(Debug)]
struct UploadRegion {
    bytes: Vec<u8>,
    label: String,
}

#[derive(Debug, Default)]
struct AllocatorState {
    resets: u64,
}

/// An [`UploadDevice`] backing every allocation with plain host memory.
///
/// Because the "GPU" of the software backend shares the host address space,
/// upload writes are trivially coherent, exactly like a real upload heap.
/// The device additionally exposes read-back of upload regions, which real
/// upload heaps permit too; tests use it to verify what the GPU would see.
#[derive(Debug, Default)]
pub struct SoftwareDevice {
    regions: Mutex<HashMap<UploadBufferId, UploadRegion>>,
    allocators: Mutex<HashMap<CommandAllocatorId, AllocatorState>>,
    next_id: AtomicUsize,
    /// Remaining upload-heap budget in bytes, when one is imposed.
    budget: Mutex<Option<u64>>,
}

impl SoftwareDevice {
    pub(crate) fn new() -> Self {
        Self {
            next_id: AtomicUsize::new(1),
            ..Default::default()
        }
    }

    fn next_id(&self) -> usize {
        self.next_id.fetch_add(1, Ordering::Relaxed)
    }

    /// Imposes an upload-heap budget; further allocations fail once the
    /// budget is exhausted. Used to exercise fatal allocation paths.
    pub fn limit_upload_budget(&self, bytes: u64) {
        *self.budget.lock().expect("software device mutex poisoned") = Some(bytes);
    }

    /// Reads back a range of an upload region.
    ///
    /// # Errors
    ///
    /// [`ResourceError::InvalidHandle`] for an unknown buffer,
    /// [`ResourceError::BackendError`] for a range past the allocation.
    pub fn read_upload_buffer(
        &self,
        id: UploadBufferId,
        offset: u64,
        len: usize,
    ) -> Result<Vec<u8>, ResourceError> {
        let regions = self.regions.lock().expect("software device mutex poisoned");
        let region = regions.get(&id).ok_or(ResourceError::InvalidHandle)?;
        let start = offset as usize;
        let end = start
            .checked_add(len)
            .filter(|end| *end <= region.bytes.len())
            .ok_or_else(|| {
                ResourceError::BackendError(format!(
                    "read of {len} bytes at {offset} exceeds '{}' ({} bytes)",
                    region.label,
                    region.bytes.len()
                ))
            })?;
        Ok(region.bytes[start..end].to_vec())
    }

    /// How many times an allocator has been reset, or `None` for an unknown
    /// allocator.
    pub fn allocator_reset_count(&self, id: CommandAllocatorId) -> Option<u64> {
        self.allocators
            .lock()
            .expect("software device mutex poisoned")
            .get(&id)
            .map(|state| state.resets)
    }
}

impl UploadDevice for SoftwareDevice {
    fn create_upload_buffer(
        &self,
        descriptor: &UploadBufferDescriptor,
    ) -> Result<UploadBufferId, ResourceError> {
        let label = descriptor
            .label
            .as_deref()
            .unwrap_or("unnamed")
            .to_string();

        if descriptor.size == 0 {
            return Err(ResourceError::InvalidDescriptor(format!(
                "upload buffer '{label}' must have a non-zero size"
            )));
        }

        {
            let mut budget = self.budget.lock().expect("software device mutex poisoned");
            if let Some(remaining) = budget.as_mut() {
                if descriptor.size > *remaining {
                    return Err(ResourceError::AllocationFailed {
                        label,
                        size: descriptor.size,
                        reason: format!("upload budget exhausted ({remaining} bytes left)"),
                    });
                }
                *remaining -= descriptor.size;
            }
        }

        let id = UploadBufferId(self.next_id());
        self.regions
            .lock()
            .expect("software device mutex poisoned")
            .insert(
                id,
                UploadRegion {
                    bytes: vec![0; descriptor.size as usize],
                    label,
                },
            );
        log::trace!("SoftwareDevice: created upload buffer {id:?} ({} bytes)", descriptor.size);
        Ok(id)
    }

    fn write_upload_buffer(
        &self,
        id: UploadBufferId,
        offset: u64,
        data: &[u8],
    ) -> Result<(), ResourceError> {
        let mut regions = self.regions.lock().expect("software device mutex poisoned");
        let region = regions.get_mut(&id).ok_or(ResourceError::InvalidHandle)?;
        let start = offset as usize;
        let end = start
            .checked_add(data.len())
            .filter(|end| *end <= region.bytes.len())
            .ok_or_else(|| {
                ResourceError::BackendError(format!(
                    "write of {} bytes at {offset} exceeds '{}' ({} bytes)",
                    data.len(),
                    region.label,
                    region.bytes.len()
                ))
            })?;
        region.bytes[start..end].copy_from_slice(data);
        Ok(())
    }

    fn destroy_upload_buffer(&self, id: UploadBufferId) -> Result<(), ResourceError> {
        let region = self
            .regions
            .lock()
            .expect("software device mutex poisoned")
            .remove(&id)
            .ok_or(ResourceError::InvalidHandle)?;

        // Destroyed allocations refund an imposed budget.
        let mut budget = self.budget.lock().expect("software device mutex poisoned");
        if let Some(remaining) = budget.as_mut() {
            *remaining += region.bytes.len() as u64;
        }
        Ok(())
    }

    fn create_command_allocator(&self) -> Result<CommandAllocatorId, ResourceError> {
        let id = CommandAllocatorId(self.next_id());
        self.allocators
            .lock()
            .expect("software device mutex poisoned")
            .insert(id, AllocatorState::default());
        Ok(id)
    }

    fn reset_command_allocator(&self, id: CommandAllocatorId) -> Result<(), ResourceError> {
        let mut allocators = self
            .allocators
            .lock()
            .expect("software device mutex poisoned");
        let state = allocators.get_mut(&id).ok_or(ResourceError::InvalidHandle)?;
        state.resets += 1;
        Ok(())
    }

    fn destroy_command_allocator(&self, id: CommandAllocatorId) -> Result<(), ResourceError> {
        self.allocators
            .lock()
            .expect("software device mutex poisoned")
            .remove(&id)
            .map(|_| ())
            .ok_or(ResourceError::InvalidHandle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kyklos_core::gpu::api::UploadKind;
    use std::borrow::Cow;

    fn descriptor(size: u64) -> UploadBufferDescriptor<'static> {
        UploadBufferDescriptor {
            label: Some(Cow::Borrowed("Test")),
            size,
            kind: UploadKind::Constant,
        }
    }

    #[test]
    fn write_then_read_round_trips() {
        let device = SoftwareDevice::new();
        let id = device.create_upload_buffer(&descriptor(64)).unwrap();

        device.write_upload_buffer(id, 16, &[1, 2, 3, 4]).unwrap();

        assert_eq!(device.read_upload_buffer(id, 16, 4).unwrap(), vec![1, 2, 3, 4]);
        // Surrounding bytes stay zeroed.
        assert_eq!(device.read_upload_buffer(id, 15, 1).unwrap(), vec![0]);
        assert_eq!(device.read_upload_buffer(id, 20, 1).unwrap(), vec![0]);
    }

    #[test]
    fn writes_past_the_region_are_rejected() {
        let device = SoftwareDevice::new();
        let id = device.create_upload_buffer(&descriptor(8)).unwrap();

        let result = device.write_upload_buffer(id, 5, &[0; 4]);
        assert!(matches!(result, Err(ResourceError::BackendError(_))));
    }

    #[test]
    fn destroyed_buffers_become_invalid_handles() {
        let device = SoftwareDevice::new();
        let id = device.create_upload_buffer(&descriptor(8)).unwrap();

        device.destroy_upload_buffer(id).unwrap();
        assert!(matches!(
            device.write_upload_buffer(id, 0, &[0]),
            Err(ResourceError::InvalidHandle)
        ));
    }

    #[test]
    fn exhausted_budget_fails_allocation() {
        let device = SoftwareDevice::new();
        device.limit_upload_budget(100);

        let first = device.create_upload_buffer(&descriptor(64)).unwrap();
        let second = device.create_upload_buffer(&descriptor(64));
        assert!(matches!(
            second,
            Err(ResourceError::AllocationFailed { size: 64, .. })
        ));

        // Releasing the first allocation refunds the budget.
        device.destroy_upload_buffer(first).unwrap();
        assert!(device.create_upload_buffer(&descriptor(64)).is_ok());
    }

    #[test]
    fn allocator_resets_are_counted() {
        let device = SoftwareDevice::new();
        let id = device.create_command_allocator().unwrap();

        device.reset_command_allocator(id).unwrap();
        device.reset_command_allocator(id).unwrap();

        assert_eq!(device.allocator_reset_count(id), Some(2));
    }
}

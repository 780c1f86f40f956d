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

//! Render items and the dirty counters that propagate logical data changes
//! into every ring slot.
//!
//! Each ring slot owns an independent copy of the per-object and
//! per-material constants, so a single logical change (an object moved, a
//! material re-tinted) must be rewritten into N consecutive slots before it
//! is fully applied. The dirty counter makes that bookkeeping explicit:
//! because the ring visits all N slots exactly once per N frames, the
//! counter reaches zero exactly when every slot holds the fresh value.

use crate::frame::resource::FrameResource;
use crate::gpu::api::{MaterialConstants, ObjectConstants};
use crate::gpu::error::ResourceError;
use crate::gpu::traits::UploadDevice;

/// Counts how many ring slots still hold stale data after a logical change.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DirtyFrames {
    remaining: u32,
}

impl DirtyFrames {
    /// A counter with no pending writes.
    pub fn clean() -> Self {
        Self { remaining: 0 }
    }

    /// Marks every ring slot stale; called whenever the tracked data changes.
    pub fn mark(&mut self, frames_in_flight: u32) {
        self.remaining = frames_in_flight;
    }

    /// Notes that the current slot received the fresh value.
    pub fn note_written(&mut self) {
        debug_assert!(
            self.remaining > 0,
            "note_written called on a clean dirty counter"
        );
        self.remaining = self.remaining.saturating_sub(1);
    }

    /// Whether any slot still holds stale data.
    pub fn is_dirty(&self) -> bool {
        self.remaining > 0
    }

    /// How many slots still need a write.
    pub fn remaining(&self) -> u32 {
        self.remaining
    }
}

/// A single drawable item.
///
/// Render items hold only non-owning indices into external geometry and
/// material catalogs, plus the CPU-side value of their object constants and
/// the dirty counter that drives its propagation into the ring. No item owns
/// any frame resource.
#[derive(Debug)]
pub struct RenderItem {
    /// The CPU-side object constants, uploaded to each stale slot.
    object_constants: ObjectConstants,
    /// Index of this item's element in each slot's object constant buffer.
    pub constant_index: u32,
    /// Non-owning index into the external geometry catalog.
    pub mesh_index: u32,
    /// Non-owning index into the external material catalog.
    pub material_index: u32,
    dirty: DirtyFrames,
}

impl RenderItem {
    /// Creates an item whose constants still need to reach every slot.
    ///
    /// New items start fully dirty: no slot has observed them yet.
    pub fn new(
        constant_index: u32,
        mesh_index: u32,
        material_index: u32,
        frames_in_flight: u32,
    ) -> Self {
        let mut dirty = DirtyFrames::clean();
        dirty.mark(frames_in_flight);
        Self {
            object_constants: ObjectConstants::default(),
            constant_index,
            mesh_index,
            material_index,
            dirty,
        }
    }

    /// Replaces the item's object constants and marks every slot stale.
    pub fn set_object_constants(&mut self, value: ObjectConstants, frames_in_flight: u32) {
        self.object_constants = value;
        self.dirty.mark(frames_in_flight);
    }

    /// The item's current CPU-side object constants.
    pub fn object_constants(&self) -> &ObjectConstants {
        &self.object_constants
    }

    /// The item's dirty counter.
    pub fn dirty(&self) -> &DirtyFrames {
        &self.dirty
    }
}

/// A material whose constants propagate through the ring like render items.
#[derive(Debug)]
pub struct MaterialEntry {
    /// The CPU-side material constants, uploaded to each stale slot.
    constants: MaterialConstants,
    /// Index of this material's element in each slot's material buffer.
    pub constant_index: u32,
    dirty: DirtyFrames,
}

impl MaterialEntry {
    /// Creates a material that still needs to reach every slot.
    pub fn new(constant_index: u32, frames_in_flight: u32) -> Self {
        let mut dirty = DirtyFrames::clean();
        dirty.mark(frames_in_flight);
        Self {
            constants: MaterialConstants::default(),
            constant_index,
            dirty,
        }
    }

    /// Replaces the material constants and marks every slot stale.
    pub fn set_constants(&mut self, value: MaterialConstants, frames_in_flight: u32) {
        self.constants = value;
        self.dirty.mark(frames_in_flight);
    }

    /// The material's current CPU-side constants.
    pub fn constants(&self) -> &MaterialConstants {
        &self.constants
    }

    /// The material's dirty counter.
    pub fn dirty(&self) -> &DirtyFrames {
        &self.dirty
    }
}

/// Writes every dirty item's object constants into the current slot.
///
/// Called once per frame between `begin_frame` and `end_frame`. Each dirty
/// item is written whole into the slot (a slot never observes a partial
/// update) and its counter is decremented by exactly one.
///
/// Returns the number of items written.
///
/// # Errors
///
/// Propagates the first upload failure; remaining items keep their dirty
/// state and will be retried by a later frame only if the caller recovers,
/// which at this layer it does not.
pub fn upload_object_constants(
    device: &dyn UploadDevice,
    frame: &FrameResource,
    items: &mut [RenderItem],
) -> Result<u32, ResourceError> {
    let mut written = 0;
    for item in items.iter_mut().filter(|item| item.dirty.is_dirty()) {
        frame
            .object_constants()
            .copy_data(device, item.constant_index, &item.object_constants)?;
        item.dirty.note_written();
        written += 1;
    }
    Ok(written)
}

/// Writes every dirty material's constants into the current slot.
///
/// The material-side counterpart of [`upload_object_constants`].
///
/// # Errors
///
/// Propagates the first upload failure.
pub fn upload_material_constants(
    device: &dyn UploadDevice,
    frame: &FrameResource,
    materials: &mut [MaterialEntry],
) -> Result<u32, ResourceError> {
    let mut written = 0;
    for material in materials.iter_mut().filter(|m| m.dirty.is_dirty()) {
        frame
            .material_constants()
            .copy_data(device, material.constant_index, &material.constants)?;
        material.dirty.note_written();
        written += 1;
    }
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dirty_counter_counts_down_to_clean() {
        let mut dirty = DirtyFrames::clean();
        assert!(!dirty.is_dirty());

        dirty.mark(3);
        assert_eq!(dirty.remaining(), 3);

        dirty.note_written();
        dirty.note_written();
        assert!(dirty.is_dirty());

        dirty.note_written();
        assert!(!dirty.is_dirty());
    }

    #[test]
    fn remarking_resets_the_countdown() {
        let mut dirty = DirtyFrames::clean();
        dirty.mark(3);
        dirty.note_written();

        // A second change before convergence restarts propagation.
        dirty.mark(3);
        assert_eq!(dirty.remaining(), 3);
    }

    #[test]
    fn new_items_start_fully_dirty() {
        let item = RenderItem::new(0, 4, 2, 3);
        assert_eq!(item.dirty().remaining(), 3);
        assert_eq!(item.mesh_index, 4);
        assert_eq!(item.material_index, 2);
    }

    #[test]
    fn setting_constants_marks_every_slot_stale() {
        let mut item = RenderItem::new(0, 0, 0, 3);
        let mut constants = ObjectConstants::default();
        constants.world[3][1] = 2.0;

        item.set_object_constants(constants, 3);
        assert_eq!(item.dirty().remaining(), 3);
        assert_eq!(item.object_constants().world[3][1], 2.0);
    }
}

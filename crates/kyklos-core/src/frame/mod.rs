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

//! The N-buffered frame pipelining core.
//!
//! Each logical frame, the ring advances to the next slot, blocks (if
//! necessary) until the GPU has finished the fence value previously recorded
//! for that slot, lets the CPU rewrite that slot's upload buffers, and,
//! after submission, records and signals a fresh fence value into the slot.
//!
//! ```text
//! Frame N:     [Slot 0: GPU reads] ← submitted commands reference this slot
//! Frame N+1:   [Slot 1: CPU writes] → copy_data() updates this slot
//! Frame N+2:   [Slot 2: CPU writes] → GPU may still be on slot 0
//! Frame N+3:   [Slot 0: CPU writes] → only after slot 0's fence completed
//! ```
//!
//! No lock guards the upload memory: the fence wait enforces mutual exclusion
//! in time. A slot is written only by the CPU while `Writable`, and read only
//! by the GPU between its submission and its next reuse.

pub mod render_item;
pub mod resource;
pub mod ring;
pub mod settings;
pub mod stats;
pub mod upload_buffer;

pub use render_item::{
    upload_material_constants, upload_object_constants, DirtyFrames, MaterialEntry, RenderItem,
};
pub use resource::{FrameResource, FrameResourceDesc};
pub use ring::FrameRing;
pub use settings::{FrameSettings, DEFAULT_FRAMES_IN_FLIGHT};
pub use stats::FrameStats;
pub use upload_buffer::UploadBuffer;

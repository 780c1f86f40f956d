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

//! Defines the core architectural traits of the CPU/GPU handshake.
//!
//! This module contains the fundamental contracts that decouple the frame
//! ring from any specific graphics backend.
//!
//! - [`UploadDevice`]: The interface for creating and writing CPU-visible GPU resources.
//! - [`SubmitQueue`]: The interface for enqueueing work and fence signals.
//! - [`FrameFence`]: The interface for observing and waiting on GPU progress.

mod frame_fence;
mod submit_queue;
mod upload_device;

pub use self::frame_fence::FrameFence;
pub use self::submit_queue::SubmitQueue;
pub use self::upload_device::UploadDevice;

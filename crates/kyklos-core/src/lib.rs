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

//! # Kyklos Core
//!
//! Foundational crate containing the backend-agnostic GPU contracts and the
//! N-buffered frame pipelining core: a fixed ring of per-frame CPU-writable
//! resources, cycled under an explicit fence handshake so the CPU can prepare
//! frame `k + 1` while the GPU is still consuming frame `k`.

#![warn(missing_docs)]

pub mod frame;
pub mod gpu;

pub use frame::{FrameRing, FrameSettings, FrameStats};
pub use gpu::{FrameFence, SubmitQueue, UploadDevice};

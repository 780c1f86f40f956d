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

//! Provides the public, backend-agnostic GPU contracts for Kyklos.
//!
//! This module defines the "common language" between the frame pipelining
//! core and a concrete graphics backend. It contains the abstract `traits`
//! (like [`UploadDevice`]), data structures (like [`UploadBufferDescriptor`]),
//! and error types that form the stable, public-facing boundary.
//!
//! The module defines the 'what' of the handshake, while the 'how' is handled
//! by a concrete backend implementation in the `kyklos-infra` crate (e.g. the
//! software execution timeline) which implements these traits. The frame ring
//! in [`crate::frame`] uses these traits to do its work without knowing the
//! specifics of the underlying device.

pub mod api;
pub mod error;
pub mod traits;

// Re-export the most important traits and types for easier use.
pub use self::api::*;
pub use self::error::{FrameError, ResourceError, SyncError};
pub use self::traits::{FrameFence, SubmitQueue, UploadDevice};

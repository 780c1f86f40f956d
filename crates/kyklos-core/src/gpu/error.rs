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

//! Defines the hierarchy of error types for the frame pipelining core.

use crate::gpu::api::FenceValue;
use std::fmt;

/// An error related to the creation or use of a backend resource
/// (upload buffers, command allocators).
///
/// All variants are non-recoverable at this layer: allocation failures have
/// no degraded mode and contract violations indicate a caller bug. Nothing
/// here is retried internally.
#[derive(Debug)]
pub enum ResourceError {
    /// The backend could not allocate a resource. Fatal at construction time.
    AllocationFailed {
        /// The debug label of the resource that failed to allocate.
        label: String,
        /// The requested size in bytes, where applicable.
        size: u64,
        /// Detailed reason from the backend.
        reason: String,
    },
    /// An indexed access fell outside an upload buffer's element range.
    ///
    /// This is a contract violation on the caller's side, surfaced loudly
    /// rather than silently writing out of bounds.
    OutOfBounds {
        /// The rejected element index.
        index: u32,
        /// The buffer's element count.
        count: u32,
    },
    /// The handle or ID used to reference a resource is invalid.
    InvalidHandle,
    /// A descriptor failed validation before reaching the backend.
    InvalidDescriptor(String),
    /// An error originating from the specific backend implementation.
    BackendError(String),
}

impl fmt::Display for ResourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceError::AllocationFailed {
                label,
                size,
                reason,
            } => {
                write!(
                    f,
                    "Allocation of '{label}' ({size} bytes) failed: {reason}"
                )
            }
            ResourceError::OutOfBounds { index, count } => {
                write!(
                    f,
                    "Element index {index} is out of bounds for a buffer of {count} elements."
                )
            }
            ResourceError::InvalidHandle => write!(f, "Invalid resource handle or ID."),
            ResourceError::InvalidDescriptor(msg) => {
                write!(f, "Invalid resource descriptor: {msg}")
            }
            ResourceError::BackendError(msg) => {
                write!(f, "Backend-specific resource error: {msg}")
            }
        }
    }
}

impl std::error::Error for ResourceError {}

/// An error in the CPU/GPU synchronization protocol.
#[derive(Debug)]
pub enum SyncError {
    /// The execution timeline stopped advancing: a fence value was signaled
    /// but never reached within the configured bound.
    ///
    /// This is a catastrophic error, distinct from allocation failure, since
    /// recovery would require full device re-creation, which this layer
    /// deliberately does not attempt.
    DeviceLost {
        /// The fence value that was being waited for.
        target: FenceValue,
        /// The last value the timeline actually reached.
        completed: FenceValue,
    },
    /// An error originating from the queue or fence backend.
    BackendError(String),
}

impl fmt::Display for SyncError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyncError::DeviceLost { target, completed } => {
                write!(
                    f,
                    "The device was lost: the timeline stalled at fence value {completed} while waiting for {target}."
                )
            }
            SyncError::BackendError(msg) => {
                write!(f, "Backend-specific synchronization error: {msg}")
            }
        }
    }
}

impl std::error::Error for SyncError {}

/// A frame-level error produced while cycling the frame-resource ring.
#[derive(Debug)]
pub enum FrameError {
    /// A resource operation failed while preparing the frame.
    Resource(ResourceError),
    /// The synchronization protocol failed.
    Sync(SyncError),
}

impl fmt::Display for FrameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FrameError::Resource(err) => write!(f, "Frame resource operation failed: {err}"),
            FrameError::Sync(err) => write!(f, "Frame synchronization failed: {err}"),
        }
    }
}

impl std::error::Error for FrameError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            FrameError::Resource(err) => Some(err),
            FrameError::Sync(err) => Some(err),
        }
    }
}

impl From<ResourceError> for FrameError {
    fn from(err: ResourceError) -> Self {
        FrameError::Resource(err)
    }
}

impl From<SyncError> for FrameError {
    fn from(err: SyncError) -> Self {
        FrameError::Sync(err)
    }
}

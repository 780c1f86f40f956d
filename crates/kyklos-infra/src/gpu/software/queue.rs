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

//! The submission side of the software execution timeline.

use kyklos_core::gpu::api::{CommandBufferId, FenceValue};
use kyklos_core::gpu::error::SyncError;
use kyklos_core::gpu::traits::SubmitQueue;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

/// A unit of work consumed by the timeline worker, strictly in send order.
#[derive(Debug)]
pub(crate) enum Packet {
    /// A submitted batch of command buffers.
    Execute(Vec<CommandBufferId>),
    /// A fence signal, queue-ordered behind all prior packets.
    Signal(FenceValue),
    /// Terminates the worker.
    Shutdown,
}

/// A [`SubmitQueue`] feeding the software timeline.
///
/// Both operations are plain enqueues and never block the caller. In a
/// paused timeline, signals park in a step queue instead of completing, so
/// tests can advance the "GPU" one signal at a time.
#[derive(Debug, Clone)]
pub struct SoftwareQueue {
    sender: flume::Sender<Packet>,
    paused: bool,
    pending_signals: Arc<Mutex<VecDeque<FenceValue>>>,
    lost: Arc<AtomicBool>,
}

impl SoftwareQueue {
    pub(crate) fn new(
        sender: flume::Sender<Packet>,
        paused: bool,
        pending_signals: Arc<Mutex<VecDeque<FenceValue>>>,
        lost: Arc<AtomicBool>,
    ) -> Self {
        Self {
            sender,
            paused,
            pending_signals,
            lost,
        }
    }
}

impl SubmitQueue for SoftwareQueue {
    fn submit(&self, commands: &[CommandBufferId]) -> Result<(), SyncError> {
        self.sender
            .send(Packet::Execute(commands.to_vec()))
            .map_err(|_| SyncError::BackendError("software timeline worker has shut down".into()))
    }

    fn signal(&self, value: FenceValue) -> Result<(), SyncError> {
        // A lost device accepts the signal but the timeline never reaches it.
        if self.lost.load(Ordering::SeqCst) {
            log::trace!("SoftwareQueue: dropping signal {value} on lost device");
            return Ok(());
        }

        if self.paused {
            self.pending_signals
                .lock()
                .expect("software queue mutex poisoned")
                .push_back(value);
            return Ok(());
        }

        self.sender
            .send(Packet::Signal(value))
            .map_err(|_| SyncError::BackendError("software timeline worker has shut down".into()))
    }
}

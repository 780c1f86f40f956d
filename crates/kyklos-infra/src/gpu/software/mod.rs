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

//! A software GPU: device, queue and fence over a simulated execution
//! timeline.
//!
//! A dedicated worker thread consumes submitted packets strictly in order
//! (work batches first, then the fence signal that follows them), so the
//! observable fence behavior matches a real single-queue GPU: a completed
//! value of `v` proves everything submitted up to and including the work
//! tagged `v` has finished.
//!
//! Two execution modes exist:
//!
//! - **Immediate**: the worker advances the timeline on its own, optionally
//!   sleeping a configured latency per batch to simulate GPU execution time.
//! - **Paused**: signals park in a step queue and the timeline only advances
//!   when [`SoftwareGpu::complete_next`] is called, giving tests full
//!   control over "how far the GPU has gotten".

pub mod device;
pub mod fence;
pub mod queue;
mod timeline;

pub use device::SoftwareDevice;
pub use fence::SoftwareFence;
pub use queue::SoftwareQueue;

use crate::gpu::software::queue::Packet;
use crate::gpu::software::timeline::TimelineState;
use kyklos_core::gpu::api::FenceValue;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::Duration;

/// Configuration of the software GPU.
#[derive(Debug, Clone, Default)]
pub struct SoftwareGpuDesc {
    /// Simulated execution time per submitted batch.
    pub execution_latency: Duration,
    /// When `true`, the timeline only advances through
    /// [`SoftwareGpu::complete_next`].
    pub paused: bool,
}

/// The bundled software backend: one device, one queue, one fence, one
/// execution timeline.
///
/// Dropping the bundle shuts the worker thread down; in-flight packets are
/// drained first, so a flushed queue tears down cleanly.
#[derive(Debug)]
pub struct SoftwareGpu {
    device: SoftwareDevice,
    queue: SoftwareQueue,
    fence: SoftwareFence,
    timeline: Arc<TimelineState>,
    pending_signals: Arc<Mutex<VecDeque<FenceValue>>>,
    lost: Arc<AtomicBool>,
    sender: flume::Sender<Packet>,
    worker: Option<JoinHandle<()>>,
}

impl SoftwareGpu {
    /// Spawns the timeline worker and assembles the backend.
    pub fn new(desc: SoftwareGpuDesc) -> Self {
        let timeline = Arc::new(TimelineState::default());
        let pending_signals = Arc::new(Mutex::new(VecDeque::new()));
        let lost = Arc::new(AtomicBool::new(false));
        let (sender, receiver) = flume::unbounded::<Packet>();

        let worker_timeline = Arc::clone(&timeline);
        let worker_lost = Arc::clone(&lost);
        let latency = desc.execution_latency;
        let worker = std::thread::Builder::new()
            .name("kyklos-gpu-timeline".to_string())
            .spawn(move || {
                while let Ok(packet) = receiver.recv() {
                    match packet {
                        Packet::Execute(commands) => {
                            if worker_lost.load(Ordering::SeqCst) {
                                continue;
                            }
                            if !latency.is_zero() {
                                std::thread::sleep(latency);
                            }
                            log::trace!(
                                "software timeline: executed a batch of {} command buffers",
                                commands.len()
                            );
                        }
                        Packet::Signal(value) => {
                            if worker_lost.load(Ordering::SeqCst) {
                                continue;
                            }
                            worker_timeline.publish(value);
                        }
                        Packet::Shutdown => break,
                    }
                }
            })
            .expect("failed to spawn the software GPU timeline thread");

        let queue = SoftwareQueue::new(
            sender.clone(),
            desc.paused,
            Arc::clone(&pending_signals),
            Arc::clone(&lost),
        );
        let fence = SoftwareFence::new(Arc::clone(&timeline));

        Self {
            device: SoftwareDevice::new(),
            queue,
            fence,
            timeline,
            pending_signals,
            lost,
            sender,
            worker: Some(worker),
        }
    }

    /// An immediate-mode backend with no simulated latency.
    pub fn immediate() -> Self {
        Self::new(SoftwareGpuDesc::default())
    }

    /// A paused backend: the timeline advances only by explicit stepping.
    pub fn paused() -> Self {
        Self::new(SoftwareGpuDesc {
            paused: true,
            ..Default::default()
        })
    }

    /// The backend's upload device.
    pub fn device(&self) -> &SoftwareDevice {
        &self.device
    }

    /// The backend's submission queue.
    pub fn queue(&self) -> &SoftwareQueue {
        &self.queue
    }

    /// The backend's fence.
    pub fn fence(&self) -> &SoftwareFence {
        &self.fence
    }

    /// Completes the oldest parked signal of a paused timeline, waking any
    /// thread waiting on it. Returns the completed value, or `None` when
    /// nothing is parked.
    pub fn complete_next(&self) -> Option<FenceValue> {
        let value = self
            .pending_signals
            .lock()
            .expect("software gpu mutex poisoned")
            .pop_front()?;
        self.timeline.publish(value);
        Some(value)
    }

    /// Completes every parked signal, returning how many were completed.
    pub fn complete_all(&self) -> usize {
        let mut completed = 0;
        while self.complete_next().is_some() {
            completed += 1;
        }
        completed
    }

    /// Simulates losing the device: from here on the timeline never
    /// advances, so every signaled value is signaled-but-never-reached.
    pub fn simulate_device_loss(&self) {
        self.lost.store(true, Ordering::SeqCst);
        log::warn!("SoftwareGpu: simulating device loss; the timeline is frozen");
    }
}

impl Drop for SoftwareGpu {
    fn drop(&mut self) {
        // The worker drains queued packets before honoring the shutdown.
        let _ = self.sender.send(Packet::Shutdown);
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                log::error!("SoftwareGpu: timeline worker panicked during shutdown");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kyklos_core::gpu::api::CommandBufferId;
    use kyklos_core::gpu::error::SyncError;
    use kyklos_core::gpu::traits::{FrameFence, SubmitQueue};

    #[test]
    fn immediate_mode_reaches_signaled_values() {
        let gpu = SoftwareGpu::immediate();

        gpu.queue().submit(&[CommandBufferId(1)]).unwrap();
        gpu.queue().signal(1).unwrap();
        gpu.fence().wait_until(1, None).unwrap();

        assert_eq!(gpu.fence().completed_value(), 1);
    }

    #[test]
    fn paused_mode_parks_signals_until_stepped() {
        let gpu = SoftwareGpu::paused();

        gpu.queue().signal(1).unwrap();
        gpu.queue().signal(2).unwrap();
        assert_eq!(gpu.fence().completed_value(), 0);

        assert_eq!(gpu.complete_next(), Some(1));
        assert_eq!(gpu.fence().completed_value(), 1);

        assert_eq!(gpu.complete_all(), 1);
        assert_eq!(gpu.fence().completed_value(), 2);
        assert_eq!(gpu.complete_next(), None);
    }

    #[test]
    fn lost_device_swallows_signals() {
        let gpu = SoftwareGpu::immediate();
        gpu.simulate_device_loss();

        gpu.queue().signal(1).unwrap();

        let result = gpu.fence().wait_until(1, Some(Duration::from_millis(20)));
        assert!(matches!(result, Err(SyncError::DeviceLost { target: 1, .. })));
    }

    #[test]
    fn queue_reports_shutdown_after_drop() {
        let gpu = SoftwareGpu::immediate();
        let queue = gpu.queue().clone();
        drop(gpu);

        let result = queue.submit(&[CommandBufferId(1)]);
        assert!(matches!(result, Err(SyncError::BackendError(_))));
    }
}

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

//! End-to-end tests of the frame pipeline over the software backend: the
//! full handshake between the ring, the submission queue and the fence,
//! including real cross-thread blocking.

use anyhow::Result;
use kyklos_core::frame::{
    upload_object_constants, FrameRing, FrameSettings, RenderItem, UploadBuffer,
};
use kyklos_core::frame::resource::FrameResourceDesc;
use kyklos_core::gpu::api::{
    CommandBufferId, MaterialConstants, ObjectConstants, UploadBufferId, UploadKind,
};
use kyklos_core::gpu::error::{FrameError, ResourceError, SyncError};
use kyklos_core::gpu::traits::FrameFence;
use kyklos_infra::{SoftwareGpu, SoftwareGpuDesc};
use std::collections::HashMap;
use std::time::Duration;

fn init_logs() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn small_settings() -> FrameSettings {
    FrameSettings {
        resources: FrameResourceDesc {
            pass_count: 1,
            object_count: 8,
            material_count: 4,
            dynamic_vertex_count: 0,
        },
        ..Default::default()
    }
}

#[test]
fn fresh_ring_runs_its_first_frames_without_stalling() -> Result<()> {
    // Even against a GPU that has completed nothing, the first
    // N frames find never-submitted slots and sail through.
    let gpu = SoftwareGpu::paused();
    let mut ring = FrameRing::new(gpu.device(), &small_settings())?;

    for frame in 0..3 {
        ring.begin_frame(gpu.device(), gpu.fence())?;
        assert!(ring.current().is_ready(gpu.fence()));
        ring.end_frame(gpu.queue(), &[CommandBufferId(frame)])?;
    }

    assert_eq!(ring.stats().stalled_frames, 0);
    assert_eq!(gpu.fence().completed_value(), 0);
    Ok(())
}

#[test]
fn fourth_frame_parks_until_the_timeline_is_stepped() -> Result<()> {
    // The 4th frame revisits the first slot, whose fence value
    // the paused timeline has not reached; begin_frame must park the
    // submission thread until the simulated GPU advances.
    init_logs();
    let gpu = SoftwareGpu::paused();
    let mut ring = FrameRing::new(gpu.device(), &small_settings())?;

    for frame in 0..3 {
        ring.begin_frame(gpu.device(), gpu.fence())?;
        ring.end_frame(gpu.queue(), &[CommandBufferId(frame)])?;
    }

    std::thread::scope(|scope| -> Result<()> {
        scope.spawn(|| {
            std::thread::sleep(Duration::from_millis(40));
            gpu.complete_next();
        });

        // Parks here until the helper thread steps the timeline.
        ring.begin_frame(gpu.device(), gpu.fence())?;
        Ok(())
    })?;

    assert_eq!(gpu.fence().completed_value(), 1);
    assert!(ring.current().is_ready(gpu.fence()));
    assert_eq!(ring.stats().stalled_frames, 1);
    assert!(ring.stats().stall_time_ms > 0.0);

    ring.end_frame(gpu.queue(), &[CommandBufferId(3)])?;
    Ok(())
}

#[test]
fn a_change_propagates_one_slot_at_a_time() -> Result<()> {
    // After an object moves, its dirty counter walks 3, 2, 1, 0 while the
    // per-slot buffers pick up the new value one whole element at a time.
    let gpu = SoftwareGpu::immediate();
    let mut ring = FrameRing::new(gpu.device(), &small_settings())?;
    let mut items = vec![RenderItem::new(0, 0, 0, 3)];

    // Warm-up: let the initial constants reach every slot, and remember
    // which upload buffer belongs to which slot.
    let mut slot_buffers: HashMap<usize, UploadBufferId> = HashMap::new();
    for frame in 0..3 {
        ring.begin_frame(gpu.device(), gpu.fence())?;
        upload_object_constants(gpu.device(), ring.current(), &mut items)?;
        slot_buffers.insert(ring.current_index(), ring.current().object_constants().id());
        ring.end_frame(gpu.queue(), &[CommandBufferId(frame)])?;
    }
    assert!(!items[0].dirty().is_dirty());

    let old_bytes = bytemuck::bytes_of(&ObjectConstants::default()).to_vec();
    let mut moved = ObjectConstants::default();
    moved.world[3][0] = 42.0;
    let new_bytes = bytemuck::bytes_of(&moved).to_vec();

    items[0].set_object_constants(moved, 3);
    assert_eq!(items[0].dirty().remaining(), 3);

    let element_size = std::mem::size_of::<ObjectConstants>();
    for step in 1..=3u32 {
        ring.begin_frame(gpu.device(), gpu.fence())?;
        upload_object_constants(gpu.device(), ring.current(), &mut items)?;
        ring.end_frame(gpu.queue(), &[CommandBufferId(u64::from(step) + 3)])?;

        assert_eq!(items[0].dirty().remaining(), 3 - step);

        // Every slot is either fully old or fully new, never partially
        // rewritten, and exactly `step` slots hold the new value.
        let mut fresh = 0;
        for buffer in slot_buffers.values() {
            let bytes = gpu.device().read_upload_buffer(*buffer, 0, element_size)?;
            if bytes == new_bytes {
                fresh += 1;
            } else {
                assert_eq!(bytes, old_bytes);
            }
        }
        assert_eq!(fresh, step);
    }

    Ok(())
}

#[test]
fn out_of_range_copy_is_rejected() -> Result<()> {
    // An index equal to the element count must be rejected, not
    // silently written past the allocation.
    let gpu = SoftwareGpu::immediate();
    let buffer = UploadBuffer::<MaterialConstants>::new(
        gpu.device(),
        4,
        UploadKind::Constant,
        "Materials",
    )?;

    let result = buffer.copy_data(gpu.device(), 4, &MaterialConstants::default());
    assert!(matches!(
        result,
        Err(ResourceError::OutOfBounds { index: 4, count: 4 })
    ));

    buffer.destroy(gpu.device());
    Ok(())
}

#[test]
fn upload_writes_round_trip_unchanged() -> Result<()> {
    // What the CPU writes at an index is exactly what the GPU would read
    // back from the mapped region.
    let gpu = SoftwareGpu::immediate();
    let buffer = UploadBuffer::<MaterialConstants>::new(
        gpu.device(),
        8,
        UploadKind::Constant,
        "Materials",
    )?;

    let value = MaterialConstants {
        base_color: [0.2, 0.4, 0.6, 1.0],
        emissive: [0.0, 0.0, 0.0, 2.5],
        params: [0.9, 0.1, 0.0, 0.0],
    };
    buffer.copy_data(gpu.device(), 5, &value)?;

    let offset = buffer.element_offset(5)?;
    let bytes = gpu.device().read_upload_buffer(
        buffer.id(),
        offset,
        std::mem::size_of::<MaterialConstants>(),
    )?;
    assert_eq!(bytes, bytemuck::bytes_of(&value));

    buffer.destroy(gpu.device());
    Ok(())
}

#[test]
fn hung_timeline_is_surfaced_as_device_loss() -> Result<()> {
    // A fence value signaled on a lost device is never reached; with a
    // bounded wait the stall becomes a fatal, diagnosable error instead of
    // an indefinitely hung frame.
    init_logs();
    let gpu = SoftwareGpu::immediate();
    gpu.simulate_device_loss();

    let settings = FrameSettings {
        wait_timeout_ms: Some(50),
        ..small_settings()
    };
    let mut ring = FrameRing::new(gpu.device(), &settings)?;

    for frame in 0..3 {
        ring.begin_frame(gpu.device(), gpu.fence())?;
        ring.end_frame(gpu.queue(), &[CommandBufferId(frame)])?;
    }

    let result = ring.begin_frame(gpu.device(), gpu.fence());
    match result {
        Err(FrameError::Sync(SyncError::DeviceLost { target, completed })) => {
            assert_eq!(target, 1);
            assert_eq!(completed, 0);
        }
        other => panic!("expected DeviceLost, got {other:?}"),
    }
    Ok(())
}

#[test]
fn allocation_failure_is_fatal_at_construction() {
    let gpu = SoftwareGpu::immediate();
    gpu.device().limit_upload_budget(1024);

    let result = FrameRing::new(gpu.device(), &small_settings());
    assert!(matches!(
        result,
        Err(ResourceError::AllocationFailed { .. })
    ));
}

#[test]
fn sustained_pipelining_against_a_slower_gpu() -> Result<()> {
    // The CPU outruns a GPU that takes 1 ms per frame; the ring absorbs the
    // backlog, stalls instead of overrunning, and a final flush drains
    // everything.
    let gpu = SoftwareGpu::new(SoftwareGpuDesc {
        execution_latency: Duration::from_millis(1),
        ..Default::default()
    });
    let mut ring = FrameRing::new(gpu.device(), &small_settings())?;
    let mut items: Vec<RenderItem> = (0..8).map(|i| RenderItem::new(i, i, 0, 3)).collect();

    for frame in 0..20 {
        ring.begin_frame(gpu.device(), gpu.fence())?;
        assert!(ring.current().is_ready(gpu.fence()));
        upload_object_constants(gpu.device(), ring.current(), &mut items)?;
        ring.end_frame(gpu.queue(), &[CommandBufferId(frame)])?;
    }

    ring.flush(gpu.queue(), gpu.fence())?;
    assert_eq!(gpu.fence().completed_value(), 21);
    assert_eq!(ring.stats().frame_number, 20);
    assert_eq!(ring.stats().last_signaled_fence, 21);

    // With the queue drained, teardown is safe.
    ring.destroy(gpu.device());
    Ok(())
}

#[test]
fn each_slot_allocator_is_reset_on_reuse() -> Result<()> {
    let gpu = SoftwareGpu::immediate();
    let mut ring = FrameRing::new(gpu.device(), &small_settings())?;

    for frame in 0..7 {
        ring.begin_frame(gpu.device(), gpu.fence())?;
        ring.end_frame(gpu.queue(), &[CommandBufferId(frame)])?;
    }

    // Frame 7 used slot 1 for the third time (frames 1, 4 and 7).
    let allocator = ring.current().command_allocator();
    assert_eq!(gpu.device().allocator_reset_count(allocator), Some(3));
    Ok(())
}

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

// Kyklos Sandbox
// Demo binary driving the frame ring over the software GPU

use anyhow::Result;
use kyklos_core::frame::resource::FrameResourceDesc;
use kyklos_core::frame::{
    upload_material_constants, upload_object_constants, FrameRing, FrameSettings, MaterialEntry,
    RenderItem,
};
use kyklos_core::gpu::api::{
    CommandBufferId, FrameVertex, MaterialConstants, ObjectConstants, PassConstants,
};
use kyklos_infra::{SoftwareGpu, SoftwareGpuDesc};
use serde::Deserialize;
use std::time::{Duration, Instant};

/// Sandbox configuration, loadable from `sandbox.json`.
#[derive(Debug, Deserialize)]
#[serde(default)]
struct SandboxConfig {
    /// How many frames to run.
    frames: u64,
    /// Simulated GPU execution time per frame, in microseconds.
    gpu_latency_us: u64,
    /// Frame ring settings.
    ring: FrameSettings,
}

impl Default for SandboxConfig {
    fn default() -> Self {
        Self {
            frames: 240,
            gpu_latency_us: 1500,
            ring: FrameSettings {
                // Demonstrate the recommended divergence from the classic
                // pattern: bound the fence wait and treat expiry as fatal.
                wait_timeout_ms: Some(2000),
                resources: FrameResourceDesc {
                    pass_count: 1,
                    object_count: 64,
                    material_count: 8,
                    dynamic_vertex_count: 96,
                },
                ..Default::default()
            },
        }
    }
}

fn load_config() -> SandboxConfig {
    match std::fs::read_to_string("sandbox.json") {
        Ok(content) => match serde_json::from_str(&content) {
            Ok(config) => {
                log::info!("Loaded configuration from sandbox.json");
                config
            }
            Err(e) => {
                log::warn!("Failed to parse sandbox.json: {e}. Using defaults.");
                SandboxConfig::default()
            }
        },
        Err(_) => {
            log::info!("sandbox.json not found, using defaults");
            SandboxConfig::default()
        }
    }
}

fn translation(x: f32, y: f32, z: f32) -> ObjectConstants {
    let mut constants = ObjectConstants::default();
    constants.world[3] = [x, y, z, 1.0];
    constants
}

fn main() -> Result<()> {
    env_logger::init();
    let config = load_config();
    log::info!(
        "Sandbox: {} frames over a software GPU with {} us of latency per frame",
        config.frames,
        config.gpu_latency_us
    );

    let gpu = SoftwareGpu::new(SoftwareGpuDesc {
        execution_latency: Duration::from_micros(config.gpu_latency_us),
        ..Default::default()
    });

    let mut ring = FrameRing::new(gpu.device(), &config.ring)?;
    let frames_in_flight = ring.frames_in_flight() as u32;

    // An 8x4 grid of items sharing a handful of materials.
    let mut items: Vec<RenderItem> = (0..32)
        .map(|i| {
            let mut item = RenderItem::new(i, i % 4, i % 8, frames_in_flight);
            let x = (i % 8) as f32 * 2.0;
            let z = (i / 8) as f32 * 2.0;
            item.set_object_constants(translation(x, 0.0, z), frames_in_flight);
            item
        })
        .collect();

    let mut materials: Vec<MaterialEntry> = (0..8)
        .map(|i| {
            let mut material = MaterialEntry::new(i, frames_in_flight);
            material.set_constants(
                MaterialConstants {
                    base_color: [i as f32 / 8.0, 0.4, 1.0 - i as f32 / 8.0, 1.0],
                    ..Default::default()
                },
                frames_in_flight,
            );
            material
        })
        .collect();

    let vertex_count = config.ring.resources.dynamic_vertex_count;
    let move_at = config.frames / 2;
    let started = Instant::now();
    let mut last_frame = started;

    for frame in 0..config.frames {
        ring.begin_frame(gpu.device(), gpu.fence())?;

        let now = Instant::now();
        let pass = PassConstants {
            time_seconds: started.elapsed().as_secs_f32(),
            delta_seconds: now.duration_since(last_frame).as_secs_f32(),
            ..Default::default()
        };
        last_frame = now;

        let slot = ring.current();
        slot.pass_constants().copy_data(gpu.device(), 0, &pass)?;

        // Halfway through, shove one item across the grid and watch its
        // change ripple through the ring slots.
        if frame == move_at {
            items[0].set_object_constants(translation(20.0, 0.0, 0.0), frames_in_flight);
            log::info!(
                "Frame {frame}: moved item 0, dirty in {frames_in_flight} slots"
            );
        }
        if frame > move_at && items[0].dirty().is_dirty() {
            log::debug!(
                "Frame {frame}: item 0 still dirty in {} slots",
                items[0].dirty().remaining()
            );
        }

        let objects_written = upload_object_constants(gpu.device(), slot, &mut items)?;
        upload_material_constants(gpu.device(), slot, &mut materials)?;

        // Rewrite the procedural ripple geometry for this slot.
        if let Some(vertices) = slot.dynamic_vertices() {
            let time = pass.time_seconds;
            for i in 0..vertex_count {
                let x = i as f32 * 0.25;
                let vertex = FrameVertex {
                    position: [x, (x + time * 4.0).sin() * 0.5, 0.0],
                    color: [0.2, 0.6, 1.0],
                };
                vertices.copy_data(gpu.device(), i, &vertex)?;
            }
        }

        log::trace!("Frame {frame}: {objects_written} object constants uploaded");
        ring.end_frame(gpu.queue(), &[CommandBufferId(frame + 1)])?;
    }

    ring.flush(gpu.queue(), gpu.fence())?;

    let stats = ring.stats();
    log::info!(
        "Done: {} frames in {:?}; {} stalled for {:.2} ms total; last fence {}",
        stats.frame_number,
        started.elapsed(),
        stats.stalled_frames,
        stats.stall_time_ms,
        stats.last_signaled_fence
    );

    ring.destroy(gpu.device());
    Ok(())
}

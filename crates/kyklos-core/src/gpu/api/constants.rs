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

//! GPU-side constant layouts uploaded once per frame slot.
//!
//! These structures are designed to be copied directly into upload-heap
//! memory; their layout must match the constant block declarations consumed
//! by shaders. Constant buffers require 16-byte field alignment, so vector
//! fields carry explicit padding components.

/// The 4x4 identity matrix, row-major.
pub const IDENTITY_MATRIX: [[f32; 4]; 4] = [
    [1.0, 0.0, 0.0, 0.0],
    [0.0, 1.0, 0.0, 0.0],
    [0.0, 0.0, 1.0, 0.0],
    [0.0, 0.0, 0.0, 1.0],
];

/// Per-pass constants, rewritten every frame.
///
/// One element per render pass; pass constants carry no dirty counter since
/// camera and timing data changes every frame anyway.
#[repr(C, align(16))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PassConstants {
    /// The combined view-projection matrix (projection * view).
    pub view_projection: [[f32; 4]; 4],
    /// The camera's position in world space.
    /// Note: The fourth component is padding for alignment.
    pub eye_position: [f32; 4],
    /// Total elapsed time in seconds.
    pub time_seconds: f32,
    /// Time since the previous frame in seconds.
    pub delta_seconds: f32,
    /// Padding for 16-byte alignment.
    pub _padding: [f32; 2],
}

impl Default for PassConstants {
    fn default() -> Self {
        Self {
            view_projection: IDENTITY_MATRIX,
            eye_position: [0.0; 4],
            time_seconds: 0.0,
            delta_seconds: 0.0,
            _padding: [0.0; 2],
        }
    }
}

// Ensure the struct can be safely cast to bytes for GPU upload
unsafe impl bytemuck::Pod for PassConstants {}
unsafe impl bytemuck::Zeroable for PassConstants {}

/// Per-object constants: one element per render item, per frame slot.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ObjectConstants {
    /// The object's world matrix (local to world space).
    pub world: [[f32; 4]; 4],
    /// The inverse-transpose of the world matrix, for normal transformation.
    pub normal_matrix: [[f32; 4]; 4],
}

impl Default for ObjectConstants {
    fn default() -> Self {
        Self {
            world: IDENTITY_MATRIX,
            normal_matrix: IDENTITY_MATRIX,
        }
    }
}

/// Per-material constants: one element per material, per frame slot.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct MaterialConstants {
    /// Base color (rgba).
    pub base_color: [f32; 4],
    /// Emissive color (rgb) and intensity (a).
    pub emissive: [f32; 4],
    /// Roughness (x) and metallic (y), with padding (zw).
    pub params: [f32; 4],
}

impl Default for MaterialConstants {
    fn default() -> Self {
        Self {
            base_color: [1.0, 1.0, 1.0, 1.0],
            emissive: [0.0; 4],
            params: [0.5, 0.0, 0.0, 0.0],
        }
    }
}

/// A vertex rewritten by the CPU every frame (e.g. procedurally animated
/// geometry), stored in a frame slot's dynamic vertex buffer.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct FrameVertex {
    /// Position in local space.
    pub position: [f32; 3],
    /// Vertex color.
    pub color: [f32; 3],
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pass_constants_size() {
        // Mat4 = 64 bytes, Vec4 = 16 bytes, scalars + padding = 16 bytes
        assert_eq!(std::mem::size_of::<PassConstants>(), 96);
    }

    #[test]
    fn test_pass_constants_alignment() {
        // PassConstants should be aligned to 16 bytes for GPU compatibility
        assert_eq!(std::mem::align_of::<PassConstants>(), 16);
    }

    #[test]
    fn test_object_constants_size() {
        assert_eq!(std::mem::size_of::<ObjectConstants>(), 128);
    }

    #[test]
    fn test_material_constants_size() {
        assert_eq!(std::mem::size_of::<MaterialConstants>(), 48);
    }

    #[test]
    fn test_frame_vertex_size() {
        assert_eq!(std::mem::size_of::<FrameVertex>(), 24);
    }

    #[test]
    fn test_constants_bytemuck() {
        let constants = ObjectConstants::default();
        let data_array = [constants];
        let bytes: &[u8] = bytemuck::cast_slice(&data_array);
        assert_eq!(bytes.len(), std::mem::size_of::<ObjectConstants>());
    }
}

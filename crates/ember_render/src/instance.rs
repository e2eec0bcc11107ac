//! GPU-visible POD layouts: the indirect draw command, per-instance data,
//! per-node transforms, and per-material scalar records.
//!
//! Field order and padding follow the std430-compatible layouts; every type
//! here is `bytemuck::Pod` so the draw list can upload its vectors as raw
//! bytes without a per-element copy loop.

use bytemuck::{Pod, Zeroable};

/// Mirrors the standard 20-byte Vulkan `VkDrawIndexedIndirectCommand`.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Pod, Zeroable)]
pub struct DrawIndexedIndirectCommand {
    pub index_count: u32,
    pub instance_count: u32,
    pub first_index: u32,
    pub vertex_offset: i32,
    pub first_instance: u32,
}

/// 64 bytes, std430-compatible.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct InstanceData {
    pub tint: [f32; 4],
    /// `(metallic, roughness, flexibility, anchor_height)`.
    pub material: [f32; 4],
    /// `(albedo_idx, normal_idx, transform_idx, bone_offset)`.
    pub payload: [u32; 4],
    /// `(upper_id, lower_id, 0, 0)`.
    pub selection: [u32; 4],
}

/// 128 bytes: model and normal matrices, column-major.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct TransformData {
    pub model: [[f32; 4]; 4],
    pub normal: [[f32; 4]; 4],
}

/// A packed per-material record referencing image-array indices, deduped by
/// material identity within a frame.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct MaterialRecord {
    pub albedo_index: u32,
    pub normal_index: u32,
    pub metallic: f32,
    pub roughness: f32,
    pub flexibility: f32,
    pub anchor_height: f32,
    /// Keeps the record's size a multiple of 16 bytes.
    pub _pad: [u32; 2],
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::mem::size_of;

    #[test]
    fn layouts_match_the_documented_byte_sizes() {
        assert_eq!(size_of::<DrawIndexedIndirectCommand>(), 20);
        assert_eq!(size_of::<InstanceData>(), 64);
        assert_eq!(size_of::<TransformData>(), 128);
    }
}

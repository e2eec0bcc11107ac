//! The material-keyed draw list.
//!
//! Grounded in `libsbx-models/libsbx/models/material_draw_list.hpp`'s
//! `basic_material_draw_list`: per `(pipeline, material_key)`, submitted
//! submesh instances are grouped by mesh and submesh index, then built into
//! a contiguous run of indirect draw commands with an accumulating
//! `first_instance`, and published per bucket (opaque/transparent/shadow)
//! for whichever buckets that material contributes to.

use bitflags::bitflags;
use rustc_hash::FxHashMap;

use crate::buffer::{plan_growth, BufferLen, GrowthPlan};
use crate::instance::{DrawIndexedIndirectCommand, InstanceData, MaterialRecord, TransformData};

pub type MeshId = u64;
pub type PipelineKey = u64;
/// An opaque hashable identifier grouping instances that share pipeline,
/// textures, and scalar parameters. Callers own how they derive it (e.g.
/// from an asset's material UUID); the draw list only ever hashes and
/// compares it.
pub type MaterialKey = u64;

bitflags! {
    /// Which buckets a material contributes draws to, derived by the caller
    /// from alpha-mode and feature flags before submission.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct BucketMask: u8 {
        const OPAQUE = 0b001;
        const TRANSPARENT = 0b010;
        const SHADOW = 0b100;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Bucket {
    Opaque,
    Transparent,
    Shadow,
}

impl Bucket {
    pub const ALL: [Bucket; 3] = [Bucket::Opaque, Bucket::Transparent, Bucket::Shadow];

    fn mask(self) -> BucketMask {
        match self {
            Bucket::Opaque => BucketMask::OPAQUE,
            Bucket::Transparent => BucketMask::TRANSPARENT,
            Bucket::Shadow => BucketMask::SHADOW,
        }
    }

    fn index(self) -> usize {
        match self {
            Bucket::Opaque => 0,
            Bucket::Transparent => 1,
            Bucket::Shadow => 2,
        }
    }
}

/// A contiguous slice `{offset, count}` of a draw-command buffer
/// contributed by one mesh.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DrawRange {
    pub offset: u32,
    pub count: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RangeRef {
    pub mesh_id: MeshId,
    pub range: DrawRange,
}

/// Everything published for one `(pipeline, material_key)` pair within a
/// bucket: its own draw-command and instance-data buffers, and the per-mesh
/// ranges into them.
#[derive(Debug, Clone, Default)]
pub struct PipelineBucketData {
    pub pipeline_key: PipelineKey,
    pub draw_commands: Vec<DrawIndexedIndirectCommand>,
    pub instance_data: Vec<InstanceData>,
    pub ranges: Vec<RangeRef>,
}

/// What a scene-query collect phase submits per submesh instance.
pub struct Submission {
    pub pipeline_key: PipelineKey,
    pub material_key: MaterialKey,
    pub mesh_id: MeshId,
    pub submesh_index: u32,
    pub index_count: u32,
    pub index_offset: u32,
    pub vertex_offset: i32,

    pub model: [[f32; 4]; 4],
    pub normal: [[f32; 4]; 4],
    pub tint: [f32; 4],

    pub albedo_index: u32,
    pub normal_index: u32,
    pub bone_offset: u32,
    pub selection: [u32; 2],

    pub metallic: f32,
    pub roughness: f32,
    pub flexibility: f32,
    pub anchor_height: f32,
    pub bucket_mask: BucketMask,
}

#[derive(Debug, Clone, Copy)]
struct SubmeshMeta {
    index_count: u32,
    index_offset: u32,
    vertex_offset: i32,
}

#[derive(Debug, Default)]
pub struct BufferSizes {
    pub transform_data: BufferLen,
    pub material_data: BufferLen,
}

pub struct MaterialDrawList {
    transform_data: Vec<TransformData>,
    material_data: Vec<MaterialRecord>,
    material_index: FxHashMap<MaterialKey, u32>,
    bucket_membership: FxHashMap<MaterialKey, BucketMask>,
    submesh_meta: FxHashMap<(MeshId, u32), SubmeshMeta>,
    /// `(pipeline_key, material_key) -> mesh_id -> submesh_index -> instances`.
    submissions: FxHashMap<(PipelineKey, MaterialKey), FxHashMap<MeshId, FxHashMap<u32, Vec<InstanceData>>>>,
    buckets: [FxHashMap<MaterialKey, PipelineBucketData>; 3],
}

impl MaterialDrawList {
    #[must_use]
    pub fn new() -> Self {
        Self {
            transform_data: Vec::new(),
            material_data: Vec::new(),
            material_index: FxHashMap::default(),
            bucket_membership: FxHashMap::default(),
            submesh_meta: FxHashMap::default(),
            submissions: FxHashMap::default(),
            buckets: [FxHashMap::default(), FxHashMap::default(), FxHashMap::default()],
        }
    }

    /// Clear phase: wipes everything from the previous frame.
    pub fn clear(&mut self) {
        self.transform_data.clear();
        self.material_data.clear();
        self.material_index.clear();
        self.bucket_membership.clear();
        self.submesh_meta.clear();
        self.submissions.clear();
        for bucket in &mut self.buckets {
            bucket.clear();
        }
    }

    /// Collect phase: records one submesh instance, deduplicating its
    /// material by `material_key` and appending its transform.
    pub fn submit(&mut self, submission: Submission) {
        let transform_index = self.transform_data.len() as u32;
        self.transform_data.push(TransformData {
            model: submission.model,
            normal: submission.normal,
        });

        self.material_index.entry(submission.material_key).or_insert_with(|| {
            let index = self.material_data.len() as u32;
            self.material_data.push(MaterialRecord {
                albedo_index: submission.albedo_index,
                normal_index: submission.normal_index,
                metallic: submission.metallic,
                roughness: submission.roughness,
                flexibility: submission.flexibility,
                anchor_height: submission.anchor_height,
                _pad: [0; 2],
            });
            index
        });

        self.bucket_membership.insert(submission.material_key, submission.bucket_mask);
        self.submesh_meta.insert(
            (submission.mesh_id, submission.submesh_index),
            SubmeshMeta {
                index_count: submission.index_count,
                index_offset: submission.index_offset,
                vertex_offset: submission.vertex_offset,
            },
        );

        let instance = InstanceData {
            tint: submission.tint,
            material: [submission.metallic, submission.roughness, submission.flexibility, submission.anchor_height],
            payload: [submission.albedo_index, submission.normal_index, transform_index, submission.bone_offset],
            selection: [submission.selection[0], submission.selection[1], 0, 0],
        };

        self.submissions
            .entry((submission.pipeline_key, submission.material_key))
            .or_default()
            .entry(submission.mesh_id)
            .or_default()
            .entry(submission.submesh_index)
            .or_default()
            .push(instance);
    }

    /// Build phase: turns every submitted `(pipeline, material)` group into
    /// a contiguous run of draw commands with accumulating `first_instance`,
    /// and publishes it under every bucket its material participates in.
    pub fn build(&mut self) {
        for bucket in &mut self.buckets {
            bucket.clear();
        }

        for (&(pipeline_key, material_key), meshes) in &self.submissions {
            let mut draw_commands = Vec::new();
            let mut instance_data = Vec::new();
            let mut ranges = Vec::new();
            let mut base_instance = 0u32;

            for (&mesh_id, submeshes) in meshes {
                let range_offset = draw_commands.len() as u32;
                for (&submesh_index, instances) in submeshes {
                    let meta = self.submesh_meta[&(mesh_id, submesh_index)];
                    draw_commands.push(DrawIndexedIndirectCommand {
                        index_count: meta.index_count,
                        instance_count: instances.len() as u32,
                        first_index: meta.index_offset,
                        vertex_offset: meta.vertex_offset,
                        first_instance: base_instance,
                    });
                    instance_data.extend_from_slice(instances);
                    base_instance += instances.len() as u32;
                }
                let range_count = draw_commands.len() as u32 - range_offset;
                ranges.push(RangeRef {
                    mesh_id,
                    range: DrawRange { offset: range_offset, count: range_count },
                });
            }

            let mask = self.bucket_membership.get(&material_key).copied().unwrap_or(BucketMask::empty());
            for bucket in Bucket::ALL {
                if mask.contains(bucket.mask()) {
                    self.buckets[bucket.index()].insert(
                        material_key,
                        PipelineBucketData {
                            pipeline_key,
                            draw_commands: draw_commands.clone(),
                            instance_data: instance_data.clone(),
                            ranges: ranges.clone(),
                        },
                    );
                }
            }
        }
    }

    #[must_use]
    pub fn bucket(&self, bucket: Bucket) -> &FxHashMap<MaterialKey, PipelineBucketData> {
        &self.buckets[bucket.index()]
    }

    #[must_use]
    pub fn transform_data(&self) -> &[TransformData] {
        &self.transform_data
    }

    #[must_use]
    pub fn material_data(&self) -> &[MaterialRecord] {
        &self.material_data
    }

    /// Plans growth for the shared transform/material buffers against their
    /// current device-side capacity. Per-`(pipeline, bucket)` draw-command
    /// and instance-data buffers are planned the same way by the caller,
    /// keyed by whatever handle it tracks those buffers under.
    #[must_use]
    pub fn plan_shared_buffer_growth(&self, current: &BufferSizes) -> (GrowthPlan, GrowthPlan) {
        let transform_required = BufferLen::of::<TransformData>(self.transform_data.len());
        let material_required = BufferLen::of::<MaterialRecord>(self.material_data.len());
        (
            plan_growth(current.transform_data, transform_required),
            plan_growth(current.material_data, material_required),
        )
    }
}

impl Default for MaterialDrawList {
    fn default() -> Self {
        Self::new()
    }
}

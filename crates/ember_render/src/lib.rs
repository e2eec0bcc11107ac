//! Material-keyed draw lists, shader reflection, and the subrenderer
//! contract that a render-graph pass binds its pipelines through.
//!
//! A frame builds one [`draw_list::MaterialDrawList`] from whatever is
//! visible, [`subrenderer::SubrendererTable`] dispatches each bound
//! [`subrenderer::Subrenderer`] once per [`ember_graph::Graph`] pass, and
//! [`reflection`] checks a pipeline's declared bindings against what its
//! compiled SPIR-V actually exposes before the pipeline is ever built.

mod buffer;
mod config;
mod draw_list;
mod error;
mod instance;
mod reflection;
mod subrenderer;

pub use buffer::{plan_growth, BufferLen, GrowthPlan};
pub use config::{
    AppConfig, CullMode, DepthMode, FrontFace, PipelineDefinition, PolygonMode, RasterizationState, Resolution,
    Version, WindowConfig, parse_app_config, parse_pipeline_definition, parse_window_config,
};
pub use draw_list::{
    Bucket, BucketMask, BufferSizes, DrawRange, MaterialDrawList, MaterialKey, MeshId, PipelineBucketData,
    PipelineKey, RangeRef, Submission,
};
pub use error::{RenderError, Result};
pub use instance::{DrawIndexedIndirectCommand, InstanceData, MaterialRecord, TransformData};
pub use reflection::{
    diff_against_declared, merge_stages, parse_module, reflect_stage, DeclaredBinding, DescriptorBinding,
    DescriptorType,
};
pub use subrenderer::{Subrenderer, SubrendererTable};

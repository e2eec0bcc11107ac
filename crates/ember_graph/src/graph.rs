//! The render-graph builder and its resolved, immutable [`Graph`].
//!
//! Grounded in the behavioral contract of the engine's original subpass
//! description tables (`render_stage.cpp`), re-architected per the engine's
//! own design notes as an explicit builder rather than a variadic lambda:
//! passes declare produced/used attachment names, [`GraphBuilder::build`]
//! topologically schedules them and resolves every attachment's format,
//! extent, clear op, and blend state.

use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use crate::attachment::{
    AttachmentDecl, AttachmentExtent, AttachmentKind, ResolvedAttachment, ResolvedViewport, Viewport,
};
use crate::blend::derive_blend_state;
use crate::error::{GraphError, Result};

/// Identifies a pass within a built [`Graph`]. Stable for the lifetime of
/// that graph; indexes directly into its pass list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PassId(usize);

/// A pass as declared to the builder, before scheduling/resolution.
#[derive(Debug, Clone)]
pub struct PassDecl {
    pub name: String,
    pub produces: Vec<AttachmentDecl>,
    pub uses: Vec<String>,
    pub viewport: Viewport,
}

impl PassDecl {
    #[must_use]
    pub fn new(name: impl Into<String>, viewport: Viewport) -> Self {
        Self {
            name: name.into(),
            produces: Vec::new(),
            uses: Vec::new(),
            viewport,
        }
    }

    #[must_use]
    pub fn produces(mut self, attachment: AttachmentDecl) -> Self {
        self.produces.push(attachment);
        self
    }

    #[must_use]
    pub fn uses(mut self, name: impl Into<String>) -> Self {
        self.uses.push(name.into());
        self
    }
}

/// Collects pass declarations and resolves them into a [`Graph`].
#[derive(Debug, Default)]
pub struct GraphBuilder {
    passes: Vec<PassDecl>,
}

impl GraphBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self { passes: Vec::new() }
    }

    pub fn add_pass(&mut self, decl: PassDecl) -> PassId {
        self.passes.push(decl);
        PassId(self.passes.len() - 1)
    }

    /// Resolves the declared passes into a schedule. `default_depth_format`
    /// backs any `Depth` attachment that doesn't declare its own format;
    /// `swapchain_format`/`swapchain_extent` back every `Swapchain`
    /// attachment and `Window`-relative viewports.
    pub fn build(
        self,
        default_depth_format: wgpu::TextureFormat,
        swapchain_format: wgpu::TextureFormat,
        swapchain_extent: (u32, u32),
    ) -> Result<Graph> {
        let passes = self.passes;
        let producer_of = build_producer_map(&passes)?;
        let schedule = topological_schedule(&passes, &producer_of)?;

        let mut resolved = Vec::with_capacity(passes.len());
        for pass in &passes {
            resolved.push(resolve_pass(pass, default_depth_format, swapchain_format, swapchain_extent)?);
        }

        let pass_lookup = passes
            .iter()
            .enumerate()
            .map(|(i, p)| (p.name.clone(), PassId(i)))
            .collect();

        log::debug!(
            "render graph resolved: {} passes scheduled as [{}]",
            passes.len(),
            schedule.iter().map(|&id| passes[id.0].name.as_str()).collect::<Vec<_>>().join(", ")
        );

        Ok(Graph {
            passes,
            schedule,
            resolved,
            pass_lookup,
        })
    }
}

fn build_producer_map(passes: &[PassDecl]) -> Result<FxHashMap<String, PassId>> {
    let mut producer_of: FxHashMap<String, PassId> = FxHashMap::default();
    for (i, pass) in passes.iter().enumerate() {
        for attachment in &pass.produces {
            if producer_of.insert(attachment.name.clone(), PassId(i)).is_some() {
                return Err(GraphError::DuplicateProducer(attachment.name.clone()));
            }
        }
    }
    Ok(producer_of)
}

/// Kahn's algorithm, breaking ties by declaration order so the schedule is
/// deterministic and stable across rebuilds of the same declarations.
fn topological_schedule(passes: &[PassDecl], producer_of: &FxHashMap<String, PassId>) -> Result<Vec<PassId>> {
    let n = passes.len();
    let mut in_degree = vec![0u32; n];
    let mut dependents: Vec<SmallVec<[usize; 4]>> = vec![SmallVec::new(); n];

    for (q, pass) in passes.iter().enumerate() {
        for used in &pass.uses {
            let producer = producer_of
                .get(used)
                .ok_or_else(|| GraphError::UnresolvedAttachment(used.clone()))?;
            dependents[producer.0].push(q);
            in_degree[q] += 1;
        }
    }

    let mut ready: Vec<usize> = (0..n).filter(|&i| in_degree[i] == 0).collect();
    let mut schedule = Vec::with_capacity(n);

    while !ready.is_empty() {
        ready.sort_unstable();
        let next = ready.remove(0);
        schedule.push(PassId(next));
        for &dependent in &dependents[next] {
            in_degree[dependent] -= 1;
            if in_degree[dependent] == 0 {
                ready.push(dependent);
            }
        }
    }

    if schedule.len() != n {
        return Err(GraphError::CyclicGraph);
    }

    Ok(schedule)
}

struct ResolvedPassInner {
    viewport: ResolvedViewport,
    attachments: SmallVec<[ResolvedAttachment; 4]>,
}

fn resolve_pass(
    pass: &PassDecl,
    default_depth_format: wgpu::TextureFormat,
    swapchain_format: wgpu::TextureFormat,
    swapchain_extent: (u32, u32),
) -> Result<ResolvedPassInner> {
    // Attachments first: a `Dynamic` viewport needs to know the extent of
    // the pass's own first non-swapchain produced attachment.
    let mut attachments = SmallVec::new();
    let mut first_non_swapchain_extent = None;

    for decl in &pass.produces {
        let format = match decl.kind {
            AttachmentKind::Swapchain => swapchain_format,
            AttachmentKind::Depth => decl.format.unwrap_or(default_depth_format),
            AttachmentKind::Image => decl.format.expect("image attachments must declare a format"),
        };
        let (width, height) = match decl.extent {
            AttachmentExtent::Fixed(w, h) => (w, h),
            AttachmentExtent::MatchSwapchain => swapchain_extent,
        };
        if decl.kind != AttachmentKind::Swapchain && first_non_swapchain_extent.is_none() {
            first_non_swapchain_extent = Some((width, height));
        }
        let blend_state = if decl.kind == AttachmentKind::Depth {
            None
        } else {
            derive_blend_state(format, decl.blend_state)
        };
        attachments.push(ResolvedAttachment {
            name: decl.name.clone(),
            kind: decl.kind,
            format,
            clear_color: decl.clear_color,
            blend_state,
            width,
            height,
        });
    }

    let viewport = match pass.viewport {
        Viewport::Fixed { width, height } => ResolvedViewport { width, height },
        Viewport::Window { scale_x, scale_y } => ResolvedViewport {
            width: (swapchain_extent.0 as f32 * scale_x) as u32,
            height: (swapchain_extent.1 as f32 * scale_y) as u32,
        },
        Viewport::Dynamic => {
            let (width, height) = first_non_swapchain_extent
                .ok_or_else(|| GraphError::UndefinedViewport(pass.name.clone()))?;
            ResolvedViewport { width, height }
        }
    };

    Ok(ResolvedPassInner { viewport, attachments })
}

/// An immutable, resolved render graph: a schedule plus per-pass attachment
/// and viewport data.
pub struct Graph {
    passes: Vec<PassDecl>,
    schedule: Vec<PassId>,
    resolved: Vec<ResolvedPassInner>,
    pass_lookup: FxHashMap<String, PassId>,
}

impl Graph {
    #[must_use]
    pub fn pass_id(&self, name: &str) -> Option<PassId> {
        self.pass_lookup.get(name).copied()
    }

    /// Passes in scheduled (topological) order.
    #[must_use]
    pub fn schedule(&self) -> &[PassId] {
        &self.schedule
    }

    #[must_use]
    pub fn pass_name(&self, id: PassId) -> &str {
        &self.passes[id.0].name
    }

    #[must_use]
    pub fn viewport(&self, id: PassId) -> ResolvedViewport {
        self.resolved[id.0].viewport
    }

    #[must_use]
    pub fn attachments(&self, id: PassId) -> &[ResolvedAttachment] {
        &self.resolved[id.0].attachments
    }

    #[must_use]
    pub fn color_formats(&self, id: PassId) -> SmallVec<[wgpu::TextureFormat; 4]> {
        self.attachments(id)
            .iter()
            .filter(|a| a.kind != AttachmentKind::Depth)
            .map(|a| a.format)
            .collect()
    }

    #[must_use]
    pub fn depth_format(&self, id: PassId) -> Option<wgpu::TextureFormat> {
        self.attachments(id).iter().find(|a| a.kind == AttachmentKind::Depth).map(|a| a.format)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attachment::AttachmentDecl;

    const SWAPCHAIN_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Bgra8UnormSrgb;
    const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

    #[test]
    fn schedules_a_linear_chain_in_declared_order() {
        let mut builder = GraphBuilder::new();
        builder.add_pass(
            PassDecl::new("geometry", Viewport::Dynamic)
                .produces(AttachmentDecl::depth("depth"))
                .produces(AttachmentDecl::image("albedo", wgpu::TextureFormat::Rgba8Unorm)),
        );
        builder.add_pass(PassDecl::new("lighting", Viewport::Dynamic).uses("albedo").produces(AttachmentDecl::image(
            "resolve",
            wgpu::TextureFormat::Rgba8Unorm,
        )));
        builder.add_pass(
            PassDecl::new("present", Viewport::Window { scale_x: 1.0, scale_y: 1.0 })
                .uses("resolve")
                .produces(AttachmentDecl::swapchain("swapchain")),
        );

        let graph = builder.build(DEPTH_FORMAT, SWAPCHAIN_FORMAT, (1920, 1080)).unwrap();
        let names: Vec<_> = graph.schedule().iter().map(|&id| graph.pass_name(id)).collect();
        assert_eq!(names, vec!["geometry", "lighting", "present"]);
    }

    #[test]
    fn duplicate_producer_is_an_error() {
        let mut builder = GraphBuilder::new();
        builder.add_pass(PassDecl::new("a", Viewport::Dynamic).produces(AttachmentDecl::swapchain("swapchain")));
        builder.add_pass(PassDecl::new("b", Viewport::Dynamic).produces(AttachmentDecl::swapchain("swapchain")));

        let err = builder.build(DEPTH_FORMAT, SWAPCHAIN_FORMAT, (1920, 1080)).unwrap_err();
        assert_eq!(err, GraphError::DuplicateProducer("swapchain".to_string()));
    }

    #[test]
    fn unresolved_use_is_an_error() {
        let mut builder = GraphBuilder::new();
        builder.add_pass(PassDecl::new("consumer", Viewport::Dynamic).uses("ghost"));

        let err = builder.build(DEPTH_FORMAT, SWAPCHAIN_FORMAT, (1920, 1080)).unwrap_err();
        assert_eq!(err, GraphError::UnresolvedAttachment("ghost".to_string()));
    }

    #[test]
    fn cyclic_graph_is_detected() {
        let mut builder = GraphBuilder::new();
        builder.add_pass(
            PassDecl::new("a", Viewport::Dynamic)
                .uses("b_out")
                .produces(AttachmentDecl::image("a_out", wgpu::TextureFormat::Rgba8Unorm)),
        );
        builder.add_pass(
            PassDecl::new("b", Viewport::Dynamic)
                .uses("a_out")
                .produces(AttachmentDecl::image("b_out", wgpu::TextureFormat::Rgba8Unorm)),
        );

        let err = builder.build(DEPTH_FORMAT, SWAPCHAIN_FORMAT, (1920, 1080)).unwrap_err();
        assert_eq!(err, GraphError::CyclicGraph);
    }

    #[test]
    fn dynamic_viewport_with_depth_only_attachment_uses_its_extent() {
        let mut builder = GraphBuilder::new();
        builder.add_pass(
            PassDecl::new("shadow", Viewport::Dynamic)
                .produces(AttachmentDecl::depth("shadow_depth").with_extent(AttachmentExtent::Fixed(2048, 2048))),
        );

        let graph = builder.build(DEPTH_FORMAT, SWAPCHAIN_FORMAT, (1920, 1080)).unwrap();
        let id = graph.pass_id("shadow").unwrap();
        assert_eq!(graph.viewport(id), ResolvedViewport { width: 2048, height: 2048 });
    }

    #[test]
    fn dynamic_viewport_with_no_produced_attachment_is_an_error() {
        let mut builder = GraphBuilder::new();
        builder.add_pass(PassDecl::new("nop", Viewport::Dynamic));

        let err = builder.build(DEPTH_FORMAT, SWAPCHAIN_FORMAT, (1920, 1080)).unwrap_err();
        assert_eq!(err, GraphError::UndefinedViewport("nop".to_string()));
    }

    #[test]
    fn window_relative_viewport_scales_from_swapchain_extent() {
        let mut builder = GraphBuilder::new();
        builder.add_pass(PassDecl::new("half", Viewport::Window { scale_x: 0.5, scale_y: 0.5 }));

        let graph = builder.build(DEPTH_FORMAT, SWAPCHAIN_FORMAT, (1920, 1080)).unwrap();
        let id = graph.pass_id("half").unwrap();
        assert_eq!(graph.viewport(id), ResolvedViewport { width: 960, height: 540 });
    }
}

//! The subrenderer contract and the table that binds subrenderers to
//! render-graph passes.
//!
//! Grounded in `libsbx-models/libsbx/models/static_mesh_subrenderer.hpp`
//! (one subrenderer owns one pipeline and draws into a single bound pass)
//! and `examples/panxinmiao-myth/src/renderer/graph/stage.rs` (the
//! teacher's own per-stage update-then-render split this trait's
//! [`Subrenderer::update`]/[`Subrenderer::render`] methods follow): the
//! frame loop calls `update` at most once per frame and `render` exactly
//! once per frame for each pass it is bound to, in the order the
//! subrenderers were bound.

use ember_graph::PassId;
use rustc_hash::FxHashMap;

/// A pipeline owner bound to one render-graph pass.
///
/// `render` is handed a pass already bound to its resolved color and depth
/// attachments; the subrenderer's job is to bind its pipeline, push the
/// draw list's buffer bindings, and issue its draws.
pub trait Subrenderer {
    /// Runs once per frame, before any pass begins, for CPU-side work that
    /// doesn't depend on a bound render pass (compacting a draw list,
    /// uploading instance data). Default no-op.
    fn update(&mut self) {}

    fn render(&mut self, pass: &mut wgpu::RenderPass<'_>);
}

/// Binds subrenderers to the passes of a built [`ember_graph::Graph`] and
/// drives them in bind order.
#[derive(Default)]
pub struct SubrendererTable {
    bindings: FxHashMap<PassId, Vec<Box<dyn Subrenderer>>>,
}

impl SubrendererTable {
    #[must_use]
    pub fn new() -> Self {
        Self { bindings: FxHashMap::default() }
    }

    /// Binds `subrenderer` to `pass`, appended after any already bound to
    /// that pass.
    pub fn bind(&mut self, pass: PassId, subrenderer: Box<dyn Subrenderer>) {
        self.bindings.entry(pass).or_default().push(subrenderer);
    }

    pub fn bound_count(&self, pass: PassId) -> usize {
        self.bindings.get(&pass).map_or(0, Vec::len)
    }

    /// Calls [`Subrenderer::update`] on every bound subrenderer, across all
    /// passes, in no particular cross-pass order.
    pub fn update_all(&mut self) {
        for subrenderers in self.bindings.values_mut() {
            for subrenderer in subrenderers {
                subrenderer.update();
            }
        }
    }

    /// Renders every subrenderer bound to `pass`, in bind order, into the
    /// already-bound `render_pass`.
    pub fn render_pass(&mut self, pass: PassId, render_pass: &mut wgpu::RenderPass<'_>) {
        let Some(subrenderers) = self.bindings.get_mut(&pass) else { return };
        for subrenderer in subrenderers {
            subrenderer.render(render_pass);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ember_graph::{GraphBuilder, PassDecl, Viewport};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct Counting {
        updates: Arc<AtomicUsize>,
    }

    impl Subrenderer for Counting {
        fn update(&mut self) {
            self.updates.fetch_add(1, Ordering::SeqCst);
        }

        fn render(&mut self, _pass: &mut wgpu::RenderPass<'_>) {}
    }

    fn two_pass_ids() -> (PassId, PassId) {
        let mut builder = GraphBuilder::new();
        builder.add_pass(PassDecl::new("a", Viewport::Fixed { width: 1, height: 1 }));
        builder.add_pass(PassDecl::new("b", Viewport::Fixed { width: 1, height: 1 }));
        let graph = builder
            .build(wgpu::TextureFormat::Depth32Float, wgpu::TextureFormat::Bgra8UnormSrgb, (1, 1))
            .unwrap();
        (graph.pass_id("a").unwrap(), graph.pass_id("b").unwrap())
    }

    #[test]
    fn update_all_reaches_every_bound_subrenderer() {
        let (pass_a, pass_b) = two_pass_ids();
        let mut table = SubrendererTable::new();
        let counter_a = Arc::new(AtomicUsize::new(0));
        let counter_b = Arc::new(AtomicUsize::new(0));
        table.bind(pass_a, Box::new(Counting { updates: counter_a.clone() }));
        table.bind(pass_b, Box::new(Counting { updates: counter_b.clone() }));

        table.update_all();

        assert_eq!(counter_a.load(Ordering::SeqCst), 1);
        assert_eq!(counter_b.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn bound_count_reflects_number_of_subrenderers_on_a_pass() {
        let (pass_a, _pass_b) = two_pass_ids();
        let mut table = SubrendererTable::new();
        assert_eq!(table.bound_count(pass_a), 0);
        table.bind(pass_a, Box::new(Counting { updates: Arc::new(AtomicUsize::new(0)) }));
        table.bind(pass_a, Box::new(Counting { updates: Arc::new(AtomicUsize::new(0)) }));
        assert_eq!(table.bound_count(pass_a), 2);
    }
}

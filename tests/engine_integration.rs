//! End-to-end wiring across `ember_ecs`, `ember_graph`, and `ember_render`:
//! a scene of entities feeds a draw list, scheduled against a two-pass
//! render graph, with subrenderers bound and driven through one frame.

use ember::{Bucket, Entity, Graph, GraphBuilder, MaterialDrawList, PassDecl, Registry, Submission, Subrenderer, SubrendererTable, Viewport};
use ember_graph::AttachmentDecl;

struct Transform {
    model: [[f32; 4]; 4],
}

struct Mesh {
    mesh_id: u64,
    material_key: u64,
}

fn build_graph() -> Graph {
    let mut builder = GraphBuilder::new();
    builder.add_pass(
        PassDecl::new("geometry", Viewport::Dynamic)
            .produces(AttachmentDecl::depth("depth"))
            .produces(AttachmentDecl::image("albedo", wgpu::TextureFormat::Rgba8Unorm)),
    );
    builder.add_pass(
        PassDecl::new("present", Viewport::Window { scale_x: 1.0, scale_y: 1.0 })
            .uses("albedo")
            .produces(AttachmentDecl::swapchain("swapchain")),
    );
    builder
        .build(wgpu::TextureFormat::Depth32Float, wgpu::TextureFormat::Bgra8UnormSrgb, (1920, 1080))
        .expect("a two-pass linear graph always resolves")
}

struct NoopSubrenderer {
    frames_rendered: usize,
}

impl Subrenderer for NoopSubrenderer {
    fn render(&mut self, _pass: &mut wgpu::RenderPass<'_>) {
        self.frames_rendered += 1;
    }
}

#[test]
fn scene_entities_batch_into_a_draw_list_scheduled_against_a_graph() {
    let _ = env_logger::builder().is_test(true).try_init();

    let mut registry = Registry::new();
    let entities: Vec<Entity> = (0..4)
        .map(|_| {
            let entity = registry.create();
            registry
                .add_component(
                    entity,
                    Transform {
                        model: [[1.0, 0.0, 0.0, 0.0], [0.0, 1.0, 0.0, 0.0], [0.0, 0.0, 1.0, 0.0], [0.0, 0.0, 0.0, 1.0]],
                    },
                )
                .unwrap();
            registry.add_component(entity, Mesh { mesh_id: 7, material_key: 42 }).unwrap();
            entity
        })
        .collect();

    let mut draw_list = MaterialDrawList::new();
    draw_list.clear();
    for &entity in &entities {
        let transform = registry.get_component::<Transform>(entity).unwrap();
        let mesh = registry.get_component::<Mesh>(entity).unwrap();
        draw_list.submit(Submission {
            pipeline_key: 1,
            material_key: mesh.material_key,
            mesh_id: mesh.mesh_id,
            submesh_index: 0,
            index_count: 36,
            index_offset: 0,
            vertex_offset: 0,
            model: transform.model,
            normal: transform.model,
            tint: [1.0; 4],
            albedo_index: 0,
            normal_index: 0,
            bone_offset: 0,
            selection: [0, 0],
            metallic: 0.0,
            roughness: 0.5,
            flexibility: 0.0,
            anchor_height: 0.0,
            bucket_mask: ember_render::BucketMask::OPAQUE,
        });
    }
    draw_list.build();

    let opaque = draw_list.bucket(Bucket::Opaque);
    let entry = opaque.get(&42).expect("the shared material must publish one bucket entry");
    assert_eq!(entry.draw_commands.len(), 1, "one mesh, one submesh, one draw command");
    assert_eq!(entry.draw_commands[0].instance_count, 4);
    assert_eq!(draw_list.material_data().len(), 1);

    let graph = build_graph();
    assert_eq!(graph.schedule().len(), 2);

    let mut table = SubrendererTable::new();
    let geometry = graph.pass_id("geometry").unwrap();
    table.bind(geometry, Box::new(NoopSubrenderer { frames_rendered: 0 }));
    table.update_all();
    assert_eq!(table.bound_count(geometry), 1);

    registry.destroy(entities[0]).unwrap();
    assert!(!registry.is_alive(entities[0]));
    assert!(registry.get_component::<Transform>(entities[1]).is_ok());
}

//! Device-agnostic frame renderer
//!
//! The [`RenderEngine`] owns the device and walks the scene once per tick.
//! Geometry and material binds are skipped when the resource id matches
//! the one bound last, so nodes sharing resources cost one bind per run.

use std::time::{Duration, Instant};

use log::{debug, trace};

use crate::{
    error::SceneError,
    gfx::{
        device::RenderDevice,
        rendering::{frame_clock::FrameClock, RenderConfig},
        resources::{
            Drawable, Geometry, GeometryGroup, GeometryId, GeometryKey, Material, MaterialId,
            ResourceStore, UniformSet,
        },
        scene::{Scene, SceneNode},
    },
};

/// Counters of one rendered frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    pub nodes: usize,
    pub draw_calls: usize,
    pub geometry_binds: usize,
    pub material_binds: usize,
}

/// Last bound resources; reset at the start of every frame
#[derive(Debug, Default)]
struct BindState {
    geometry: Option<GeometryId>,
    material: Option<MaterialId>,
}

/// Core rendering engine issuing binds, uniform writes and draw calls
pub struct RenderEngine<D: RenderDevice> {
    device: D,
    config: RenderConfig,
    clock: FrameClock,
    running: bool,
}

impl<D: RenderDevice> RenderEngine<D> {
    pub fn new(device: D, config: RenderConfig) -> Self {
        Self {
            device,
            config,
            clock: FrameClock::default(),
            running: true,
        }
    }

    pub fn device(&self) -> &D {
        &self.device
    }

    /// Device access for compiling resources into a scene
    pub fn device_mut(&mut self) -> &mut D {
        &mut self.device
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: RenderConfig) {
        self.config = config;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Stops the loop; every later tick renders nothing and returns `false`.
    pub fn stop(&mut self) {
        debug!("Render engine stopped");
        self.running = false;
    }

    /// Runs one frame at the current time. See [`RenderEngine::tick_at`].
    pub fn tick<F>(&mut self, scene: &mut Scene, update: F) -> Result<bool, SceneError>
    where
        F: FnOnce(Duration, &mut [SceneNode]),
    {
        self.tick_at(Instant::now(), scene, update)
    }

    /// Calls `update` with the time since the previous tick, then renders.
    ///
    /// Returns whether the engine is still running.
    pub fn tick_at<F>(&mut self, now: Instant, scene: &mut Scene, update: F) -> Result<bool, SceneError>
    where
        F: FnOnce(Duration, &mut [SceneNode]),
    {
        if !self.running {
            return Ok(false);
        }

        let delta = self.clock.tick(now);
        update(delta, scene.nodes_mut());
        self.render_frame(scene)?;
        Ok(self.running)
    }

    /// Clears the frame and draws every visible node in order.
    pub fn render_frame(&mut self, scene: &mut Scene) -> Result<FrameStats, SceneError> {
        let device: &mut dyn RenderDevice = &mut self.device;
        device.begin_frame(&self.config);

        let parts = scene.parts();
        let globals = parts.camera.uniform().to_uniform_set();
        let mut state = BindState::default();
        let mut stats = FrameStats::default();

        for node in parts.nodes.iter().filter(|node| node.visible) {
            let material = parts.materials.get_mut(node.material()).ok_or_else(|| {
                SceneError::InvalidArgument(format!("unknown material {:?}", node.material()))
            })?;
            if state.material != Some(node.material()) {
                material.bind(device)?;
                state.material = Some(node.material());
                stats.material_binds += 1;
            }

            let node_uniforms = globals.merged_with(&node.uniforms());
            material.update_uniforms(&node_uniforms, device);

            match node.drawable() {
                Drawable::Geometry(id) => {
                    let geometry = bind_geometry(parts.geometries, id, &mut state, &mut stats, device)?;
                    geometry.draw(device);
                    stats.draw_calls += 1;
                }
                Drawable::Group(id) => {
                    let group = parts.groups.get(id).ok_or_else(|| {
                        SceneError::InvalidArgument(format!("unknown group {:?}", id))
                    })?;
                    draw_group(
                        group,
                        material,
                        &node_uniforms,
                        parts.geometries,
                        &mut state,
                        &mut stats,
                        device,
                    )?;
                }
            }
            stats.nodes += 1;
        }

        trace!(
            "Frame: {} nodes, {} draws, {} geometry binds, {} material binds",
            stats.nodes,
            stats.draw_calls,
            stats.geometry_binds,
            stats.material_binds
        );
        Ok(stats)
    }
}

fn bind_geometry<'a>(
    geometries: &'a ResourceStore<GeometryKey, Geometry>,
    id: GeometryId,
    state: &mut BindState,
    stats: &mut FrameStats,
    device: &mut dyn RenderDevice,
) -> Result<&'a Geometry, SceneError> {
    let geometry = geometries
        .get(id)
        .ok_or_else(|| SceneError::InvalidArgument(format!("unknown geometry {:?}", id)))?;

    if state.geometry != Some(id) {
        geometry.bind(device)?;
        state.geometry = Some(id);
        stats.geometry_binds += 1;
    }
    Ok(geometry)
}

/// Draws each child with its overrides layered over the node uniforms.
///
/// Before a child's overrides are pushed, every name overridden by any child
/// of the group is reset to the node value (or the material's initial value).
/// The same reset runs once more after the last child, so overrides stay
/// inside the group and later nodes sharing the material are unaffected.
fn draw_group(
    group: &GeometryGroup,
    material: &mut Material,
    node_uniforms: &UniformSet,
    geometries: &ResourceStore<GeometryKey, Geometry>,
    state: &mut BindState,
    stats: &mut FrameStats,
    device: &mut dyn RenderDevice,
) -> Result<(), SceneError> {
    let overridden: Vec<&str> = group.overridden_names().collect();
    let mut baseline = material.defaults_for(overridden.iter().copied());
    for name in &overridden {
        if let Some(value) = node_uniforms.get(name) {
            baseline.insert(*name, value.clone());
        }
    }

    for (id, overrides) in group.children() {
        let geometry = bind_geometry(geometries, *id, state, stats, device)?;
        material.update_uniforms(&baseline.merged_with(overrides), device);
        geometry.draw(device);
        stats.draw_calls += 1;
    }

    if !baseline.is_empty() {
        material.update_uniforms(&baseline, device);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::{
        device::{DeviceCall, RecordingDevice},
        resources::{
            presets::{basic_material, BasicMaterialConfig},
            GeometryConfig, MaterialConfig, UniformValue, VertexAttribute,
        },
    };
    use cgmath::Vector3;

    fn triangle() -> GeometryConfig {
        GeometryConfig::new().with_attribute(
            "a_position",
            VertexAttribute::float32(3, vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0]),
        )
    }

    fn engine() -> RenderEngine<RecordingDevice> {
        RenderEngine::new(RecordingDevice::new(), RenderConfig::default())
    }

    fn color_material() -> MaterialConfig {
        MaterialConfig::new("vs", "fs")
            .with_uniform("u_model_matrix", UniformValue::Mat4([0.0; 16]))
            .with_uniform("u_color", UniformValue::Vec3([0.0, 0.0, 0.0]))
            .with_uniform("u_opacity", 1.0_f32)
    }

    #[test]
    fn test_shared_geometry_is_bound_once() {
        let mut engine = engine();
        let mut scene = Scene::default();
        let geometry = scene.create_geometry(triangle(), engine.device_mut()).unwrap();
        let material = scene
            .create_material(basic_material(&BasicMaterialConfig::default()), engine.device_mut())
            .unwrap();
        for name in ["a", "b", "c"] {
            let node = scene.create_node(name, Drawable::Geometry(geometry), material).unwrap();
            scene.add_node(node).unwrap();
        }

        engine.device_mut().clear_calls();
        let stats = engine.render_frame(&mut scene).unwrap();

        assert_eq!(stats.draw_calls, 3);
        assert_eq!(stats.geometry_binds, 1);
        assert_eq!(stats.material_binds, 1);
        assert_eq!(engine.device().vertex_array_binds(), 1);
        assert_eq!(engine.device().program_binds(), 1);
        assert_eq!(engine.device().calls().first(), Some(&DeviceCall::BeginFrame));
    }

    #[test]
    fn test_binds_reset_every_frame() {
        let mut engine = engine();
        let mut scene = Scene::default();
        let geometry = scene.create_geometry(triangle(), engine.device_mut()).unwrap();
        let material = scene
            .create_material(basic_material(&BasicMaterialConfig::default()), engine.device_mut())
            .unwrap();
        let node = scene.create_node("a", Drawable::Geometry(geometry), material).unwrap();
        scene.add_node(node).unwrap();

        engine.render_frame(&mut scene).unwrap();
        let second = engine.render_frame(&mut scene).unwrap();
        assert_eq!(second.geometry_binds, 1);
        assert_eq!(second.material_binds, 1);
    }

    #[test]
    fn test_group_draws_each_child_with_its_overrides() {
        let mut engine = engine();
        let mut scene = Scene::default();
        let first = scene.create_geometry(triangle(), engine.device_mut()).unwrap();
        let second = scene.create_geometry(triangle(), engine.device_mut()).unwrap();
        let material = scene.create_material(color_material(), engine.device_mut()).unwrap();
        let group = scene
            .create_group(
                vec![first, second],
                vec![
                    UniformSet::new().with("u_color", UniformValue::Vec3([1.0, 0.0, 0.0])),
                    UniformSet::new().with("u_opacity", 0.5_f32),
                ],
            )
            .unwrap();
        let node = scene.create_node("model", Drawable::Group(group), material).unwrap();
        scene.add_node(node).unwrap();

        engine.device_mut().clear_calls();
        let stats = engine.render_frame(&mut scene).unwrap();
        assert_eq!(stats.draw_calls, 2);
        assert_eq!(stats.geometry_binds, 2);

        // Split the call log at each draw and inspect what preceded it.
        let calls = engine.device().calls();
        let draws: Vec<usize> = calls
            .iter()
            .enumerate()
            .filter(|(_, call)| matches!(call, DeviceCall::DrawTriangles { .. }))
            .map(|(i, _)| i)
            .collect();
        assert_eq!(draws.len(), 2);

        let before_first = &calls[..draws[0]];
        let before_second = &calls[draws[0] + 1..draws[1]];
        assert!(before_first.iter().any(|c| matches!(c, DeviceCall::BindVertexArray(_))));
        assert!(before_second.iter().any(|c| matches!(c, DeviceCall::BindVertexArray(_))));

        let last = |slice: &[DeviceCall], name: &str| {
            slice.iter().rev().find_map(|call| match call {
                DeviceCall::SetUniform { name: n, value } if n == name => Some(value.clone()),
                _ => None,
            })
        };
        assert_eq!(last(before_first, "u_color"), Some(UniformValue::Vec3([1.0, 0.0, 0.0])));
        assert_eq!(last(before_first, "u_opacity"), Some(UniformValue::Float(1.0)));
        assert_eq!(last(before_second, "u_color"), Some(UniformValue::Vec3([0.0, 0.0, 0.0])));
        assert_eq!(last(before_second, "u_opacity"), Some(UniformValue::Float(0.5)));
        assert!(last(before_first, "u_model_matrix").is_some());
    }

    #[test]
    fn test_group_overrides_do_not_reach_next_node() {
        let mut engine = engine();
        let mut scene = Scene::default();
        let part = scene.create_geometry(triangle(), engine.device_mut()).unwrap();
        let plain = scene.create_geometry(triangle(), engine.device_mut()).unwrap();
        let material = scene.create_material(color_material(), engine.device_mut()).unwrap();
        let group = scene
            .create_group(
                vec![part],
                vec![UniformSet::new().with("u_color", UniformValue::Vec3([1.0, 0.0, 0.0]))],
            )
            .unwrap();
        let model = scene.create_node("model", Drawable::Group(group), material).unwrap();
        scene.add_node(model).unwrap();
        let after = scene.create_node("after", Drawable::Geometry(plain), material).unwrap();
        scene.add_node(after).unwrap();

        engine.device_mut().clear_calls();
        engine.render_frame(&mut scene).unwrap();

        let calls = engine.device().calls();
        let last_draw = calls
            .iter()
            .rposition(|call| matches!(call, DeviceCall::DrawTriangles { .. }))
            .unwrap();
        let color_at_last_draw = calls[..last_draw].iter().rev().find_map(|call| match call {
            DeviceCall::SetUniform { name, value } if name == "u_color" => Some(value.clone()),
            _ => None,
        });
        assert_eq!(color_at_last_draw, Some(UniformValue::Vec3([0.0, 0.0, 0.0])));
    }

    #[test]
    fn test_draw_uses_triangle_count_times_three() {
        let mut engine = engine();
        let mut scene = Scene::default();
        let quad = GeometryConfig::new().with_attribute(
            "a_position",
            VertexAttribute::float32(3, vec![0.0; 18]),
        );
        let geometry = scene.create_geometry(quad, engine.device_mut()).unwrap();
        let material = scene.create_material(color_material(), engine.device_mut()).unwrap();
        let node = scene.create_node("quad", Drawable::Geometry(geometry), material).unwrap();
        scene.add_node(node).unwrap();

        engine.render_frame(&mut scene).unwrap();
        assert!(engine
            .device()
            .calls()
            .contains(&DeviceCall::DrawTriangles { vertex_count: 6 }));
    }

    #[test]
    fn test_hidden_nodes_are_skipped() {
        let mut engine = engine();
        let mut scene = Scene::default();
        let geometry = scene.create_geometry(triangle(), engine.device_mut()).unwrap();
        let material = scene.create_material(color_material(), engine.device_mut()).unwrap();
        let mut node = scene.create_node("a", Drawable::Geometry(geometry), material).unwrap();
        node.visible = false;
        scene.add_node(node).unwrap();

        let stats = engine.render_frame(&mut scene).unwrap();
        assert_eq!(stats, FrameStats::default());
    }

    #[test]
    fn test_tick_passes_delta_and_stops() {
        let mut engine = engine();
        let mut scene = Scene::default();
        let geometry = scene.create_geometry(triangle(), engine.device_mut()).unwrap();
        let material = scene.create_material(color_material(), engine.device_mut()).unwrap();
        let node = scene.create_node("a", Drawable::Geometry(geometry), material).unwrap();
        scene.add_node(node).unwrap();

        let later = Instant::now() + Duration::from_millis(500);
        let mut seen = None;
        let running = engine
            .tick_at(later, &mut scene, |delta, nodes| {
                seen = Some(delta);
                nodes[0].set_translation(Vector3::new(1.0, 0.0, 0.0));
            })
            .unwrap();
        assert!(running);
        assert!(seen.unwrap() >= Duration::from_millis(500));
        assert_eq!(scene.nodes()[0].translation(), Vector3::new(1.0, 0.0, 0.0));

        engine.stop();
        engine.device_mut().clear_calls();
        let running = engine
            .tick_at(later, &mut scene, |_, _| panic!("stopped engines do not update"))
            .unwrap();
        assert!(!running);
        assert!(engine.device().calls().is_empty());
    }

    #[test]
    fn test_node_from_another_scene_is_rejected() {
        let mut engine = engine();
        let mut scene = Scene::default();
        let geometry = scene.create_geometry(triangle(), engine.device_mut()).unwrap();
        let material = scene.create_material(color_material(), engine.device_mut()).unwrap();
        let node = scene.create_node("a", Drawable::Geometry(geometry), material).unwrap();

        let mut empty = Scene::default();
        assert!(matches!(
            empty.add_node(node),
            Err(SceneError::InvalidArgument(_))
        ));
        assert_eq!(engine.render_frame(&mut empty).unwrap().nodes, 0);
    }
}

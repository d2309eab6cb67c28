use log::debug;

use crate::{
    error::SceneError,
    formats::{mtl::MaterialLibrary, obj::ObjFile},
    gfx::{
        camera::Camera,
        device::RenderDevice,
        math::Vec3,
        resources::{
            Drawable, Geometry, GeometryConfig, GeometryGroup, GeometryId, GeometryKey, GroupId,
            GroupKey, Material, MaterialConfig, MaterialId, MaterialKey, ResourceStore, UniformSet,
        },
        scene::object::SceneNode,
    },
};

/// Main scene containing resources, nodes and the camera
///
/// Geometries, materials and groups are stored once in per-kind stores and
/// shared by id. Nodes are drawn in insertion order.
#[derive(Debug, Default)]
pub struct Scene {
    pub camera: Camera,
    geometries: ResourceStore<GeometryKey, Geometry>,
    materials: ResourceStore<MaterialKey, Material>,
    groups: ResourceStore<GroupKey, GeometryGroup>,
    nodes: Vec<SceneNode>,
}

/// Disjoint borrows of the scene used by a frame traversal
pub(crate) struct SceneParts<'a> {
    pub camera: &'a Camera,
    pub geometries: &'a ResourceStore<GeometryKey, Geometry>,
    pub materials: &'a mut ResourceStore<MaterialKey, Material>,
    pub groups: &'a ResourceStore<GroupKey, GeometryGroup>,
    pub nodes: &'a [SceneNode],
}

impl Scene {
    /// Creates a new scene with the given camera
    pub fn new(camera: Camera) -> Self {
        Self {
            camera,
            ..Default::default()
        }
    }

    /// Compiles a geometry on `device` and stores it.
    pub fn create_geometry(
        &mut self,
        config: GeometryConfig,
        device: &mut dyn RenderDevice,
    ) -> Result<GeometryId, SceneError> {
        let mut geometry = Geometry::new(config);
        geometry.compile(device)?;
        Ok(self.geometries.insert(geometry))
    }

    /// Compiles a material on `device` and stores it.
    pub fn create_material(
        &mut self,
        config: MaterialConfig,
        device: &mut dyn RenderDevice,
    ) -> Result<MaterialId, SceneError> {
        let mut material = Material::new(config);
        material.compile(device)?;
        Ok(self.materials.insert(material))
    }

    /// Groups existing geometries; `overrides` pairs with `geometries` by position.
    pub fn create_group(
        &mut self,
        geometries: Vec<GeometryId>,
        overrides: Vec<UniformSet>,
    ) -> Result<GroupId, SceneError> {
        if let Some(missing) = geometries.iter().find(|id| !self.geometries.contains(**id)) {
            return Err(SceneError::InvalidArgument(format!(
                "group references unknown geometry {:?}",
                missing
            )));
        }
        let group = GeometryGroup::new(geometries, overrides)?;
        Ok(self.groups.insert(group))
    }

    /// Builds a node for a stored drawable and material.
    ///
    /// The node inherits the drawable's re-centering offset.
    pub fn create_node(
        &self,
        name: impl Into<String>,
        drawable: Drawable,
        material: MaterialId,
    ) -> Result<SceneNode, SceneError> {
        let offset = self.drawable_offset(drawable)?;
        self.check_material(material)?;
        Ok(SceneNode::new(name, drawable, material, offset))
    }

    /// Appends a node and returns its index.
    pub fn add_node(&mut self, node: SceneNode) -> Result<usize, SceneError> {
        self.drawable_offset(node.drawable())?;
        self.check_material(node.material())?;
        self.nodes.push(node);
        Ok(self.nodes.len() - 1)
    }

    /// Uploads every batch of a parsed OBJ file and adds one node drawing
    /// them as a group with `material`.
    ///
    /// Each batch gets the uniform overrides of its MTL record; batches whose
    /// material is not in `library` get none. Returns the node index.
    pub fn add_model(
        &mut self,
        obj: &ObjFile,
        library: &MaterialLibrary,
        material: MaterialId,
        device: &mut dyn RenderDevice,
    ) -> Result<usize, SceneError> {
        self.check_material(material)?;

        let mut geometries = Vec::with_capacity(obj.batches.len());
        let mut overrides = Vec::with_capacity(obj.batches.len());
        for batch in &obj.batches {
            geometries.push(self.create_geometry(batch.to_geometry_config(), device)?);
            overrides.push(library.uniforms_for(&batch.material));
        }

        let group = GeometryGroup::new(geometries, overrides)?.with_offset(obj.offset);
        let group = self.groups.insert(group);
        let node = self.create_node(obj.name.clone(), Drawable::Group(group), material)?;

        debug!(
            "Added model '{}' as {} geometries ({} triangles)",
            obj.name,
            obj.batches.len(),
            obj.triangle_count()
        );
        self.add_node(node)
    }

    pub fn nodes(&self) -> &[SceneNode] {
        &self.nodes
    }

    pub fn nodes_mut(&mut self) -> &mut [SceneNode] {
        &mut self.nodes
    }

    pub fn node(&self, index: usize) -> Option<&SceneNode> {
        self.nodes.get(index)
    }

    pub fn node_mut(&mut self, index: usize) -> Option<&mut SceneNode> {
        self.nodes.get_mut(index)
    }

    pub fn geometry(&self, id: GeometryId) -> Option<&Geometry> {
        self.geometries.get(id)
    }

    pub fn material(&self, id: MaterialId) -> Option<&Material> {
        self.materials.get(id)
    }

    pub fn group(&self, id: GroupId) -> Option<&GeometryGroup> {
        self.groups.get(id)
    }

    /// Gets statistics about the scene
    pub fn statistics(&self) -> SceneStatistics {
        let total_triangles = self
            .nodes
            .iter()
            .map(|node| self.drawable_triangles(node.drawable()))
            .sum();

        SceneStatistics {
            node_count: self.nodes.len(),
            geometry_count: self.geometries.len(),
            material_count: self.materials.len(),
            group_count: self.groups.len(),
            total_triangles,
        }
    }

    pub(crate) fn parts(&mut self) -> SceneParts<'_> {
        SceneParts {
            camera: &self.camera,
            geometries: &self.geometries,
            materials: &mut self.materials,
            groups: &self.groups,
            nodes: &self.nodes,
        }
    }

    fn drawable_offset(&self, drawable: Drawable) -> Result<Vec3, SceneError> {
        match drawable {
            Drawable::Geometry(id) => self.geometries.get(id).map(Geometry::offset),
            Drawable::Group(id) => self.groups.get(id).map(GeometryGroup::offset),
        }
        .ok_or_else(|| SceneError::InvalidArgument(format!("unknown drawable {:?}", drawable)))
    }

    fn check_material(&self, material: MaterialId) -> Result<(), SceneError> {
        if self.materials.contains(material) {
            Ok(())
        } else {
            Err(SceneError::InvalidArgument(format!(
                "unknown material {:?}",
                material
            )))
        }
    }

    fn drawable_triangles(&self, drawable: Drawable) -> u32 {
        match drawable {
            Drawable::Geometry(id) => self.geometries.get(id).map_or(0, Geometry::triangle_count),
            Drawable::Group(id) => self.groups.get(id).map_or(0, |group| {
                group
                    .children()
                    .iter()
                    .filter_map(|(geometry, _)| self.geometries.get(*geometry))
                    .map(Geometry::triangle_count)
                    .sum()
            }),
        }
    }
}

/// Scene statistics for debugging and logging
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SceneStatistics {
    pub node_count: usize,
    pub geometry_count: usize,
    pub material_count: usize,
    pub group_count: usize,
    pub total_triangles: u32,
}

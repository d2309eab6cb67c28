//! Vertex data resources
//!
//! A [`Geometry`] owns its attribute streams and, once compiled, the device
//! vertex array they were uploaded to. Attribute order in the
//! [`GeometryConfig`] is the binding slot order.

use cgmath::{Vector3, Zero};
use log::debug;

use crate::{
    error::SceneError,
    gfx::device::{ElementType, LayoutElement, RenderDevice, VertexArrayHandle},
};

/// Attribute names recognised as the position stream, in lookup order.
pub const POSITION_ATTRIBUTES: [&str; 2] = ["a_position", "position"];

/// Typed attribute data
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeData {
    Float32(Vec<f32>),
    Uint32(Vec<u32>),
    Uint8(Vec<u8>),
}

impl AttributeData {
    pub fn element_type(&self) -> ElementType {
        match self {
            AttributeData::Float32(_) => ElementType::Float32,
            AttributeData::Uint32(_) => ElementType::Uint32,
            AttributeData::Uint8(_) => ElementType::Uint8,
        }
    }

    /// Number of scalar components
    pub fn len(&self) -> usize {
        match self {
            AttributeData::Float32(data) => data.len(),
            AttributeData::Uint32(data) => data.len(),
            AttributeData::Uint8(data) => data.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn as_bytes(&self) -> &[u8] {
        match self {
            AttributeData::Float32(data) => bytemuck::cast_slice(data),
            AttributeData::Uint32(data) => bytemuck::cast_slice(data),
            AttributeData::Uint8(data) => data.as_slice(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct VertexAttribute {
    pub component_count: u32,
    pub data: AttributeData,
}

impl VertexAttribute {
    pub fn new(component_count: u32, data: AttributeData) -> Self {
        Self {
            component_count,
            data,
        }
    }

    pub fn float32(component_count: u32, data: Vec<f32>) -> Self {
        Self::new(component_count, AttributeData::Float32(data))
    }

    /// Number of whole vertices in the stream
    pub fn vertex_count(&self) -> usize {
        if self.component_count == 0 {
            return 0;
        }
        self.data.len() / self.component_count as usize
    }
}

/// Ordered attribute streams plus an optional index list
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GeometryConfig {
    attributes: Vec<(String, VertexAttribute)>,
    indices: Option<Vec<u32>>,
}

impl GeometryConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder pattern: append an attribute; replaces an existing one of the same name in place
    pub fn with_attribute(mut self, name: impl Into<String>, attribute: VertexAttribute) -> Self {
        let name = name.into();
        match self.attributes.iter_mut().find(|(n, _)| *n == name) {
            Some((_, existing)) => *existing = attribute,
            None => self.attributes.push((name, attribute)),
        }
        self
    }

    /// Builder pattern: draw through an index buffer
    pub fn with_indices(mut self, indices: Vec<u32>) -> Self {
        self.indices = Some(indices);
        self
    }

    pub fn attributes(&self) -> impl Iterator<Item = (&str, &VertexAttribute)> {
        self.attributes.iter().map(|(n, a)| (n.as_str(), a))
    }

    pub fn attribute(&self, name: &str) -> Option<&VertexAttribute> {
        self.attributes
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, a)| a)
    }

    pub fn indices(&self) -> Option<&[u32]> {
        self.indices.as_deref()
    }

    /// The position stream: the first of [`POSITION_ATTRIBUTES`] present,
    /// otherwise the first attribute.
    pub fn position(&self) -> Option<&VertexAttribute> {
        POSITION_ATTRIBUTES
            .iter()
            .find_map(|name| self.attribute(name))
            .or_else(|| self.attributes.first().map(|(_, a)| a))
    }
}

/// GPU-bound vertex data
#[derive(Debug)]
pub struct Geometry {
    config: GeometryConfig,
    vertex_array: Option<VertexArrayHandle>,
    triangle_count: u32,
    offset: Vector3<f32>,
}

impl Geometry {
    /// Creates an uncompiled geometry; the triangle count is derived from the
    /// position stream.
    pub fn new(config: GeometryConfig) -> Self {
        let vertex_count = config.position().map_or(0, VertexAttribute::vertex_count);

        Self {
            config,
            vertex_array: None,
            triangle_count: (vertex_count / 3) as u32,
            offset: Vector3::zero(),
        }
    }

    /// Builder pattern: translation applied after the owning node's transform
    pub fn with_offset(mut self, offset: Vector3<f32>) -> Self {
        self.offset = offset;
        self
    }

    pub fn offset(&self) -> Vector3<f32> {
        self.offset
    }

    pub fn config(&self) -> &GeometryConfig {
        &self.config
    }

    pub fn triangle_count(&self) -> u32 {
        self.triangle_count
    }

    /// Vertices issued by a non-indexed draw
    pub fn vertex_count(&self) -> u32 {
        self.triangle_count * 3
    }

    pub fn is_compiled(&self) -> bool {
        self.vertex_array.is_some()
    }

    /// Uploads every attribute stream and records the vertex layout.
    ///
    /// Compilation happens exactly once per geometry.
    pub fn compile(&mut self, device: &mut dyn RenderDevice) -> Result<(), SceneError> {
        if self.is_compiled() {
            return Err(SceneError::AlreadyCompiled("geometry"));
        }

        let mut elements = Vec::with_capacity(self.config.attributes.len());
        for (slot, (_, attribute)) in self.config.attributes.iter().enumerate() {
            let buffer = device.create_buffer(attribute.data.as_bytes())?;
            elements.push(LayoutElement {
                slot: slot as u32,
                component_count: attribute.component_count,
                element_type: attribute.data.element_type(),
                normalized: false,
                buffer,
            });
        }

        let index_buffer = match &self.config.indices {
            Some(indices) => Some(device.create_index_buffer(indices)?),
            None => None,
        };

        let vertex_array = device.create_vertex_array()?;
        device.bind_vertex_layout(vertex_array, &elements, index_buffer)?;
        self.vertex_array = Some(vertex_array);

        debug!(
            "Compiled geometry: {} attributes, {} triangles",
            elements.len(),
            self.triangle_count
        );
        Ok(())
    }

    pub fn bind(&self, device: &mut dyn RenderDevice) -> Result<(), SceneError> {
        let vertex_array = self
            .vertex_array
            .ok_or(SceneError::NotCompiled("geometry"))?;
        device.bind_vertex_array(vertex_array);
        Ok(())
    }

    /// Issues the draw call for the bound geometry.
    pub fn draw(&self, device: &mut dyn RenderDevice) {
        match &self.config.indices {
            Some(indices) => device.draw_indexed_triangles(indices.len() as u32),
            None => device.draw_triangles(self.vertex_count()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::device::{DeviceCall, RecordingDevice};

    fn triangle_config() -> GeometryConfig {
        GeometryConfig::new()
            .with_attribute(
                "a_position",
                VertexAttribute::float32(3, vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 1.0, 0.0]),
            )
            .with_attribute(
                "a_texCoord",
                VertexAttribute::float32(2, vec![0.0, 0.0, 1.0, 0.0, 1.0, 1.0]),
            )
            .with_attribute(
                "a_color",
                VertexAttribute::new(4, AttributeData::Uint8(vec![255; 12])),
            )
    }

    #[test]
    fn test_triangle_count_from_positions() {
        let geometry = Geometry::new(triangle_config());
        assert_eq!(geometry.triangle_count(), 1);
        assert_eq!(geometry.vertex_count(), 3);
    }

    #[test]
    fn test_position_falls_back_to_first_attribute() {
        let config =
            GeometryConfig::new().with_attribute("vertices", VertexAttribute::float32(3, vec![0.0; 18]));
        assert_eq!(Geometry::new(config).triangle_count(), 2);
    }

    #[test]
    fn test_compile_binds_attributes_in_declaration_order() {
        let mut device = RecordingDevice::new();
        let mut geometry = Geometry::new(triangle_config());
        geometry.compile(&mut device).unwrap();

        let layout = device
            .calls()
            .iter()
            .find_map(|call| match call {
                DeviceCall::BindVertexLayout { elements, .. } => Some(elements.clone()),
                _ => None,
            })
            .expect("layout was bound");

        let slots: Vec<_> = layout
            .iter()
            .map(|e| (e.slot, e.component_count, e.element_type))
            .collect();
        assert_eq!(
            slots,
            vec![
                (0, 3, ElementType::Float32),
                (1, 2, ElementType::Float32),
                (2, 4, ElementType::Uint8),
            ]
        );

        // Float buffers are uploaded as raw bytes
        assert!(device
            .calls()
            .contains(&DeviceCall::CreateBuffer { handle: layout[0].buffer, len: 36 }));
    }

    #[test]
    fn test_recompile_is_rejected() {
        let mut device = RecordingDevice::new();
        let mut geometry = Geometry::new(triangle_config());
        geometry.compile(&mut device).unwrap();

        assert_eq!(
            geometry.compile(&mut device),
            Err(SceneError::AlreadyCompiled("geometry"))
        );
    }

    #[test]
    fn test_bind_requires_compilation() {
        let mut device = RecordingDevice::new();
        let geometry = Geometry::new(triangle_config());
        assert_eq!(
            geometry.bind(&mut device),
            Err(SceneError::NotCompiled("geometry"))
        );
    }

    #[test]
    fn test_indexed_geometry_draws_indices() {
        let mut device = RecordingDevice::new();
        let config = GeometryConfig::new()
            .with_attribute("position", VertexAttribute::float32(3, vec![0.0; 12]))
            .with_indices(vec![0, 1, 2, 0, 2, 3]);
        let mut geometry = Geometry::new(config);
        geometry.compile(&mut device).unwrap();
        geometry.draw(&mut device);

        assert_eq!(
            device.calls().last(),
            Some(&DeviceCall::DrawIndexedTriangles { index_count: 6 })
        );
    }
}

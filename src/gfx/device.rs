//! # Device Boundary
//!
//! The scene and renderer never talk to a graphics API directly. Every buffer
//! upload, program compilation, uniform write and draw goes through the
//! [`RenderDevice`] trait, so a WebGL, OpenGL or wgpu wrapper can be plugged in
//! by the application.
//!
//! [`RecordingDevice`] is a headless implementation that records every call.
//! It backs the test-suite and is handy for inspecting what a frame does.

use std::collections::HashMap;

use thiserror::Error;

use crate::gfx::{rendering::RenderConfig, resources::uniform::UniformValue};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BufferHandle(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VertexArrayHandle(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProgramHandle(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UniformLocation(pub u32);

/// Scalar type of one vertex attribute component
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementType {
    Float32,
    Uint32,
    Uint8,
}

impl ElementType {
    /// Size of one component in bytes
    pub fn size(self) -> usize {
        match self {
            ElementType::Float32 | ElementType::Uint32 => 4,
            ElementType::Uint8 => 1,
        }
    }
}

/// One attribute binding of a vertex array.
///
/// Attributes are not interleaved: each element reads tightly packed data
/// from its own buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayoutElement {
    pub slot: u32,
    pub component_count: u32,
    pub element_type: ElementType,
    pub normalized: bool,
    pub buffer: BufferHandle,
}

/// Failure reported by the device layer, carrying its diagnostic text.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{operation} failed: {message}")]
pub struct DeviceError {
    pub operation: &'static str,
    pub message: String,
}

impl DeviceError {
    pub fn new(operation: &'static str, message: impl Into<String>) -> Self {
        Self {
            operation,
            message: message.into(),
        }
    }
}

/// Graphics device the resource model issues its calls against
pub trait RenderDevice {
    fn create_buffer(&mut self, data: &[u8]) -> Result<BufferHandle, DeviceError>;

    fn create_index_buffer(&mut self, indices: &[u32]) -> Result<BufferHandle, DeviceError>;

    fn create_vertex_array(&mut self) -> Result<VertexArrayHandle, DeviceError>;

    /// Attaches `elements` (slot order) and an optional index buffer to a vertex array.
    fn bind_vertex_layout(
        &mut self,
        vertex_array: VertexArrayHandle,
        elements: &[LayoutElement],
        index_buffer: Option<BufferHandle>,
    ) -> Result<(), DeviceError>;

    fn bind_vertex_array(&mut self, vertex_array: VertexArrayHandle);

    /// Compiles and links a program; compile and link logs are returned as the error message.
    fn create_program(
        &mut self,
        vertex_source: &str,
        fragment_source: &str,
    ) -> Result<ProgramHandle, DeviceError>;

    fn use_program(&mut self, program: ProgramHandle);

    fn uniform_location(&mut self, program: ProgramHandle, name: &str) -> Option<UniformLocation>;

    /// Writes a uniform of the currently used program.
    fn set_uniform(&mut self, location: UniformLocation, value: &UniformValue);

    /// Sets up depth/cull state and clears the frame buffer.
    fn begin_frame(&mut self, config: &RenderConfig);

    /// Draws `vertex_count` vertices of the bound vertex array as a triangle list.
    fn draw_triangles(&mut self, vertex_count: u32);

    fn draw_indexed_triangles(&mut self, index_count: u32);
}

/// A call observed by [`RecordingDevice`]
#[derive(Debug, Clone, PartialEq)]
pub enum DeviceCall {
    CreateBuffer { handle: BufferHandle, len: usize },
    CreateIndexBuffer { handle: BufferHandle, count: usize },
    CreateVertexArray(VertexArrayHandle),
    BindVertexLayout {
        vertex_array: VertexArrayHandle,
        elements: Vec<LayoutElement>,
        index_buffer: Option<BufferHandle>,
    },
    BindVertexArray(VertexArrayHandle),
    CreateProgram(ProgramHandle),
    UseProgram(ProgramHandle),
    SetUniform { name: String, value: UniformValue },
    BeginFrame,
    DrawTriangles { vertex_count: u32 },
    DrawIndexedTriangles { index_count: u32 },
}

/// Headless [`RenderDevice`] that hands out sequential handles and records
/// every call in order.
#[derive(Debug, Default)]
pub struct RecordingDevice {
    calls: Vec<DeviceCall>,
    next_handle: u32,
    locations: HashMap<(ProgramHandle, String), UniformLocation>,
    location_names: HashMap<UniformLocation, String>,
    program_failure: Option<String>,
    unknown_uniforms: Vec<String>,
}

impl RecordingDevice {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every following `create_program` fail with `log` as diagnostic text.
    pub fn fail_program_compilation(&mut self, log: impl Into<String>) {
        self.program_failure = Some(log.into());
    }

    /// Makes `uniform_location` report `name` as absent from every program.
    pub fn hide_uniform(&mut self, name: impl Into<String>) {
        self.unknown_uniforms.push(name.into());
    }

    pub fn calls(&self) -> &[DeviceCall] {
        &self.calls
    }

    pub fn clear_calls(&mut self) {
        self.calls.clear();
    }

    pub fn count(&self, predicate: impl Fn(&DeviceCall) -> bool) -> usize {
        self.calls.iter().filter(|call| predicate(call)).count()
    }

    pub fn draw_calls(&self) -> usize {
        self.count(|call| {
            matches!(
                call,
                DeviceCall::DrawTriangles { .. } | DeviceCall::DrawIndexedTriangles { .. }
            )
        })
    }

    pub fn vertex_array_binds(&self) -> usize {
        self.count(|call| matches!(call, DeviceCall::BindVertexArray(_)))
    }

    pub fn program_binds(&self) -> usize {
        self.count(|call| matches!(call, DeviceCall::UseProgram(_)))
    }

    /// Last value written to the uniform called `name`, if any.
    pub fn last_uniform(&self, name: &str) -> Option<&UniformValue> {
        self.calls.iter().rev().find_map(|call| match call {
            DeviceCall::SetUniform { name: n, value } if n == name => Some(value),
            _ => None,
        })
    }

    fn next(&mut self) -> u32 {
        self.next_handle += 1;
        self.next_handle
    }
}

impl RenderDevice for RecordingDevice {
    fn create_buffer(&mut self, data: &[u8]) -> Result<BufferHandle, DeviceError> {
        let handle = BufferHandle(self.next());
        self.calls.push(DeviceCall::CreateBuffer {
            handle,
            len: data.len(),
        });
        Ok(handle)
    }

    fn create_index_buffer(&mut self, indices: &[u32]) -> Result<BufferHandle, DeviceError> {
        let handle = BufferHandle(self.next());
        self.calls.push(DeviceCall::CreateIndexBuffer {
            handle,
            count: indices.len(),
        });
        Ok(handle)
    }

    fn create_vertex_array(&mut self) -> Result<VertexArrayHandle, DeviceError> {
        let handle = VertexArrayHandle(self.next());
        self.calls.push(DeviceCall::CreateVertexArray(handle));
        Ok(handle)
    }

    fn bind_vertex_layout(
        &mut self,
        vertex_array: VertexArrayHandle,
        elements: &[LayoutElement],
        index_buffer: Option<BufferHandle>,
    ) -> Result<(), DeviceError> {
        self.calls.push(DeviceCall::BindVertexLayout {
            vertex_array,
            elements: elements.to_vec(),
            index_buffer,
        });
        Ok(())
    }

    fn bind_vertex_array(&mut self, vertex_array: VertexArrayHandle) {
        self.calls.push(DeviceCall::BindVertexArray(vertex_array));
    }

    fn create_program(
        &mut self,
        _vertex_source: &str,
        _fragment_source: &str,
    ) -> Result<ProgramHandle, DeviceError> {
        if let Some(log) = &self.program_failure {
            return Err(DeviceError::new("program link", log.clone()));
        }

        let handle = ProgramHandle(self.next());
        self.calls.push(DeviceCall::CreateProgram(handle));
        Ok(handle)
    }

    fn use_program(&mut self, program: ProgramHandle) {
        self.calls.push(DeviceCall::UseProgram(program));
    }

    fn uniform_location(&mut self, program: ProgramHandle, name: &str) -> Option<UniformLocation> {
        if self.unknown_uniforms.iter().any(|n| n == name) {
            return None;
        }

        if let Some(location) = self.locations.get(&(program, name.to_string())) {
            return Some(*location);
        }

        let location = UniformLocation(self.next());
        self.locations.insert((program, name.to_string()), location);
        self.location_names.insert(location, name.to_string());
        Some(location)
    }

    fn set_uniform(&mut self, location: UniformLocation, value: &UniformValue) {
        let name = self
            .location_names
            .get(&location)
            .cloned()
            .unwrap_or_else(|| format!("<location {}>", location.0));
        self.calls.push(DeviceCall::SetUniform {
            name,
            value: value.clone(),
        });
    }

    fn begin_frame(&mut self, _config: &RenderConfig) {
        self.calls.push(DeviceCall::BeginFrame);
    }

    fn draw_triangles(&mut self, vertex_count: u32) {
        self.calls.push(DeviceCall::DrawTriangles { vertex_count });
    }

    fn draw_indexed_triangles(&mut self, index_count: u32) {
        self.calls.push(DeviceCall::DrawIndexedTriangles { index_count });
    }
}

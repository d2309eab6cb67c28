//! Shader programs and their uniform state
//!
//! A [`Material`] is a compiled program plus the uniforms it declares. Only
//! uniforms named in the [`MaterialConfig`] are tracked; writes to any other
//! name are ignored, which lets the renderer push the same global uniform set
//! to every material.

use std::collections::HashMap;

use log::{debug, trace};

use crate::{
    error::SceneError,
    gfx::{
        device::{ProgramHandle, RenderDevice, UniformLocation},
        resources::uniform::{UniformSet, UniformValue},
    },
};

/// Shader sources plus the uniforms (and their initial values) the program uses
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MaterialConfig {
    pub vertex: String,
    pub fragment: String,
    pub uniforms: UniformSet,
}

impl MaterialConfig {
    pub fn new(vertex: impl Into<String>, fragment: impl Into<String>) -> Self {
        Self {
            vertex: vertex.into(),
            fragment: fragment.into(),
            uniforms: UniformSet::new(),
        }
    }

    /// Builder pattern: declare a uniform with its initial value
    pub fn with_uniform(mut self, name: impl Into<String>, value: impl Into<UniformValue>) -> Self {
        self.uniforms.insert(name, value);
        self
    }
}

#[derive(Debug, Clone)]
struct BoundUniform {
    location: UniformLocation,
    value: UniformValue,
}

#[derive(Debug)]
pub struct Material {
    config: MaterialConfig,
    program: Option<ProgramHandle>,
    uniforms: HashMap<String, BoundUniform>,
}

impl Material {
    pub fn new(config: MaterialConfig) -> Self {
        Self {
            config,
            program: None,
            uniforms: HashMap::new(),
        }
    }

    pub fn config(&self) -> &MaterialConfig {
        &self.config
    }

    pub fn is_compiled(&self) -> bool {
        self.program.is_some()
    }

    /// Compiles the program, resolves every declared uniform and uploads its
    /// initial value.
    ///
    /// Compilation happens exactly once per material. A declared uniform the
    /// linked program does not expose is an error.
    pub fn compile(&mut self, device: &mut dyn RenderDevice) -> Result<(), SceneError> {
        if self.is_compiled() {
            return Err(SceneError::AlreadyCompiled("material"));
        }

        let program = device.create_program(&self.config.vertex, &self.config.fragment)?;
        device.use_program(program);

        let mut uniforms = HashMap::with_capacity(self.config.uniforms.len());
        for (name, value) in self.config.uniforms.iter() {
            let location = device
                .uniform_location(program, name)
                .ok_or_else(|| SceneError::MissingUniform(name.to_string()))?;
            device.set_uniform(location, value);
            uniforms.insert(
                name.to_string(),
                BoundUniform {
                    location,
                    value: value.clone(),
                },
            );
        }

        debug!("Compiled material with {} uniforms", uniforms.len());
        self.program = Some(program);
        self.uniforms = uniforms;
        Ok(())
    }

    pub fn bind(&self, device: &mut dyn RenderDevice) -> Result<(), SceneError> {
        let program = self.program.ok_or(SceneError::NotCompiled("material"))?;
        device.use_program(program);
        Ok(())
    }

    /// Writes one uniform of the bound program.
    ///
    /// Returns `false` without touching the device when the material does not
    /// declare `name`.
    pub fn update_uniform(
        &mut self,
        name: &str,
        value: &UniformValue,
        device: &mut dyn RenderDevice,
    ) -> bool {
        match self.uniforms.get_mut(name) {
            Some(bound) => {
                bound.value = value.clone();
                device.set_uniform(bound.location, value);
                true
            }
            None => {
                trace!("Skipping undeclared uniform {} ({})", name, value.type_name());
                false
            }
        }
    }

    pub fn update_uniforms(&mut self, uniforms: &UniformSet, device: &mut dyn RenderDevice) {
        for (name, value) in uniforms.iter() {
            self.update_uniform(name, value, device);
        }
    }

    /// Current value of a declared uniform
    pub fn uniform(&self, name: &str) -> Option<&UniformValue> {
        match self.uniforms.get(name) {
            Some(bound) => Some(&bound.value),
            None => self.config.uniforms.get(name),
        }
    }

    /// Initial values of the declared uniforms among `names`
    pub fn defaults_for<'a>(&self, names: impl IntoIterator<Item = &'a str>) -> UniformSet {
        names
            .into_iter()
            .filter_map(|name| {
                self.config
                    .uniforms
                    .get(name)
                    .map(|value| (name, value.clone()))
            })
            .collect()
    }
}

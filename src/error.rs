//! Errors raised by the resource model and the scene

use thiserror::Error;

use crate::gfx::device::DeviceError;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum SceneError {
    #[error("{0} has already been compiled")]
    AlreadyCompiled(&'static str),
    #[error("{0} must be compiled before use")]
    NotCompiled(&'static str),
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("uniform `{0}` is not declared by the program")]
    MissingUniform(String),
    #[error(transparent)]
    Device(#[from] DeviceError),
}

/// Shader module - stage reflection, stage registry, material signatures

pub mod reflection;
pub mod shader_library;
pub mod signature;

pub use reflection::*;
pub use shader_library::*;
pub use signature::*;

/// Buffer trait and vertex element formats

use crate::error::Result;

/// Data format of one vertex element
///
/// Only the semantic name and index of an element take part in the pipeline
/// cache key; the format is carried to the backend but never hashed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(non_camel_case_types)]
pub enum BufferFormat {
    R32_SFLOAT,
    R32G32_SFLOAT,
    R32G32B32_SFLOAT,
    R32G32B32A32_SFLOAT,

    R32_UINT,
    R32G32_UINT,
    R32G32B32A32_UINT,

    R16G16_SFLOAT,
    R16G16B16A16_SFLOAT,

    R8G8B8A8_UNORM,
    R8G8B8A8_UINT,
}

impl BufferFormat {
    /// Returns size in bytes for this format
    pub fn size_bytes(&self) -> u32 {
        match self {
            BufferFormat::R32_SFLOAT | BufferFormat::R32_UINT => 4,
            BufferFormat::R32G32_SFLOAT | BufferFormat::R32G32_UINT => 8,
            BufferFormat::R32G32B32_SFLOAT => 12,
            BufferFormat::R32G32B32A32_SFLOAT | BufferFormat::R32G32B32A32_UINT => 16,
            BufferFormat::R16G16_SFLOAT => 4,
            BufferFormat::R16G16B16A16_SFLOAT => 8,
            BufferFormat::R8G8B8A8_UNORM | BufferFormat::R8G8B8A8_UINT => 4,
        }
    }
}

/// GPU buffer (vertex/index data owned by the scene collaborator)
///
/// Implemented by backend-specific buffer types.
/// The buffer is automatically destroyed when dropped.
pub trait Buffer: Send + Sync {
    /// Size in bytes
    fn size(&self) -> u64;

    /// Update buffer data
    ///
    /// # Arguments
    ///
    /// * `offset` - Offset into the buffer in bytes
    /// * `data` - Data to write
    fn update(&self, offset: u64, data: &[u8]) -> Result<()>;
}

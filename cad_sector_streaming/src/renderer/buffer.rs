/// Buffer trait, buffer descriptor and element formats

use crate::error::Result;

/// Descriptor for creating a buffer
#[derive(Debug, Clone)]
pub struct BufferDesc {
    /// Size in bytes
    pub size: u64,
}

/// Buffer data format for vertex and instance attributes
///
/// Defines the data type and component count for buffer elements.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(non_camel_case_types)]
pub enum BufferFormat {
    // Float formats
    R32_SFLOAT,         // float (4 bytes)
    R32G32_SFLOAT,      // vec2 (8 bytes)
    R32G32B32_SFLOAT,   // vec3 (12 bytes)
    R32G32B32A32_SFLOAT, // vec4 (16 bytes)

    // Integer formats (unsigned)
    R32_UINT,
    R32G32_UINT,
    R32G32B32A32_UINT,

    // Byte formats (unsigned, colors)
    R8G8B8A8_UINT,
}

impl BufferFormat {
    /// Returns size in bytes for this format
    pub fn size_bytes(&self) -> u32 {
        match self {
            BufferFormat::R32_SFLOAT | BufferFormat::R32_UINT | BufferFormat::R8G8B8A8_UINT => 4,
            BufferFormat::R32G32_SFLOAT | BufferFormat::R32G32_UINT => 8,
            BufferFormat::R32G32B32_SFLOAT => 12,
            BufferFormat::R32G32B32A32_SFLOAT | BufferFormat::R32G32B32A32_UINT => 16,
        }
    }
}

/// Buffer resource trait
///
/// Implemented by backend-specific buffer types.
/// The buffer is destroyed when its last `Arc` is dropped, so whoever holds
/// the last reference owns its disposal.
pub trait Buffer: Send + Sync {
    /// Update buffer data
    ///
    /// # Arguments
    ///
    /// * `offset` - Offset into the buffer in bytes
    /// * `data` - Data to write
    fn update(&self, offset: u64, data: &[u8]) -> Result<()>;

    /// Allocated size in bytes
    fn size(&self) -> u64;
}

#[cfg(test)]
#[path = "buffer_tests.rs"]
mod tests;

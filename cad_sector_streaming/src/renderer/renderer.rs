/// Renderer trait - GPU resource factory used by the streaming core

use std::sync::Arc;
use crate::error::Result;
use crate::renderer::{Buffer, BufferDesc};

/// GPU resource factory
///
/// The streaming core only allocates the buffers it owns outright (instanced
/// draw lanes). Sector geometry and textures arrive already uploaded from the
/// decoding side and are never created here.
pub trait Renderer: Send + Sync {
    /// Create a buffer
    ///
    /// # Arguments
    ///
    /// * `desc` - Buffer descriptor
    ///
    /// # Returns
    ///
    /// A shared pointer to the created buffer
    fn create_buffer(&mut self, desc: BufferDesc) -> Result<Arc<dyn Buffer>>;
}

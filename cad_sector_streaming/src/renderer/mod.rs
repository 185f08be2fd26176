/// Renderer module - GPU resource traits consumed by the streaming core

pub mod renderer;
pub mod buffer;
pub mod texture;

pub use renderer::*;
pub use buffer::*;
pub use texture::*;

// Mock renderer for tests (no GPU required)
#[cfg(test)]
pub mod mock_renderer;

/// Mock Renderer for unit tests (no GPU required)
///
/// Buffers keep their bytes in memory so tests can read back what the
/// batching code uploaded. Buffers and textures can carry a `DropCounter`
/// to observe when their last reference is released.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, Weak};

use crate::error::Result;
use crate::renderer::{
    Buffer, BufferDesc, Renderer, Texture, TextureFormat, TextureInfo,
};
use crate::stream_bail;

// ============================================================================
// Drop Counter
// ============================================================================

/// Shared counter incremented each time a tracked mock resource is dropped
#[derive(Debug, Clone, Default)]
pub struct DropCounter(Arc<AtomicUsize>);

impl DropCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of tracked resources dropped so far
    pub fn count(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }

    fn record(&self) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }
}

// ============================================================================
// Mock Buffer
// ============================================================================

#[derive(Debug)]
pub struct MockBuffer {
    pub size: u64,
    pub name: String,
    pub data: Mutex<Vec<u8>>,
    drops: Option<DropCounter>,
}

impl MockBuffer {
    pub fn new(size: u64, name: String) -> Self {
        Self {
            size,
            name,
            data: Mutex::new(vec![0; size as usize]),
            drops: None,
        }
    }

    /// Buffer pre-filled with `bytes`
    pub fn with_data(bytes: &[u8], name: &str) -> Self {
        Self {
            size: bytes.len() as u64,
            name: name.to_string(),
            data: Mutex::new(bytes.to_vec()),
            drops: None,
        }
    }

    /// Attach a drop counter
    pub fn tracked(mut self, drops: &DropCounter) -> Self {
        self.drops = Some(drops.clone());
        self
    }

    /// Copy of the bytes in `[offset, offset + len)`
    pub fn read(&self, offset: u64, len: u64) -> Vec<u8> {
        let data = self.data.lock().unwrap();
        data[offset as usize..(offset + len) as usize].to_vec()
    }
}

impl Buffer for MockBuffer {
    fn update(&self, offset: u64, data: &[u8]) -> Result<()> {
        let end = offset + data.len() as u64;
        if end > self.size {
            stream_bail!("sector3d::MockBuffer", kind = BackendError,
                "Write of {} bytes at offset {} overflows buffer '{}' ({} bytes)",
                data.len(), offset, self.name, self.size);
        }
        let mut bytes = self.data.lock().unwrap();
        bytes[offset as usize..end as usize].copy_from_slice(data);
        Ok(())
    }

    fn size(&self) -> u64 {
        self.size
    }
}

impl Drop for MockBuffer {
    fn drop(&mut self) {
        if let Some(drops) = &self.drops {
            drops.record();
        }
    }
}

// ============================================================================
// Mock Texture
// ============================================================================

#[derive(Debug)]
pub struct MockTexture {
    pub info: TextureInfo,
    pub name: String,
    drops: Option<DropCounter>,
}

impl MockTexture {
    pub fn new(width: u32, height: u32, name: String) -> Self {
        Self {
            info: TextureInfo {
                width,
                height,
                format: TextureFormat::R8G8B8A8_SRGB,
            },
            name,
            drops: None,
        }
    }

    /// Attach a drop counter
    pub fn tracked(mut self, drops: &DropCounter) -> Self {
        self.drops = Some(drops.clone());
        self
    }
}

impl Texture for MockTexture {
    fn info(&self) -> &TextureInfo {
        &self.info
    }
}

impl Drop for MockTexture {
    fn drop(&mut self) {
        if let Some(drops) = &self.drops {
            drops.record();
        }
    }
}

// ============================================================================
// Mock Renderer
// ============================================================================

/// Mock renderer that creates in-memory buffers
///
/// Every created buffer is remembered weakly in `created_buffers` so tests can
/// inspect lane contents without keeping the lanes alive. `buffer_budget`
/// makes allocations past the given byte total of live buffers fail with
/// `Error::OutOfMemory`.
pub struct MockRenderer {
    pub created_buffers: Arc<Mutex<Vec<Weak<MockBuffer>>>>,
    pub buffer_budget: Option<u64>,
    pub buffer_drops: DropCounter,
}

impl MockRenderer {
    pub fn new() -> Self {
        Self {
            created_buffers: Arc::new(Mutex::new(Vec::new())),
            buffer_budget: None,
            buffer_drops: DropCounter::new(),
        }
    }

    /// Mock renderer refusing allocations beyond `bytes` in total
    pub fn with_budget(bytes: u64) -> Self {
        Self {
            buffer_budget: Some(bytes),
            ..Self::new()
        }
    }

    /// Buffer created at position `index`, if it is still alive
    pub fn buffer(&self, index: usize) -> Option<Arc<MockBuffer>> {
        self.created_buffers.lock().unwrap().get(index).and_then(Weak::upgrade)
    }

    /// Number of buffers created so far
    pub fn buffer_count(&self) -> usize {
        self.created_buffers.lock().unwrap().len()
    }

    /// Number of created buffers still alive
    pub fn live_buffer_count(&self) -> usize {
        self.live().len()
    }

    /// Bytes held by live buffers
    pub fn live_bytes(&self) -> u64 {
        self.live().iter().map(|b| b.size).sum()
    }

    fn live(&self) -> Vec<Arc<MockBuffer>> {
        self.created_buffers.lock().unwrap().iter().filter_map(Weak::upgrade).collect()
    }
}

impl Default for MockRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl Renderer for MockRenderer {
    fn create_buffer(&mut self, desc: BufferDesc) -> Result<Arc<dyn Buffer>> {
        if let Some(budget) = self.buffer_budget {
            let allocated = self.live_bytes();
            if allocated + desc.size > budget {
                return Err(crate::error::Error::OutOfMemory);
            }
        }
        let mut buffers = self.created_buffers.lock().unwrap();
        let name = format!("mock_buffer_{}", buffers.len());
        let buffer = Arc::new(MockBuffer::new(desc.size, name).tracked(&self.buffer_drops));
        buffers.push(Arc::downgrade(&buffer));
        Ok(buffer)
    }
}

#[cfg(test)]
#[path = "mock_renderer_tests.rs"]
mod tests;

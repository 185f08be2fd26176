/// Streaming configuration

use crate::error::Result;
use crate::stream_bail;

/// Tunables of the streaming core
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamingConfig {
    /// Parallel instance lanes created per primitive sub-kind
    pub lane_count: usize,
    /// Byte capacity of a freshly allocated lane
    pub initial_lane_capacity: u64,
    /// Unreferenced sectors kept by the sector cache before eviction
    pub sector_cache_size: usize,
}

impl Default for StreamingConfig {
    fn default() -> Self {
        Self {
            lane_count: 2,
            initial_lane_capacity: 64 * 1024,
            sector_cache_size: 50,
        }
    }
}

impl StreamingConfig {
    /// Check the configuration and return it unchanged if usable
    ///
    /// # Errors
    ///
    /// `Error::InvalidResource` if `lane_count` or `initial_lane_capacity` is zero.
    pub fn validated(self) -> Result<Self> {
        if self.lane_count == 0 {
            stream_bail!("sector3d::StreamingConfig", "lane_count must be at least 1");
        }
        if self.initial_lane_capacity == 0 {
            stream_bail!("sector3d::StreamingConfig", "initial_lane_capacity must be non-zero");
        }
        Ok(self)
    }
}

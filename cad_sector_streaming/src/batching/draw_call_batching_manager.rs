/// Batching seam between the sector pipeline and the instanced draw path

use glam::Mat4;

use crate::error::Result;
use crate::sector::{ParsedGeometry, SectorId};

/// Merges instanced geometry of many sectors into a bounded number of draw calls
pub trait DrawCallBatchingManager {
    /// Add the instanced items of a sector to the shared batches.
    ///
    /// Items that are not instanced are ignored. A sector can be batched once
    /// until it is removed.
    fn batch_geometries(&mut self, items: &[ParsedGeometry], sector_id: SectorId) -> Result<()>;

    /// Remove exactly the contribution of `sector_id`; unknown ids are a no-op
    fn remove_sector_batches(&mut self, sector_id: SectorId);

    /// Whether `sector_id` currently has a batched contribution
    fn has_sector(&self, sector_id: SectorId) -> bool;

    /// Remove every sector and release all batch buffers
    fn dispose(&mut self);

    /// Per-frame hook run with the world transform of the batched model
    fn before_render(&self, _world: &Mat4) {}
}

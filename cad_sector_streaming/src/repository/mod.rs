/// Repository module - the owner of decoded sector resources

pub mod sector_cache;

pub use sector_cache::*;

use crate::error::Result;
use crate::sector::{ModelIdentifier, ParsedGeometry, SectorId};

/// Owner of decoded sector geometry and textures
///
/// The repository reference-counts sectors across every consumer. Streaming
/// managers never release cache-owned resources themselves: they hand the
/// sector back with `dereference_sector` and the repository decides when the
/// last reference is gone.
pub trait SectorRepository {
    /// Acquire a sector, decoding it on a miss. Each call takes one reference.
    fn load_sector(&mut self, model: &ModelIdentifier, sector_id: SectorId) -> Result<Vec<ParsedGeometry>>;

    /// Release one reference taken by `load_sector`
    fn dereference_sector(&mut self, model: &ModelIdentifier, sector_id: SectorId);

    /// Number of unreferenced sectors to keep around for reuse
    fn set_cache_size(&mut self, size: usize);

    /// Drop every unreferenced sector
    fn clear_cache(&mut self);
}

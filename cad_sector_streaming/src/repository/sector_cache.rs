/// Reference-counted sector cache
///
/// Sectors are decoded through a loader closure on first use and shared by
/// every caller that loads them afterwards. A sector whose reference count
/// drops to zero is not released immediately: it joins an LRU list of up to
/// `cache_size` entries so that a viewpoint moving back and forth does not
/// decode the same sector again. Evicting an entry drops its `Arc`s, which is
/// the only place cache-owned GPU resources are released.

use std::collections::BTreeMap;
use rustc_hash::FxHashMap;

use crate::error::Result;
use crate::repository::SectorRepository;
use crate::sector::{ModelIdentifier, ParsedGeometry, SectorId};
use crate::{stream_debug, stream_warn};

type CacheKey = (ModelIdentifier, SectorId);

struct CacheEntry {
    items: Vec<ParsedGeometry>,
    ref_count: usize,
    /// Position in the LRU while unreferenced
    released_at: Option<u64>,
}

pub struct SectorCache<L>
where
    L: FnMut(&ModelIdentifier, SectorId) -> Result<Vec<ParsedGeometry>>,
{
    loader: L,
    entries: FxHashMap<CacheKey, CacheEntry>,
    /// Unreferenced entries by release stamp, least recently released first
    unreferenced: BTreeMap<u64, CacheKey>,
    next_stamp: u64,
    cache_size: usize,
}

impl<L> SectorCache<L>
where
    L: FnMut(&ModelIdentifier, SectorId) -> Result<Vec<ParsedGeometry>>,
{
    pub fn new(loader: L, cache_size: usize) -> Self {
        Self {
            loader,
            entries: FxHashMap::default(),
            unreferenced: BTreeMap::new(),
            next_stamp: 0,
            cache_size,
        }
    }

    /// Current reference count of a sector (0 if unreferenced or absent)
    pub fn reference_count(&self, model: &ModelIdentifier, sector_id: SectorId) -> usize {
        self.entries
            .get(&(model.clone(), sector_id))
            .map_or(0, |entry| entry.ref_count)
    }

    /// Whether the sector's resources are still held
    pub fn is_cached(&self, model: &ModelIdentifier, sector_id: SectorId) -> bool {
        self.entries.contains_key(&(model.clone(), sector_id))
    }

    /// Number of held sectors, referenced or not
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn cache_size(&self) -> usize {
        self.cache_size
    }

    fn evict_overflow(&mut self) {
        while self.unreferenced.len() > self.cache_size {
            if let Some((_, key)) = self.unreferenced.pop_first() {
                self.entries.remove(&key);
                stream_debug!("sector3d::SectorCache", "Evicted sector {} of model '{}'", key.1, key.0);
            }
        }
    }
}

impl<L> SectorRepository for SectorCache<L>
where
    L: FnMut(&ModelIdentifier, SectorId) -> Result<Vec<ParsedGeometry>>,
{
    fn load_sector(&mut self, model: &ModelIdentifier, sector_id: SectorId) -> Result<Vec<ParsedGeometry>> {
        let key = (model.clone(), sector_id);

        if let Some(entry) = self.entries.get_mut(&key) {
            if let Some(stamp) = entry.released_at.take() {
                self.unreferenced.remove(&stamp);
            }
            entry.ref_count += 1;
            return Ok(entry.items.clone());
        }

        let items = (self.loader)(model, sector_id)?;
        self.entries.insert(key, CacheEntry {
            items: items.clone(),
            ref_count: 1,
            released_at: None,
        });
        Ok(items)
    }

    fn dereference_sector(&mut self, model: &ModelIdentifier, sector_id: SectorId) {
        let key = (model.clone(), sector_id);

        let Some(entry) = self.entries.get_mut(&key) else {
            stream_debug!("sector3d::SectorCache",
                "Dereference of sector {} of model '{}' which is not cached", sector_id, model);
            return;
        };

        if entry.ref_count == 0 {
            stream_warn!("sector3d::SectorCache",
                "Sector {} of model '{}' dereferenced more often than loaded", sector_id, model);
            return;
        }

        entry.ref_count -= 1;
        if entry.ref_count == 0 {
            let stamp = self.next_stamp;
            self.next_stamp += 1;
            entry.released_at = Some(stamp);
            self.unreferenced.insert(stamp, key);
            self.evict_overflow();
        }
    }

    fn set_cache_size(&mut self, size: usize) {
        self.cache_size = size;
        self.evict_overflow();
    }

    fn clear_cache(&mut self) {
        for (_, key) in std::mem::take(&mut self.unreferenced) {
            self.entries.remove(&key);
        }
    }
}

#[cfg(test)]
#[path = "sector_cache_tests.rs"]
mod tests;

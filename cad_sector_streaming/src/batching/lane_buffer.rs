/// Fixed-capacity instance arena backed by one GPU buffer
///
/// Contributions are appended back to back and remembered per sector in a
/// provenance table. Removing a sector drains its bytes and shifts the tail
/// down, so live instances always form one contiguous prefix that can be
/// drawn with a single instanced call. A lane never grows: when it is full,
/// the owner allocates another lane instead of reallocating this buffer
/// under outstanding GPU references.
///
/// Writes go to a CPU mirror first and are uploaded by `flush`, which sends
/// only the byte range touched since the previous flush.

use std::collections::BTreeMap;
use std::ops::Range;
use std::sync::Arc;

use crate::error::Result;
use crate::renderer::{Buffer, BufferDesc, Renderer};
use crate::sector::SectorId;
use crate::stream_bail;

pub struct LaneBuffer {
    buffer: Arc<dyn Buffer>,
    capacity: u64,
    /// CPU mirror of the live prefix
    data: Vec<u8>,
    /// Byte range of every contributing sector
    ranges: BTreeMap<SectorId, Range<u64>>,
    /// Bytes changed since the last flush
    dirty: Option<Range<u64>>,
}

impl LaneBuffer {
    /// Allocate a lane of `capacity` bytes
    pub fn new(renderer: &mut dyn Renderer, capacity: u64) -> Result<Self> {
        let buffer = renderer.create_buffer(BufferDesc { size: capacity })?;
        Ok(Self {
            buffer,
            capacity,
            data: Vec::new(),
            ranges: BTreeMap::new(),
            dirty: None,
        })
    }

    pub fn buffer(&self) -> &Arc<dyn Buffer> {
        &self.buffer
    }

    pub fn capacity(&self) -> u64 {
        self.capacity
    }

    /// Bytes in use
    pub fn len(&self) -> u64 {
        self.data.len() as u64
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn remaining(&self) -> u64 {
        self.capacity - self.len()
    }

    pub fn fits(&self, bytes: u64) -> bool {
        bytes <= self.remaining()
    }

    pub fn contains(&self, sector_id: SectorId) -> bool {
        self.ranges.contains_key(&sector_id)
    }

    /// Byte range currently holding a sector's contribution
    pub fn range_of(&self, sector_id: SectorId) -> Option<Range<u64>> {
        self.ranges.get(&sector_id).cloned()
    }

    /// Contributing sectors, ascending
    pub fn sectors(&self) -> impl Iterator<Item = SectorId> + '_ {
        self.ranges.keys().copied()
    }

    /// CPU copy of the bytes in `range`
    pub fn bytes(&self, range: Range<u64>) -> &[u8] {
        &self.data[range.start as usize..range.end as usize]
    }

    /// Range waiting to be uploaded
    pub fn dirty_range(&self) -> Option<Range<u64>> {
        self.dirty.clone()
    }

    /// Append a sector's contribution. Returns the byte range it occupies.
    ///
    /// # Errors
    ///
    /// `Error::InvalidResource` if the sector already contributes to this lane
    /// or the bytes do not fit.
    pub fn append(&mut self, sector_id: SectorId, bytes: &[u8]) -> Result<Range<u64>> {
        if self.contains(sector_id) {
            stream_bail!("sector3d::LaneBuffer", "Sector {} already contributes to this lane", sector_id);
        }
        if !self.fits(bytes.len() as u64) {
            stream_bail!("sector3d::LaneBuffer",
                "Contribution of {} bytes exceeds remaining lane capacity {}", bytes.len(), self.remaining());
        }

        let range = self.len()..self.len() + bytes.len() as u64;
        self.data.extend_from_slice(bytes);
        self.ranges.insert(sector_id, range.clone());
        self.mark_dirty(range.clone());
        Ok(range)
    }

    /// Excise a sector's contribution and compact the tail.
    ///
    /// Returns the removed bytes, or `None` if the sector has no range here.
    pub fn remove(&mut self, sector_id: SectorId) -> Option<Vec<u8>> {
        let range = self.ranges.remove(&sector_id)?;
        let removed_len = range.end - range.start;
        let removed: Vec<u8> = self.data
            .drain(range.start as usize..range.end as usize)
            .collect();

        for other in self.ranges.values_mut() {
            if other.start >= range.end {
                other.start -= removed_len;
                other.end -= removed_len;
            }
        }

        if range.start < self.len() {
            self.mark_dirty(range.start..self.len());
        }
        Some(removed)
    }

    /// Upload the dirty range to the GPU buffer
    ///
    /// On failure the range stays dirty so the next flush retries it.
    pub fn flush(&mut self) -> Result<()> {
        if let Some(range) = self.dirty.clone() {
            // Removal may have shrunk the data below the recorded end
            let end = range.end.min(self.len());
            if range.start < end {
                self.buffer.update(range.start, &self.data[range.start as usize..end as usize])?;
            }
            self.dirty = None;
        }
        Ok(())
    }

    fn mark_dirty(&mut self, range: Range<u64>) {
        self.dirty = Some(match self.dirty.take() {
            Some(dirty) => dirty.start.min(range.start)..dirty.end.max(range.end),
            None => range,
        });
    }
}

#[cfg(test)]
#[path = "lane_buffer_tests.rs"]
mod tests;

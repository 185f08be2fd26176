/// InstancedBatchingManager - lane-based batching of instanced primitives
///
/// Every primitive sub-kind (identified by the instance id of the parsed
/// geometry) owns a small set of lanes. A sector's instances of one sub-kind
/// are appended to the least-filled lane that can hold them; when none can,
/// another lane is allocated. Each lane is drawn with one instanced call, so
/// the number of draw calls is bounded by the number of lanes rather than by
/// the number of loaded sectors.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::ops::Range;
use std::rc::Rc;
use std::sync::{Arc, Mutex};
use glam::Mat4;
use rustc_hash::{FxHashMap, FxHashSet};

use crate::batching::{DrawCallBatchingManager, LaneBuffer};
use crate::config::StreamingConfig;
use crate::error::{Error, Result};
use crate::material::{Material, ModelMaterials};
use crate::registry::TreeIndexRegistry;
use crate::renderer::{Buffer, Renderer};
use crate::sector::{
    read_tree_indices, CollectionType, GeometryPath, ParsedGeometry, SectorId, TreeIndex, VertexLayout,
};
use crate::{stream_bail, stream_debug, stream_err, stream_error, stream_trace};

const SOURCE: &str = "sector3d::InstancedBatchingManager";

// ===== LANE =====

/// One lane of a sub-kind: the arena plus the state needed to draw it
pub struct InstancedLane {
    buffer: LaneBuffer,
    instance_count: u32,
    /// Instances per tree index (highlight counting)
    tree_index_counts: FxHashMap<TreeIndex, u32>,
    visible: bool,
}

impl InstancedLane {
    fn new(renderer: &Arc<Mutex<dyn Renderer>>, capacity: u64) -> Result<Self> {
        let mut renderer = renderer
            .lock()
            .map_err(|_| Error::BackendError("Renderer lock poisoned".to_string()))?;
        Ok(Self {
            buffer: LaneBuffer::new(&mut *renderer, capacity)?,
            instance_count: 0,
            tree_index_counts: FxHashMap::default(),
            visible: false,
        })
    }

    pub fn buffer(&self) -> &LaneBuffer {
        &self.buffer
    }

    pub fn instance_count(&self) -> u32 {
        self.instance_count
    }

    pub fn tree_index_counts(&self) -> &FxHashMap<TreeIndex, u32> {
        &self.tree_index_counts
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }
}

/// Lanes of one primitive sub-kind
struct InstanceBatch {
    collection_type: CollectionType,
    layout: VertexLayout,
    material: Rc<Material>,
    lanes: Vec<InstancedLane>,
}

/// One instanced draw of a visible lane
#[derive(Clone)]
pub struct DrawCall {
    pub instance_id: String,
    pub lane_index: usize,
    pub collection_type: CollectionType,
    pub buffer: Arc<dyn Buffer>,
    pub instance_count: u32,
    pub material: Rc<Material>,
}

/// Instances of one sub-kind delivered by one sector
struct Contribution<'a> {
    collection_type: CollectionType,
    layout: &'a VertexLayout,
    bytes: Vec<u8>,
}

// ===== MANAGER =====

pub struct InstancedBatchingManager {
    renderer: Arc<Mutex<dyn Renderer>>,
    materials: ModelMaterials,
    registry: Rc<RefCell<TreeIndexRegistry>>,
    config: StreamingConfig,
    /// Sub-kinds by instance id (ordered so draw calls are stable)
    batches: BTreeMap<String, InstanceBatch>,
    /// (instance id, lane index) of every contribution of a sector
    sector_batches: FxHashMap<SectorId, Vec<(String, usize)>>,
}

impl InstancedBatchingManager {
    pub fn new(
        renderer: Arc<Mutex<dyn Renderer>>,
        materials: ModelMaterials,
        registry: Rc<RefCell<TreeIndexRegistry>>,
        config: StreamingConfig,
    ) -> Result<Self> {
        Ok(Self {
            renderer,
            materials,
            registry,
            config: config.validated()?,
            batches: BTreeMap::new(),
            sector_batches: FxHashMap::default(),
        })
    }

    /// Batched sector ids, ascending
    pub fn batched_sector_ids(&self) -> Vec<SectorId> {
        let mut ids: Vec<SectorId> = self.sector_batches.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    /// Number of lanes of a sub-kind (0 if never batched)
    pub fn lane_count(&self, instance_id: &str) -> usize {
        self.batches.get(instance_id).map_or(0, |batch| batch.lanes.len())
    }

    pub fn lane(&self, instance_id: &str, lane_index: usize) -> Option<&InstancedLane> {
        self.batches.get(instance_id)?.lanes.get(lane_index)
    }

    /// Instances of a sub-kind across all lanes
    pub fn instance_count(&self, instance_id: &str) -> u32 {
        self.batches
            .get(instance_id)
            .map_or(0, |batch| batch.lanes.iter().map(|lane| lane.instance_count).sum())
    }

    /// Where a sector's instances live: (instance id, lane index, byte range)
    pub fn sector_ranges(&self, sector_id: SectorId) -> Vec<(String, usize, Range<u64>)> {
        let Some(entries) = self.sector_batches.get(&sector_id) else {
            return Vec::new();
        };
        entries
            .iter()
            .filter_map(|(instance_id, lane_index)| {
                let range = self.lane(instance_id, *lane_index)?.buffer.range_of(sector_id)?;
                Some((instance_id.clone(), *lane_index, range))
            })
            .collect()
    }

    /// Draw calls of every visible lane, ordered by instance id then lane
    pub fn draw_calls(&self) -> Vec<DrawCall> {
        let mut calls = Vec::new();
        for (instance_id, batch) in &self.batches {
            for (lane_index, lane) in batch.lanes.iter().enumerate().filter(|(_, lane)| lane.visible) {
                calls.push(DrawCall {
                    instance_id: instance_id.clone(),
                    lane_index,
                    collection_type: batch.collection_type,
                    buffer: lane.buffer.buffer().clone(),
                    instance_count: lane.instance_count,
                    material: batch.material.clone(),
                });
            }
        }
        calls
    }

    /// Group the instanced items by sub-kind, checking each one first
    fn collect_contributions<'a>(
        &self,
        items: &'a [ParsedGeometry],
        sector_id: SectorId,
    ) -> Result<BTreeMap<String, Contribution<'a>>> {
        let mut contributions: BTreeMap<String, Contribution<'a>> = BTreeMap::new();

        for item in items.iter().filter(|item| item.collection_type.path() == GeometryPath::Instanced) {
            let Some(instance_id) = item.instance_id.as_deref() else {
                continue;
            };
            let geometry = &item.geometry_buffer;

            if !geometry.has_tree_indices() {
                stream_bail!(SOURCE, kind = InvalidGeometry,
                    "Instances of '{}' in sector {} have no tree index attribute", instance_id, sector_id);
            }

            let expected = self.batches
                .get(instance_id)
                .map(|batch| &batch.layout)
                .or_else(|| contributions.get(instance_id).map(|c| c.layout));
            if let Some(expected) = expected {
                if expected != geometry.layout() {
                    stream_bail!(SOURCE, kind = InvalidGeometry,
                        "Instances of '{}' in sector {} have stride {} but the batch expects stride {} with the same attributes",
                        instance_id, sector_id, geometry.layout().stride, expected.stride);
                }
            }

            contributions
                .entry(instance_id.to_string())
                .or_insert_with(|| Contribution {
                    collection_type: item.collection_type,
                    layout: geometry.layout(),
                    bytes: Vec::new(),
                })
                .bytes
                .extend_from_slice(geometry.data());
        }
        Ok(contributions)
    }

    fn create_batch(&self, collection_type: CollectionType, layout: VertexLayout) -> Result<InstanceBatch> {
        let material = self.materials
            .for_type(collection_type)
            .cloned()
            .ok_or_else(|| stream_err!(SOURCE, "No material for {:?}", collection_type))?;

        let lanes = (0..self.config.lane_count)
            .map(|_| InstancedLane::new(&self.renderer, self.config.initial_lane_capacity))
            .collect::<Result<Vec<_>>>()?;

        Ok(InstanceBatch { collection_type, layout, material, lanes })
    }

    /// Write one contribution into the least-filled lane that can hold it
    fn append_contribution(&mut self, instance_id: &str, contribution: Contribution<'_>, sector_id: SectorId) -> Result<()> {
        if !self.batches.contains_key(instance_id) {
            let batch = self.create_batch(contribution.collection_type, contribution.layout.clone())?;
            stream_debug!(SOURCE, "Created {} lanes for '{}'", batch.lanes.len(), instance_id);
            self.batches.insert(instance_id.to_string(), batch);
        }
        let batch = self.batches
            .get_mut(instance_id)
            .ok_or_else(|| stream_err!(SOURCE, "Batch '{}' missing after creation", instance_id))?;

        let needed = contribution.bytes.len() as u64;
        let least_filled = batch.lanes
            .iter()
            .enumerate()
            .filter(|(_, lane)| lane.buffer.fits(needed))
            .min_by_key(|(_, lane)| lane.buffer.len())
            .map(|(index, _)| index);

        let lane_index = match least_filled {
            Some(index) => index,
            None => {
                let capacity = self.config.initial_lane_capacity.max(needed);
                batch.lanes.push(InstancedLane::new(&self.renderer, capacity)?);
                stream_debug!(SOURCE, "All lanes of '{}' are full; added lane {} ({} bytes)",
                    instance_id, batch.lanes.len() - 1, capacity);
                batch.lanes.len() - 1
            }
        };

        let lane = &mut batch.lanes[lane_index];
        lane.buffer.append(sector_id, &contribution.bytes)?;
        self.sector_batches
            .entry(sector_id)
            .or_default()
            .push((instance_id.to_string(), lane_index));

        let instances = (contribution.bytes.len() / batch.layout.stride as usize) as u32;
        for tree_index in read_tree_indices(&contribution.bytes, &batch.layout).into_iter().flatten() {
            *lane.tree_index_counts.entry(tree_index).or_insert(0) += 1;
        }
        lane.instance_count += instances;
        lane.visible = true;

        lane.buffer.flush()
    }

    /// Record the sector's tree indices once per collection type
    fn register_tree_indices(&self, items: &[ParsedGeometry], sector_id: SectorId) {
        let mut by_type: BTreeMap<CollectionType, FxHashSet<TreeIndex>> = BTreeMap::new();
        for item in items
            .iter()
            .filter(|item| item.instance_id.is_some() && item.collection_type.path() == GeometryPath::Instanced)
        {
            let indices = by_type.entry(item.collection_type).or_default();
            if let Some(tree_indices) = item.geometry_buffer.tree_indices() {
                indices.extend(tree_indices);
            }
        }

        let mut registry = self.registry.borrow_mut();
        for (collection_type, indices) in by_type {
            if registry.is_completed(sector_id, collection_type) {
                continue;
            }
            for tree_index in indices {
                registry.set(tree_index, sector_id);
            }
            registry.mark_completed(sector_id, collection_type);
        }
    }
}

impl DrawCallBatchingManager for InstancedBatchingManager {
    /// # Errors
    ///
    /// - `Error::SectorAlreadyBatched` if the sector is batched already
    /// - `Error::InvalidGeometry` for instances without a tree index attribute
    ///   or with a layout that differs from their sub-kind's
    /// - renderer or upload errors; the sector's partial contribution is
    ///   rolled back before returning
    fn batch_geometries(&mut self, items: &[ParsedGeometry], sector_id: SectorId) -> Result<()> {
        if self.has_sector(sector_id) {
            stream_error!(SOURCE, "Sector {} is already batched", sector_id);
            return Err(Error::SectorAlreadyBatched(sector_id));
        }

        let contributions = self.collect_contributions(items, sector_id)?;
        self.sector_batches.insert(sector_id, Vec::new());

        for (instance_id, contribution) in contributions {
            if contribution.bytes.is_empty() {
                continue;
            }
            if let Err(err) = self.append_contribution(&instance_id, contribution, sector_id) {
                stream_error!(SOURCE, "Batching sector {} failed: {}", sector_id, err);
                self.remove_sector_batches(sector_id);
                return Err(err);
            }
        }

        self.register_tree_indices(items, sector_id);
        stream_trace!(SOURCE, "Batched sector {}", sector_id);
        Ok(())
    }

    fn remove_sector_batches(&mut self, sector_id: SectorId) {
        let Some(entries) = self.sector_batches.remove(&sector_id) else {
            stream_debug!(SOURCE, "No batches for sector {}", sector_id);
            return;
        };

        for (instance_id, lane_index) in entries {
            let Some(batch) = self.batches.get_mut(&instance_id) else {
                continue;
            };
            let Some(lane) = batch.lanes.get_mut(lane_index) else {
                continue;
            };
            let Some(removed) = lane.buffer.remove(sector_id) else {
                continue;
            };

            for tree_index in read_tree_indices(&removed, &batch.layout).into_iter().flatten() {
                if let Some(count) = lane.tree_index_counts.get_mut(&tree_index) {
                    *count -= 1;
                    if *count == 0 {
                        lane.tree_index_counts.remove(&tree_index);
                    }
                }
            }
            let instances = (removed.len() / batch.layout.stride as usize) as u32;
            lane.instance_count = lane.instance_count.saturating_sub(instances);
            lane.visible = lane.instance_count > 0;

            if let Err(err) = lane.buffer.flush() {
                stream_error!(SOURCE, "Upload of lane {} of '{}' failed after removing sector {}: {}",
                    lane_index, instance_id, sector_id, err);
            }
        }
    }

    fn has_sector(&self, sector_id: SectorId) -> bool {
        self.sector_batches.contains_key(&sector_id)
    }

    fn dispose(&mut self) {
        for sector_id in self.batched_sector_ids() {
            self.remove_sector_batches(sector_id);
        }
        let lanes: usize = self.batches.values().map(|batch| batch.lanes.len()).sum();
        self.batches.clear();
        stream_debug!(SOURCE, "Disposed {} lanes", lanes);
    }

    /// Refresh the world inverse of every material with a visible lane
    fn before_render(&self, world: &Mat4) {
        for batch in self.batches.values() {
            if batch.lanes.iter().any(|lane| lane.visible) {
                batch.material.update_world_inverse(world);
            }
        }
    }
}

#[cfg(test)]
#[path = "instanced_batching_manager_tests.rs"]
mod tests;

/// SectorPipeline - the entry point for sector load and unload events
///
/// A loaded sector's geometry is split by collection type: individually
/// meshed items go to the `MeshLifecycleManager` and become a group attached
/// to the model's scene group, instanced items go to the batching manager.
/// Unloading asks both managers to drop the sector and hands it back to the
/// repository once.

use std::cell::RefCell;
use std::rc::Rc;

use crate::batching::{DrawCallBatchingManager, InstancedBatchingManager};
use crate::error::{Error, Result};
use crate::mesh::MeshLifecycleManager;
use crate::repository::SectorRepository;
use crate::scene::SceneGroup;
use crate::sector::{GeometryPath, ModelIdentifier, ParsedGeometry, SectorId};
use crate::{stream_debug, stream_error, stream_info};

const SOURCE: &str = "sector3d::SectorPipeline";

pub struct SectorPipeline<B: DrawCallBatchingManager = InstancedBatchingManager> {
    meshes: MeshLifecycleManager,
    batching: B,
    scene: Rc<RefCell<SceneGroup>>,
    needs_redraw: bool,
}

impl<B: DrawCallBatchingManager> SectorPipeline<B> {
    pub fn new(meshes: MeshLifecycleManager, batching: B, scene: Rc<RefCell<SceneGroup>>) -> Self {
        Self {
            meshes,
            batching,
            scene,
            needs_redraw: false,
        }
    }

    pub fn model(&self) -> &ModelIdentifier {
        self.meshes.model()
    }

    pub fn meshes(&self) -> &MeshLifecycleManager {
        &self.meshes
    }

    pub fn batching(&self) -> &B {
        &self.batching
    }

    pub fn scene(&self) -> &Rc<RefCell<SceneGroup>> {
        &self.scene
    }

    /// Acquire a sector from the repository and process it.
    ///
    /// The reference taken here is released by `unload_sector`, or right away
    /// if processing fails.
    pub fn load_sector(&mut self, repository: &mut dyn SectorRepository, sector_id: SectorId) -> Result<()> {
        let model = self.model().clone();
        let items = repository.load_sector(&model, sector_id)?;
        if let Err(err) = self.on_sector_loaded(&items, sector_id) {
            repository.dereference_sector(&model, sector_id);
            return Err(err);
        }
        Ok(())
    }

    /// Process the decoded geometry of a newly loaded sector.
    ///
    /// Every sector gets a mesh group, even one without mesh items, so that
    /// `unload_sector` releases each loaded sector exactly once. Non-empty
    /// groups are attached to the scene group.
    ///
    /// # Errors
    ///
    /// - `Error::SectorAlreadyLoaded` if either path still holds the sector;
    ///   nothing is touched then
    /// - material lookups and batching failures; the sector is then left
    ///   unprocessed (its mesh group is removed again)
    pub fn on_sector_loaded(&mut self, items: &[ParsedGeometry], sector_id: SectorId) -> Result<()> {
        if self.meshes.has_managed_sector(sector_id) || self.batching.has_sector(sector_id) {
            stream_error!(SOURCE, "Sector {} delivered twice without an unload", sector_id);
            return Err(Error::SectorAlreadyLoaded(sector_id));
        }

        let mut mesh_items = Vec::new();
        let mut instanced_items = Vec::new();
        let mut ignored = 0usize;
        for item in items {
            match item.collection_type.path() {
                GeometryPath::Mesh => mesh_items.push(item.clone()),
                GeometryPath::Instanced => instanced_items.push(item.clone()),
                GeometryPath::Ignored => ignored += 1,
            }
        }
        if ignored > 0 {
            stream_debug!(SOURCE, "Ignored {} items of unrecognized type in sector {}", ignored, sector_id);
        }

        let group = self.meshes.create_sector_group(&mesh_items, sector_id)?;

        if let Err(err) = self.batching.batch_geometries(&instanced_items, sector_id) {
            stream_error!(SOURCE, "Sector {} could not be batched: {}", sector_id, err);
            self.meshes.remove_sector_group(sector_id);
            return Err(err);
        }

        if !group.is_empty() {
            SceneGroup::attach(&self.scene, &group);
        }
        self.needs_redraw = true;
        Ok(())
    }

    /// Remove a sector from both paths and release it in the repository.
    ///
    /// Returns `false` for sectors that were never loaded through this
    /// pipeline (nothing is released then).
    pub fn unload_sector(&mut self, repository: &mut dyn SectorRepository, sector_id: SectorId) -> bool {
        let model = self.model().clone();
        if !self.meshes.remove_sector_group_and_dereference(sector_id, repository, &model) {
            return false;
        }
        self.batching.remove_sector_batches(sector_id);
        self.needs_redraw = true;
        true
    }

    /// Loaded sector ids, ascending
    pub fn loaded_sector_ids(&self) -> Vec<SectorId> {
        self.meshes.managed_sector_ids()
    }

    pub fn is_loaded(&self, sector_id: SectorId) -> bool {
        self.meshes.has_managed_sector(sector_id)
    }

    /// Whether a sector was added or removed since the last `reset_redraw`
    pub fn needs_redraw(&self) -> bool {
        self.needs_redraw
    }

    pub fn reset_redraw(&mut self) {
        self.needs_redraw = false;
    }

    /// Run per-frame hooks of both paths. Returns the number of mesh units drawn.
    pub fn before_render(&self) -> usize {
        let scene = self.scene.borrow();
        self.batching.before_render(scene.world_matrix());
        scene.before_render()
    }

    /// Unload every sector, then release the batch buffers
    pub fn dispose(&mut self, repository: &mut dyn SectorRepository) {
        let sectors = self.loaded_sector_ids();
        for sector_id in &sectors {
            self.unload_sector(repository, *sector_id);
        }
        self.batching.dispose();
        self.meshes.dispose();
        self.needs_redraw = true;
        stream_info!(SOURCE, "Disposed pipeline of model {} ({} sectors unloaded)", self.model(), sectors.len());
    }
}

#[cfg(test)]
#[path = "sector_pipeline_tests.rs"]
mod tests;

/// MeshLifecycleManager - builds and removes the mesh-path groups of sectors
///
/// Converts the individually meshed items of a sector (plain and textured
/// triangle meshes) into a `SectorMeshGroup`, keeps the group in a table
/// keyed by sector id, and records the sector's tree indices in the shared
/// `TreeIndexRegistry` once per sector.
///
/// The manager never attaches groups to the scene and never releases
/// geometry or textures: both belong to the sector repository, which is told
/// about the removal through `dereference_sector`.

use std::cell::RefCell;
use std::rc::Rc;
use rustc_hash::{FxHashMap, FxHashSet};

use crate::error::Result;
use crate::material::{Material, MaterialProvider, ModelMaterials};
use crate::registry::TreeIndexRegistry;
use crate::repository::SectorRepository;
use crate::scene::{RenderableUnit, SectorMeshGroup};
use crate::sector::{CollectionType, GeometryPath, ModelIdentifier, ParsedGeometry, SectorId, TreeIndex};
use crate::{stream_debug, stream_trace, stream_warn};

const SOURCE: &str = "sector3d::MeshLifecycleManager";

pub struct MeshLifecycleManager {
    model: ModelIdentifier,
    materials: Rc<RefCell<dyn MaterialProvider>>,
    registry: Rc<RefCell<TreeIndexRegistry>>,
    groups: FxHashMap<SectorId, SectorMeshGroup>,
}

impl MeshLifecycleManager {
    pub fn new(
        model: ModelIdentifier,
        materials: Rc<RefCell<dyn MaterialProvider>>,
        registry: Rc<RefCell<TreeIndexRegistry>>,
    ) -> Self {
        Self {
            model,
            materials,
            registry,
            groups: FxHashMap::default(),
        }
    }

    pub fn model(&self) -> &ModelIdentifier {
        &self.model
    }

    /// Build the mesh group of a sector from its parsed geometry.
    ///
    /// Only mesh-path items are used; everything else is ignored. A textured
    /// item without a texture (or an item without any bounds) is skipped with
    /// a warning. The returned group is registered under `sector_id` but not
    /// attached to any scene.
    ///
    /// Creating a group for a sector that still has one is a caller error:
    /// the previous group is dropped from the table and left orphaned.
    ///
    /// # Errors
    ///
    /// Fails if the material provider does not know the model or cannot
    /// create a textured material. Textured materials already created for the
    /// sector are released before returning.
    pub fn create_sector_group(&mut self, items: &[ParsedGeometry], sector_id: SectorId) -> Result<SectorMeshGroup> {
        let group = SectorMeshGroup::new(sector_id);
        let mut observed: FxHashSet<TreeIndex> = FxHashSet::default();

        if let Err(err) = self.build_units(items, sector_id, &group, &mut observed) {
            let released = self.materials.borrow_mut().remove_textured_mesh_materials(&self.model, sector_id);
            stream_warn!(SOURCE, "Mesh group of sector {} failed ({}); released {} textured materials",
                sector_id, err, released);
            return Err(err);
        }

        self.register_tree_indices(&observed, sector_id);

        if let Some(previous) = self.groups.insert(sector_id, group.clone()) {
            stream_warn!(SOURCE, "Sector {} already had a mesh group ({} units); the old group is orphaned",
                sector_id, previous.unit_count());
        }

        stream_debug!(SOURCE, "Created mesh group for sector {} with {} units", sector_id, group.unit_count());
        Ok(group)
    }

    /// Remove a sector's group and hand the sector back to the repository.
    ///
    /// The group is detached from its parent and cleared. The repository's
    /// `dereference_sector` is called exactly once. Unknown sector ids are a
    /// no-op (nothing is dereferenced). Returns whether a group was removed.
    pub fn remove_sector_group_and_dereference(
        &mut self,
        sector_id: SectorId,
        repository: &mut dyn SectorRepository,
        model: &ModelIdentifier,
    ) -> bool {
        if !self.remove_sector_group(sector_id) {
            return false;
        }
        repository.dereference_sector(model, sector_id);
        true
    }

    /// Detach, clear and untrack a sector's group without touching the repository
    pub fn remove_sector_group(&mut self, sector_id: SectorId) -> bool {
        let Some(group) = self.groups.remove(&sector_id) else {
            stream_debug!(SOURCE, "No mesh group for sector {}", sector_id);
            return false;
        };

        group.detach();
        group.clear();
        self.materials.borrow_mut().remove_textured_mesh_materials(&self.model, sector_id);
        stream_trace!(SOURCE, "Removed mesh group of sector {}", sector_id);
        true
    }

    /// Sector ids with a live group, ascending
    pub fn managed_sector_ids(&self) -> Vec<SectorId> {
        let mut ids: Vec<SectorId> = self.groups.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    pub fn has_managed_sector(&self, sector_id: SectorId) -> bool {
        self.groups.contains_key(&sector_id)
    }

    /// Live group of a sector
    pub fn sector_group(&self, sector_id: SectorId) -> Option<&SectorMeshGroup> {
        self.groups.get(&sector_id)
    }

    /// Remove every managed group
    pub fn dispose(&mut self) {
        for sector_id in self.managed_sector_ids() {
            self.remove_sector_group(sector_id);
        }
    }

    /// Add a unit to `group` for every usable mesh item
    fn build_units(
        &self,
        items: &[ParsedGeometry],
        sector_id: SectorId,
        group: &SectorMeshGroup,
        observed: &mut FxHashSet<TreeIndex>,
    ) -> Result<()> {
        let mut model_materials: Option<ModelMaterials> = None;

        for item in items.iter().filter(|item| item.collection_type.path() == GeometryPath::Mesh) {
            let material = match self.resolve_material(item, sector_id, &mut model_materials)? {
                Some(material) => material,
                None => continue,
            };

            let Some(bounds) = item.bounds() else {
                stream_warn!(SOURCE, "Skipping {:?} item without bounds in sector {}",
                    item.collection_type, sector_id);
                continue;
            };

            let mut unit = RenderableUnit::new(item.collection_type, item.geometry_buffer.clone(), material.clone(), bounds);
            let counts = occurrence_counts(item);
            observed.extend(counts.keys().copied());
            unit.set_tree_index_counts(counts);

            // Sectors are culled as a whole
            unit.set_frustum_culled(false);

            if material.needs_world_inverse() {
                let hook_material = material.clone();
                unit.set_before_render(Box::new(move |world| hook_material.update_world_inverse(world)));
            }

            group.add_unit(unit);
        }
        Ok(())
    }

    /// Material of one mesh item, or `None` if the item must be skipped
    fn resolve_material(
        &self,
        item: &ParsedGeometry,
        sector_id: SectorId,
        model_materials: &mut Option<ModelMaterials>,
    ) -> Result<Option<Rc<Material>>> {
        if item.collection_type.is_textured() {
            let Some(texture) = &item.texture else {
                stream_warn!(SOURCE, "Textured mesh in sector {} has no texture; skipping it", sector_id);
                return Ok(None);
            };
            let material = self.materials
                .borrow_mut()
                .add_textured_mesh_material(&self.model, sector_id, texture.clone())?;
            return Ok(Some(material));
        }

        if model_materials.is_none() {
            *model_materials = Some(self.materials.borrow().model_materials(&self.model)?);
        }
        Ok(model_materials.as_ref().map(|materials| materials.triangle_mesh().clone()))
    }

    fn register_tree_indices(&self, observed: &FxHashSet<TreeIndex>, sector_id: SectorId) {
        if observed.is_empty() {
            return;
        }
        let mut registry = self.registry.borrow_mut();
        if registry.is_completed(sector_id, CollectionType::TriangleMesh) {
            return;
        }
        for tree_index in observed {
            registry.set(*tree_index, sector_id);
        }
        registry.mark_completed(sector_id, CollectionType::TriangleMesh);
    }
}

/// Vertices per tree index of one item (empty without a tree index attribute)
fn occurrence_counts(item: &ParsedGeometry) -> FxHashMap<TreeIndex, u32> {
    let mut counts = FxHashMap::default();
    if let Some(tree_indices) = item.geometry_buffer.tree_indices() {
        for tree_index in tree_indices {
            *counts.entry(tree_index).or_insert(0) += 1;
        }
    }
    counts
}

#[cfg(test)]
#[path = "mesh_lifecycle_manager_tests.rs"]
mod tests;

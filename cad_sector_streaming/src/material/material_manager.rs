/// Material provider seam and its reference implementation

use std::rc::Rc;
use std::sync::Arc;
use rustc_hash::FxHashMap;

use crate::error::{Error, Result};
use crate::material::{Material, ModelMaterials};
use crate::renderer::Texture;
use crate::sector::{ModelIdentifier, SectorId};
use crate::stream_debug;

/// Source of materials for the streaming managers
pub trait MaterialProvider {
    /// Shared materials registered for a model
    ///
    /// # Errors
    ///
    /// `Error::UnknownModel` if the model was never registered.
    fn model_materials(&self, model: &ModelIdentifier) -> Result<ModelMaterials>;

    /// Create the material of a textured triangle mesh in one sector
    fn add_textured_mesh_material(
        &mut self,
        model: &ModelIdentifier,
        sector_id: SectorId,
        texture: Arc<dyn Texture>,
    ) -> Result<Rc<Material>>;

    /// Release the textured materials created for a sector.
    ///
    /// Returns how many were released.
    fn remove_textured_mesh_materials(&mut self, _model: &ModelIdentifier, _sector_id: SectorId) -> usize {
        0
    }
}

struct ModelEntry {
    materials: ModelMaterials,
    textured: FxHashMap<SectorId, Vec<Rc<Material>>>,
}

/// Per-model material registry
///
/// Holds the shared `ModelMaterials` of every registered model and the
/// textured materials created for its sectors.
#[derive(Default)]
pub struct MaterialManager {
    models: FxHashMap<ModelIdentifier, ModelEntry>,
}

impl MaterialManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a model with the default material set
    pub fn add_model(&mut self, model: ModelIdentifier) {
        self.add_model_with_materials(model, ModelMaterials::new());
    }

    /// Register a model with explicit materials (replaces any previous entry)
    pub fn add_model_with_materials(&mut self, model: ModelIdentifier, materials: ModelMaterials) {
        stream_debug!("sector3d::MaterialManager", "Registered materials for model '{}'", model);
        self.models.insert(model, ModelEntry {
            materials,
            textured: FxHashMap::default(),
        });
    }

    /// Forget a model and every textured material created for it
    pub fn remove_model(&mut self, model: &ModelIdentifier) -> bool {
        self.models.remove(model).is_some()
    }

    /// Number of textured materials alive for a sector
    pub fn textured_material_count(&self, model: &ModelIdentifier, sector_id: SectorId) -> usize {
        self.models
            .get(model)
            .and_then(|entry| entry.textured.get(&sector_id))
            .map_or(0, Vec::len)
    }
}

impl MaterialProvider for MaterialManager {
    fn model_materials(&self, model: &ModelIdentifier) -> Result<ModelMaterials> {
        self.models
            .get(model)
            .map(|entry| entry.materials.clone())
            .ok_or_else(|| Error::UnknownModel(model.to_string()))
    }

    fn add_textured_mesh_material(
        &mut self,
        model: &ModelIdentifier,
        sector_id: SectorId,
        texture: Arc<dyn Texture>,
    ) -> Result<Rc<Material>> {
        let entry = self.models
            .get_mut(model)
            .ok_or_else(|| Error::UnknownModel(model.to_string()))?;

        let materials = entry.textured.entry(sector_id).or_default();
        let name = format!("textured_mesh_{}_{}_{}", model, sector_id, materials.len());
        let material = Rc::new(
            Material::new(&name)
                .with_texture(texture)
                .with_inverse_model_matrix(),
        );
        materials.push(material.clone());
        Ok(material)
    }

    fn remove_textured_mesh_materials(&mut self, model: &ModelIdentifier, sector_id: SectorId) -> usize {
        self.models
            .get_mut(model)
            .and_then(|entry| entry.textured.remove(&sector_id))
            .map_or(0, |materials| materials.len())
    }
}

#[cfg(test)]
#[path = "material_manager_tests.rs"]
mod tests;

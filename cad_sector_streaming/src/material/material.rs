/// Render-thread material description.
///
/// A Material names the shader family a renderable uses, optionally binds a
/// sector texture, and optionally exposes an `inverseModelMatrix` uniform that
/// is refreshed before each draw from the drawable's world transform.
///
/// Materials are shared through `Rc` between every renderable of a model, so
/// the uniform lives in a `Cell` and is written through `&self`.

use std::cell::Cell;
use std::rc::Rc;
use std::sync::Arc;
use glam::Mat4;
use rustc_hash::FxHashMap;

use crate::renderer::Texture;
use crate::sector::CollectionType;

// ===== MATERIAL =====

pub struct Material {
    name: String,
    texture: Option<Arc<dyn Texture>>,
    inverse_model_matrix: Option<Cell<Mat4>>,
}

impl Material {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            texture: None,
            inverse_model_matrix: None,
        }
    }

    /// Bind a texture to this material
    pub fn with_texture(mut self, texture: Arc<dyn Texture>) -> Self {
        self.texture = Some(texture);
        self
    }

    /// Expose an `inverseModelMatrix` uniform (starts as identity)
    pub fn with_inverse_model_matrix(mut self) -> Self {
        self.inverse_model_matrix = Some(Cell::new(Mat4::IDENTITY));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn texture(&self) -> Option<&Arc<dyn Texture>> {
        self.texture.as_ref()
    }

    /// Whether draws with this material must refresh the world inverse first
    pub fn needs_world_inverse(&self) -> bool {
        self.inverse_model_matrix.is_some()
    }

    /// Current value of the `inverseModelMatrix` uniform
    pub fn inverse_model_matrix(&self) -> Option<Mat4> {
        self.inverse_model_matrix.as_ref().map(Cell::get)
    }

    /// Recompute the `inverseModelMatrix` uniform from a world transform.
    ///
    /// No-op for materials without the uniform.
    pub fn update_world_inverse(&self, world: &Mat4) {
        if let Some(uniform) = &self.inverse_model_matrix {
            uniform.set(world.inverse());
        }
    }
}

// ===== MODEL MATERIALS =====

/// Shared materials of one model, one per untextured collection type
///
/// Textured triangle meshes get a material per sector instead
/// (see `MaterialProvider::add_textured_mesh_material`).
#[derive(Clone)]
pub struct ModelMaterials {
    triangle_mesh: Rc<Material>,
    instanced_mesh: Rc<Material>,
    primitives: FxHashMap<CollectionType, Rc<Material>>,
}

impl ModelMaterials {
    /// Default material set: every material exposes the world-inverse uniform
    pub fn new() -> Self {
        let shared = |t: CollectionType| Rc::new(Material::new(&format!("{:?}", t)).with_inverse_model_matrix());

        let primitives = CollectionType::ALL
            .iter()
            .filter(|t| !matches!(
                t,
                CollectionType::TriangleMesh | CollectionType::TexturedTriangleMesh | CollectionType::InstanceMesh
            ))
            .map(|t| (*t, shared(*t)))
            .collect();

        Self {
            triangle_mesh: shared(CollectionType::TriangleMesh),
            instanced_mesh: shared(CollectionType::InstanceMesh),
            primitives,
        }
    }

    /// Replace the shared triangle mesh material
    pub fn with_triangle_mesh(mut self, material: Rc<Material>) -> Self {
        self.triangle_mesh = material;
        self
    }

    pub fn triangle_mesh(&self) -> &Rc<Material> {
        &self.triangle_mesh
    }

    pub fn instanced_mesh(&self) -> &Rc<Material> {
        &self.instanced_mesh
    }

    /// Shared material for a collection type
    ///
    /// `None` for textured meshes (per-sector materials) and unrecognized types.
    pub fn for_type(&self, collection_type: CollectionType) -> Option<&Rc<Material>> {
        match collection_type {
            CollectionType::TriangleMesh => Some(&self.triangle_mesh),
            CollectionType::InstanceMesh => Some(&self.instanced_mesh),
            CollectionType::TexturedTriangleMesh | CollectionType::Unrecognized(_) => None,
            primitive => self.primitives.get(&primitive),
        }
    }
}

impl Default for ModelMaterials {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "material_tests.rs"]
mod tests;

/// RenderableUnit - one drawable built from one parsed mesh item

use std::rc::Rc;
use std::sync::Arc;
use bitflags::bitflags;
use glam::Mat4;
use rustc_hash::FxHashMap;

use crate::material::Material;
use crate::sector::{BoundingSphere, CollectionType, GeometryBuffer, TreeIndex, AABB};

bitflags! {
    /// Per-unit render state
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct RenderFlags: u32 {
        /// Unit is drawn
        const VISIBLE        = 1 << 0;
        /// Unit is tested against the view frustum before drawing
        const FRUSTUM_CULLED = 1 << 1;
    }
}

/// Callback run before each draw with the unit's current world transform
pub type BeforeRenderHook = Box<dyn Fn(&Mat4)>;

/// One GPU-drawable object of a sector
///
/// The geometry is shared with the sector cache; the unit only holds a
/// reference to it.
pub struct RenderableUnit {
    collection_type: CollectionType,
    geometry: Arc<GeometryBuffer>,
    material: Rc<Material>,
    bounding_box: AABB,
    bounding_sphere: BoundingSphere,
    /// Vertices per tree index
    tree_index_counts: FxHashMap<TreeIndex, u32>,
    flags: RenderFlags,
    before_render: Option<BeforeRenderHook>,
}

impl RenderableUnit {
    pub fn new(
        collection_type: CollectionType,
        geometry: Arc<GeometryBuffer>,
        material: Rc<Material>,
        bounding_box: AABB,
    ) -> Self {
        Self {
            collection_type,
            geometry,
            material,
            bounding_box,
            bounding_sphere: BoundingSphere::from_aabb(&bounding_box),
            tree_index_counts: FxHashMap::default(),
            flags: RenderFlags::VISIBLE | RenderFlags::FRUSTUM_CULLED,
            before_render: None,
        }
    }

    pub fn collection_type(&self) -> CollectionType {
        self.collection_type
    }

    pub fn geometry(&self) -> &Arc<GeometryBuffer> {
        &self.geometry
    }

    pub fn material(&self) -> &Rc<Material> {
        &self.material
    }

    pub fn bounding_box(&self) -> &AABB {
        &self.bounding_box
    }

    pub fn bounding_sphere(&self) -> &BoundingSphere {
        &self.bounding_sphere
    }

    pub fn tree_index_counts(&self) -> &FxHashMap<TreeIndex, u32> {
        &self.tree_index_counts
    }

    pub fn set_tree_index_counts(&mut self, counts: FxHashMap<TreeIndex, u32>) {
        self.tree_index_counts = counts;
    }

    pub fn flags(&self) -> RenderFlags {
        self.flags
    }

    pub fn is_visible(&self) -> bool {
        self.flags.contains(RenderFlags::VISIBLE)
    }

    pub fn set_visible(&mut self, visible: bool) {
        self.flags.set(RenderFlags::VISIBLE, visible);
    }

    pub fn is_frustum_culled(&self) -> bool {
        self.flags.contains(RenderFlags::FRUSTUM_CULLED)
    }

    pub fn set_frustum_culled(&mut self, culled: bool) {
        self.flags.set(RenderFlags::FRUSTUM_CULLED, culled);
    }

    pub fn has_before_render(&self) -> bool {
        self.before_render.is_some()
    }

    pub fn set_before_render(&mut self, hook: BeforeRenderHook) {
        self.before_render = Some(hook);
    }

    /// Run the before-render hook, if any
    pub fn before_render(&self, world: &Mat4) {
        if let Some(hook) = &self.before_render {
            hook(world);
        }
    }
}

#[cfg(test)]
#[path = "renderable_unit_tests.rs"]
mod tests;

/// SectorMeshGroup - the renderable units one sector contributed through the mesh path
///
/// A cheap-to-clone handle (`Rc<RefCell<..>>`). The mesh manager keeps one
/// clone in its table; the scene keeps another while the group is attached.

use std::cell::{Ref, RefCell};
use std::rc::{Rc, Weak};
use std::sync::Arc;

use crate::renderer::Texture;
use crate::scene::{RenderableUnit, SceneGroup, SceneNodeKey};
use crate::sector::SectorId;

struct SectorMeshGroupData {
    sector_id: SectorId,
    units: Vec<RenderableUnit>,
    /// Textures bound by the units (owned by the sector cache)
    textures: Vec<Arc<dyn Texture>>,
    parent: Option<(Weak<RefCell<SceneGroup>>, SceneNodeKey)>,
}

#[derive(Clone)]
pub struct SectorMeshGroup(Rc<RefCell<SectorMeshGroupData>>);

impl SectorMeshGroup {
    pub fn new(sector_id: SectorId) -> Self {
        Self(Rc::new(RefCell::new(SectorMeshGroupData {
            sector_id,
            units: Vec::new(),
            textures: Vec::new(),
            parent: None,
        })))
    }

    pub fn sector_id(&self) -> SectorId {
        self.0.borrow().sector_id
    }

    pub fn add_unit(&self, unit: RenderableUnit) {
        let mut data = self.0.borrow_mut();
        if let Some(texture) = unit.material().texture() {
            if !data.textures.iter().any(|t| Arc::ptr_eq(t, texture)) {
                data.textures.push(texture.clone());
            }
        }
        data.units.push(unit);
    }

    pub fn unit_count(&self) -> usize {
        self.0.borrow().units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.borrow().units.is_empty()
    }

    /// Borrow the units
    pub fn units(&self) -> Ref<'_, [RenderableUnit]> {
        Ref::map(self.0.borrow(), |data| data.units.as_slice())
    }

    pub fn textures(&self) -> Ref<'_, [Arc<dyn Texture>]> {
        Ref::map(self.0.borrow(), |data| data.textures.as_slice())
    }

    /// Drop every unit and texture reference.
    ///
    /// Resources shared with the sector cache stay alive as long as the cache
    /// holds them.
    pub fn clear(&self) {
        let mut data = self.0.borrow_mut();
        data.units.clear();
        data.textures.clear();
    }

    pub fn is_attached(&self) -> bool {
        self.parent().is_some()
    }

    /// Scene group this group is attached to, if it is still alive
    pub fn parent(&self) -> Option<Rc<RefCell<SceneGroup>>> {
        self.0.borrow().parent.as_ref().and_then(|(parent, _)| parent.upgrade())
    }

    /// Detach from the parent scene group. Returns `false` if not attached.
    pub fn detach(&self) -> bool {
        let link = self.0.borrow_mut().parent.take();
        match link.and_then(|(parent, key)| parent.upgrade().map(|p| (p, key))) {
            Some((parent, key)) => parent.borrow_mut().remove_child(key).is_some(),
            None => false,
        }
    }

    pub(crate) fn set_parent(&self, parent: Option<(Weak<RefCell<SceneGroup>>, SceneNodeKey)>) {
        self.0.borrow_mut().parent = parent;
    }

    /// Whether both handles refer to the same group
    pub fn ptr_eq(&self, other: &SectorMeshGroup) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

#[cfg(test)]
#[path = "sector_mesh_group_tests.rs"]
mod tests;

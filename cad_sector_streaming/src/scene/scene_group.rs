/// SceneGroup - the scene container sector mesh groups are attached to
///
/// Owned by whatever drives the scene (usually as `Rc<RefCell<SceneGroup>>`).
/// Children live in a SlotMap so detaching one never invalidates the keys of
/// the others.

use std::cell::RefCell;
use std::rc::Rc;
use glam::Mat4;
use slotmap::{new_key_type, SlotMap};

use crate::scene::SectorMeshGroup;

new_key_type! {
    /// Stable key of a child within a SceneGroup
    pub struct SceneNodeKey;
}

pub struct SceneGroup {
    name: String,
    world_matrix: Mat4,
    children: SlotMap<SceneNodeKey, SectorMeshGroup>,
}

impl SceneGroup {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            world_matrix: Mat4::IDENTITY,
            children: SlotMap::with_key(),
        }
    }

    /// Shared handle, as expected by `attach`
    pub fn new_shared(name: &str) -> Rc<RefCell<SceneGroup>> {
        Rc::new(RefCell::new(Self::new(name)))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn world_matrix(&self) -> &Mat4 {
        &self.world_matrix
    }

    pub fn set_world_matrix(&mut self, world_matrix: Mat4) {
        self.world_matrix = world_matrix;
    }

    /// Attach a sector group, detaching it from any previous parent first
    pub fn attach(parent: &Rc<RefCell<SceneGroup>>, group: &SectorMeshGroup) -> SceneNodeKey {
        group.detach();
        let key = parent.borrow_mut().children.insert(group.clone());
        group.set_parent(Some((Rc::downgrade(parent), key)));
        key
    }

    /// Remove a child. Returns the detached group.
    pub fn remove_child(&mut self, key: SceneNodeKey) -> Option<SectorMeshGroup> {
        let group = self.children.remove(key)?;
        group.set_parent(None);
        Some(group)
    }

    /// Detach every child
    pub fn clear(&mut self) {
        for (_, group) in self.children.drain() {
            group.set_parent(None);
        }
    }

    pub fn child_count(&self) -> usize {
        self.children.len()
    }

    pub fn children(&self) -> impl Iterator<Item = &SectorMeshGroup> {
        self.children.values()
    }

    /// Whether the group is one of this scene group's children
    pub fn contains(&self, group: &SectorMeshGroup) -> bool {
        self.children.values().any(|child| child.ptr_eq(group))
    }

    /// Run before-render hooks of every visible unit with this group's world matrix.
    ///
    /// Returns the number of units that will be drawn.
    pub fn before_render(&self) -> usize {
        let mut drawn = 0;
        for group in self.children.values() {
            for unit in group.units().iter().filter(|unit| unit.is_visible()) {
                unit.before_render(&self.world_matrix);
                drawn += 1;
            }
        }
        drawn
    }
}

#[cfg(test)]
#[path = "scene_group_tests.rs"]
mod tests;

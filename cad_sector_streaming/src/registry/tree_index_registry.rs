/// Tree index to sector registry
///
/// Records, per model, which sectors contain geometry referencing each tree
/// index. Selection and styling layers use it to find the sectors to touch
/// when an object changes, and subscribe to be told when a new
/// (tree index, sector) association appears.
///
/// The registry is append-only: unloading a sector does not remove its
/// associations, so `get` may name sectors that are no longer resident and
/// consumers must tolerate that.
///
/// Shared by the mesh and batching managers as `Rc<RefCell<TreeIndexRegistry>>`.
/// Listeners run while the registry is mutably borrowed and must not call back
/// into it.

use rustc_hash::{FxHashMap, FxHashSet};
use slotmap::{new_key_type, SlotMap};

use crate::sector::{CollectionType, SectorId, TreeIndex};

new_key_type! {
    /// Handle of a subscribed change listener
    pub struct ListenerKey;
}

/// Callback invoked with each newly recorded (tree index, sector) pair
pub type ChangeListener = Box<dyn FnMut(TreeIndex, SectorId)>;

#[derive(Default)]
pub struct TreeIndexRegistry {
    sectors_by_index: FxHashMap<TreeIndex, FxHashSet<SectorId>>,
    completed: FxHashSet<(SectorId, CollectionType)>,
    listeners: SlotMap<ListenerKey, ChangeListener>,
    association_count: usize,
    empty: FxHashSet<SectorId>,
}

impl TreeIndexRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `sector_id` contains `tree_index`.
    ///
    /// Listeners are notified only the first time a pair is seen.
    /// Returns `true` if the pair is new.
    pub fn set(&mut self, tree_index: TreeIndex, sector_id: SectorId) -> bool {
        let inserted = self.sectors_by_index
            .entry(tree_index)
            .or_default()
            .insert(sector_id);

        if inserted {
            self.association_count += 1;
            for listener in self.listeners.values_mut() {
                listener(tree_index, sector_id);
            }
        }
        inserted
    }

    /// Sectors containing `tree_index` (empty for unknown indices)
    pub fn get(&self, tree_index: TreeIndex) -> &FxHashSet<SectorId> {
        self.sectors_by_index.get(&tree_index).unwrap_or(&self.empty)
    }

    /// Whether the (sector, collection type) pair was already registered
    pub fn is_completed(&self, sector_id: SectorId, collection_type: CollectionType) -> bool {
        self.completed.contains(&(sector_id, collection_type))
    }

    pub fn mark_completed(&mut self, sector_id: SectorId, collection_type: CollectionType) {
        self.completed.insert((sector_id, collection_type));
    }

    /// Subscribe to new associations
    pub fn subscribe(&mut self, listener: impl FnMut(TreeIndex, SectorId) + 'static) -> ListenerKey {
        self.listeners.insert(Box::new(listener))
    }

    /// Remove a listener. Returns `false` for unknown keys.
    pub fn unsubscribe(&mut self, key: ListenerKey) -> bool {
        self.listeners.remove(key).is_some()
    }

    /// Number of distinct tree indices seen
    pub fn tree_index_count(&self) -> usize {
        self.sectors_by_index.len()
    }

    /// Number of distinct (tree index, sector) pairs recorded
    pub fn association_count(&self) -> usize {
        self.association_count
    }
}

#[cfg(test)]
#[path = "tree_index_registry_tests.rs"]
mod tests;

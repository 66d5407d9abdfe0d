//! Per-variant atlas slots and the join barrier over their loads.
//!
//! Each slot holds at most one pending request. Issuing a new request for a
//! slot cancels the previous one first. [`AtlasSlots::begin_group`] starts a
//! join over all slots: the group completes exactly once, when every slot
//! has resolved (loaded and preloaded, or found absent).

use bevy_ecs::prelude::Resource;
use log::debug;
use rustc_hash::FxHashMap;
use std::path::Path;
use std::sync::Arc;

use crate::resources::loadbridge::{LoadBridge, LoadId, PendingLoad};
use crate::resources::textureatlas::TextureAtlas;

#[derive(Debug)]
pub struct AtlasSlot {
    pub name: String,
    /// Last atlas that resolved for this slot.
    pub atlas: Option<Arc<TextureAtlas>>,
    pending: Option<PendingLoad>,
    resolved: bool,
}

impl AtlasSlot {
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn is_resolved(&self) -> bool {
        self.resolved
    }
}

#[derive(Resource, Debug, Default)]
pub struct AtlasSlots {
    slots: Vec<AtlasSlot>,
    routes: FxHashMap<LoadId, usize>,
    /// Slots the current group still waits for; `None` outside a group.
    waiting: Option<usize>,
}

impl AtlasSlots {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        AtlasSlots {
            slots: names
                .into_iter()
                .map(|name| AtlasSlot {
                    name: name.into(),
                    atlas: None,
                    pending: None,
                    resolved: false,
                })
                .collect(),
            routes: FxHashMap::default(),
            waiting: None,
        }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn slots(&self) -> &[AtlasSlot] {
        &self.slots
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.slots.iter().position(|s| s.name == name)
    }

    pub fn name(&self, slot: usize) -> Option<&str> {
        self.slots.get(slot).map(|s| s.name.as_str())
    }

    pub fn atlas(&self, name: &str) -> Option<Arc<TextureAtlas>> {
        self.index_of(name)
            .and_then(|i| self.slots[i].atlas.clone())
    }

    /// Whether a group is waiting for slots to resolve.
    pub fn is_loading(&self) -> bool {
        self.waiting.is_some()
    }

    /// Start a join over every slot, cancelling whatever each had pending.
    /// Returns `true` when there are no slots, so the group is already
    /// complete.
    pub fn begin_group(&mut self) -> bool {
        for slot in &mut self.slots {
            if let Some(pending) = slot.pending.take() {
                pending.cancel();
            }
            slot.resolved = false;
        }
        self.routes.clear();
        if self.slots.is_empty() {
            self.waiting = None;
            return true;
        }
        self.waiting = Some(self.slots.len());
        false
    }

    fn issue(&mut self, slot: usize, pending: PendingLoad) {
        if let Some(previous) = self.slots[slot].pending.replace(pending.clone()) {
            debug!("Superseding pending load #{} of slot {}", previous.id(), self.slots[slot].name);
            previous.cancel();
            self.routes.remove(&previous.id());
        }
        self.routes.insert(pending.id(), slot);
    }

    /// Load `dir` into `slot` on a worker.
    pub fn load(&mut self, bridge: &mut LoadBridge, slot: usize, dir: &Path) -> Option<LoadId> {
        if slot >= self.slots.len() {
            return None;
        }
        let pending = bridge.load(dir);
        let id = pending.id();
        self.issue(slot, pending);
        Some(id)
    }

    /// Preload `atlas` for `slot` on a worker.
    pub fn preload(
        &mut self,
        bridge: &mut LoadBridge,
        slot: usize,
        atlas: Arc<TextureAtlas>,
    ) -> Option<LoadId> {
        if slot >= self.slots.len() {
            return None;
        }
        let pending = bridge.preload(atlas);
        let id = pending.id();
        self.issue(slot, pending);
        Some(id)
    }

    /// Slot a delivered request belongs to. Each id routes once.
    pub fn route(&mut self, id: LoadId) -> Option<usize> {
        let slot = self.routes.remove(&id)?;
        let current = self.slots[slot].pending.as_ref().map(PendingLoad::id);
        if current == Some(id) {
            self.slots[slot].pending = None;
            Some(slot)
        } else {
            None
        }
    }

    /// Record the outcome of `slot`. An absent atlas keeps the slot's
    /// previous one. Returns `true` exactly once per group, when the last
    /// slot resolves.
    pub fn resolve(&mut self, slot: usize, atlas: Option<Arc<TextureAtlas>>) -> bool {
        let Some(entry) = self.slots.get_mut(slot) else {
            return false;
        };
        if atlas.is_some() {
            entry.atlas = atlas;
        }
        if entry.resolved {
            return false;
        }
        entry.resolved = true;
        match self.waiting {
            Some(remaining) if remaining > 1 => {
                self.waiting = Some(remaining - 1);
                false
            }
            Some(_) => {
                self.waiting = None;
                true
            }
            None => false,
        }
    }

    /// Cancel every pending request and abandon the current group.
    pub fn cancel_all(&mut self) {
        for slot in &mut self.slots {
            if let Some(pending) = slot.pending.take() {
                pending.cancel();
            }
        }
        self.routes.clear();
        self.waiting = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rustc_hash::FxHashMap;

    fn empty_atlas(name: &str) -> Arc<TextureAtlas> {
        Arc::new(TextureAtlas::new(name, Vec::new(), FxHashMap::default()))
    }

    #[test]
    fn group_completes_once_after_every_slot() {
        let mut slots = AtlasSlots::new(["black", "purple"]);
        assert!(!slots.begin_group());
        assert!(slots.is_loading());
        assert!(!slots.resolve(1, Some(empty_atlas("p"))));
        assert!(!slots.resolve(1, None));
        assert!(slots.resolve(0, None));
        assert!(!slots.is_loading());
        assert!(!slots.resolve(0, None));
        assert!(slots.atlas("purple").is_some());
        assert!(slots.atlas("black").is_none());
    }

    #[test]
    fn empty_group_has_nothing_to_wait_for() {
        let mut slots = AtlasSlots::new(Vec::<String>::new());
        assert!(slots.begin_group());
        assert!(!slots.is_loading());
        assert!(!slots.resolve(0, None));
    }

    #[test]
    fn new_request_supersedes_the_slot_pending_one() {
        let mut bridge = LoadBridge::new();
        let mut slots = AtlasSlots::new(["black"]);
        let _ = slots.begin_group();
        let first = slots.preload(&mut bridge, 0, empty_atlas("a")).unwrap();
        let second = slots.preload(&mut bridge, 0, empty_atlas("b")).unwrap();
        assert!(slots.slots()[0].is_pending());

        let delivered: Vec<LoadId> = bridge.drain().into_iter().map(|(id, _)| id).collect();
        assert_eq!(delivered, vec![second]);
        assert_eq!(slots.route(first), None);
        assert_eq!(slots.route(second), Some(0));
        assert_eq!(slots.route(second), None);
        assert!(!slots.slots()[0].is_pending());
    }

    #[test]
    fn restarting_a_group_cancels_pending_requests() {
        let mut bridge = LoadBridge::new();
        let mut slots = AtlasSlots::new(["black", "purple"]);
        let _ = slots.begin_group();
        let id = slots.preload(&mut bridge, 1, empty_atlas("a")).unwrap();
        let _ = slots.begin_group();
        assert!(bridge.drain().is_empty());
        assert_eq!(slots.route(id), None);
        assert!(slots.load(&mut bridge, 5, Path::new("nowhere")).is_none());
    }
}

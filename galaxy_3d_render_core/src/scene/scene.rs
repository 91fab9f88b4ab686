/// Scene - drawable entities and the change events render queues consume.
///
/// Entities live in a SlotMap with stable keys. Every entity also gets a
/// dense `u32` id (reused after removal) that indexes visibility sets.

use glam::Mat4;
use rustc_hash::FxHashSet;
use slotmap::SlotMap;
use crate::error::{Error, Result};
use super::entity::{Entity, EntityDesc, EntityKey, RenderOrder};

/// What happened to the scene
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SceneChangeKind {
    Add(EntityKey),
    Delete(EntityKey),
    DeleteAll,
}

/// Change event tagged with the render order it concerns
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SceneChange {
    pub kind: SceneChangeKind,
    pub order: RenderOrder,
}

#[derive(Default)]
pub struct Scene {
    entities: SlotMap<EntityKey, Entity>,
    free_ids: Vec<u32>,
    next_id: u32,
    changes: Vec<SceneChange>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_entity(&mut self, desc: EntityDesc) -> EntityKey {
        let id = self.free_ids.pop().unwrap_or_else(|| {
            let id = self.next_id;
            self.next_id += 1;
            id
        });
        let order = desc.order;
        let key = self.entities.insert(Entity {
            name: desc.name,
            material: desc.material,
            geometry: desc.geometry,
            transform: desc.transform,
            order,
            id,
        });
        self.changes.push(SceneChange { kind: SceneChangeKind::Add(key), order });
        key
    }

    /// Remove an entity
    ///
    /// The entity stays readable until the Delete change has been consumed:
    /// removal only happens in `take_changes`.
    pub fn remove_entity(&mut self, key: EntityKey) -> Result<()> {
        let Some(entity) = self.entities.get(key) else {
            return Err(Error::InvalidResource(format!("entity {:?} not found", key)));
        };
        self.changes.push(SceneChange { kind: SceneChangeKind::Delete(key), order: entity.order });
        Ok(())
    }

    /// Remove every entity
    ///
    /// Entities added after this call, before the changes are taken, survive.
    pub fn clear(&mut self) {
        for order in RenderOrder::ALL {
            self.changes.push(SceneChange { kind: SceneChangeKind::DeleteAll, order });
        }
    }

    pub fn set_transform(&mut self, key: EntityKey, transform: Mat4) -> Result<()> {
        match self.entities.get_mut(key) {
            Some(entity) => {
                entity.transform = transform;
                Ok(())
            }
            None => Err(Error::InvalidResource(format!("entity {:?} not found", key))),
        }
    }

    /// Pending changes, oldest first
    pub fn pending_changes(&self) -> &[SceneChange] {
        &self.changes
    }

    /// Forget pending changes and apply the deletions they describe
    ///
    /// Call once every render queue has consumed `pending_changes`. Changes
    /// apply in event order, like the queues saw them: a DeleteAll removes
    /// the entities whose Add came before it.
    pub fn take_changes(&mut self) -> Vec<SceneChange> {
        self.take_applied_changes(self.changes.len())
    }

    /// Take the `count` oldest pending changes and apply their deletions
    ///
    /// The rest stay pending. Entities whose Add is still pending survive a
    /// taken DeleteAll.
    pub fn take_applied_changes(&mut self, count: usize) -> Vec<SceneChange> {
        let remaining = self.changes.split_off(count.min(self.changes.len()));
        let changes = std::mem::replace(&mut self.changes, remaining);
        for (index, change) in changes.iter().enumerate() {
            match change.kind {
                SceneChangeKind::Delete(key) => {
                    if let Some(entity) = self.entities.remove(key) {
                        self.free_ids.push(entity.id);
                    }
                }
                SceneChangeKind::DeleteAll => {
                    let added_later: FxHashSet<EntityKey> = changes[index + 1..]
                        .iter()
                        .chain(self.changes.iter())
                        .filter_map(|later| match later.kind {
                            SceneChangeKind::Add(key) => Some(key),
                            _ => None,
                        })
                        .collect();
                    let free_ids = &mut self.free_ids;
                    self.entities.retain(|key, entity| {
                        if added_later.contains(&key) {
                            return true;
                        }
                        free_ids.push(entity.id);
                        false
                    });
                    if self.entities.is_empty() {
                        self.free_ids.clear();
                        self.next_id = 0;
                    }
                }
                SceneChangeKind::Add(_) => {}
            }
        }
        changes
    }

    pub fn entity(&self, key: EntityKey) -> Option<&Entity> {
        self.entities.get(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (EntityKey, &Entity)> {
        self.entities.iter()
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Upper bound of dense entity ids
    pub fn id_capacity(&self) -> u32 {
        self.next_id
    }
}

#[cfg(test)]
#[path = "scene_tests.rs"]
mod tests;

/// Per-pass visibility bitsets and frustum culling

use crate::camera::Frustum;
use super::scene::Scene;

/// One bit per dense entity id
#[derive(Debug, Clone, Default)]
pub struct VisibilitySet {
    bits: Vec<u64>,
}

impl VisibilitySet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, id: u32) {
        let word = id as usize / 64;
        if word >= self.bits.len() {
            self.bits.resize(word + 1, 0);
        }
        self.bits[word] |= 1u64 << (id % 64);
    }

    pub fn is_visible(&self, id: u32) -> bool {
        self.bits
            .get(id as usize / 64)
            .is_some_and(|word| word & (1u64 << (id % 64)) != 0)
    }

    pub fn clear(&mut self) {
        self.bits.iter_mut().for_each(|word| *word = 0);
    }

    pub fn count(&self) -> usize {
        self.bits.iter().map(|word| word.count_ones() as usize).sum()
    }

    /// Mark every entity of the scene visible
    pub fn mark_all(&mut self, scene: &Scene) {
        self.clear();
        for (_, entity) in scene.iter() {
            self.set(entity.id);
        }
    }

    /// Rebuild from the entities whose world bounds intersect `frustum`
    pub fn cull(&mut self, scene: &Scene, frustum: &Frustum) {
        self.clear();
        for (_, entity) in scene.iter() {
            if frustum.intersects_aabb(&entity.world_bounds()) {
                self.set(entity.id);
            }
        }
    }
}

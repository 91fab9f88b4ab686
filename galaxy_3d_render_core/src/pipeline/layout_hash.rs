/// Vertex layout hashing for the pipeline cache key

use std::hash::{Hash, Hasher};
use rustc_hash::FxHasher;
use crate::graphics_device::VertexLayout;

/// Hash of a vertex layout as seen by the pipeline cache
///
/// Only the semantic name and semantic index of each element are hashed.
/// Two layouts that differ only in element format or byte offset produce the
/// same hash and share one pipeline.
pub fn layout_hash(layout: &VertexLayout) -> u64 {
    let mut hasher = FxHasher::default();
    layout.elements.len().hash(&mut hasher);
    for element in &layout.elements {
        element.semantic_name.hash(&mut hasher);
        element.semantic_index.hash(&mut hasher);
    }
    hasher.finish()
}

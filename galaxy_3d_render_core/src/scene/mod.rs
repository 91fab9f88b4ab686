//! Scene module - entities, change events and visibility.

mod entity;
mod scene;
mod visibility;

pub use entity::{AABB, Entity, EntityDesc, EntityKey, GeometryRecord, RenderOrder};
pub use scene::{Scene, SceneChange, SceneChangeKind};
pub use visibility::VisibilitySet;

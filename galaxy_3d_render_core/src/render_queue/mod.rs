//! Render queue module - sorted per-pass draw lists.

mod render_queue;

pub use render_queue::{DrawStats, QueueEntry, RenderQueue};

/// Pipeline module - state synthesis and the pipeline state cache

pub mod layout_hash;
pub mod render_state;
pub mod pipeline_cache;

pub use layout_hash::*;
pub use render_state::*;
pub use pipeline_cache::*;

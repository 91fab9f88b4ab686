/// Descriptor module - shader-visible descriptor table management

pub mod descriptor_allocator;
pub mod resource_table;

pub use descriptor_allocator::*;
pub use resource_table::*;

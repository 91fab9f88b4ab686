/// Material module - definitions, resolved instances and assigned materials

pub mod definition;
pub mod auto_param;
pub mod instance;
pub mod assigned;
pub mod material_library;

pub use definition::*;
pub use auto_param::*;
pub use instance::*;
pub use assigned::*;
pub use material_library::*;

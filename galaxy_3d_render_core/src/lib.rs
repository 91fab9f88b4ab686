/*!
# Galaxy 3D Render Core

Command submission and resource binding core of the Galaxy 3D engine.

The crate sits between a scene/material loader and a graphics backend. It
turns materials and scene entities into sorted, minimally rebound draw
streams, records them on one persistent thread per pass, and paces frame
reuse with GPU fences. Backends implement the traits of `graphics_device`.

## Architecture

- **DescriptorAllocator / ResourceTable**: fixed-capacity bindless descriptor table
- **SignatureCache**: root signatures merged from shader stage reflection
- **PipelineCache**: deduplicated pipeline states with hot reload
- **MaterialLibrary**: material definitions, instances and assigned materials
- **RenderQueue**: per-pass draw lists sorted to minimize state changes
- **ParallelRecordingScheduler**: one recording thread per pass, ordered submission
- **FrameFenceTracker / FrameConstantArena**: frame-in-flight pacing and per-frame constants
- **RenderContext**: owner of the above for one device
*/

// Internal modules
mod error;
mod engine;
mod context;
pub mod log;
pub mod config;
pub mod graphics_device;
pub mod descriptor;
pub mod shader;
pub mod pipeline;
pub mod material;
pub mod camera;
pub mod scene;
pub mod render_queue;
pub mod frame;
pub mod scheduler;

// Main galaxy3d namespace module
pub mod galaxy3d {
    // Error types
    pub use crate::error::{Error, Result};

    // Logging facade
    pub use crate::engine::Engine;

    // Configuration and context
    pub use crate::config::Config;
    pub use crate::context::RenderContext;

    // Logging sub-module (types only, NOT macros)
    pub mod log {
        pub use crate::log::{Logger, LogEntry, LogSeverity, DefaultLogger};
    }

    // Backend traits and descriptors
    pub mod render {
        pub use crate::graphics_device::*;
    }

    pub mod descriptor {
        pub use crate::descriptor::*;
    }

    pub mod shader {
        pub use crate::shader::*;
    }

    pub mod pipeline {
        pub use crate::pipeline::*;
    }

    pub mod material {
        pub use crate::material::*;
    }

    pub mod camera {
        pub use crate::camera::*;
    }

    pub mod scene {
        pub use crate::scene::*;
    }

    pub mod queue {
        pub use crate::render_queue::*;
    }

    pub mod frame {
        pub use crate::frame::*;
    }

    pub mod scheduler {
        pub use crate::scheduler::*;
    }
}

// Re-export math library at crate root
pub use glam;

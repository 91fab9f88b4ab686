/// Named shader-visible views on top of the descriptor allocator

use std::sync::Arc;
use rustc_hash::FxHashMap;
use crate::descriptor::{DescriptorAllocator, DescriptorKind};
use crate::error::{Error, Result};
use crate::graphics_device::GraphicsDevice;
use crate::{engine_debug, engine_warn_once};

/// Name of the view every missing texture resolves to
pub const FALLBACK_TEXTURE: &str = "__fallback_texture";

pub struct ResourceTable {
    device: Arc<dyn GraphicsDevice>,
    allocator: DescriptorAllocator,
    views: FxHashMap<String, u32>,
    fallback_index: u32,
}

impl ResourceTable {
    /// Create the table and its fallback texture view
    pub fn new(device: Arc<dyn GraphicsDevice>, capacity: u32) -> Result<Self> {
        let mut table = Self {
            device,
            allocator: DescriptorAllocator::new(capacity),
            views: FxHashMap::default(),
            fallback_index: 0,
        };
        table.fallback_index = table.create_view(FALLBACK_TEXTURE, DescriptorKind::Texture2D)?;
        Ok(table)
    }

    /// Allocate a slot and write the view into it
    ///
    /// Creating a view whose name is already registered returns its index.
    pub fn create_view(&mut self, name: &str, kind: DescriptorKind) -> Result<u32> {
        if let Some(&index) = self.views.get(name) {
            return Ok(index);
        }
        let index = self.allocator.allocate(kind, name)?;
        if let Err(err) = self.device.write_descriptor(index, kind, name) {
            self.allocator.free(index)?;
            return Err(err);
        }
        engine_debug!("galaxy3d::ResourceTable", "view '{}' ({:?}) -> slot {}", name, kind, index);
        self.views.insert(name.to_string(), index);
        Ok(index)
    }

    /// Release a named view; unknown names are ignored
    ///
    /// The fallback texture view lives as long as the table.
    pub fn destroy_view(&mut self, name: &str) -> Result<()> {
        if name == FALLBACK_TEXTURE {
            return Err(Error::InvalidResource(format!("view '{}' cannot be destroyed", name)));
        }
        let Some(index) = self.views.remove(name) else {
            return Ok(());
        };
        self.device.clear_descriptor(index)?;
        self.allocator.free(index)
    }

    pub fn index_of(&self, name: &str) -> Option<u32> {
        self.views.get(name).copied()
    }

    /// Index of a named texture view, or of the fallback view with a one-time warning
    pub fn texture_or_fallback(&self, name: &str) -> u32 {
        match self.views.get(name) {
            Some(&index) => index,
            None => {
                engine_warn_once!(format!("texture:{}", name), "galaxy3d::ResourceTable",
                    "texture '{}' not found, using fallback", name);
                self.fallback_index
            }
        }
    }

    pub fn fallback_index(&self) -> u32 {
        self.fallback_index
    }

    pub fn allocator(&self) -> &DescriptorAllocator {
        &self.allocator
    }

    /// Number of named views, fallback included
    pub fn view_count(&self) -> usize {
        self.views.len()
    }
}

#[cfg(test)]
#[path = "resource_table_tests.rs"]
mod tests;

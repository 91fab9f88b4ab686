/// Registry of compiled shader stages by name

use std::sync::Arc;
use rustc_hash::FxHashMap;
use crate::shader::ShaderStageInfo;
use crate::engine_info;

#[derive(Default)]
pub struct ShaderLibrary {
    stages: FxHashMap<String, Arc<ShaderStageInfo>>,
    /// Bumped every time a registered stage is replaced
    generation: u64,
}

impl ShaderLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a stage, replacing any stage of the same name wholesale
    ///
    /// Returns true when an existing stage was replaced (hot reload).
    pub fn register(&mut self, info: ShaderStageInfo) -> bool {
        let name = info.name.clone();
        let replaced = self.stages.insert(name.clone(), Arc::new(info)).is_some();
        if replaced {
            self.generation += 1;
            engine_info!("galaxy3d::ShaderLibrary", "shader stage '{}' replaced", name);
        }
        replaced
    }

    pub fn get(&self, name: &str) -> Option<Arc<ShaderStageInfo>> {
        self.stages.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.stages.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }
}

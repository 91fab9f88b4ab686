/// Resource state tracking across passes and frames

use rustc_hash::FxHashMap;
use crate::graphics_device::{ResourceId, ResourceState, Transition};

/// State a pass needs a resource in while it records
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResourceUsage {
    pub resource: ResourceId,
    pub state: ResourceState,
}

impl ResourceUsage {
    pub fn new(resource: ResourceId, state: ResourceState) -> Self {
        Self { resource, state }
    }
}

/// Last known state of every declared resource
///
/// Untracked resources start in `ResourceState::Common`.
#[derive(Debug, Default)]
pub struct ResourceStateTracker {
    states: FxHashMap<ResourceId, ResourceState>,
}

impl ResourceStateTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self, resource: ResourceId) -> ResourceState {
        self.states.get(&resource).copied().unwrap_or(ResourceState::Common)
    }

    /// Record a state reached outside of the scheduled passes (e.g. after present)
    pub fn set_state(&mut self, resource: ResourceId, state: ResourceState) {
        self.states.insert(resource, state);
    }

    /// Transitions bringing every usage into its declared state
    pub fn transitions_for(&mut self, usages: &[ResourceUsage]) -> Vec<Transition> {
        let mut transitions = Vec::new();
        for usage in usages {
            let before = self.state(usage.resource);
            if before != usage.state {
                transitions.push(Transition { resource: usage.resource, before, after: usage.state });
                self.states.insert(usage.resource, usage.state);
            }
        }
        transitions
    }
}

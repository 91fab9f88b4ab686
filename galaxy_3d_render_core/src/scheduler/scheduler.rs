/// ParallelRecordingScheduler - one persistent recording thread per pass
///
/// Every pass owns a worker thread, a command list and a begin/finished
/// signal pair. Each frame the orchestrator plans resource transitions over
/// the enabled passes in submission order, hands workers their frame slot and
/// planned transitions, and raises "begin"; workers wait for the passes
/// they depend on, record, and raise "finished". The orchestrator then
/// submits all command lists as one batch in submission order, whatever
/// order the workers completed in.
///
/// Shutdown (also run by `Drop`) clears the running flag, raises "begin",
/// joins the worker, then releases the command list, in that order.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use crate::error::{Error, Result};
use crate::graphics_device::{CommandList, GraphicsDevice, Transition};
use crate::{engine_debug, engine_error, engine_info, engine_warn};
use super::frame_signal::FrameSignal;
use super::pass_recorder::{FrameContext, PassRecorder};
use super::resource_state::{ResourceStateTracker, ResourceUsage};

const SOURCE: &str = "galaxy3d::ParallelRecordingScheduler";

/// Index of a pass within its scheduler
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PassId(pub usize);

/// A pass's place in the submission batch, for the compositor
#[derive(Debug, Clone)]
pub struct SubmissionSlot {
    pub pass: PassId,
    pub name: String,
    pub enabled: bool,
    pub finished: Arc<FrameSignal>,
}

/// Work handed to a worker for one frame
#[derive(Default)]
struct PassWork {
    frame: u64,
    frame_slot: usize,
    transitions: Vec<Transition>,
    error: Option<Error>,
}

/// State shared between the orchestrator and one worker
struct PassShared {
    name: String,
    begin: FrameSignal,
    finished: Arc<FrameSignal>,
    work: Mutex<PassWork>,
    command_list: Mutex<Option<Box<dyn CommandList>>>,
}

struct PassSlot {
    shared: Arc<PassShared>,
    handle: Option<JoinHandle<()>>,
    depends_on: Vec<PassId>,
    usages: Vec<ResourceUsage>,
    /// Transitions planned for the frame being prepared
    planned: Vec<Transition>,
    enabled: bool,
}

pub struct ParallelRecordingScheduler {
    device: Arc<dyn GraphicsDevice>,
    frames_in_flight: usize,
    running: Arc<AtomicBool>,
    passes: Vec<PassSlot>,
    submission_order: Vec<PassId>,
    states: ResourceStateTracker,
    planned_frame: u64,
}

impl ParallelRecordingScheduler {
    pub fn new(device: Arc<dyn GraphicsDevice>, frames_in_flight: usize) -> Self {
        Self {
            device,
            frames_in_flight,
            running: Arc::new(AtomicBool::new(true)),
            passes: Vec::new(),
            submission_order: Vec::new(),
            states: ResourceStateTracker::new(),
            planned_frame: 0,
        }
    }

    // ===== SETUP =====

    /// Create a pass with its command list and worker thread
    ///
    /// `depends_on` lists passes whose recording must finish before this one
    /// starts. Only existing passes can be named, so dependencies never cycle.
    /// The pass is appended to the submission order.
    pub fn initialize(&mut self, recorder: Box<dyn PassRecorder>, depends_on: &[PassId]) -> Result<PassId> {
        let id = PassId(self.passes.len());
        let name = recorder.name().to_string();
        if let Some(missing) = depends_on.iter().find(|dep| dep.0 >= self.passes.len()) {
            return Err(Error::InvalidResource(format!(
                "pass '{}' depends on unknown pass {:?}", name, missing
            )));
        }

        let command_list = self.device.create_command_list(&name, self.frames_in_flight)?;
        let shared = Arc::new(PassShared {
            name: name.clone(),
            begin: FrameSignal::new(),
            finished: Arc::new(FrameSignal::new()),
            work: Mutex::new(PassWork::default()),
            command_list: Mutex::new(Some(command_list)),
        });
        let dependencies: Vec<Arc<FrameSignal>> = depends_on
            .iter()
            .map(|dep| self.passes[dep.0].shared.finished.clone())
            .collect();
        let usages = recorder.resource_usages();

        let handle = {
            let shared = shared.clone();
            let running = self.running.clone();
            thread::Builder::new()
                .name(format!("galaxy3d-pass-{}", name))
                .spawn(move || worker_loop(shared, recorder, dependencies, running))
                .map_err(|e| Error::InitializationFailed(format!("cannot spawn worker for '{}': {}", name, e)))?
        };

        self.passes.push(PassSlot {
            shared,
            handle: Some(handle),
            depends_on: depends_on.to_vec(),
            usages,
            planned: Vec::new(),
            enabled: true,
        });
        self.submission_order.push(id);
        engine_info!(SOURCE, "Initialized pass '{}' ({:?}, {} dependencies)", name, id, depends_on.len());
        Ok(id)
    }

    /// Enable or disable a pass
    ///
    /// A disabled pass does not record; its "finished" signal is raised by
    /// the orchestrator so that dependents keep running, and it is left out
    /// of submission.
    pub fn set_enabled(&mut self, pass: PassId, enabled: bool) -> Result<()> {
        self.slot_mut(pass)?.enabled = enabled;
        Ok(())
    }

    pub fn is_enabled(&self, pass: PassId) -> bool {
        self.passes.get(pass.0).is_some_and(|slot| slot.enabled)
    }

    /// Replace the submission order
    ///
    /// `order` must name every pass once, each after the passes it depends on.
    pub fn set_submission_order(&mut self, order: Vec<PassId>) -> Result<()> {
        if order.len() != self.passes.len() {
            return Err(Error::InvalidResource(format!(
                "submission order names {} passes, scheduler has {}", order.len(), self.passes.len()
            )));
        }
        let mut position = vec![usize::MAX; self.passes.len()];
        for (index, pass) in order.iter().enumerate() {
            match position.get_mut(pass.0) {
                Some(slot) if *slot == usize::MAX => *slot = index,
                _ => {
                    return Err(Error::InvalidResource(format!(
                        "submission order names {:?} twice or out of range", pass
                    )))
                }
            }
        }
        for (index, slot) in self.passes.iter().enumerate() {
            if let Some(dep) = slot.depends_on.iter().find(|dep| position[dep.0] > position[index]) {
                return Err(Error::InvalidResource(format!(
                    "pass '{}' submitted before its dependency {:?}", slot.shared.name, dep
                )));
            }
        }
        self.submission_order = order;
        Ok(())
    }

    pub fn submission_slots(&self) -> Vec<SubmissionSlot> {
        self.submission_order
            .iter()
            .map(|&pass| {
                let slot = &self.passes[pass.0];
                SubmissionSlot {
                    pass,
                    name: slot.shared.name.clone(),
                    enabled: slot.enabled,
                    finished: slot.shared.finished.clone(),
                }
            })
            .collect()
    }

    pub fn pass_count(&self) -> usize {
        self.passes.len()
    }

    pub fn resource_states(&mut self) -> &mut ResourceStateTracker {
        &mut self.states
    }

    // ===== FRAME =====

    /// Plan the resource transitions of every enabled pass for `frame`
    ///
    /// Passes are walked in submission order, so each pass sees the state the
    /// previously submitted pass left its resources in, whatever order `run`
    /// is later called in. Runs once per frame; `run` calls it on demand.
    pub fn prepare_frame(&mut self, frame: &FrameContext) {
        if self.planned_frame >= frame.frame {
            return;
        }
        for &pass in &self.submission_order {
            let slot = &mut self.passes[pass.0];
            slot.planned = if slot.enabled {
                self.states.transitions_for(&slot.usages)
            } else {
                Vec::new()
            };
        }
        self.planned_frame = frame.frame;
    }

    /// Start recording one pass for `frame`
    pub fn run(&mut self, frame: &FrameContext, pass: PassId) -> Result<()> {
        self.slot(pass)?;
        self.prepare_frame(frame);
        let slot = self.slot(pass)?;
        let shared = slot.shared.clone();
        if !slot.enabled {
            return shared.finished.signal(frame.frame);
        }

        // Previous frame must be done before its work is overwritten
        let previous = shared.work.lock()?.frame;
        if previous >= frame.frame {
            return Err(Error::InvariantViolation(format!(
                "pass '{}' already ran frame {}", shared.name, previous
            )));
        }
        shared.finished.wait_for(previous)?;

        let transitions = std::mem::take(&mut self.passes[pass.0].planned);
        {
            let mut work = shared.work.lock()?;
            work.frame = frame.frame;
            work.frame_slot = frame.frame_slot;
            work.transitions = transitions;
            work.error = None;
        }
        shared.begin.signal(frame.frame)
    }

    /// Start recording every pass for `frame`, in submission order
    pub fn run_frame(&mut self, frame: &FrameContext) -> Result<()> {
        for pass in self.submission_order.clone() {
            self.run(frame, pass)?;
        }
        Ok(())
    }

    /// Wait for every pass that ran `frame` and submit their command lists
    ///
    /// Lists are submitted as one batch in submission order. When a pass
    /// failed to record, nothing is submitted and its error is returned.
    pub fn submit_frame(&mut self, frame: &FrameContext) -> Result<()> {
        let mut batch = Vec::new();
        let mut first_error = None;
        for &pass in &self.submission_order {
            let slot = &self.passes[pass.0];
            if !slot.enabled {
                continue;
            }
            let shared = &slot.shared;
            if shared.work.lock()?.frame != frame.frame {
                continue;
            }
            shared.finished.wait_for(frame.frame)?;
            if let Some(error) = shared.work.lock()?.error.take() {
                engine_error!(SOURCE, "Pass '{}' failed to record frame {}: {}", shared.name, frame.frame, error);
                first_error.get_or_insert(error);
            }
            batch.push(shared.clone());
        }
        if let Some(error) = first_error {
            return Err(error);
        }

        let guards = batch
            .iter()
            .map(|shared| shared.command_list.lock())
            .collect::<std::result::Result<Vec<_>, _>>()?;
        let lists = guards
            .iter()
            .filter_map(|guard| guard.as_deref())
            .collect::<Vec<&dyn CommandList>>();
        self.device.submit(&lists)?;
        engine_debug!(SOURCE, "Submitted {} command lists for frame {}", lists.len(), frame.frame);
        Ok(())
    }

    // ===== SHUTDOWN =====

    /// Stop and join every worker, then release their command lists
    pub fn shutdown(&mut self) {
        if self.passes.iter().all(|slot| slot.handle.is_none()) {
            return;
        }
        self.running.store(false, Ordering::Release);
        for slot in &self.passes {
            let _ = slot.shared.begin.signal(u64::MAX);
            // Dependents blocked on a pass that never ran
            let _ = slot.shared.finished.signal(u64::MAX);
        }
        for slot in &mut self.passes {
            if let Some(handle) = slot.handle.take() {
                if handle.join().is_err() {
                    engine_error!(SOURCE, "Worker of pass '{}' panicked", slot.shared.name);
                }
            }
            match slot.shared.command_list.lock() {
                Ok(mut list) => drop(list.take()),
                Err(_) => engine_warn!(SOURCE, "Command list of '{}' poisoned", slot.shared.name),
            }
            engine_debug!(SOURCE, "Pass '{}' shut down", slot.shared.name);
        }
    }

    fn slot(&self, pass: PassId) -> Result<&PassSlot> {
        self.passes
            .get(pass.0)
            .ok_or_else(|| Error::InvalidResource(format!("unknown pass {:?}", pass)))
    }

    fn slot_mut(&mut self, pass: PassId) -> Result<&mut PassSlot> {
        self.passes
            .get_mut(pass.0)
            .ok_or_else(|| Error::InvalidResource(format!("unknown pass {:?}", pass)))
    }
}

impl Drop for ParallelRecordingScheduler {
    fn drop(&mut self) {
        self.shutdown();
    }
}

// ============================================================================
// Worker
// ============================================================================

fn worker_loop(
    shared: Arc<PassShared>,
    mut recorder: Box<dyn PassRecorder>,
    dependencies: Vec<Arc<FrameSignal>>,
    running: Arc<AtomicBool>,
) {
    let mut next_frame = 1;
    loop {
        if shared.begin.wait_for(next_frame).is_err() || !running.load(Ordering::Acquire) {
            break;
        }
        let (frame, transitions) = match shared.work.lock() {
            Ok(mut work) => (
                FrameContext { frame: work.frame, frame_slot: work.frame_slot },
                std::mem::take(&mut work.transitions),
            ),
            Err(_) => break,
        };
        next_frame = frame.frame + 1;

        if dependencies.iter().any(|dep| dep.wait_for(frame.frame).is_err()) {
            break;
        }
        if !running.load(Ordering::Acquire) {
            break;
        }

        let result = record_frame(&shared, recorder.as_mut(), &frame, &transitions);
        if let Err(error) = result {
            if let Ok(mut work) = shared.work.lock() {
                work.error = Some(error);
            }
        }
        if shared.finished.signal(frame.frame).is_err() {
            break;
        }
    }
}

fn record_frame(
    shared: &PassShared,
    recorder: &mut dyn PassRecorder,
    frame: &FrameContext,
    transitions: &[Transition],
) -> Result<()> {
    let mut guard = shared.command_list.lock()?;
    let Some(cmd) = guard.as_mut() else {
        return Err(Error::BackendError(format!("command list of '{}' released", shared.name)));
    };
    cmd.reset(frame.frame_slot)?;
    if !transitions.is_empty() {
        cmd.resource_barrier(transitions)?;
    }
    if recorder.has_changes() {
        recorder.record(frame, &mut **cmd)?;
    }
    cmd.close()
}

#[cfg(test)]
#[path = "scheduler_tests.rs"]
mod tests;

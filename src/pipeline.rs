use crate::models::Frame;
use crate::processing::FrameProcessor;
use anyhow::Result;
use tracing::{debug, info, warn};

/// Handle to one processor instance registered with a chain.
///
/// Chain membership is tracked by handle, so two processors with the same
/// type and parameters are still distinct entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProcessorId(usize);

/// Result of toggling a processor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Toggle {
    Added,
    Removed,
}

/// Ordered, mutable chain of frame processors.
///
/// Processor instances live in the registry for as long as the chain does;
/// adding and removing only changes which handles are active and in what
/// order. A processor's internal state therefore survives being removed
/// and added again, and also survives `clear`.
pub struct ProcessorChain {
    registry: Vec<Box<dyn FrameProcessor>>,
    active: Vec<ProcessorId>,
}

impl ProcessorChain {
    /// Create an empty chain with no registered processors
    pub fn new() -> Self {
        Self {
            registry: Vec::new(),
            active: Vec::new(),
        }
    }

    /// Store a long-lived processor instance. It is not active until added.
    pub fn register(&mut self, processor: Box<dyn FrameProcessor>) -> ProcessorId {
        let id = ProcessorId(self.registry.len());
        debug!(processor = processor.name(), id = id.0, "registered processor");
        self.registry.push(processor);
        id
    }

    /// Append a processor to the end of the chain.
    /// Returns false if the handle does not belong to this chain.
    pub fn add(&mut self, id: ProcessorId) -> bool {
        let Some(processor) = self.registry.get(id.0) else {
            warn!(id = id.0, "ignoring unknown processor handle");
            return false;
        };
        info!(processor = processor.name(), "added processor");
        self.active.push(id);
        true
    }

    /// Remove the first occurrence of a processor. Removing a processor
    /// that is not in the chain is a no-op and returns false.
    pub fn remove(&mut self, id: ProcessorId) -> bool {
        let Some(pos) = self.active.iter().position(|&active| active == id) else {
            return false;
        };
        self.active.remove(pos);
        info!(processor = self.registry[id.0].name(), "removed processor");
        true
    }

    /// Add the processor if absent, remove it if present
    pub fn toggle(&mut self, id: ProcessorId) -> Toggle {
        if self.remove(id) {
            Toggle::Removed
        } else {
            self.add(id);
            Toggle::Added
        }
    }

    pub fn contains(&self, id: ProcessorId) -> bool {
        self.active.contains(&id)
    }

    /// Deactivate every processor. Registered instances keep their state.
    pub fn clear(&mut self) {
        self.active.clear();
        info!("all processors cleared");
    }

    /// Number of active entries
    pub fn len(&self) -> usize {
        self.active.len()
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }

    /// Active handles in application order
    pub fn active(&self) -> &[ProcessorId] {
        &self.active
    }

    /// Names of the active processors in application order
    pub fn active_names(&self) -> Vec<&str> {
        self.active
            .iter()
            .map(|id| self.registry[id.0].name())
            .collect()
    }

    pub fn processor(&self, id: ProcessorId) -> Option<&dyn FrameProcessor> {
        self.registry.get(id.0).map(|p| &**p)
    }

    /// Run a copy of `frame` through every active processor in order.
    ///
    /// Each processor receives the previous processor's output. The input
    /// frame itself is never modified; an empty chain returns a plain copy.
    pub fn apply(&mut self, frame: &Frame) -> Result<Frame> {
        let mut result = frame.clone();

        for id in &self.active {
            result = self.registry[id.0].process(result)?;
        }

        Ok(result)
    }
}

impl Default for ProcessorChain {
    fn default() -> Self {
        Self::new()
    }
}

//! Drivers for a graph of [`Processor`]s.
//!
//! The executor only decides *when* each processor is polled. Data moves
//! through the ports the processors were built with, so [`connect`] records
//! topology for ordering and does not create channels.
//!
//! Two modes:
//! - [`run`]: one thread, sweeping processors in topological order.
//! - [`run_threaded`]: one scoped thread per processor, yielding and then
//!   sleeping briefly while a processor waits on a port.
//!
//! [`connect`]: PipelineExecutor::connect
//! [`run`]: PipelineExecutor::run
//! [`run_threaded`]: PipelineExecutor::run_threaded

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use tracing::{debug, info, warn};

use super::core::{Edge, ProcessorId, topo_sort};
use crate::error::ProcessorError;
use crate::processor::{Processor, Status};

/// Sweeps without progress before [`PipelineExecutor::run`] gives up.
const MAX_IDLE_SWEEPS: usize = 2;

/// Idle polls a worker thread yields through before it starts sleeping.
const YIELD_POLLS: u32 = 64;

/// Sleep between polls of a worker thread that stays idle.
const IDLE_SLEEP: Duration = Duration::from_micros(50);

/// Owns the processors of one pipeline and drives them to completion.
#[derive(Default)]
pub struct PipelineExecutor {
    processors: Vec<Box<dyn Processor>>,
    edges: Vec<Edge>,
}

impl PipelineExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a processor and return its id.
    pub fn add_processor<P: Processor + 'static>(&mut self, processor: P) -> ProcessorId {
        self.processors.push(Box::new(processor));
        self.processors.len() - 1
    }

    /// Record that `from` feeds `to`.
    pub fn connect(&mut self, from: ProcessorId, to: ProcessorId) -> Result<(), ProcessorError> {
        let n = self.processors.len();
        if from >= n || to >= n {
            return Err(ProcessorError::config(format!(
                "cannot connect {from} -> {to}, executor has {n} processors"
            )));
        }
        self.edges.push(Edge::new(from, to));
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.processors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.processors.is_empty()
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Processor names in insertion order.
    pub fn names(&self) -> Vec<&'static str> {
        self.processors.iter().map(|p| p.name()).collect()
    }

    /// Topological order of the processors; fails on a cycle.
    pub fn execution_order(&self) -> Result<Vec<ProcessorId>, ProcessorError> {
        let order = topo_sort(self.processors.len(), &self.edges);
        if order.len() != self.processors.len() {
            return Err(ProcessorError::config(format!(
                "processor graph has a cycle: only {} of {} processors can be ordered",
                order.len(),
                self.processors.len()
            )));
        }
        Ok(order)
    }

    /// Drive every processor on the calling thread until all are finished.
    ///
    /// Each sweep prepares every unfinished processor once, in topological
    /// order, and runs `work` for those that are ready. Fails with
    /// [`ProcessorError::Stalled`] when consecutive sweeps neither run any
    /// work nor see a processor finish.
    pub fn run(&mut self) -> Result<()> {
        let order = self.execution_order()?;
        let mut finished = vec![false; self.processors.len()];
        let mut remaining = self.processors.len();
        let mut idle_sweeps = 0;
        let mut sweeps = 0usize;

        info!(processors = remaining, "starting pipeline");

        while remaining > 0 {
            sweeps += 1;
            let mut progressed = false;

            for &id in &order {
                if finished[id] {
                    continue;
                }
                let processor = &mut self.processors[id];
                let status = processor.prepare().with_context(|| {
                    format!("prepare failed in processor {id} ({})", processor.name())
                })?;

                match status {
                    Status::Ready => {
                        processor.work().with_context(|| {
                            format!("work failed in processor {id} ({})", processor.name())
                        })?;
                        progressed = true;
                    }
                    Status::Finished => {
                        debug!(processor = processor.name(), id, "processor finished");
                        finished[id] = true;
                        remaining -= 1;
                        progressed = true;
                    }
                    Status::NeedData | Status::PortFull => {}
                }
            }

            if progressed {
                idle_sweeps = 0;
                continue;
            }

            idle_sweeps += 1;
            if idle_sweeps >= MAX_IDLE_SWEEPS {
                let processors: Vec<String> = order
                    .iter()
                    .filter(|&&id| !finished[id])
                    .map(|&id| format!("{id}:{}", self.processors[id].name()))
                    .collect();
                warn!(?processors, sweeps, "pipeline stalled");
                return Err(ProcessorError::Stalled { processors }.into());
            }
        }

        info!(sweeps, "pipeline finished");
        Ok(())
    }

    /// Drive every processor on its own scoped thread until all are finished.
    ///
    /// A processor that fails stops the others at their next poll. Its
    /// ports are dropped with it, which also finishes or closes them for the
    /// neighbouring processors.
    pub fn run_threaded(self) -> Result<()> {
        self.execution_order()?;
        let failed = AtomicBool::new(false);

        info!(processors = self.processors.len(), "starting threaded pipeline");

        let errors: Vec<anyhow::Error> = std::thread::scope(|scope| {
            let handles: Vec<_> = self
                .processors
                .into_iter()
                .enumerate()
                .map(|(id, processor)| {
                    let failed = &failed;
                    let name = processor.name();
                    let handle = scope.spawn(move || drive(processor, failed));
                    (id, name, handle)
                })
                .collect();

            handles
                .into_iter()
                .filter_map(|(id, name, handle)| match handle.join() {
                    Ok(Ok(())) => None,
                    Ok(Err(err)) => Some(err.context(format!("processor {id} ({name}) failed"))),
                    Err(_) => Some(anyhow!("processor {id} ({name}) panicked")),
                })
                .collect()
        });

        match errors.into_iter().next() {
            Some(err) => {
                warn!("threaded pipeline failed: {err:#}");
                Err(err)
            }
            None => {
                info!("threaded pipeline finished");
                Ok(())
            }
        }
    }
}

/// Run one processor to completion on the current thread.
///
/// Only the first failure is reported. A processor failing after another
/// one did is usually reacting to its neighbour's ports going away.
fn drive(mut processor: Box<dyn Processor>, failed: &AtomicBool) -> Result<()> {
    let result = poll_until_finished(processor.as_mut(), failed);
    // The flag is raised before `processor` and its ports are dropped.
    if result.is_err() && failed.swap(true, Ordering::AcqRel) {
        debug!(processor = processor.name(), "ignoring failure after earlier failure");
        return Ok(());
    }
    result
}

fn poll_until_finished(processor: &mut dyn Processor, failed: &AtomicBool) -> Result<()> {
    let mut idle_polls = 0u32;
    loop {
        if failed.load(Ordering::Acquire) {
            debug!(processor = processor.name(), "stopping after failure elsewhere");
            return Ok(());
        }

        match processor.prepare().context("prepare failed")? {
            Status::Ready => {
                processor.work().context("work failed")?;
                idle_polls = 0;
            }
            Status::Finished => {
                debug!(processor = processor.name(), "processor finished");
                return Ok(());
            }
            Status::NeedData | Status::PortFull => {
                idle_polls = idle_polls.saturating_add(1);
                if idle_polls < YIELD_POLLS {
                    std::thread::yield_now();
                } else {
                    std::thread::sleep(IDLE_SLEEP);
                }
            }
        }
    }
}

impl std::fmt::Debug for PipelineExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PipelineExecutor")
            .field("processors", &self.names())
            .field("edges", &self.edges)
            .finish()
    }
}

#[cfg(test)]
#[path = "tests/executor_tests.rs"]
mod tests;

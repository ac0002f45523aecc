//! rrsim kernel library
//!
//! A round-robin process scheduler running synthetic programs out of one
//! flat, word-addressed main memory.
//!
//! # Layers
//!
//! - [`loader`]: parse a job and place its processes into memory
//! - [`cpu`]: decode and execute instructions for one slice
//! - [`scheduler`]: ready/I-O-wait queues, the clock and the state machine
//! - [`trace`]: observable events and sinks that collect or print them
//!
//! # Example
//!
//! ```
//! use kernel::trace::VecSink;
//!
//! let job: kernel::Job = "30 2 5 1\n1 12 1 3 7 0\n".parse().unwrap();
//! let mut sink = VecSink::new();
//! let report = kernel::simulate(&job, &mut sink).unwrap();
//! assert_eq!(report.processes[0].register_value, 7);
//! ```

pub mod config;
pub mod cpu;
pub mod error;
pub mod loader;
pub mod memory;
pub mod process;
pub mod scheduler;
pub mod trace;

#[cfg(test)]
mod tests;

use log::info;
use serde::{Deserialize, Serialize};

pub use config::SimConfig;
pub use error::KernelError;
pub use loader::Job;

use memory::MainMemory;
use process::{ControlBlockSnapshot, ProcessHandle};
use scheduler::{RunSummary, Scheduler};
use trace::TraceSink;

/// Outcome of a complete simulation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunReport {
    pub config: SimConfig,
    pub summary: RunSummary,
    /// Final control blocks, in load order.
    pub processes: Vec<ControlBlockSnapshot>,
    /// Final contents of main memory.
    pub memory: Vec<i64>,
}

/// A job placed in memory and ready to run.
///
/// [`simulate`] does all of this in one call; the steps are exposed so a
/// caller can inspect memory between placement and execution.
pub struct Simulation {
    config: SimConfig,
    memory: MainMemory,
    handles: Vec<ProcessHandle>,
    scheduler: Scheduler,
}

impl Simulation {
    /// Validate the configuration and place every process.
    pub fn new(job: &Job) -> Result<Self, KernelError> {
        job.config.validate()?;

        let mut memory = MainMemory::new(job.config.memory_size);
        let handles = loader::place(&job.processes, &mut memory)?;

        let mut scheduler = Scheduler::new(job.config.into());
        scheduler.admit(handles.iter().copied());

        Ok(Simulation {
            config: job.config,
            memory,
            handles,
            scheduler,
        })
    }

    pub fn memory(&self) -> &MainMemory {
        &self.memory
    }

    /// Placed processes in load order.
    pub fn handles(&self) -> &[ProcessHandle] {
        &self.handles
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    /// Current control block of every process, in load order.
    pub fn snapshots(&self) -> Vec<ControlBlockSnapshot> {
        self.handles
            .iter()
            .map(|&h| self.memory.control_block(h).snapshot())
            .collect()
    }

    /// Run every process to completion.
    pub fn run(mut self, sink: &mut dyn TraceSink) -> RunReport {
        let summary = self.scheduler.run(&mut self.memory, sink);
        let processes = self.snapshots();
        RunReport {
            config: self.config,
            summary,
            processes,
            memory: self.memory.words().to_vec(),
        }
    }
}

/// Place and run `job`, sending every trace event to `sink`.
pub fn simulate(job: &Job, sink: &mut dyn TraceSink) -> Result<RunReport, KernelError> {
    let sim = Simulation::new(job)?;
    info!(
        "[KERNEL] simulating {} processes in {} words",
        job.processes.len(),
        job.config.memory_size
    );
    Ok(sim.run(sink))
}

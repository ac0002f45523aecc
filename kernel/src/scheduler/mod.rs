//! Kernel scheduler module.
//!
//! Round-robin scheduling of placed processes. The scheduler owns the
//! clock, the ready queue and the I/O-wait queue; main memory is lent to
//! it for each step and the control blocks inside it are the only record
//! of per-process state.
//!
//! ```text
//!   NEW -> READY -> RUNNING -> READY       (slice budget used up)
//!                           -> IOWAIT      (Print)
//!                           -> TERMINATED  (out of instructions)
//!   IOWAIT -> READY                        (idle drain only)
//! ```

pub mod clock;
pub mod round_robin;

use hashbrown::HashMap;
use log::{debug, info, trace};
use serde::{Deserialize, Serialize};

pub use clock::Clock;
pub use round_robin::RoundRobinQueue;

use crate::config::SimConfig;
use crate::cpu::{self, SliceOutcome};
use crate::memory::MainMemory;
use crate::process::{ProcessHandle, ProcessId, ProcessState};
use crate::trace::{TraceEvent, TraceSink};

/// Scheduler parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// Clock cost of every context switch.
    pub context_switch: u64,
    /// CPU budget per slice.
    pub slice_budget: u64,
}

impl From<SimConfig> for SchedulerConfig {
    fn from(config: SimConfig) -> Self {
        SchedulerConfig {
            context_switch: config.context_switch,
            slice_budget: config.slice_budget,
        }
    }
}

/// Scheduler statistics.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchedulerStats {
    /// Every context-switch overhead charged, including idle drains and
    /// the final one.
    pub context_switches: u64,
    /// Slices started, one per move to Running.
    pub dispatches: u64,
    /// Slices that used up their budget.
    pub timeouts: u64,
    /// Slices ended by a Print.
    pub io_interrupts: u64,
    /// Times the CPU sat idle and the I/O-wait queue was drained.
    pub idle_drains: u64,
    /// Processes that ran out of instructions.
    pub terminations: u64,
}

/// What one call to [`Scheduler::step`] did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchedulerStep {
    /// The CPU was idle; these processes moved from I/O wait to ready.
    IdleDrain { completed: Vec<ProcessId> },
    /// A process ran one slice.
    Dispatched {
        pid: ProcessId,
        outcome: SliceOutcome,
    },
    /// Both queues were empty; the run is over.
    Finished { total_elapsed: u64 },
}

/// Result of a complete run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    /// Clock value after the final context switch.
    pub final_clock: u64,
    /// Sum over all processes of (termination time - first dispatch time).
    pub total_elapsed: u64,
    pub stats: SchedulerStats,
}

/// Round-robin scheduler.
pub struct Scheduler {
    config: SchedulerConfig,
    clock: Clock,
    ready: RoundRobinQueue,
    io_wait: RoundRobinQueue,
    /// Clock value at each process's first dispatch.
    first_run: HashMap<ProcessId, u64>,
    total_elapsed: u64,
    stats: SchedulerStats,
    finished: bool,
}

impl Scheduler {
    /// Create a scheduler with empty queues and the clock at zero.
    pub fn new(config: SchedulerConfig) -> Self {
        Scheduler {
            config,
            clock: Clock::new(),
            ready: RoundRobinQueue::new(),
            io_wait: RoundRobinQueue::new(),
            first_run: HashMap::new(),
            total_elapsed: 0,
            stats: SchedulerStats::default(),
            finished: false,
        }
    }

    /// Append placed processes to the ready queue in the given order.
    pub fn admit(&mut self, handles: impl IntoIterator<Item = ProcessHandle>) {
        self.ready.extend(handles);
        self.finished = false;
    }

    /// Advance the state machine by one idle drain, one slice, or the
    /// final context switch.
    pub fn step(&mut self, memory: &mut MainMemory, sink: &mut dyn TraceSink) -> SchedulerStep {
        if self.ready.is_empty() {
            if self.io_wait.is_empty() {
                return self.finish(sink);
            }
            return self.idle_drain(memory, sink);
        }

        let Some(handle) = self.ready.dequeue() else {
            return self.finish(sink);
        };
        self.dispatch(handle, memory, sink)
    }

    /// Run until every process has terminated.
    pub fn run(&mut self, memory: &mut MainMemory, sink: &mut dyn TraceSink) -> RunSummary {
        while !self.is_finished() {
            self.step(memory, sink);
        }
        info!(
            "[SCHED] run complete at {} ({} dispatches, {} context switches)",
            self.clock.now(),
            self.stats.dispatches,
            self.stats.context_switches
        );
        self.summary()
    }

    /// Summary of the run so far.
    pub fn summary(&self) -> RunSummary {
        RunSummary {
            final_clock: self.clock.now(),
            total_elapsed: self.total_elapsed,
            stats: self.stats,
        }
    }

    pub fn clock(&self) -> Clock {
        self.clock
    }

    pub fn ready_len(&self) -> usize {
        self.ready.len()
    }

    pub fn io_wait_len(&self) -> usize {
        self.io_wait.len()
    }

    /// Ready queue contents, front first.
    pub fn ready(&self) -> impl Iterator<Item = ProcessHandle> + '_ {
        self.ready.iter()
    }

    /// Returns `true` once the final context switch has been charged.
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    fn context_switch(&mut self) {
        self.clock.advance(self.config.context_switch);
        self.stats.context_switches += 1;
    }

    fn idle_drain(&mut self, memory: &mut MainMemory, sink: &mut dyn TraceSink) -> SchedulerStep {
        self.context_switch();
        self.stats.idle_drains += 1;

        let mut completed = Vec::with_capacity(self.io_wait.len());
        for handle in self.io_wait.drain() {
            let mut pcb = memory.control_block_mut(handle);
            pcb.set_state(ProcessState::Ready);
            let pid = pcb.view().process_id();
            sink.record(TraceEvent::IoCompleted { pid });
            self.ready.enqueue(handle);
            completed.push(pid);
        }

        debug!(
            "[SCHED] idle at {}: {} processes completed I/O",
            self.clock.now(),
            completed.len()
        );
        SchedulerStep::IdleDrain { completed }
    }

    fn dispatch(
        &mut self,
        handle: ProcessHandle,
        memory: &mut MainMemory,
        sink: &mut dyn TraceSink,
    ) -> SchedulerStep {
        self.context_switch();
        self.stats.dispatches += 1;

        let mut pcb = memory.control_block_mut(handle);
        pcb.set_state(ProcessState::Running);
        let pid = pcb.view().process_id();
        sink.record(TraceEvent::Dispatched { pid });

        let now = self.clock.now();
        let entered_at = *self.first_run.entry(pid).or_insert(now);
        debug!(
            "[SCHED] dispatch pid {} at {} ({} ready, {} waiting)",
            pid,
            now,
            self.ready_len(),
            self.io_wait_len()
        );

        let outcome = cpu::run_slice(
            handle,
            memory,
            &mut self.clock,
            self.config.slice_budget,
            sink,
        );

        let mut pcb = memory.control_block_mut(handle);
        match outcome {
            SliceOutcome::Terminated => {
                pcb.set_state(ProcessState::Terminated);
                let terminated_at = self.clock.now();
                self.total_elapsed += terminated_at.saturating_sub(entered_at);
                self.stats.terminations += 1;
                sink.record(TraceEvent::Terminated {
                    pid,
                    entered_at,
                    terminated_at,
                });
            }
            SliceOutcome::TimedOut => {
                pcb.set_state(ProcessState::Ready);
                self.stats.timeouts += 1;
                sink.record(TraceEvent::TimedOut { pid });
                self.ready.enqueue(handle);
                trace!(
                    "[SCHED] ready queue {:?}",
                    self.ready().map(|h| h.base()).collect::<Vec<_>>()
                );
            }
            SliceOutcome::IoBlocked => {
                pcb.set_state(ProcessState::IoWait);
                self.stats.io_interrupts += 1;
                sink.record(TraceEvent::IoBlocked { pid });
                self.io_wait.enqueue(handle);
            }
        }

        debug!("[SCHED] pid {} {:?} at {}", pid, outcome, self.clock.now());
        SchedulerStep::Dispatched { pid, outcome }
    }

    fn finish(&mut self, sink: &mut dyn TraceSink) -> SchedulerStep {
        if !self.finished {
            self.context_switch();
            self.finished = true;
            sink.record(TraceEvent::AllComplete {
                total_elapsed: self.total_elapsed,
            });
        }
        SchedulerStep::Finished {
            total_elapsed: self.total_elapsed,
        }
    }
}

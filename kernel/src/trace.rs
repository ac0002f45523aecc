//! Execution trace.
//!
//! The scheduler and the executor report what happens through a
//! [`TraceSink`]. Each [`TraceEvent`] renders as one human-readable line;
//! the wording of those lines is stable so traces can be diffed against
//! reference output.

use core::fmt;
use std::io;

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use crate::process::ProcessId;

bitflags! {
    /// Categories of trace events.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct TraceFilter: u8 {
        /// Scheduler state transitions and the run summary.
        const TRANSITIONS = 1 << 0;
        /// One line per successfully executed instruction.
        const INSTRUCTIONS = 1 << 1;
        /// Bad Store/Load addresses and unknown opcodes.
        const FAULTS = 1 << 2;
    }
}

impl TraceFilter {
    /// Parse a comma-separated list such as `transitions,faults`.
    ///
    /// Accepted names are `transitions`, `instructions`, `faults`, `all`
    /// and `none`.
    pub fn parse_list(list: &str) -> Result<Self, String> {
        let mut filter = TraceFilter::empty();
        for name in list.split(',').map(str::trim).filter(|s| !s.is_empty()) {
            filter |= match name.to_ascii_lowercase().as_str() {
                "transitions" => TraceFilter::TRANSITIONS,
                "instructions" => TraceFilter::INSTRUCTIONS,
                "faults" => TraceFilter::FAULTS,
                "all" => TraceFilter::all(),
                "none" => TraceFilter::empty(),
                other => return Err(format!("unknown trace category: {other}")),
            };
        }
        Ok(filter)
    }
}

impl Default for TraceFilter {
    fn default() -> Self {
        TraceFilter::all()
    }
}

/// Something observable that happened during a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum TraceEvent {
    /// Dequeued from the ready queue and given the CPU.
    Dispatched { pid: ProcessId },
    /// Used up its slice and went back to the ready queue.
    TimedOut { pid: ProcessId },
    /// Issued an I/O request and moved to the I/O-wait queue.
    IoBlocked { pid: ProcessId },
    /// I/O drained while the CPU was idle; back in the ready queue.
    IoCompleted { pid: ProcessId },
    /// Ran out of instructions.
    Terminated {
        pid: ProcessId,
        entered_at: u64,
        terminated_at: u64,
    },
    /// Both queues are empty.
    AllComplete { total_elapsed: u64 },
    Computed { pid: ProcessId },
    Printed { pid: ProcessId },
    Stored { pid: ProcessId, address: usize, value: i64 },
    Loaded { pid: ProcessId, address: usize, value: i64 },
    StoreFault { pid: ProcessId, address: i64 },
    LoadFault { pid: ProcessId, address: i64 },
    InvalidOpcode { pid: ProcessId, opcode: i64 },
}

impl TraceEvent {
    /// Category this event belongs to.
    pub fn kind(&self) -> TraceFilter {
        match self {
            TraceEvent::Dispatched { .. }
            | TraceEvent::TimedOut { .. }
            | TraceEvent::IoBlocked { .. }
            | TraceEvent::IoCompleted { .. }
            | TraceEvent::Terminated { .. }
            | TraceEvent::AllComplete { .. } => TraceFilter::TRANSITIONS,
            TraceEvent::Computed { .. }
            | TraceEvent::Printed { .. }
            | TraceEvent::Stored { .. }
            | TraceEvent::Loaded { .. } => TraceFilter::INSTRUCTIONS,
            TraceEvent::StoreFault { .. }
            | TraceEvent::LoadFault { .. }
            | TraceEvent::InvalidOpcode { .. } => TraceFilter::FAULTS,
        }
    }
}

impl fmt::Display for TraceEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TraceEvent::Dispatched { pid } => write!(f, "Process {} has moved to Running.", pid),
            TraceEvent::TimedOut { pid } => write!(
                f,
                "Process {} has a TimeOUT interrupt and is moved to the ReadyQueue.",
                pid
            ),
            TraceEvent::IoBlocked { pid } => write!(
                f,
                "Process {} issued an IOInterrupt and is moved to IOWaitingQueue.",
                pid
            ),
            TraceEvent::IoCompleted { pid } => write!(
                f,
                "Process {} completed I/O and is moved to ReadyQueue",
                pid
            ),
            TraceEvent::Terminated {
                pid,
                entered_at,
                terminated_at,
            } => write!(
                f,
                "Process {} terminated. Entered running at: {}. Terminated at: {}. Total Execution Time: {}",
                pid,
                entered_at,
                terminated_at,
                terminated_at.saturating_sub(*entered_at)
            ),
            TraceEvent::AllComplete { total_elapsed } => write!(
                f,
                "All processes complete. Total CPU time used: {}",
                total_elapsed
            ),
            TraceEvent::Computed { .. } => f.write_str("compute"),
            TraceEvent::Printed { .. } => f.write_str("print"),
            TraceEvent::Stored { .. } => f.write_str("stored"),
            TraceEvent::Loaded { .. } => f.write_str("loaded"),
            TraceEvent::StoreFault { pid, address } => {
                write!(f, "Process {} store error! address {}", pid, address)
            }
            TraceEvent::LoadFault { pid, address } => {
                write!(f, "Process {} load error! address {}", pid, address)
            }
            TraceEvent::InvalidOpcode { pid, opcode } => {
                write!(f, "ERROR: invalid opcode {} in process {}", opcode, pid)
            }
        }
    }
}

/// Receiver of trace events.
pub trait TraceSink {
    fn record(&mut self, event: TraceEvent);
}

impl<S: TraceSink + ?Sized> TraceSink for &mut S {
    fn record(&mut self, event: TraceEvent) {
        (**self).record(event);
    }
}

/// Forward every event to both sinks.
impl<A: TraceSink, B: TraceSink> TraceSink for (A, B) {
    fn record(&mut self, event: TraceEvent) {
        self.0.record(event.clone());
        self.1.record(event);
    }
}

/// An absent sink drops everything.
impl<S: TraceSink> TraceSink for Option<S> {
    fn record(&mut self, event: TraceEvent) {
        if let Some(sink) = self {
            sink.record(event);
        }
    }
}

/// Sink that drops everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl TraceSink for NullSink {
    fn record(&mut self, _event: TraceEvent) {}
}

/// Sink that keeps every event in memory.
#[derive(Debug, Default, Clone)]
pub struct VecSink {
    events: Vec<TraceEvent>,
}

impl VecSink {
    pub fn new() -> Self {
        VecSink::default()
    }

    pub fn events(&self) -> &[TraceEvent] {
        &self.events
    }

    pub fn into_events(self) -> Vec<TraceEvent> {
        self.events
    }

    /// Rendered lines, in order.
    pub fn lines(&self) -> Vec<String> {
        self.events.iter().map(ToString::to_string).collect()
    }
}

impl TraceSink for VecSink {
    fn record(&mut self, event: TraceEvent) {
        self.events.push(event);
    }
}

/// Passes on only the events whose category is in `filter`.
#[derive(Debug, Clone)]
pub struct Filtered<S> {
    inner: S,
    filter: TraceFilter,
}

impl<S: TraceSink> Filtered<S> {
    pub fn new(inner: S, filter: TraceFilter) -> Self {
        Filtered { inner, filter }
    }

    pub fn into_inner(self) -> S {
        self.inner
    }
}

impl<S: TraceSink> TraceSink for Filtered<S> {
    fn record(&mut self, event: TraceEvent) {
        if self.filter.contains(event.kind()) {
            self.inner.record(event);
        }
    }
}

/// Writes one line per event.
///
/// Recording cannot fail, so the first write error is stored and every
/// later event is dropped. [`WriterSink::finish`] surfaces it.
#[derive(Debug)]
pub struct WriterSink<W: io::Write> {
    writer: W,
    error: Option<io::Error>,
}

impl<W: io::Write> WriterSink<W> {
    pub fn new(writer: W) -> Self {
        WriterSink {
            writer,
            error: None,
        }
    }

    /// Flush and return the writer, or the first error seen.
    pub fn finish(mut self) -> io::Result<W> {
        if let Some(err) = self.error.take() {
            return Err(err);
        }
        self.writer.flush()?;
        Ok(self.writer)
    }
}

impl<W: io::Write> TraceSink for WriterSink<W> {
    fn record(&mut self, event: TraceEvent) {
        if self.error.is_some() {
            return;
        }
        if let Err(err) = writeln!(self.writer, "{}", event) {
            self.error = Some(err);
        }
    }
}

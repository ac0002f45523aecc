//! Memory-resident control blocks.
//!
//! Every placed process starts with a [`PCB_SIZE`]-word window in main
//! memory. The views here wrap that window so callers work with named
//! fields instead of offsets from a base address.

use serde::{Deserialize, Serialize};

use super::ProcessId;
use crate::config::{pcb, PCB_SIZE};

/// Opaque handle to a placed process: the base address of its region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProcessHandle(usize);

impl ProcessHandle {
    pub(crate) fn from_base(base: usize) -> Self {
        ProcessHandle(base)
    }

    /// Base address of the process region (first control-block word).
    pub fn base(&self) -> usize {
        self.0
    }
}

/// Process state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProcessState {
    /// Described but not yet placed
    New = 0,
    /// Waiting in the ready queue
    Ready = 1,
    /// Currently executing a slice
    Running = 2,
    /// Waiting for I/O to complete
    IoWait = 3,
    /// Instruction stream exhausted
    Terminated = 4,
}

impl ProcessState {
    /// The word stored in the control block.
    pub fn as_word(self) -> i64 {
        self as i64
    }

    /// Decode a control-block state word.
    pub fn from_word(word: i64) -> Option<Self> {
        match word {
            0 => Some(ProcessState::New),
            1 => Some(ProcessState::Ready),
            2 => Some(ProcessState::Running),
            3 => Some(ProcessState::IoWait),
            4 => Some(ProcessState::Terminated),
            _ => None,
        }
    }
}

pub(crate) fn word_to_addr(word: i64) -> usize {
    word.max(0) as usize
}

/// Read-only view of a control block.
#[derive(Debug, Clone, Copy)]
pub struct ControlBlock<'a> {
    words: &'a [i64],
}

impl<'a> ControlBlock<'a> {
    pub(crate) fn new(words: &'a [i64]) -> Self {
        debug_assert_eq!(words.len(), PCB_SIZE);
        ControlBlock { words }
    }

    pub fn process_id(&self) -> ProcessId {
        ProcessId::from_word(self.words[pcb::PROCESS_ID])
    }

    /// Current state. Control blocks are outside every process's Store
    /// range, so the word is always one the kernel wrote.
    pub fn state(&self) -> ProcessState {
        ProcessState::from_word(self.words[pcb::STATE]).unwrap_or(ProcessState::New)
    }

    pub fn program_counter(&self) -> usize {
        word_to_addr(self.words[pcb::PROGRAM_COUNTER])
    }

    pub fn instruction_base(&self) -> usize {
        word_to_addr(self.words[pcb::INSTRUCTION_BASE])
    }

    pub fn data_base(&self) -> usize {
        word_to_addr(self.words[pcb::DATA_BASE])
    }

    pub fn memory_limit(&self) -> usize {
        word_to_addr(self.words[pcb::MEMORY_LIMIT])
    }

    pub fn cpu_cycles_used(&self) -> u64 {
        self.words[pcb::CPU_CYCLES_USED].max(0) as u64
    }

    pub fn register_value(&self) -> i64 {
        self.words[pcb::REGISTER_VALUE]
    }

    pub fn max_memory_needed(&self) -> usize {
        word_to_addr(self.words[pcb::MAX_MEMORY_NEEDED])
    }

    pub fn main_memory_base(&self) -> usize {
        word_to_addr(self.words[pcb::MAIN_MEMORY_BASE])
    }

    /// Length of the instruction segment.
    pub fn instruction_count(&self) -> usize {
        self.data_base().saturating_sub(self.instruction_base())
    }

    /// Returns `true` if `addr` is inside the range Store and Load may touch.
    pub fn in_bounds(&self, addr: i64) -> bool {
        let lo = self.instruction_base() as i64;
        let hi = lo + self.max_memory_needed() as i64;
        addr >= lo && addr < hi
    }

    /// Copy every field out of memory.
    pub fn snapshot(&self) -> ControlBlockSnapshot {
        ControlBlockSnapshot {
            process_id: self.process_id(),
            state: self.state(),
            program_counter: self.program_counter(),
            instruction_base: self.instruction_base(),
            data_base: self.data_base(),
            memory_limit: self.memory_limit(),
            cpu_cycles_used: self.cpu_cycles_used(),
            register_value: self.register_value(),
            max_memory_needed: self.max_memory_needed(),
            main_memory_base: self.main_memory_base(),
        }
    }
}

/// Mutable view of a control block.
#[derive(Debug)]
pub struct ControlBlockMut<'a> {
    words: &'a mut [i64],
}

impl<'a> ControlBlockMut<'a> {
    pub(crate) fn new(words: &'a mut [i64]) -> Self {
        debug_assert_eq!(words.len(), PCB_SIZE);
        ControlBlockMut { words }
    }

    /// Read-only view of the same block.
    pub fn view(&self) -> ControlBlock<'_> {
        ControlBlock::new(&*self.words)
    }

    /// Write a freshly placed process's control block.
    pub(crate) fn initialize(
        &mut self,
        pid: ProcessId,
        base: usize,
        instruction_count: usize,
        max_memory_needed: usize,
    ) {
        let instruction_base = base + PCB_SIZE;
        let data_base = instruction_base + instruction_count;

        self.words[pcb::PROCESS_ID] = pid.as_word();
        self.words[pcb::STATE] = ProcessState::Ready.as_word();
        self.words[pcb::PROGRAM_COUNTER] = 0;
        self.words[pcb::INSTRUCTION_BASE] = instruction_base as i64;
        self.words[pcb::DATA_BASE] = data_base as i64;
        self.words[pcb::MEMORY_LIMIT] = max_memory_needed as i64;
        self.words[pcb::CPU_CYCLES_USED] = 0;
        self.words[pcb::REGISTER_VALUE] = 0;
        self.words[pcb::MAX_MEMORY_NEEDED] = max_memory_needed as i64;
        self.words[pcb::MAIN_MEMORY_BASE] = base as i64;
    }

    pub fn set_state(&mut self, state: ProcessState) {
        self.words[pcb::STATE] = state.as_word();
    }

    pub fn set_program_counter(&mut self, pc: usize) {
        self.words[pcb::PROGRAM_COUNTER] = pc as i64;
    }

    pub fn set_cpu_cycles_used(&mut self, cycles: u64) {
        self.words[pcb::CPU_CYCLES_USED] = cycles as i64;
    }

    pub fn set_register_value(&mut self, value: i64) {
        self.words[pcb::REGISTER_VALUE] = value;
    }
}

/// Owned copy of a control block, for reports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControlBlockSnapshot {
    pub process_id: ProcessId,
    pub state: ProcessState,
    pub program_counter: usize,
    pub instruction_base: usize,
    pub data_base: usize,
    pub memory_limit: usize,
    pub cpu_cycles_used: u64,
    pub register_value: i64,
    pub max_memory_needed: usize,
    pub main_memory_base: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SENTINEL;

    #[test]
    fn state_words_round_trip() {
        for state in [
            ProcessState::New,
            ProcessState::Ready,
            ProcessState::Running,
            ProcessState::IoWait,
            ProcessState::Terminated,
        ] {
            assert_eq!(ProcessState::from_word(state.as_word()), Some(state));
        }
        assert_eq!(ProcessState::from_word(5), None);
        assert_eq!(ProcessState::from_word(SENTINEL), None);
    }

    #[test]
    fn initialize_fills_every_field() {
        let mut words = [SENTINEL; PCB_SIZE];
        let mut block = ControlBlockMut::new(&mut words);
        block.initialize(ProcessId(7), 40, 3, 12);

        let view = block.view();
        assert_eq!(view.process_id(), ProcessId(7));
        assert_eq!(view.state(), ProcessState::Ready);
        assert_eq!(view.program_counter(), 0);
        assert_eq!(view.instruction_base(), 50);
        assert_eq!(view.data_base(), 53);
        assert_eq!(view.instruction_count(), 3);
        assert_eq!(view.memory_limit(), 12);
        assert_eq!(view.max_memory_needed(), 12);
        assert_eq!(view.main_memory_base(), 40);
        assert!(words.iter().all(|&w| w != SENTINEL));
    }

    #[test]
    fn bounds_cover_instruction_base_to_reservation_end() {
        let mut words = [SENTINEL; PCB_SIZE];
        let mut block = ControlBlockMut::new(&mut words);
        block.initialize(ProcessId(1), 0, 1, 12);
        let view = block.view();
        assert!(view.in_bounds(10));
        assert!(view.in_bounds(21));
        assert!(!view.in_bounds(22));
        assert!(!view.in_bounds(9));
        assert!(!view.in_bounds(-1));
    }
}

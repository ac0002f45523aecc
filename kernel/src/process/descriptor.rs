//! Process Descriptors
//!
//! The loader-side view of a process: what it is called, how much memory
//! it reserves and which instructions it runs. Descriptors are consumed by
//! [`crate::loader::place`], after which main memory is the only record of
//! the process.

use core::fmt;

use serde::{Deserialize, Serialize};

use crate::cpu::Opcode;

/// Process ID type
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProcessId(pub u64);

impl ProcessId {
    /// Get the raw ID value
    pub fn as_u64(&self) -> u64 {
        self.0
    }

    /// The word stored in a control block for this id.
    pub fn as_word(&self) -> i64 {
        self.0 as i64
    }

    /// Interpret a memory word as a process id.
    pub fn from_word(word: i64) -> Self {
        ProcessId(word.max(0) as u64)
    }
}

impl fmt::Display for ProcessId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One instruction of a synthetic program.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "lowercase")]
pub enum Instruction {
    /// Burn `cycles` of CPU time. `iterations` is carried but not executed.
    Compute { iterations: i64, cycles: i64 },
    /// Issue an I/O request costing `cycles`; ends the current slice.
    Print { cycles: i64 },
    /// Write `value` at `address`, relative to the instruction segment.
    Store { value: i64, address: i64 },
    /// Read the word at `address`, relative to the instruction segment.
    Load { address: i64 },
}

impl Instruction {
    /// The opcode this instruction is encoded with.
    pub fn opcode(&self) -> Opcode {
        match self {
            Instruction::Compute { .. } => Opcode::Compute,
            Instruction::Print { .. } => Opcode::Print,
            Instruction::Store { .. } => Opcode::Store,
            Instruction::Load { .. } => Opcode::Load,
        }
    }

    /// Operand words in the order they are laid out in the operand segment.
    pub fn operands(&self) -> impl Iterator<Item = i64> {
        let words = match *self {
            Instruction::Compute { iterations, cycles } => [iterations, cycles],
            Instruction::Print { cycles } => [cycles, 0],
            Instruction::Store { value, address } => [value, address],
            Instruction::Load { address } => [address, 0],
        };
        words.into_iter().take(self.opcode().operand_width())
    }
}

/// A process as produced by the job loader.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessDescriptor {
    pub process_id: ProcessId,
    /// Words reserved for code and operands (the control block comes on top).
    pub max_memory_needed: usize,
    pub instructions: Vec<Instruction>,
}

impl ProcessDescriptor {
    /// Create a new descriptor.
    pub fn new(process_id: u64, max_memory_needed: usize, instructions: Vec<Instruction>) -> Self {
        ProcessDescriptor {
            process_id: ProcessId(process_id),
            max_memory_needed,
            instructions,
        }
    }

    /// Number of operand words all instructions need.
    pub fn operand_words(&self) -> usize {
        self.instructions
            .iter()
            .map(|inst| inst.opcode().operand_width())
            .sum()
    }

    /// Words the instruction and operand segments occupy once placed.
    pub fn image_size(&self) -> usize {
        self.instructions.len() + self.operand_words()
    }
}

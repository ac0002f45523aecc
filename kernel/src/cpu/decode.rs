//! Instruction decoding.
//!
//! The only place memory words are turned into [`Instruction`]s.

use serde::{Deserialize, Serialize};

use crate::memory::MainMemory;
use crate::process::Instruction;

/// Instruction opcodes as stored in the instruction segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Opcode {
    Compute = 1,
    Print = 2,
    Store = 3,
    Load = 4,
}

impl Opcode {
    /// Decode an opcode word.
    pub fn from_word(word: i64) -> Option<Self> {
        match word {
            1 => Some(Opcode::Compute),
            2 => Some(Opcode::Print),
            3 => Some(Opcode::Store),
            4 => Some(Opcode::Load),
            _ => None,
        }
    }

    /// The word written to the instruction segment.
    pub fn as_word(self) -> i64 {
        self as i64
    }

    /// Operand words this opcode consumes from the operand segment.
    pub fn operand_width(self) -> usize {
        match self {
            Opcode::Compute | Opcode::Store => 2,
            Opcode::Print | Opcode::Load => 1,
        }
    }
}

/// Decoding failure.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeError {
    #[error("invalid opcode {0}")]
    InvalidOpcode(i64),
}

/// Decode the instruction whose opcode is at `opcode_addr` and whose
/// operands start at `operand_addr`.
pub fn decode(
    memory: &MainMemory,
    opcode_addr: usize,
    operand_addr: usize,
) -> Result<Instruction, DecodeError> {
    let word = memory.read(opcode_addr);
    let opcode = Opcode::from_word(word).ok_or(DecodeError::InvalidOpcode(word))?;
    let a = memory.read(operand_addr);
    let b = memory.read(operand_addr + 1);

    Ok(match opcode {
        Opcode::Compute => Instruction::Compute {
            iterations: a,
            cycles: b,
        },
        Opcode::Print => Instruction::Print { cycles: a },
        Opcode::Store => Instruction::Store {
            value: a,
            address: b,
        },
        Opcode::Load => Instruction::Load { address: a },
    })
}

/// Offset into the operand segment of instruction `index`.
///
/// Operand positions are never stored; they follow from the widths of the
/// opcodes before `index` as they currently sit in memory. Unknown opcodes
/// contribute nothing.
pub fn operand_offset(memory: &MainMemory, instruction_base: usize, index: usize) -> usize {
    (0..index)
        .filter_map(|i| Opcode::from_word(memory.read(instruction_base + i)))
        .map(Opcode::operand_width)
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn memory_with(words: &[i64]) -> MainMemory {
        let mut mem = MainMemory::new(words.len());
        for (addr, &w) in words.iter().enumerate() {
            mem.write(addr, w);
        }
        mem
    }

    #[test]
    fn decodes_each_opcode() {
        // opcodes at 0..4, operands at 4..
        let mem = memory_with(&[1, 2, 3, 4, 10, 20, 30, 40, 50, 60]);
        assert_eq!(
            decode(&mem, 0, 4),
            Ok(Instruction::Compute {
                iterations: 10,
                cycles: 20
            })
        );
        assert_eq!(decode(&mem, 1, 6), Ok(Instruction::Print { cycles: 30 }));
        assert_eq!(
            decode(&mem, 2, 7),
            Ok(Instruction::Store {
                value: 40,
                address: 50
            })
        );
        assert_eq!(decode(&mem, 3, 9), Ok(Instruction::Load { address: 60 }));
    }

    #[test]
    fn unknown_opcode_is_reported() {
        let mem = memory_with(&[9, 0]);
        assert_eq!(decode(&mem, 0, 1), Err(DecodeError::InvalidOpcode(9)));
    }

    #[test]
    fn operand_offset_sums_widths() {
        let mem = memory_with(&[1, 2, 9, 3, 4]);
        assert_eq!(operand_offset(&mem, 0, 0), 0);
        assert_eq!(operand_offset(&mem, 0, 1), 2);
        assert_eq!(operand_offset(&mem, 0, 2), 3);
        // unknown opcode at index 2 consumes nothing
        assert_eq!(operand_offset(&mem, 0, 3), 3);
        assert_eq!(operand_offset(&mem, 0, 5), 6);
    }
}

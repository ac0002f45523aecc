//! Main memory.
//!
//! A single flat array of words shared by every process. Control blocks,
//! instruction segments and operand segments all live here; nothing about
//! a placed process is kept anywhere else.
//!
//! Cells start out holding [`SENTINEL`]. Reads past the end of the array
//! also yield the sentinel and writes past the end are dropped, so a
//! corrupted operand offset can never panic the simulator.

use core::fmt;
use core::ops::Range;

use serde::{Deserialize, Serialize};

use crate::config::{PCB_SIZE, SENTINEL};
use crate::process::{ControlBlock, ControlBlockMut, ProcessHandle};

/// Flat simulated main memory. Serializes as a plain array of words.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MainMemory {
    words: Vec<i64>,
}

impl MainMemory {
    /// Allocate `size` words, all set to the sentinel.
    pub fn new(size: usize) -> Self {
        MainMemory {
            words: vec![SENTINEL; size],
        }
    }

    /// Size in words.
    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Read a word. Out-of-range addresses read as the sentinel.
    pub fn read(&self, addr: usize) -> i64 {
        self.words.get(addr).copied().unwrap_or(SENTINEL)
    }

    /// Write a word. Returns `false` if `addr` is outside memory.
    pub fn write(&mut self, addr: usize, value: i64) -> bool {
        if let Some(word) = self.words.get_mut(addr) {
            *word = value;
            true
        } else {
            false
        }
    }

    /// All words, in address order.
    pub fn words(&self) -> &[i64] {
        &self.words
    }

    /// Control block of a placed process.
    pub fn control_block(&self, handle: ProcessHandle) -> ControlBlock<'_> {
        let base = handle.base();
        ControlBlock::new(&self.words[base..base + PCB_SIZE])
    }

    /// Mutable control block of a placed process.
    pub fn control_block_mut(&mut self, handle: ProcessHandle) -> ControlBlockMut<'_> {
        let base = handle.base();
        ControlBlockMut::new(&mut self.words[base..base + PCB_SIZE])
    }

    /// Whole reserved region of a placed process: control block plus
    /// `max_memory_needed` words.
    pub fn region(&self, handle: ProcessHandle) -> Range<usize> {
        let base = handle.base();
        base..base + PCB_SIZE + self.control_block(handle).max_memory_needed()
    }

    /// `(address, word)` pairs for every cell.
    pub fn dump(&self) -> impl Iterator<Item = (usize, i64)> + '_ {
        self.words.iter().copied().enumerate()
    }
}

impl fmt::Display for MainMemory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (addr, word) in self.dump() {
            writeln!(f, "{} : {}", addr, word)?;
        }
        Ok(())
    }
}

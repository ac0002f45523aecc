//! Process Management
//!
//! Process descriptors as handed over by the job loader, and the typed
//! control-block views used once a process lives in main memory.

pub mod control_block;
pub mod descriptor;

pub use control_block::{
    ControlBlock, ControlBlockMut, ControlBlockSnapshot, ProcessHandle, ProcessState,
};
pub use descriptor::{Instruction, ProcessDescriptor, ProcessId};

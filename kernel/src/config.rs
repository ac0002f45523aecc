//! Kernel configuration.
//!
//! Layout constants for the memory-resident control block and the run
//! scalars every simulation needs (memory size, context-switch overhead
//! and the per-slice CPU budget).

use serde::{Deserialize, Serialize};

use crate::error::KernelError;

/// Number of words occupied by a control block at the start of every
/// process region.
pub const PCB_SIZE: usize = 10;

/// Value main memory is filled with before anything is placed.
pub const SENTINEL: i64 = -1;

/// Default context-switch overhead in cycles.
pub const DEFAULT_CONTEXT_SWITCH: u64 = 2;

/// Default CPU budget per slice in cycles.
pub const DEFAULT_SLICE_BUDGET: u64 = 5;

/// Cycles charged by a Store or Load.
pub const MEMORY_OP_CYCLES: u64 = 1;

/// Control block field offsets, relative to a process's base address.
pub mod pcb {
    pub const PROCESS_ID: usize = 0;
    pub const STATE: usize = 1;
    pub const PROGRAM_COUNTER: usize = 2;
    pub const INSTRUCTION_BASE: usize = 3;
    pub const DATA_BASE: usize = 4;
    pub const MEMORY_LIMIT: usize = 5;
    pub const CPU_CYCLES_USED: usize = 6;
    pub const REGISTER_VALUE: usize = 7;
    pub const MAX_MEMORY_NEEDED: usize = 8;
    pub const MAIN_MEMORY_BASE: usize = 9;
}

/// Scalars that parameterize one simulation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Size of main memory in words.
    pub memory_size: usize,
    /// Clock cost of every context switch.
    pub context_switch: u64,
    /// Cycles a process may use before it is preempted.
    pub slice_budget: u64,
}

impl Default for SimConfig {
    fn default() -> Self {
        SimConfig {
            memory_size: 0,
            context_switch: DEFAULT_CONTEXT_SWITCH,
            slice_budget: DEFAULT_SLICE_BUDGET,
        }
    }
}

impl SimConfig {
    /// Create a config from explicit values.
    pub fn new(memory_size: usize, context_switch: u64, slice_budget: u64) -> Self {
        SimConfig {
            memory_size,
            context_switch,
            slice_budget,
        }
    }

    /// Reject configurations the scheduler cannot run.
    ///
    /// A zero slice budget would never let a process execute anything.
    pub fn validate(&self) -> Result<(), KernelError> {
        if self.slice_budget == 0 {
            return Err(KernelError::InvalidConfig(
                "slice budget must be at least one cycle".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_classic_values() {
        let config = SimConfig::default();
        assert_eq!(config.context_switch, 2);
        assert_eq!(config.slice_budget, 5);
        assert_eq!(config.memory_size, 0);
    }

    #[test]
    fn zero_budget_is_rejected() {
        let config = SimConfig::new(100, 2, 0);
        assert!(matches!(config.validate(), Err(KernelError::InvalidConfig(_))));
        assert!(SimConfig::new(100, 0, 1).validate().is_ok());
    }
}

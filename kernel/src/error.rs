//! Kernel Error Types
//!
//! Errors that abort a simulation before or during setup. Faults raised by
//! running processes (bad Store/Load addresses, unknown opcodes) are not
//! errors: they are reported as trace events and execution continues.

use crate::process::ProcessId;

/// Kernel setup error.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum KernelError {
    /// The reserved regions of all processes do not fit in main memory.
    #[error("out of memory: {required} words required, {available} available")]
    OutOfMemory { required: usize, available: usize },

    /// A process's code and operands do not fit in its own reservation.
    /// Writing them anyway would spill into the next process's region, so
    /// the loader refuses the job instead.
    #[error(
        "process {pid} needs {required} words for code and operands but reserves {reserved}; \
         refusing to overwrite the next region"
    )]
    ImageTooLarge {
        pid: ProcessId,
        required: usize,
        reserved: usize,
    },

    /// Two descriptors share a process id.
    #[error("duplicate process id {0}")]
    DuplicateProcessId(ProcessId),

    /// Process ids must be positive.
    #[error("invalid process id {0}")]
    InvalidProcessId(i64),

    /// The run scalars are unusable.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// The job description could not be parsed.
    #[error("parse error at line {line}: {message}")]
    Parse { line: usize, message: String },
}

impl KernelError {
    /// Returns `true` for errors caused by the job not fitting in memory,
    /// as opposed to malformed input.
    pub fn is_capacity_error(&self) -> bool {
        matches!(
            self,
            KernelError::OutOfMemory { .. } | KernelError::ImageTooLarge { .. }
        )
    }
}

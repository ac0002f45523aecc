use std::path::PathBuf;
use std::process::ExitCode;

use kernel::KernelError;

/// All errors produced by rrsim.
///
/// Variants are split into two categories:
/// - **Infrastructure errors** (exit code 2): unreadable files, malformed
///   jobs or config, trace output failures
/// - **Simulation errors** (exit code 1): a well-formed job that cannot be
///   placed in memory
#[derive(thiserror::Error, Debug)]
pub enum RrsimError {
    // ── Infrastructure errors (exit code 2) ──────────────────────────

    #[error("cannot read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("cannot write trace file {path}: {source}")]
    TraceFile {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("config parse error: {0}")]
    ConfigParse(String),

    #[error("invalid trace filter: {0}")]
    TraceFilter(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // ── Kernel errors (exit code depends on the kind) ───────────────

    #[error(transparent)]
    Kernel(#[from] KernelError),
}

impl RrsimError {
    /// Numeric exit status.
    ///
    /// - `2`: infrastructure error (I/O, parse, config)
    /// - `1`: simulation error (capacity, layout)
    pub fn exit_status(&self) -> u8 {
        match self {
            Self::Kernel(
                KernelError::OutOfMemory { .. }
                | KernelError::ImageTooLarge { .. }
                | KernelError::DuplicateProcessId(_),
            ) => 1,
            Self::Kernel(
                KernelError::Parse { .. }
                | KernelError::InvalidConfig(_)
                | KernelError::InvalidProcessId(_),
            ) => 2,
            Self::Read { .. }
            | Self::TraceFile { .. }
            | Self::ConfigParse(_)
            | Self::TraceFilter(_)
            | Self::Io(_)
            | Self::Json(_) => 2,
        }
    }

    /// Map each error variant to its process exit code.
    pub fn exit_code(&self) -> ExitCode {
        ExitCode::from(self.exit_status())
    }
}

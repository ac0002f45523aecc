//! `rrsim check`: parse and place a job without running it.

use std::fmt;
use std::path::PathBuf;

use kernel::process::ProcessId;
use kernel::{SimConfig, Simulation};
use serde::Serialize;

use crate::cli::CheckArgs;
use crate::config;
use crate::error::RrsimError;
use crate::run::read_job;

/// Where one process landed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Placement {
    pub process_id: ProcessId,
    pub base: usize,
    pub instruction_base: usize,
    pub data_base: usize,
    /// One past the last reserved word.
    pub end: usize,
    pub instructions: usize,
}

/// Layout of a placed job.
#[derive(Debug, Serialize)]
pub struct CheckOutput {
    pub job: PathBuf,
    pub config: SimConfig,
    pub reserved_words: usize,
    pub processes: Vec<Placement>,
}

/// Execute the `check` subcommand.
pub fn check(args: &CheckArgs) -> Result<CheckOutput, RrsimError> {
    let mut job = read_job(&args.job)?;
    job.config = config::resolve(job.config, &args.sim)?;

    let sim = Simulation::new(&job)?;
    let memory = sim.memory();
    let processes: Vec<_> = sim
        .handles()
        .iter()
        .map(|&h| {
            let pcb = memory.control_block(h);
            Placement {
                process_id: pcb.process_id(),
                base: h.base(),
                instruction_base: pcb.instruction_base(),
                data_base: pcb.data_base(),
                end: memory.region(h).end,
                instructions: pcb.instruction_count(),
            }
        })
        .collect();

    Ok(CheckOutput {
        job: args.job.clone(),
        config: job.config,
        reserved_words: processes.last().map_or(0, |p| p.end),
        processes,
    })
}

impl fmt::Display for CheckOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{}: {} processes, {} of {} words reserved",
            self.job.display(),
            self.processes.len(),
            self.reserved_words,
            self.config.memory_size
        )?;
        writeln!(
            f,
            "{:>6} {:>6} {:>6} {:>6} {:>6} {:>6}",
            "PID", "BASE", "CODE", "DATA", "END", "INSTR"
        )?;
        for p in &self.processes {
            writeln!(
                f,
                "{:>6} {:>6} {:>6} {:>6} {:>6} {:>6}",
                p.process_id, p.base, p.instruction_base, p.data_base, p.end, p.instructions
            )?;
        }
        Ok(())
    }
}

//! `rrsim run`: place a job and run it to completion.

use std::fmt;
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use kernel::memory::MainMemory;
use kernel::process::ControlBlockSnapshot;
use kernel::trace::{Filtered, TraceEvent, TraceFilter, VecSink, WriterSink};
use kernel::{Job, RunReport, SimConfig, Simulation};
use log::info;
use serde::Serialize;

use crate::cli::RunArgs;
use crate::config;
use crate::error::RrsimError;

/// Everything `run` reports.
#[derive(Debug, Serialize)]
pub struct RunOutput {
    pub job: PathBuf,
    pub config: SimConfig,
    /// Memory as placed, before the first dispatch (`--dump-memory`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub placed_memory: Option<MainMemory>,
    pub trace: Vec<TraceEvent>,
    pub report: RunReport,
}

/// Read and parse a job file.
pub fn read_job(path: &Path) -> Result<Job, RrsimError> {
    let text = std::fs::read_to_string(path).map_err(|source| RrsimError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(text.parse::<Job>()?)
}

/// Execute the `run` subcommand.
pub fn run(args: &RunArgs) -> Result<RunOutput, RrsimError> {
    let filter = TraceFilter::parse_list(&args.trace).map_err(RrsimError::TraceFilter)?;

    let mut job = read_job(&args.job)?;
    job.config = config::resolve(job.config, &args.sim)?;
    info!(
        "loaded {} processes from {} ({:?})",
        job.processes.len(),
        args.job.display(),
        job.config
    );

    let trace_file = match &args.trace_file {
        Some(path) => {
            let file = File::create(path).map_err(|source| RrsimError::TraceFile {
                path: path.clone(),
                source,
            })?;
            Some(WriterSink::new(BufWriter::new(file)))
        }
        None => None,
    };

    let sim = Simulation::new(&job)?;
    let placed_memory = args.dump_memory.then(|| sim.memory().clone());

    let mut sink = Filtered::new((VecSink::new(), trace_file), filter);
    let report = sim.run(&mut sink);
    let (collected, trace_file) = sink.into_inner();

    if let (Some(sink), Some(path)) = (trace_file, &args.trace_file) {
        sink.finish().map_err(|source| RrsimError::TraceFile {
            path: path.clone(),
            source,
        })?;
    }

    Ok(RunOutput {
        job: args.job.clone(),
        config: job.config,
        placed_memory,
        trace: collected.into_events(),
        report,
    })
}

fn write_control_block(f: &mut fmt::Formatter<'_>, pcb: &ControlBlockSnapshot) -> fmt::Result {
    writeln!(f, "Process ID: {}", pcb.process_id)?;
    writeln!(f, "State: {:?}", pcb.state)?;
    writeln!(f, "Program Counter: {}", pcb.program_counter)?;
    writeln!(f, "Instruction Base: {}", pcb.instruction_base)?;
    writeln!(f, "Data Base: {}", pcb.data_base)?;
    writeln!(f, "Memory Limit: {}", pcb.memory_limit)?;
    writeln!(f, "CPU Cycles Used: {}", pcb.cpu_cycles_used)?;
    writeln!(f, "Register Value: {}", pcb.register_value)?;
    writeln!(f, "Max Memory Needed: {}", pcb.max_memory_needed)?;
    writeln!(f, "Main Memory Base: {}", pcb.main_memory_base)
}

impl fmt::Display for RunOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(memory) = &self.placed_memory {
            writeln!(f, "{}", memory)?;
        }

        for event in &self.trace {
            writeln!(f, "{}", event)?;
        }

        let summary = &self.report.summary;
        let stats = &summary.stats;
        writeln!(f)?;
        writeln!(f, "Final clock: {}", summary.final_clock)?;
        writeln!(
            f,
            "Context switches: {}  Dispatches: {}  Timeouts: {}  IO interrupts: {}  Idle drains: {}",
            stats.context_switches,
            stats.dispatches,
            stats.timeouts,
            stats.io_interrupts,
            stats.idle_drains
        )?;
        for pcb in &self.report.processes {
            writeln!(f)?;
            write_control_block(f, pcb)?;
        }
        Ok(())
    }
}

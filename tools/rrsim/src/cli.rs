use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::output::OutputFormat;

/// Round-robin scheduler simulator.
#[derive(Parser, Debug)]
#[command(name = "rrsim", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Output format for all subcommands.
    #[arg(long, value_enum, default_value = "human", global = true)]
    pub output: OutputFormat,

    /// More log output on stderr (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Only log errors.
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Load a job and run every process to completion.
    Run(RunArgs),

    /// Parse and place a job without running it.
    Check(CheckArgs),
}

// ── Shared argument structs ──────────────────────────────────────────

/// Run scalars that override the job header.
#[derive(clap::Args, Debug, Default, Clone)]
pub struct SimArgs {
    /// TOML file with a `[sim]` table of overrides.
    #[arg(long, value_name = "TOML")]
    pub config: Option<PathBuf>,

    /// Main memory size in words.
    #[arg(long, value_name = "N")]
    pub memory_size: Option<usize>,

    /// Cycles charged per context switch.
    #[arg(long, value_name = "N")]
    pub context_switch: Option<u64>,

    /// CPU cycles a process may use per slice.
    #[arg(long, value_name = "N")]
    pub slice_budget: Option<u64>,
}

// ── run ──────────────────────────────────────────────────────────────

#[derive(clap::Args, Debug)]
pub struct RunArgs {
    /// Path to the job file.
    pub job: PathBuf,

    #[command(flatten)]
    pub sim: SimArgs,

    /// Also write trace lines to this file.
    #[arg(long, value_name = "PATH")]
    pub trace_file: Option<PathBuf>,

    /// Trace categories: transitions, instructions, faults, all, none.
    #[arg(long, value_name = "LIST", default_value = "all")]
    pub trace: String,

    /// Include the memory image as placed, before the first dispatch.
    #[arg(long)]
    pub dump_memory: bool,
}

// ── check ────────────────────────────────────────────────────────────

#[derive(clap::Args, Debug)]
pub struct CheckArgs {
    /// Path to the job file.
    pub job: PathBuf,

    #[command(flatten)]
    pub sim: SimArgs,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn run_flags_parse() {
        let cli = Cli::parse_from([
            "rrsim",
            "run",
            "job.txt",
            "--slice-budget",
            "3",
            "--trace",
            "transitions",
            "--dump-memory",
            "--output",
            "json",
            "-vv",
        ]);
        assert_eq!(cli.output, OutputFormat::Json);
        assert_eq!(cli.verbose, 2);
        match cli.command {
            Command::Run(args) => {
                assert_eq!(args.job, PathBuf::from("job.txt"));
                assert_eq!(args.sim.slice_budget, Some(3));
                assert_eq!(args.sim.context_switch, None);
                assert_eq!(args.trace, "transitions");
                assert!(args.dump_memory);
            }
            other => panic!("expected run, got {other:?}"),
        }
    }

    #[test]
    fn check_defaults() {
        let cli = Cli::parse_from(["rrsim", "check", "job.txt"]);
        assert_eq!(cli.output, OutputFormat::Human);
        assert!(!cli.quiet);
        assert!(matches!(cli.command, Command::Check(_)));
    }
}

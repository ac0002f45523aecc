//! Property: run options.
//!
//! Config layering, trace filtering, trace files and memory dumps as seen
//! through the library entry points.

use std::io::Write;
use std::path::PathBuf;

use kernel::trace::TraceEvent;
use proptest::prelude::*;
use rrsim::check::check;
use rrsim::cli::{CheckArgs, RunArgs, SimArgs};
use rrsim::run::run;
use tempfile::{tempdir, NamedTempFile};

/// Two processes that each need two slices at budget 5, with a Print.
const JOB: &str = "\
60
2
5
2
1 12 3 1 1 4 2 2 1 1 3
2 10 2 1 1 6 4 0
";

fn job_file(text: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(text.as_bytes()).unwrap();
    file
}

fn run_args(job: PathBuf) -> RunArgs {
    RunArgs {
        job,
        sim: SimArgs::default(),
        trace_file: None,
        trace: "all".into(),
        dump_memory: false,
    }
}

#[test]
fn header_values_are_used_without_overrides() {
    let job = job_file(JOB);
    let out = run(&run_args(job.path().to_path_buf())).unwrap();
    assert_eq!(out.config.memory_size, 60);
    assert_eq!(out.config.context_switch, 2);
    assert_eq!(out.config.slice_budget, 5);
    assert!(out.placed_memory.is_none());
}

#[test]
fn config_file_then_flags_override_header() {
    let job = job_file(JOB);
    let mut toml = NamedTempFile::new().unwrap();
    writeln!(toml, "[sim]\ncontext_switch = 0\nslice_budget = 100").unwrap();

    let mut args = run_args(job.path().to_path_buf());
    args.sim = SimArgs {
        config: Some(toml.path().to_path_buf()),
        slice_budget: Some(50),
        ..SimArgs::default()
    };
    let out = run(&args).unwrap();
    assert_eq!(out.config.context_switch, 0);
    assert_eq!(out.config.slice_budget, 50);
    // no switch overhead: the clock is just the charged cycles
    let charged: u64 = out.report.processes.iter().map(|p| p.cpu_cycles_used).sum();
    assert_eq!(out.report.summary.final_clock, charged);
}

#[test]
fn trace_filter_and_trace_file() {
    let job = job_file(JOB);
    let dir = tempdir().unwrap();
    let trace_path = dir.path().join("trace.txt");

    let mut args = run_args(job.path().to_path_buf());
    args.trace = "transitions".into();
    args.trace_file = Some(trace_path.clone());
    let out = run(&args).unwrap();

    assert!(out
        .trace
        .iter()
        .all(|e| !matches!(e, TraceEvent::Computed { .. } | TraceEvent::Printed { .. })));
    assert!(matches!(out.trace.last(), Some(TraceEvent::AllComplete { .. })));

    let written = std::fs::read_to_string(&trace_path).unwrap();
    let expected: String = out.trace.iter().map(|e| format!("{e}\n")).collect();
    assert_eq!(written, expected);
}

#[test]
fn bad_trace_filter_is_rejected() {
    let job = job_file(JOB);
    let mut args = run_args(job.path().to_path_buf());
    args.trace = "everything".into();
    let err = run(&args).unwrap_err();
    assert_eq!(err.exit_status(), 2);
}

#[test]
fn dump_memory_shows_placed_image() {
    let job = job_file("30 2 5 1\n1 12 1 3 7 0\n");
    let mut args = run_args(job.path().to_path_buf());
    args.dump_memory = true;
    let out = run(&args).unwrap();

    let placed = out.placed_memory.as_ref().unwrap();
    assert_eq!(placed.len(), 30);
    assert_eq!(&placed.words()[..2], &[1, 1]);
    assert_eq!(&placed.words()[10..13], &[3, 7, 0]);
    // after the run the Store has overwritten its own opcode
    assert_eq!(out.report.memory[10], 7);

    let human = out.to_string();
    assert!(human.starts_with(&format!("{}\n", placed)));
    assert!(human.starts_with("0 : 1\n1 : 1\n"));

    // JSON keeps the plain word array
    let json = serde_json::to_value(&out).unwrap();
    assert_eq!(json["placed_memory"].as_array().map(Vec::len), Some(30));
    assert_eq!(json["placed_memory"][11], 7);
}

#[test]
fn check_reports_layout() {
    let job = job_file(JOB);
    let out = check(&CheckArgs {
        job: job.path().to_path_buf(),
        sim: SimArgs::default(),
    })
    .unwrap();
    assert_eq!(out.processes.len(), 2);
    assert_eq!(out.processes[0].base, 0);
    assert_eq!(out.processes[0].instruction_base, 10);
    assert_eq!(out.processes[0].data_base, 13);
    assert_eq!(out.processes[1].base, 22);
    assert_eq!(out.processes[1].end, 42);
    assert_eq!(out.reserved_words, 42);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    /// Any budget and switch cost from flags ends with every process
    /// terminated and the clock fully accounted for.
    #[test]
    fn flag_overrides_always_complete(context_switch in 0u64..6, slice_budget in 1u64..12) {
        let job = job_file(JOB);
        let mut args = run_args(job.path().to_path_buf());
        args.sim.context_switch = Some(context_switch);
        args.sim.slice_budget = Some(slice_budget);
        let out = run(&args).unwrap();

        let stats = out.report.summary.stats;
        let charged: u64 = out.report.processes.iter().map(|p| p.cpu_cycles_used).sum();
        prop_assert_eq!(
            out.report.summary.final_clock,
            context_switch * stats.context_switches + charged
        );
        prop_assert_eq!(stats.terminations, 2);
    }
}

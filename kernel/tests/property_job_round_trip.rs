//! Property: job text round-trip.
//!
//! Rendering a job with `Display` and parsing it back yields the same
//! job; cutting tokens off the end always yields a parse error.

use kernel::process::{Instruction, ProcessDescriptor, ProcessId};
use kernel::{Job, KernelError, SimConfig};
use proptest::prelude::*;

fn arb_instruction() -> impl Strategy<Value = Instruction> {
    prop_oneof![
        (any::<i64>(), 0i64..1_000).prop_map(|(iterations, cycles)| Instruction::Compute {
            iterations,
            cycles
        }),
        (0i64..1_000).prop_map(|cycles| Instruction::Print { cycles }),
        (any::<i64>(), any::<i64>()).prop_map(|(value, address)| Instruction::Store { value, address }),
        any::<i64>().prop_map(|address| Instruction::Load { address }),
    ]
}

fn arb_descriptor() -> impl Strategy<Value = ProcessDescriptor> {
    (
        1u64..10_000,
        0usize..500,
        proptest::collection::vec(arb_instruction(), 0..8),
    )
        .prop_map(|(pid, max_memory_needed, instructions)| ProcessDescriptor {
            process_id: ProcessId(pid),
            max_memory_needed,
            instructions,
        })
}

fn arb_job() -> impl Strategy<Value = Job> {
    (
        0usize..100_000,
        0u64..50,
        0u64..50,
        proptest::collection::vec(arb_descriptor(), 0..5),
    )
        .prop_map(|(memory_size, context_switch, slice_budget, processes)| {
            Job::new(
                SimConfig::new(memory_size, context_switch, slice_budget),
                processes,
            )
        })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn display_then_parse(job in arb_job()) {
        let text = job.to_string();
        let back: Job = text.parse().unwrap();
        prop_assert_eq!(&job, &back);
    }

    #[test]
    fn truncated_text_is_a_parse_error(job in arb_job(), cut in 1usize..4) {
        let text = job.to_string();
        let tokens: Vec<_> = text.split_whitespace().collect();
        prop_assume!(tokens.len() > cut);
        let truncated = tokens[..tokens.len() - cut].join(" ");

        let result = truncated.parse::<Job>();
        let is_parse_error = matches!(result, Err(KernelError::Parse { .. }));
        prop_assert!(is_parse_error);
    }
}

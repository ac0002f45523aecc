//! Memory Unit Tests
//!
//! Placed images as seen through main memory.

#[cfg(test)]
mod tests {
    use crate::config::SENTINEL;
    use crate::loader::place;
    use crate::memory::MainMemory;
    use crate::process::{Instruction, ProcessDescriptor};
    use crate::scheduler::{Scheduler, SchedulerConfig};
    use crate::trace::{NullSink, TraceEvent, VecSink};

    // ========================================
    // Layout
    // ========================================

    #[test]
    fn test_dump_after_placement() {
        let mut memory = MainMemory::new(14);
        place(
            &[ProcessDescriptor::new(
                3,
                3,
                vec![Instruction::Load { address: 2 }],
            )],
            &mut memory,
        )
        .unwrap();

        let dump = memory.to_string();
        let lines: Vec<_> = dump.lines().collect();
        assert_eq!(lines.len(), 14);
        assert_eq!(lines[0], "0 : 3");
        assert_eq!(lines[1], "1 : 1");
        // opcode, operand, then the reserved tail
        assert_eq!(lines[10], "10 : 4");
        assert_eq!(lines[11], "11 : 2");
        assert_eq!(lines[12], "12 : -1");
        assert_eq!(lines[13], "13 : -1");
    }

    #[test]
    fn test_instruction_segment_matches_count() {
        let mut memory = MainMemory::new(60);
        let procs = [
            ProcessDescriptor::new(1, 10, vec![Instruction::Print { cycles: 1 }; 3]),
            ProcessDescriptor::new(2, 10, Vec::new()),
            ProcessDescriptor::new(
                3,
                10,
                vec![Instruction::Store { value: 1, address: 1 }; 2],
            ),
        ];
        let handles = place(&procs, &mut memory).unwrap();
        for (desc, &h) in procs.iter().zip(&handles) {
            let pcb = memory.control_block(h);
            assert_eq!(
                pcb.data_base() - pcb.instruction_base(),
                desc.instructions.len()
            );
        }
    }

    // ========================================
    // Reads and Writes
    // ========================================

    #[test]
    fn test_load_of_unwritten_word_is_sentinel() {
        let mut memory = MainMemory::new(18);
        let handles = place(
            &[ProcessDescriptor::new(
                1,
                8,
                vec![Instruction::Load { address: 5 }],
            )],
            &mut memory,
        )
        .unwrap();
        let mut sched = Scheduler::new(SchedulerConfig {
            context_switch: 2,
            slice_budget: 5,
        });
        sched.admit(handles.iter().copied());
        let mut sink = VecSink::new();
        sched.run(&mut memory, &mut sink);

        assert_eq!(memory.control_block(handles[0]).register_value(), SENTINEL);
        assert!(sink.events().contains(&TraceEvent::Loaded {
            pid: crate::process::ProcessId(1),
            address: 15,
            value: SENTINEL,
        }));
    }

    #[test]
    fn test_store_never_leaves_own_region() {
        let mut memory = MainMemory::new(40);
        let procs = [
            ProcessDescriptor::new(
                1,
                10,
                vec![
                    Instruction::Store {
                        value: 99,
                        address: 10,
                    },
                    Instruction::Store {
                        value: 99,
                        address: -1,
                    },
                ],
            ),
            ProcessDescriptor::new(2, 10, Vec::new()),
        ];
        let handles = place(&procs, &mut memory).unwrap();
        let before = memory.words()[20..].to_vec();

        let mut sched = Scheduler::new(SchedulerConfig {
            context_switch: 1,
            slice_budget: 10,
        });
        sched.admit(handles.iter().copied());
        sched.run(&mut memory, &mut NullSink);

        // process 2's control block is untouched apart from its state
        let after = &memory.words()[20..];
        assert_eq!(after[0], before[0]);
        assert_eq!(&after[2..], &before[2..]);
        assert_eq!(memory.control_block(handles[0]).main_memory_base(), 0);
        assert_eq!(memory.control_block(handles[0]).cpu_cycles_used(), 2);
    }
}

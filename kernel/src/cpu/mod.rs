//! Simulated CPU.
//!
//! Runs one slice of a placed process: decode the instruction at the
//! saved program counter, execute it, charge its cycles, and repeat until
//! the process runs out of instructions, exhausts the slice budget or
//! issues an I/O request.
//!
//! The executor never fails. Out-of-bounds Store/Load and unknown opcodes
//! are reported to the trace sink and execution carries on with the next
//! instruction.

pub mod decode;

use log::{trace, warn};
use serde::{Deserialize, Serialize};

pub use decode::{decode, operand_offset, DecodeError, Opcode};

use crate::config::MEMORY_OP_CYCLES;
use crate::memory::MainMemory;
use crate::process::{Instruction, ProcessHandle, ProcessId, ProcessState};
use crate::scheduler::Clock;
use crate::trace::{TraceEvent, TraceSink};

/// How a slice ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SliceOutcome {
    /// The instruction stream is exhausted.
    Terminated,
    /// The slice budget was used up first.
    TimedOut,
    /// A Print instruction issued an I/O request.
    IoBlocked,
}

/// Working registers of the process being executed.
struct Registers {
    handle: ProcessHandle,
    pid: ProcessId,
    instruction_base: usize,
    register: i64,
}

/// What executing one instruction did.
struct Effect {
    cycles: u64,
    blocks: bool,
}

impl Effect {
    fn cycles(cycles: u64) -> Self {
        Effect {
            cycles,
            blocks: false,
        }
    }
}

/// Run `handle` until its slice budget is used up, it issues an I/O
/// request or it runs out of instructions.
///
/// The budget is checked after each instruction, so the last one may
/// overrun it. A Print ends the slice with `IoBlocked` even when it also
/// used up the budget. Using up the budget on the final instruction gives
/// `TimedOut`; the process terminates on its next dispatch.
///
/// Program counter, used cycles and register are written back to the
/// control block after every instruction, and every charged cycle is added
/// to `clock` as it happens.
pub fn run_slice(
    handle: ProcessHandle,
    memory: &mut MainMemory,
    clock: &mut Clock,
    budget: u64,
    sink: &mut dyn TraceSink,
) -> SliceOutcome {
    let pcb = memory.control_block(handle);
    let mut regs = Registers {
        handle,
        pid: pcb.process_id(),
        instruction_base: pcb.instruction_base(),
        register: pcb.register_value(),
    };
    let data_base = pcb.data_base();
    let count = pcb.instruction_count();
    let mut pc = pcb.program_counter();
    let mut cycles_used = pcb.cpu_cycles_used();

    let mut operand_cursor = operand_offset(memory, regs.instruction_base, pc);
    let mut slice_used = 0u64;

    while pc < count {
        let effect = match decode(memory, regs.instruction_base + pc, data_base + operand_cursor) {
            Ok(inst) => {
                trace!("[CPU] pid {} pc {} {:?}", regs.pid, pc, inst);
                operand_cursor += inst.opcode().operand_width();
                execute(inst, &mut regs, memory, sink)
            }
            Err(DecodeError::InvalidOpcode(opcode)) => {
                warn!("[CPU] pid {}: invalid opcode {} at pc {}", regs.pid, opcode, pc);
                sink.record(TraceEvent::InvalidOpcode {
                    pid: regs.pid,
                    opcode,
                });
                Effect::cycles(0)
            }
        };

        pc += 1;
        slice_used += effect.cycles;
        cycles_used += effect.cycles;
        clock.advance(effect.cycles);

        let mut pcb = memory.control_block_mut(handle);
        pcb.set_program_counter(pc);
        pcb.set_cpu_cycles_used(cycles_used);
        pcb.set_register_value(regs.register);

        if effect.blocks {
            return SliceOutcome::IoBlocked;
        }
        if slice_used >= budget {
            return SliceOutcome::TimedOut;
        }
    }

    memory
        .control_block_mut(handle)
        .set_state(ProcessState::Terminated);
    SliceOutcome::Terminated
}

fn execute(
    inst: Instruction,
    regs: &mut Registers,
    memory: &mut MainMemory,
    sink: &mut dyn TraceSink,
) -> Effect {
    let pid = regs.pid;
    match inst {
        Instruction::Compute { cycles, .. } => {
            sink.record(TraceEvent::Computed { pid });
            Effect::cycles(charge(cycles))
        }
        Instruction::Print { cycles } => {
            sink.record(TraceEvent::Printed { pid });
            Effect {
                cycles: charge(cycles),
                blocks: true,
            }
        }
        Instruction::Store { value, address } => {
            let target = regs.instruction_base as i64 + address;
            match regs.checked(memory, target) {
                Some(addr) => {
                    memory.write(addr, value);
                    regs.register = value;
                    sink.record(TraceEvent::Stored {
                        pid,
                        address: addr,
                        value,
                    });
                }
                None => {
                    warn!("[CPU] pid {}: store to {} out of bounds", pid, target);
                    sink.record(TraceEvent::StoreFault {
                        pid,
                        address: target,
                    });
                }
            }
            Effect::cycles(MEMORY_OP_CYCLES)
        }
        Instruction::Load { address } => {
            let source = regs.instruction_base as i64 + address;
            match regs.checked(memory, source) {
                Some(addr) => {
                    let value = memory.read(addr);
                    regs.register = value;
                    sink.record(TraceEvent::Loaded {
                        pid,
                        address: addr,
                        value,
                    });
                }
                None => {
                    warn!("[CPU] pid {}: load from {} out of bounds", pid, source);
                    sink.record(TraceEvent::LoadFault {
                        pid,
                        address: source,
                    });
                }
            }
            Effect::cycles(MEMORY_OP_CYCLES)
        }
    }
}

impl Registers {
    fn checked(&self, memory: &MainMemory, addr: i64) -> Option<usize> {
        if memory.control_block(self.handle).in_bounds(addr) {
            Some(addr as usize)
        } else {
            None
        }
    }
}

/// Negative cycle counts (possible after a Store rewrites an operand)
/// charge nothing, which keeps the clock monotonic.
fn charge(cycles: i64) -> u64 {
    cycles.max(0) as u64
}

//! Memory image builder.
//!
//! Lays process descriptors into main memory, one region per process,
//! packed in load order:
//!
//! ```text
//! base             base+10          data_base                 base+10+max
//!  | control block  | opcodes ...    | operands ...  | unused   |
//! ```
//!
//! Each region reserves `10 + max_memory_needed` words no matter how many
//! are actually written; the unused tail keeps the sentinel value.

use hashbrown::HashSet;
use log::{debug, info};

use crate::config::PCB_SIZE;
use crate::error::KernelError;
use crate::memory::MainMemory;
use crate::process::{ProcessDescriptor, ProcessHandle};

/// Place every descriptor and return the handles in load order, ready to
/// be queued.
///
/// Everything is validated before the first word is written, so on error
/// memory is left untouched.
pub fn place(
    processes: &[ProcessDescriptor],
    memory: &mut MainMemory,
) -> Result<Vec<ProcessHandle>, KernelError> {
    let required = validate(processes)?;
    if required > memory.len() {
        return Err(KernelError::OutOfMemory {
            required,
            available: memory.len(),
        });
    }

    let mut current_address = 0;
    let mut handles = Vec::with_capacity(processes.len());

    for desc in processes {
        let handle = ProcessHandle::from_base(current_address);
        let count = desc.instructions.len();

        memory.control_block_mut(handle).initialize(
            desc.process_id,
            current_address,
            count,
            desc.max_memory_needed,
        );

        let instruction_base = current_address + PCB_SIZE;
        let mut data_addr = instruction_base + count;
        for (i, inst) in desc.instructions.iter().enumerate() {
            memory.write(instruction_base + i, inst.opcode().as_word());
            for word in inst.operands() {
                memory.write(data_addr, word);
                data_addr += 1;
            }
        }

        debug!(
            "[LOADER] pid {} at {} ({} instructions, data at {})",
            desc.process_id,
            current_address,
            count,
            instruction_base + count
        );

        current_address += PCB_SIZE + desc.max_memory_needed;
        handles.push(handle);
    }

    info!(
        "[LOADER] placed {} processes, {} of {} words reserved",
        handles.len(),
        current_address,
        memory.len()
    );

    Ok(handles)
}

/// Words needed to place every descriptor.
pub fn reserved_words(processes: &[ProcessDescriptor]) -> usize {
    processes
        .iter()
        .map(|p| PCB_SIZE + p.max_memory_needed)
        .sum()
}

/// Check ids and per-process sizes; returns the total reservation.
fn validate(processes: &[ProcessDescriptor]) -> Result<usize, KernelError> {
    let mut seen = HashSet::with_capacity(processes.len());
    for desc in processes {
        if desc.process_id.as_u64() == 0 {
            return Err(KernelError::InvalidProcessId(0));
        }
        if !seen.insert(desc.process_id) {
            return Err(KernelError::DuplicateProcessId(desc.process_id));
        }
        let required = desc.image_size();
        if required > desc.max_memory_needed {
            return Err(KernelError::ImageTooLarge {
                pid: desc.process_id,
                required,
                reserved: desc.max_memory_needed,
            });
        }
    }
    Ok(reserved_words(processes))
}

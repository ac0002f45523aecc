//! Job description parser.
//!
//! A job is a stream of whitespace-separated integers. Line breaks carry
//! no meaning, which lets long process records wrap:
//!
//! ```text
//! <memory_size> <context_switch> <slice_budget> <process_count>
//! <pid> <max_memory_needed> <instruction_count> <instruction>...
//! ...
//! ```
//!
//! Each instruction is an opcode followed by its operands:
//! `1 iterations cycles`, `2 cycles`, `3 value address` or `4 address`.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::config::SimConfig;
use crate::cpu::Opcode;
use crate::error::KernelError;
use crate::process::{Instruction, ProcessDescriptor, ProcessId};

/// Everything needed to start a simulation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Job {
    pub config: SimConfig,
    pub processes: Vec<ProcessDescriptor>,
}

impl Job {
    pub fn new(config: SimConfig, processes: Vec<ProcessDescriptor>) -> Self {
        Job { config, processes }
    }
}

impl FromStr for Job {
    type Err = KernelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_job(s)
    }
}

/// Renders the job back into the text format, one process per line.
impl fmt::Display for Job {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.config.memory_size)?;
        writeln!(f, "{}", self.config.context_switch)?;
        writeln!(f, "{}", self.config.slice_budget)?;
        writeln!(f, "{}", self.processes.len())?;
        for p in &self.processes {
            write!(
                f,
                "{} {} {}",
                p.process_id,
                p.max_memory_needed,
                p.instructions.len()
            )?;
            for inst in &p.instructions {
                write!(f, " {}", inst.opcode().as_word())?;
                for word in inst.operands() {
                    write!(f, " {}", word)?;
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// Parse a job description.
pub fn parse_job(text: &str) -> Result<Job, KernelError> {
    let mut tokens = Tokens::new(text);

    let memory_size = tokens.unsigned("memory size")?;
    let context_switch = tokens.unsigned("context switch time")? as u64;
    let slice_budget = tokens.unsigned("CPU allocated time")? as u64;
    let count = tokens.unsigned("process count")?;

    // count is untrusted input
    let mut processes = Vec::new();
    for _ in 0..count {
        processes.push(parse_process(&mut tokens)?);
    }

    if let Some((line, token)) = tokens.next() {
        return Err(KernelError::Parse {
            line,
            message: format!("unexpected trailing token `{}`", token),
        });
    }

    Ok(Job {
        config: SimConfig::new(memory_size, context_switch, slice_budget),
        processes,
    })
}

fn parse_process(tokens: &mut Tokens<'_>) -> Result<ProcessDescriptor, KernelError> {
    let pid = tokens.integer("process id")?;
    if pid <= 0 {
        return Err(KernelError::InvalidProcessId(pid));
    }
    let max_memory_needed = tokens.unsigned("max memory needed")?;
    let count = tokens.unsigned("instruction count")?;

    let mut instructions = Vec::new();
    for _ in 0..count {
        let line = tokens.line();
        let word = tokens.integer("opcode")?;
        let opcode = Opcode::from_word(word).ok_or_else(|| KernelError::Parse {
            line,
            message: format!("unknown opcode {} in process {}", word, pid),
        })?;
        let inst = match opcode {
            Opcode::Compute => Instruction::Compute {
                iterations: tokens.integer("iterations")?,
                cycles: tokens.cycles()?,
            },
            Opcode::Print => Instruction::Print {
                cycles: tokens.cycles()?,
            },
            Opcode::Store => Instruction::Store {
                value: tokens.integer("value")?,
                address: tokens.integer("address")?,
            },
            Opcode::Load => Instruction::Load {
                address: tokens.integer("address")?,
            },
        };
        instructions.push(inst);
    }

    Ok(ProcessDescriptor {
        process_id: ProcessId(pid as u64),
        max_memory_needed,
        instructions,
    })
}

/// Integer tokens tagged with their 1-based line number.
struct Tokens<'a> {
    iter: Box<dyn Iterator<Item = (usize, &'a str)> + 'a>,
    peeked: Option<(usize, &'a str)>,
    last_line: usize,
}

impl<'a> Tokens<'a> {
    fn new(text: &'a str) -> Self {
        let iter = text
            .lines()
            .enumerate()
            .flat_map(|(i, line)| line.split_whitespace().map(move |t| (i + 1, t)));
        Tokens {
            iter: Box::new(iter),
            peeked: None,
            last_line: 1,
        }
    }

    fn next(&mut self) -> Option<(usize, &'a str)> {
        let item = self.peeked.take().or_else(|| self.iter.next());
        if let Some((line, _)) = item {
            self.last_line = line;
        }
        item
    }

    /// Line of the next token (or of the last one at end of input).
    fn line(&mut self) -> usize {
        if self.peeked.is_none() {
            self.peeked = self.iter.next();
        }
        self.peeked.map_or(self.last_line, |(line, _)| line)
    }

    fn integer(&mut self, what: &str) -> Result<i64, KernelError> {
        let (line, token) = self.next().ok_or_else(|| KernelError::Parse {
            line: self.last_line,
            message: format!("unexpected end of input, expected {}", what),
        })?;
        token.parse::<i64>().map_err(|_| KernelError::Parse {
            line,
            message: format!("expected {}, found `{}`", what, token),
        })
    }

    fn unsigned(&mut self, what: &str) -> Result<usize, KernelError> {
        let line = self.line();
        let value = self.integer(what)?;
        usize::try_from(value).map_err(|_| KernelError::Parse {
            line,
            message: format!("{} must not be negative, found {}", what, value),
        })
    }

    fn cycles(&mut self) -> Result<i64, KernelError> {
        Ok(self.unsigned("cycles")? as i64)
    }
}

//! Ahead-of-time translation of a [`Program`] into basic blocks.
//!
//! Control flow never depends on the accumulator, so every jump target is
//! known once the program is compiled. A block is a run of `nop`/`acc`
//! instructions closed by at most one `jmp`; executing it is a single wrapping
//! addition followed by a transfer to the resolved exit.

use log::debug;

use crate::cpu::Cpu;
use crate::error::ExecutionError;
use crate::instruction::Instruction;
use crate::program::Program;

/// Where control goes once a block has run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exit {
    /// Continue at another instruction inside the program.
    Continue { pc: usize },
    /// The program counter lands at or past the end of the program.
    Halt { pc: usize },
    /// A jump at `at` whose target lies before the first instruction.
    Fault { at: usize, offset: i32 },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslationBlock {
    pub start: usize,
    pub end: usize,
    pub delta: i64,
    pub exit: Exit,
}

impl TranslationBlock {
    /// Runs the whole block against `cpu`, which must sit on `self.start`.
    pub fn execute(&self, cpu: &mut Cpu) -> Result<(), ExecutionError> {
        cpu.acc = cpu.acc.wrapping_add(self.delta);

        match self.exit {
            Exit::Continue { pc } => cpu.pc = pc,
            Exit::Halt { pc } => {
                cpu.pc = pc;
                cpu.halt = true;
            }
            Exit::Fault { at, offset } => {
                cpu.pc = at;
                cpu.pc = cpu.jump_target(offset)?;
            }
        }

        Ok(())
    }
}

fn relative(pc: usize, offset: i32) -> Option<usize> {
    usize::try_from(pc as i64 + i64::from(offset)).ok()
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Translation {
    blocks: Vec<TranslationBlock>,
    // Block index for every program counter that starts a block.
    leaders: Vec<Option<usize>>,
}

impl Translation {
    pub fn new(program: &Program) -> Self {
        let len = program.len();

        let mut is_leader = vec![false; len];
        if let Some(first) = is_leader.first_mut() {
            *first = true;
        }
        for (pc, instr) in program.iter().enumerate() {
            if let Instruction::Jmp(offset) = instr {
                if let Some(next) = is_leader.get_mut(pc + 1) {
                    *next = true;
                }
                if let Some(target) = relative(pc, offset) {
                    if let Some(leader) = is_leader.get_mut(target) {
                        *leader = true;
                    }
                }
            }
        }

        let starts: Vec<usize> = (0..len).filter(|&pc| is_leader[pc]).collect();
        let mut leaders = vec![None; len];
        let mut blocks = Vec::with_capacity(starts.len());

        for (index, &start) in starts.iter().enumerate() {
            let end = starts.get(index + 1).copied().unwrap_or(len);

            let delta = (start..end)
                .filter_map(|pc| match program.get(pc) {
                    Some(Instruction::Acc(delta)) => Some(delta),
                    _ => None,
                })
                .fold(0i64, i64::wrapping_add);

            // A jmp always closes its block since the next pc is a leader.
            let last = end - 1;
            let exit = match program.get(last) {
                Some(Instruction::Jmp(offset)) => match relative(last, offset) {
                    Some(pc) if pc >= len => Exit::Halt { pc },
                    Some(pc) => Exit::Continue { pc },
                    None => Exit::Fault { at: last, offset },
                },
                _ if end >= len => Exit::Halt { pc: end },
                _ => Exit::Continue { pc: end },
            };

            leaders[start] = Some(blocks.len());
            blocks.push(TranslationBlock {
                start,
                end,
                delta,
                exit,
            });
        }

        debug!(
            "translated {} instructions into {} blocks",
            len,
            blocks.len()
        );

        Self { blocks, leaders }
    }

    pub fn blocks(&self) -> &[TranslationBlock] {
        &self.blocks
    }

    /// The block starting exactly at `pc`, if any.
    pub fn block_at(&self, pc: usize) -> Option<&TranslationBlock> {
        self.leaders
            .get(pc)
            .copied()
            .flatten()
            .and_then(|index| self.blocks.get(index))
    }
}

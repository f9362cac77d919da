use std::fmt::Display;

use log::{trace, warn};

use crate::error::ExecutionError;
use crate::instruction::Instruction;
use crate::program::Program;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cpu {
    pub acc: i64,   // The accumulator register
    pub pc: usize,  // The program counter register
    pub halt: bool, // Set once the program counter falls past the last instruction
}

impl Display for Cpu {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Cpu [ acc: {}, pc: {}, halt: {} ]", self.acc, self.pc, self.halt)
    }
}

impl Cpu {
    pub fn new(acc: i64) -> Self {
        Cpu {
            acc,
            pc: 0,
            halt: false,
        }
    }

    /// Target of a relative jump taken from the current program counter.
    /// On error the registers are left untouched.
    pub(crate) fn jump_target(&self, offset: i32) -> Result<usize, ExecutionError> {
        let target = self.pc as i64 + i64::from(offset);
        usize::try_from(target).map_err(|_| {
            warn!("trap: jmp {:+} at {:#06x}", offset, self.pc);
            ExecutionError::NegativeInstructionPointer {
                pc: self.pc,
                offset,
            }
        })
    }

    /// Executes the instruction under the program counter. Stepping a halted
    /// cpu is a no-op.
    pub fn step(&mut self, program: &Program) -> Result<(), ExecutionError> {
        let instr = match program.get(self.pc) {
            Some(instr) => instr,
            None => {
                self.halt = true;
                return Ok(());
            }
        };

        trace!("{:#06x}: {}", self.pc, instr);

        match instr {
            Instruction::Nop => {
                self.pc += 1;
            }
            Instruction::Acc(delta) => {
                self.acc = self.acc.wrapping_add(delta);
                self.pc += 1;
            }
            Instruction::Jmp(offset) => {
                self.pc = self.jump_target(offset)?;
            }
        }

        if self.pc >= program.len() {
            self.halt = true;
        }

        Ok(())
    }
}

use std::str::FromStr;

use log::debug;

use crate::error::CompileError;
use crate::instruction::Instruction;

/// An ordered, immutable sequence of instructions. Index `i` holds the
/// instruction compiled from the `i`-th input line; jump offsets are relative
/// to these indices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Program {
    instructions: Vec<Instruction>,
}

impl Program {
    /// Compiles `lines` in order, stopping at the first malformed one.
    pub fn compile<I, S>(lines: I) -> Result<Self, CompileError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let instructions = lines
            .into_iter()
            .enumerate()
            .map(|(line, text)| {
                text.as_ref()
                    .parse::<Instruction>()
                    .map_err(|source| CompileError { line, source })
            })
            .collect::<Result<Vec<_>, _>>()?;

        debug!("compiled program of {} instructions", instructions.len());

        Ok(Self { instructions })
    }

    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    pub fn get(&self, pc: usize) -> Option<Instruction> {
        self.instructions.get(pc).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = Instruction> + '_ {
        self.instructions.iter().copied()
    }
}

impl FromStr for Program {
    type Err = CompileError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        Program::compile(text.lines())
    }
}

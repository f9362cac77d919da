use thiserror::Error;

/// Why a single line of program text could not be turned into an instruction.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InstructionError {
    #[error("unknown opcode `{0}`")]
    UnknownOpcode(String),

    #[error("missing operand")]
    MissingOperand,

    #[error("operand `{0}` has no explicit sign")]
    MissingSign(String),

    #[error("invalid operand `{0}`")]
    InvalidOperand(String),

    #[error("operand `{0}` out of range")]
    OperandOutOfRange(String),
}

/// A program failed to compile. `line` is the 0-based index of the offending line.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("line {line}: {source}")]
pub struct CompileError {
    pub line: usize,
    pub source: InstructionError,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExecutionError {
    #[error("jump {offset:+} at {pc:#06x} moves before the start of the program")]
    NegativeInstructionPointer { pc: usize, offset: i32 },
}

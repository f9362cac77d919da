use std::{fmt::Display, str::FromStr};

use crate::error::InstructionError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Instruction {
    Nop,        // PC += 1
    Acc(i64),   // A += delta, PC += 1
    Jmp(i32),   // PC += offset
}

impl Display for Instruction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Instruction::Nop => write!(f, "nop +0"),
            Instruction::Acc(delta) => write!(f, "acc {:+}", delta),
            Instruction::Jmp(offset) => write!(f, "jmp {:+}", offset),
        }
    }
}

/// Checks the `<sign><digits>` shape of an operand, leaving the numeric
/// conversion (and its range check) to the caller.
fn signed_operand(operand: &str) -> Result<&str, InstructionError> {
    let magnitude = match operand.strip_prefix(&['+', '-'][..]) {
        Some(magnitude) => magnitude,
        None if operand.is_empty() => return Err(InstructionError::MissingOperand),
        None => return Err(InstructionError::MissingSign(operand.to_string())),
    };

    if magnitude.is_empty() || !magnitude.bytes().all(|b| b.is_ascii_digit()) {
        return Err(InstructionError::InvalidOperand(operand.to_string()));
    }

    Ok(operand)
}

fn parse_operand<T: FromStr>(operand: &str) -> Result<T, InstructionError> {
    signed_operand(operand)?
        .parse::<T>()
        .map_err(|_| InstructionError::OperandOutOfRange(operand.to_string()))
}

impl FromStr for Instruction {
    type Err = InstructionError;

    fn from_str(line: &str) -> Result<Instruction, Self::Err> {
        let (opcode, rest) = match (line.get(..3), line.get(3..)) {
            (Some(opcode), Some(rest)) => (opcode, rest),
            _ => return Err(InstructionError::UnknownOpcode(line.to_string())),
        };

        if !matches!(opcode, "nop" | "acc" | "jmp") {
            return Err(InstructionError::UnknownOpcode(opcode.to_string()));
        }

        let operand = match rest.strip_prefix(' ') {
            Some(operand) => operand,
            None if rest.is_empty() => return Err(InstructionError::MissingOperand),
            None => return Err(InstructionError::InvalidOperand(rest.to_string())),
        };

        match opcode {
            "acc" => parse_operand(operand).map(Instruction::Acc),
            "jmp" => parse_operand(operand).map(Instruction::Jmp),
            _ => signed_operand(operand).map(|_| Instruction::Nop),
        }
    }
}

#[test]
fn instruction_from_str() {
    fn i(s: &str) -> Instruction {
        Instruction::from_str(s).unwrap()
    }
    fn err(s: &str) -> InstructionError {
        Instruction::from_str(s).unwrap_err()
    }

    assert_eq!(i("nop +0"), Instruction::Nop);
    assert_eq!(i("nop -4"), Instruction::Nop);
    assert_eq!(i("acc +1"), Instruction::Acc(1));
    assert_eq!(i("acc -99"), Instruction::Acc(-99));
    assert_eq!(i("jmp +4"), Instruction::Jmp(4));
    assert_eq!(i("jmp -3"), Instruction::Jmp(-3));
    assert_eq!(i("jmp +0"), Instruction::Jmp(0));
    assert_eq!(i("acc +007"), Instruction::Acc(7));

    assert_eq!(err("mov +1"), InstructionError::UnknownOpcode("mov".to_string()));
    assert_eq!(err("NOP +0"), InstructionError::UnknownOpcode("NOP".to_string()));
    assert_eq!(err("ac"), InstructionError::UnknownOpcode("ac".to_string()));
    assert_eq!(err(""), InstructionError::UnknownOpcode("".to_string()));

    assert_eq!(err("acc"), InstructionError::MissingOperand);
    assert_eq!(err("acc "), InstructionError::MissingOperand);
    assert_eq!(err("acc 5"), InstructionError::MissingSign("5".to_string()));
    assert_eq!(err("nop 0"), InstructionError::MissingSign("0".to_string()));
    assert_eq!(err("acc +"), InstructionError::InvalidOperand("+".to_string()));
    assert_eq!(err("acc +1x"), InstructionError::InvalidOperand("+1x".to_string()));
    assert_eq!(err("acc ++1"), InstructionError::InvalidOperand("++1".to_string()));
    assert_eq!(err("acc  +1"), InstructionError::MissingSign(" +1".to_string()));
    assert_eq!(err("acc+1"), InstructionError::InvalidOperand("+1".to_string()));
    assert_eq!(err("nop -x"), InstructionError::InvalidOperand("-x".to_string()));
}

#[test]
fn operand_range() {
    assert_eq!(
        Instruction::from_str("acc -9223372036854775808").unwrap(),
        Instruction::Acc(i64::MIN)
    );
    assert_eq!(
        Instruction::from_str("acc +9223372036854775808").unwrap_err(),
        InstructionError::OperandOutOfRange("+9223372036854775808".to_string())
    );
    assert_eq!(
        Instruction::from_str("jmp +2147483647").unwrap(),
        Instruction::Jmp(i32::MAX)
    );
    assert_eq!(
        Instruction::from_str("jmp +2147483648").unwrap_err(),
        InstructionError::OperandOutOfRange("+2147483648".to_string())
    );
    // nop never converts its operand
    assert_eq!(Instruction::from_str("nop +99999999999999999999").unwrap(), Instruction::Nop);
}

#[test]
fn instruction_display() {
    assert_eq!(Instruction::Nop.to_string(), "nop +0");
    assert_eq!(Instruction::Acc(3).to_string(), "acc +3");
    assert_eq!(Instruction::Acc(-99).to_string(), "acc -99");
    assert_eq!(Instruction::Jmp(0).to_string(), "jmp +0");
    assert_eq!(Instruction::Jmp(-3).to_string(), "jmp -3");
}

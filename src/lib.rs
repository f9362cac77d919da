pub mod cpu;
pub mod error;
pub mod instruction;
pub mod program;
pub mod translation;

use cpu::Cpu;
use log::{debug, info};
use program::Program;
use translation::Translation;

pub use error::{CompileError, ExecutionError, InstructionError};
pub use instruction::Instruction;

/// A compiled program together with the accumulator it runs against.
#[derive(Debug, Clone)]
pub struct Emulator {
    program: Program,
    translation: Translation,
    cpu: Cpu,
}

impl Emulator {
    /// Compiles `lines` into a unit whose accumulator starts at 0.
    pub fn new<I, S>(lines: I) -> Result<Self, CompileError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self::with_accumulator(lines, 0)
    }

    pub fn with_accumulator<I, S>(lines: I, acc: i64) -> Result<Self, CompileError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Ok(Self::from_program(Program::compile(lines)?, acc))
    }

    pub fn from_program(program: Program, acc: i64) -> Self {
        let translation = Translation::new(&program);
        let mut cpu = Cpu::new(acc);
        cpu.halt = program.is_empty();

        Self {
            program,
            translation,
            cpu,
        }
    }

    pub fn accumulator(&self) -> i64 {
        self.cpu.acc
    }

    pub fn program(&self) -> &Program {
        &self.program
    }

    pub fn cpu(&self) -> &Cpu {
        &self.cpu
    }

    pub fn is_halted(&self) -> bool {
        self.cpu.halt
    }

    fn debug_state(&self) {
        let next = self
            .program
            .get(self.cpu.pc)
            .map_or_else(|| "-".to_string(), |instr| instr.to_string());
        debug!(
            "State: PC: {:#06x}, ACC: {:#4} | {}",
            self.cpu.pc, self.cpu.acc, next
        );
    }

    /// Executes a single instruction.
    pub fn step(&mut self) -> Result<(), ExecutionError> {
        self.cpu.step(&self.program)
    }

    /// Runs until the program counter falls past the last instruction. There
    /// is no cycle detection: a program that revisits an instruction never
    /// returns.
    pub fn run(&mut self) -> Result<(), ExecutionError> {
        // As long the machine is not stopped
        while !self.cpu.halt {
            match self.translation.block_at(self.cpu.pc) {
                Some(block) => block.execute(&mut self.cpu)?,
                // Only reachable after manual steps left pc inside a block
                None => self.cpu.step(&self.program)?,
            }

            self.debug_state();
        }

        info!("{}", self.cpu);

        Ok(())
    }
}

#[cfg(test)]
mod tests {

    use super::*;

    const REFERENCE: [&str; 9] = [
        "nop +0", "acc +1", "jmp +4", "acc +3", "jmp -3", "acc -99", "acc +1", "nop -4", "acc +6",
    ];

    fn init() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    /// Steps until halted or `max_steps` is exhausted, returning the number of
    /// steps taken.
    fn step_bounded(vm: &mut Emulator, max_steps: usize) -> Result<usize, ExecutionError> {
        let mut steps = 0;
        while !vm.is_halted() && steps < max_steps {
            vm.step()?;
            steps += 1;
        }
        Ok(steps)
    }

    #[test]
    pub fn reference_program() {
        init();
        let mut vm = Emulator::new(REFERENCE).unwrap();
        assert_eq!(vm.program().len(), REFERENCE.len());
        assert_eq!(vm.accumulator(), 0);
        vm.run().unwrap();
        assert_eq!(vm.accumulator(), 8);
        assert_eq!(vm.cpu(), &Cpu { acc: 8, pc: 9, halt: true });
    }

    #[test]
    pub fn reference_program_stepped() {
        init();
        let mut vm = Emulator::new(REFERENCE).unwrap();
        let steps = step_bounded(&mut vm, 1_000).unwrap();
        assert_eq!(steps, 6);
        assert_eq!(vm.cpu(), &Cpu { acc: 8, pc: 9, halt: true });
    }

    #[test]
    pub fn seeded_accumulator() {
        init();
        let mut vm = Emulator::with_accumulator(REFERENCE, 42).unwrap();
        assert_eq!(vm.accumulator(), 42);
        vm.run().unwrap();
        assert_eq!(vm.accumulator(), 50);
    }

    #[test]
    pub fn empty_program_is_halted() {
        init();
        let mut vm = Emulator::with_accumulator(Vec::<String>::new(), 3).unwrap();
        assert!(vm.is_halted());
        vm.run().unwrap();
        assert_eq!(vm.cpu(), &Cpu { acc: 3, pc: 0, halt: true });
    }

    #[test]
    pub fn self_jump_never_halts() {
        init();
        let mut vm = Emulator::new(["acc +1", "jmp +0", "acc +5"]).unwrap();
        let steps = step_bounded(&mut vm, 10_000).unwrap();
        assert_eq!(steps, 10_000);
        assert!(!vm.is_halted());
        assert_eq!(vm.cpu().pc, 1);
        assert_eq!(vm.accumulator(), 1);
    }

    #[test]
    pub fn cycle_never_halts() {
        init();
        // 1 -> 2 -> 4 -> 1 repeats forever.
        let mut vm = Emulator::new(["nop +0", "acc +2", "jmp +2", "acc -1", "jmp -3"]).unwrap();
        step_bounded(&mut vm, 300).unwrap();
        assert!(!vm.is_halted());
        assert_eq!(vm.accumulator(), 200);
    }

    #[test]
    pub fn compile_errors() {
        init();
        let err = Emulator::new(["acc 5"]).unwrap_err();
        assert_eq!(err.source, InstructionError::MissingSign("5".to_string()));

        let err = Emulator::new(["nop +0", "mov +1"]).unwrap_err();
        assert_eq!(
            err,
            CompileError {
                line: 1,
                source: InstructionError::UnknownOpcode("mov".to_string())
            }
        );
    }

    #[test]
    pub fn jump_before_start() {
        init();
        let mut vm = Emulator::new(["jmp -1"]).unwrap();
        let err = vm.run().unwrap_err();
        assert_eq!(err, ExecutionError::NegativeInstructionPointer { pc: 0, offset: -1 });
        assert_eq!(vm.accumulator(), 0);
        assert!(!vm.is_halted());
    }

    #[test]
    pub fn jump_before_start_keeps_accumulator() {
        init();
        let mut vm = Emulator::with_accumulator(["acc +3", "nop +0", "acc -1", "jmp -4"], 10).unwrap();
        let err = vm.run().unwrap_err();
        assert_eq!(err, ExecutionError::NegativeInstructionPointer { pc: 3, offset: -4 });
        assert_eq!(vm.cpu(), &Cpu { acc: 12, pc: 3, halt: false });
    }

    #[test]
    pub fn independent_units() {
        init();
        let mut first = Emulator::new(REFERENCE).unwrap();
        let mut second = Emulator::new(REFERENCE).unwrap();

        first.run().unwrap();
        assert_eq!(first.accumulator(), 8);
        assert_eq!(second.accumulator(), 0);

        second.run().unwrap();
        assert_eq!(first.cpu(), second.cpu());
    }

    #[test]
    pub fn run_resumes_after_manual_steps() {
        init();
        let lines = ["acc +1", "acc +2", "acc +4", "jmp +2", "acc +100", "acc +8"];

        let mut stepped = Emulator::new(lines).unwrap();
        step_bounded(&mut stepped, 1_000).unwrap();

        // Two steps leave pc in the middle of the first block.
        let mut mixed = Emulator::new(lines).unwrap();
        mixed.step().unwrap();
        mixed.step().unwrap();
        mixed.run().unwrap();

        assert_eq!(mixed.cpu(), stepped.cpu());
        assert_eq!(mixed.accumulator(), 15);
    }

    #[test]
    pub fn jump_past_end_halts() {
        init();
        let mut vm = Emulator::new(["acc +1", "jmp +10", "acc +1"]).unwrap();
        vm.run().unwrap();
        assert_eq!(vm.cpu(), &Cpu { acc: 1, pc: 11, halt: true });
    }

    #[test]
    pub fn compile_from_text() {
        init();
        let program: Program = REFERENCE.join("\n").parse().unwrap();
        let mut vm = Emulator::from_program(program, 0);
        vm.run().unwrap();
        assert_eq!(vm.accumulator(), 8);
    }
}

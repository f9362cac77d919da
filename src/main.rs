use std::error::Error;

use acc_vm::Emulator;

const PROGRAM: [&str; 9] = [
    "nop +0",
    "acc +1",
    "jmp +4",
    "acc +3",
    "jmp -3",
    "acc -99",
    "acc +1",
    "nop -4",
    "acc +6",
];

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();

    let mut vm = Emulator::new(PROGRAM)?;

    println!("{}", vm.accumulator());

    vm.run()?;

    println!("{}", vm.accumulator());

    Ok(())
}

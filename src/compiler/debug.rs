//! Debug utilities for accumulator code
//!
//! Tools for inspecting emitted programs and machine states.

use crate::machine::{Instruction, MachineState, Reg};
use std::fmt;
use std::fmt::Write as _;

/// Format a single instruction
pub fn format_instr(instr: &Instruction) -> String {
    match instr {
        Instruction::LoadImmediate(value) => format!("ldi {}", value),
        Instruction::Load(reg) => format!("ld  {}", reg),
        Instruction::Store(reg) => format!("st  {}", reg),
        Instruction::Add(reg) => format!("add {}", reg),
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_instr(self))
    }
}

/// Render a program as a numbered listing
///
/// ```text
/// 0000: ld  r2
/// 0001: st  r10
/// ```
pub fn dump_program(program: &[Instruction]) -> String {
    let mut out = String::new();
    for (i, instr) in program.iter().enumerate() {
        let _ = writeln!(out, "{:04}: {}", i, format_instr(instr));
    }
    out
}

/// Render a program together with the state after each instruction
pub fn trace_program(program: &[Instruction], initial: &MachineState) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "      {:<10} {}", "", initial);
    let mut state = initial.clone();
    for (i, instr) in program.iter().enumerate() {
        state = crate::machine::step(instr, state);
        let _ = writeln!(out, "{:04}: {:<10} {}", i, format_instr(instr), state);
    }
    out
}

/// Registers written at or above `watermark`, in first-write order
pub fn temporaries_written(program: &[Instruction], watermark: Reg) -> Vec<Reg> {
    let mut seen = Vec::new();
    for reg in program.iter().filter_map(Instruction::written_register) {
        if reg >= watermark && !seen.contains(&reg) {
            seen.push(reg);
        }
    }
    seen
}

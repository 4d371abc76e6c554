//! # Accumulator Machine
//!
//! The compilation target: a single accumulator plus an unbounded file of
//! word-sized registers, executed strictly in sequence.
//!
//! ## Module Structure
//!
//! ```text
//! machine/
//! ├── mod.rs          # This file - step/run semantics and re-exports
//! ├── instruction.rs  # Word, Reg, Instruction
//! └── state.rs        # RegisterFile, MachineState
//! ```
//!
//! ## Semantics
//!
//! | Instruction | Accumulator | Registers |
//! |-------------|-------------|-----------|
//! | `LoadImmediate(v)` | `v` | unchanged |
//! | `Load(r)` | `regs[r]` | unchanged |
//! | `Store(r)` | unchanged | `regs[r] = acc` |
//! | `Add(r)` | `regs[r] + acc` | unchanged |
//!
//! Addition wraps at the word width. States are threaded by value: every
//! step consumes a state and hands back its successor.

mod instruction;
mod state;

pub use instruction::{Instruction, Reg, Word};
pub use state::{MachineState, RegisterFile};

/// Execute a single instruction
pub fn step(instr: &Instruction, mut state: MachineState) -> MachineState {
    match *instr {
        Instruction::LoadImmediate(value) => {
            state.accumulator = value;
        }
        Instruction::Load(reg) => {
            state.accumulator = state.registers.get(reg);
        }
        Instruction::Store(reg) => {
            state.registers.set(reg, state.accumulator);
        }
        Instruction::Add(reg) => {
            state.accumulator = state.registers.get(reg).wrapping_add(state.accumulator);
        }
    }
    state
}

/// Execute a program left to right, starting from `state`
///
/// The empty program returns `state` unchanged, and running `p1 ++ p2` is the
/// same as running `p2` on the result of `p1`.
pub fn run(program: &[Instruction], state: MachineState) -> MachineState {
    let final_state = program.iter().enumerate().fold(state, |state, (pc, instr)| {
        let next = step(instr, state);
        tracing::trace!(pc, ?instr, acc = next.accumulator, "step");
        next
    });
    tracing::debug!(
        instructions = program.len(),
        acc = final_state.accumulator,
        "program finished"
    );
    final_state
}

//! Machine state and the growable register file

use super::instruction::{Reg, Word};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Register file holding machine storage.
///
/// Conceptually total over every index: a register that was never written
/// reads as zero. Writes grow the backing vector on demand, so the file is
/// only as large as the highest register touched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RegisterFile {
    regs: Vec<Word>,
}

impl RegisterFile {
    /// Creates an empty register file (every register reads as zero)
    pub fn new() -> Self {
        Self { regs: Vec::new() }
    }

    /// Creates a register file with room for `capacity` registers
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            regs: Vec::with_capacity(capacity),
        }
    }

    /// Returns the value in register `reg`
    pub fn get(&self, reg: Reg) -> Word {
        self.regs.get(reg.index()).copied().unwrap_or(0)
    }

    /// Writes `value` into register `reg`, growing the file if needed
    pub fn set(&mut self, reg: Reg, value: Word) {
        let idx = reg.index();
        if idx >= self.regs.len() {
            if value == 0 {
                return;
            }
            self.regs.resize(idx + 1, 0);
        }
        self.regs[idx] = value;
    }

    /// One past the highest register that may hold a non-zero value
    pub fn extent(&self) -> usize {
        self.regs.len()
    }

    /// Registers the file can hold without reallocating
    pub fn capacity(&self) -> usize {
        self.regs.capacity()
    }

    /// Iterates over `(register, value)` pairs holding non-zero values
    pub fn iter_nonzero(&self) -> impl Iterator<Item = (Reg, Word)> + '_ {
        self.regs
            .iter()
            .enumerate()
            .filter(|(_, v)| **v != 0)
            .map(|(i, v)| (Reg(i), *v))
    }
}

// Equality is semantic: trailing zero slots are indistinguishable from
// registers that were never allocated.
impl PartialEq for RegisterFile {
    fn eq(&self, other: &Self) -> bool {
        let len = self.regs.len().max(other.regs.len());
        (0..len).all(|i| self.get(Reg(i)) == other.get(Reg(i)))
    }
}

impl Eq for RegisterFile {}

/// Complete machine state: the accumulator plus the register file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MachineState {
    /// Working register holding the in-progress result
    pub accumulator: Word,
    /// Register storage
    pub registers: RegisterFile,
}

impl MachineState {
    /// Creates a state with a zero accumulator and all registers zero
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a zeroed state with room for `capacity` registers
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            accumulator: 0,
            registers: RegisterFile::with_capacity(capacity),
        }
    }

    /// Creates a state with the given registers preloaded
    pub fn with_registers<I>(values: I) -> Self
    where
        I: IntoIterator<Item = (Reg, Word)>,
    {
        let mut state = Self::new();
        for (reg, value) in values {
            state.registers.set(reg, value);
        }
        state
    }

    /// Returns the value in register `reg`
    pub fn register(&self, reg: Reg) -> Word {
        self.registers.get(reg)
    }

    /// Returns a copy of this state with the accumulator replaced
    pub fn with_accumulator(mut self, value: Word) -> Self {
        self.accumulator = value;
        self
    }

    /// Returns a copy of this state with register `reg` set to `value`
    pub fn with_register(mut self, reg: Reg, value: Word) -> Self {
        self.registers.set(reg, value);
        self
    }
}

impl fmt::Display for MachineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "acc={}", self.accumulator)?;
        for (reg, value) in self.registers.iter_nonzero() {
            write!(f, " {}={}", reg, value)?;
        }
        Ok(())
    }
}

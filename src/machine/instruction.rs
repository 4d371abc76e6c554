//! Accumulator machine instruction definitions

use serde::{Deserialize, Serialize};
use std::fmt;

/// Machine word shared by source values, the accumulator and every register
pub type Word = u64;

/// Register index (unbounded supply, unread registers hold zero)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Reg(pub usize);

impl Reg {
    /// Creates a register reference with the given index
    pub fn new(index: usize) -> Self {
        Self(index)
    }

    /// Index of this register in the register file
    pub fn index(self) -> usize {
        self.0
    }

    /// The register directly above this one
    ///
    /// # Panics
    ///
    /// Panics if `self` is the last addressable register.
    pub fn next(self) -> Self {
        match self.checked_next() {
            Some(reg) => reg,
            None => panic!("no register above {}", self),
        }
    }

    /// The register directly above this one, or `None` at the top of the
    /// register space
    pub fn checked_next(self) -> Option<Self> {
        self.checked_offset(1)
    }

    /// The register `offset` places above this one, or `None` on overflow
    pub fn checked_offset(self, offset: usize) -> Option<Self> {
        self.0.checked_add(offset).map(Self)
    }
}

impl fmt::Display for Reg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "r{}", self.0)
    }
}

impl From<usize> for Reg {
    fn from(index: usize) -> Self {
        Self(index)
    }
}

/// Accumulator machine instruction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Instruction {
    /// Load immediate: acc = value
    LoadImmediate(Word),
    /// Load register: acc = reg
    Load(Reg),
    /// Store accumulator: reg = acc
    Store(Reg),
    /// Add register: acc = reg + acc
    Add(Reg),
}

impl Instruction {
    /// Register this instruction writes, if any
    pub fn written_register(&self) -> Option<Reg> {
        match self {
            Instruction::Store(r) => Some(*r),
            _ => None,
        }
    }

    /// Register this instruction reads, if any
    pub fn read_register(&self) -> Option<Reg> {
        match self {
            Instruction::Load(r) | Instruction::Add(r) => Some(*r),
            _ => None,
        }
    }

    /// True if the instruction reads the accumulator before overwriting it
    pub fn reads_accumulator(&self) -> bool {
        matches!(self, Instruction::Store(_) | Instruction::Add(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checked_next() {
        assert_eq!(Reg(4).checked_next(), Some(Reg(5)));
        assert_eq!(Reg(usize::MAX).checked_next(), None);
        assert_eq!(Reg(usize::MAX - 2).checked_offset(2), Some(Reg(usize::MAX)));
        assert_eq!(Reg(usize::MAX - 2).checked_offset(3), None);
    }

    #[test]
    #[should_panic(expected = "no register above")]
    fn test_next_at_top_of_register_space() {
        let _ = Reg(usize::MAX).next();
    }

    #[test]
    fn test_register_queries() {
        assert_eq!(Instruction::Load(Reg(1)).read_register(), Some(Reg(1)));
        assert_eq!(Instruction::Add(Reg(2)).read_register(), Some(Reg(2)));
        assert_eq!(Instruction::Store(Reg(3)).read_register(), None);
        assert_eq!(Instruction::Store(Reg(3)).written_register(), Some(Reg(3)));
        assert_eq!(Instruction::LoadImmediate(9).written_register(), None);
    }
}

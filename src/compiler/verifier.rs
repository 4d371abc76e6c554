//! # Program Verifier
//!
//! Static checks on emitted accumulator code. The central check is
//! non-interference: no `Store` may target a register below the watermark
//! the program was compiled at.

use crate::machine::{Instruction, Reg};
use std::collections::HashSet;

/// Default instruction limit
pub const MAX_INSTRUCTIONS: usize = 1 << 20;

/// Verification result with warnings
#[derive(Debug, Clone)]
pub struct VerifyResult {
    /// Program passed every check
    pub valid: bool,
    /// Errors that make the program unusable
    pub errors: Vec<VerifyError>,
    /// Warnings (non-fatal)
    pub warnings: Vec<String>,
    /// Statistics
    pub stats: ProgramStats,
}

/// Program statistics
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProgramStats {
    /// Total instruction count
    pub instruction_count: usize,
    /// Number of `Store` instructions
    pub store_count: usize,
    /// Number of `Load` and `LoadImmediate` instructions
    pub load_count: usize,
    /// Number of distinct registers at or above the watermark that are written
    pub temporaries_used: usize,
}

/// Verification error types
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerifyError {
    /// Program exceeds instruction limit.
    TooManyInstructions {
        /// Actual instruction count in the program
        count: usize,
        /// Maximum allowed instructions
        limit: usize,
    },

    /// A store would overwrite variable storage.
    StoreBelowWatermark {
        /// Index of the offending instruction
        index: usize,
        /// Register being written
        reg: Reg,
        /// Watermark the program must respect
        watermark: Reg,
    },

    /// A temporary is read before the program wrote it.
    ReadBeforeWrite {
        /// Index of the offending instruction
        index: usize,
        /// Temporary register being read
        reg: Reg,
    },
}

impl std::fmt::Display for VerifyError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VerifyError::TooManyInstructions { count, limit } => {
                write!(f, "Too many instructions: {} (limit: {})", count, limit)
            }
            VerifyError::StoreBelowWatermark {
                index,
                reg,
                watermark,
            } => {
                write!(
                    f,
                    "Store to {} at instruction {} is below the watermark {}",
                    reg, index, watermark
                )
            }
            VerifyError::ReadBeforeWrite { index, reg } => {
                write!(
                    f,
                    "Temporary {} read at instruction {} before any store",
                    reg, index
                )
            }
        }
    }
}

/// Accumulator program verifier
pub struct Verifier {
    /// First register the program may write
    watermark: Reg,
    /// Maximum allowed instructions
    max_instructions: usize,
    /// Strict mode (treat warnings as errors)
    strict: bool,
}

impl Verifier {
    /// Creates a verifier for code compiled at `watermark`.
    ///
    /// Defaults:
    /// - `max_instructions`: [`MAX_INSTRUCTIONS`]
    /// - `strict`: `false` (warnings don't fail verification)
    pub fn new(watermark: Reg) -> Self {
        Self {
            watermark,
            max_instructions: MAX_INSTRUCTIONS,
            strict: false,
        }
    }

    /// Enable strict mode
    pub fn strict(mut self) -> Self {
        self.strict = true;
        self
    }

    /// Set custom instruction limit
    pub fn max_instructions(mut self, limit: usize) -> Self {
        self.max_instructions = limit;
        self
    }

    /// Verify a program
    pub fn verify(&self, program: &[Instruction]) -> VerifyResult {
        let mut errors = Vec::new();
        let mut warnings = Vec::new();
        let mut stats = ProgramStats {
            instruction_count: program.len(),
            ..ProgramStats::default()
        };

        if stats.instruction_count > self.max_instructions {
            errors.push(VerifyError::TooManyInstructions {
                count: stats.instruction_count,
                limit: self.max_instructions,
            });
        }

        if program.is_empty() {
            warnings.push("Empty program leaves the accumulator unchanged".to_string());
        }

        let mut written: HashSet<Reg> = HashSet::new();
        let mut acc_defined = false;

        for (index, instr) in program.iter().enumerate() {
            if instr.reads_accumulator() && !acc_defined {
                warnings.push(format!(
                    "Instruction {} uses the accumulator before it is set",
                    index
                ));
                acc_defined = true;
            }

            if let Some(reg) = instr.read_register() {
                self.check_read(index, reg, &written, &mut errors);
            }

            match *instr {
                Instruction::LoadImmediate(_) | Instruction::Load(_) => {
                    stats.load_count += 1;
                    acc_defined = true;
                }
                Instruction::Add(_) => {}
                Instruction::Store(reg) => {
                    stats.store_count += 1;
                    if reg < self.watermark {
                        errors.push(VerifyError::StoreBelowWatermark {
                            index,
                            reg,
                            watermark: self.watermark,
                        });
                    } else {
                        written.insert(reg);
                    }
                }
            }
        }

        stats.temporaries_used = written.len();

        let valid = errors.is_empty() && (!self.strict || warnings.is_empty());

        VerifyResult {
            valid,
            errors,
            warnings,
            stats,
        }
    }

    // Registers below the watermark are variables and may be read freely
    fn check_read(
        &self,
        index: usize,
        reg: Reg,
        written: &HashSet<Reg>,
        errors: &mut Vec<VerifyError>,
    ) {
        if reg >= self.watermark && !written.contains(&reg) {
            errors.push(VerifyError::ReadBeforeWrite { index, reg });
        }
    }
}

//! # accumc Compiler - Expressions to Accumulator Code
//!
//! This module compiles arithmetic expressions to straight-line code for the
//! accumulator machine in [`crate::machine`].
//!
//! ## Architecture
//!
//! ```text
//! Source → Scanner → Parser → Expr ─┐
//!                 VariableMap ───────┼→ validate → codegen → verify → CompileResult
//!                   watermark ───────┘
//! ```
//!
//! [`compile`] is the bare code generator and trusts its inputs. [`Compiler`]
//! is the checked entry point: it rejects incomplete maps and watermarks
//! that would let temporaries overwrite variables before generating code.
//!
//! ## Usage
//!
//! ```
//! use accumc::compiler::{CompileOptions, Compiler};
//!
//! # fn main() -> accumc::Result<()> {
//! let compiler = Compiler::new(CompileOptions::default());
//! let (map, result) = compiler.compile_source_resolved("(+ x (+ y 1))")?;
//! assert_eq!(map.len(), 2);
//! assert_eq!(result.instructions.len(), 7);
//! # Ok(())
//! # }
//! ```

pub mod codegen;
pub mod contract;
pub mod debug;
pub mod var_map;
pub mod verifier;

pub use codegen::compile;
pub use contract::{check_contract, ContractReport};
pub use debug::{dump_program, format_instr, trace_program};
pub use var_map::VariableMap;
pub use verifier::{ProgramStats, VerifyError, VerifyResult, Verifier};

use crate::machine::{Instruction, Reg};
use crate::parser::{parse_source, Expr, MAX_NESTING_DEPTH};
use crate::{Error, Result};
use serde::Serialize;

/// Compilation options
#[derive(Debug, Clone)]
pub struct CompileOptions {
    /// Watermark to allocate temporaries from; `None` derives it from the map
    pub watermark: Option<Reg>,
    /// Run the static verifier on the emitted code
    pub verify: bool,
    /// Reject expressions whose identifiers share a register
    pub reject_aliasing: bool,
    /// Deepest `Sum` nesting accepted before code generation
    pub max_depth: usize,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            watermark: None,
            verify: true,
            reject_aliasing: false,
            max_depth: MAX_NESTING_DEPTH,
        }
    }
}

impl CompileOptions {
    /// Options with an explicit watermark
    pub fn with_watermark(watermark: Reg) -> Self {
        Self {
            watermark: Some(watermark),
            ..Self::default()
        }
    }
}

/// Compilation result with metadata
#[derive(Debug, Clone, Serialize)]
pub struct CompileResult {
    /// Emitted program
    pub instructions: Vec<Instruction>,
    /// Watermark the program was compiled at
    pub watermark: Reg,
    /// Number of temporary registers the program occupies
    pub temporaries: usize,
    /// Warnings generated during compilation
    pub warnings: Vec<String>,
    /// Verifier statistics (when verification ran)
    #[serde(skip)]
    pub verification: Option<VerifyResult>,
}

impl CompileResult {
    /// Serialize the program and its metadata as JSON
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| Error::compiler(format!("Failed to serialize result: {}", e)))
    }

    /// Numbered listing of the program
    pub fn listing(&self) -> String {
        dump_program(&self.instructions)
    }
}

/// Expression to accumulator-code compiler
#[derive(Debug, Clone, Default)]
pub struct Compiler {
    options: CompileOptions,
}

impl Compiler {
    /// Create a new compiler with options
    pub fn new(options: CompileOptions) -> Self {
        Self { options }
    }

    /// Options this compiler was built with
    pub fn options(&self) -> &CompileOptions {
        &self.options
    }

    /// Compile source text against an existing variable map
    pub fn compile_source(&self, map: &VariableMap, source: &str) -> Result<CompileResult> {
        let expr = parse_source(source)?;
        self.compile_expr(map, &expr)
    }

    /// Compile source text, assigning registers to its identifiers first
    pub fn compile_source_resolved(&self, source: &str) -> Result<(VariableMap, CompileResult)> {
        let expr = parse_source(source)?;
        let map = VariableMap::resolve(&expr);
        let result = self.compile_expr(&map, &expr)?;
        Ok((map, result))
    }

    /// Compile an already-built expression
    pub fn compile_expr(&self, map: &VariableMap, expr: &Expr) -> Result<CompileResult> {
        // Phase 0: bound the recursion of every later pass
        let depth = expr.depth();
        if depth > self.options.max_depth {
            return Err(Error::NestingTooDeep {
                depth,
                limit: self.options.max_depth,
            });
        }

        // Phase 1: the map must be total over the expression
        map.validate_for(expr)?;

        // Phase 2: resolve and check the watermark, then make sure every
        // temporary above it is addressable
        let watermark = self.resolve_watermark(map, expr)?;
        map.check_watermark(expr, watermark)?;
        let temporaries = expr.temporaries();
        if watermark.checked_offset(temporaries).is_none() {
            return Err(Error::RegisterOverflow {
                base: watermark,
                offset: temporaries,
            });
        }

        // Phase 3: injectivity
        let mut warnings = Vec::new();
        for (reg, names) in map.aliases_in(expr) {
            if self.options.reject_aliasing {
                return Err(Error::RegisterAliasing { reg, names });
            }
            tracing::warn!(%reg, ?names, "variables share a register");
            warnings.push(format!(
                "Register {} is shared by variables {}",
                reg,
                names.join(", ")
            ));
        }

        // Phase 4: generate code
        let instructions = compile(map, expr, watermark);

        // Phase 5: verify
        let verification = if self.options.verify {
            let result = Verifier::new(watermark).verify(&instructions);
            if !result.valid {
                let error_msgs: Vec<String> =
                    result.errors.iter().map(|e| e.to_string()).collect();
                return Err(Error::compiler(format!(
                    "Verification failed: {}",
                    error_msgs.join("; ")
                )));
            }
            warnings.extend(result.warnings.iter().cloned());
            Some(result)
        } else {
            None
        };

        tracing::debug!(
            %expr,
            %watermark,
            instructions = instructions.len(),
            "compiled expression"
        );

        Ok(CompileResult {
            temporaries,
            instructions,
            watermark,
            warnings,
            verification,
        })
    }

    fn resolve_watermark(&self, map: &VariableMap, expr: &Expr) -> Result<Reg> {
        if let Some(watermark) = self.options.watermark {
            return Ok(watermark);
        }
        match map.max_register_for(expr) {
            Some(top) => top
                .checked_next()
                .ok_or(Error::RegisterOverflow { base: top, offset: 1 }),
            None => Ok(Reg(0)),
        }
    }
}

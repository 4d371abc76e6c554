//! # accumc - Expressions to Accumulator Code
//!
//! A small compiler from arithmetic expressions (constants, variables, sums)
//! to a sequential accumulator-register machine, together with the register
//! discipline that makes the emitted code compute the source value without
//! disturbing variable storage.
//!
//! ## Quick Start
//!
//! ```rust
//! use accumc::{compile, evaluate, run, Environment, Expr, MachineState, Reg, VariableMap};
//!
//! # fn main() -> accumc::Result<()> {
//! // (+ (+ x 3) (+ x (+ y 2)))
//! let expr = Expr::sum(
//!     Expr::sum(Expr::var("x"), Expr::constant(3)),
//!     Expr::sum(Expr::var("x"), Expr::sum(Expr::var("y"), Expr::constant(2))),
//! );
//!
//! // x lives in r2, y in r5; temporaries start at r10
//! let map: VariableMap = [("x", Reg(2)), ("y", Reg(5))].into_iter().collect();
//! let program = compile(&map, &expr, Reg(10));
//!
//! let env: Environment = [("x", 4), ("y", 5)].into_iter().collect();
//! let initial = MachineState::with_registers([(Reg(2), 4), (Reg(5), 5)]);
//! let last = run(&program, initial);
//!
//! assert_eq!(last.accumulator, evaluate(&expr, &env)?);
//! assert_eq!(last.accumulator, 18);
//! assert_eq!(last.register(Reg(2)), 4);
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! Source → Scanner → Parser → Expr → Compiler → [Instruction] → Machine → MachineState
//! ```
//!
//! ### Main Components
//!
//! - [`Scanner`] / [`Parser`] - S-expression front-end (`(+ x (+ y 1))`)
//! - [`Expr`] and [`evaluate`] - source language and its reference semantics
//! - [`VariableMap`] - identifier → register assignment, validated per expression
//! - [`compile`] - the code generator; [`Compiler`] wraps it with validation
//! - [`step`] / [`run`] - target machine semantics
//! - [`compiler::contract`] - the correctness contract as checkable predicates
//!
//! ## The Contract
//!
//! If every variable of `e` sits in a register below the watermark `t` and
//! the initial state holds each variable's value, then running
//! `compile(map, e, t)` leaves `evaluate(e, env)` in the accumulator and
//! every register below `t` untouched. Registers from `t` upward are scratch.
//!
//! ## Error Handling
//!
//! The code generator, the evaluator on a complete environment and the
//! machine are total. Everything that can go wrong is caught before code
//! generation:
//!
//! ```rust
//! use accumc::{CompileOptions, Compiler, Error, Reg, VariableMap};
//!
//! let map: VariableMap = [("x", Reg(0)), ("y", Reg(1))].into_iter().collect();
//! let compiler = Compiler::new(CompileOptions::with_watermark(Reg(1)));
//!
//! match compiler.compile_source(&map, "(+ x y)") {
//!     Ok(_) => panic!("Should have failed"),
//!     Err(e) => assert!(matches!(e, Error::PreconditionViolation { .. })),
//! }
//! ```
//!
//! ## License
//!
//! Licensed under the [MIT License](https://opensource.org/licenses/MIT).

/// Version of the accumc compiler
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod compiler;
pub mod error;
pub mod lexer;
pub mod machine;
pub mod parallel;
pub mod parser;
pub mod runtime;

// Re-export main types
pub use compiler::{compile, CompileOptions, CompileResult, Compiler, VariableMap};
pub use error::{Error, ErrorSeverity, Result};
pub use lexer::{SExprScanner, Token, TokenKind};
pub use machine::{run, step, Instruction, MachineState, Reg, RegisterFile, Word};
pub use parser::{parse_source, Expr, SExprParser, MAX_NESTING_DEPTH};
pub use runtime::{evaluate, Environment};

/// Type alias for the S-expression scanner (lexer).
/// Converts raw source text into tokens for the parser.
pub type Scanner = SExprScanner;

/// Type alias for the S-expression parser.
/// Converts tokens into an expression tree.
pub type Parser = SExprParser;

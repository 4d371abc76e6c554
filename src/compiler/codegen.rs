//! # Code Generator
//!
//! Structural recursion from [`Expr`] to accumulator-machine code with bump
//! allocation of temporaries:
//!
//! ```text
//! Const(v)      → ldi v
//! Var(x)        → ld  map[x]
//! Sum(s1, s2)   → code(s1, t) ; st t ; code(s2, t+1) ; add t
//! ```
//!
//! The left operand's value is spilled to the watermark register `t` so that
//! the right operand, which starts allocating at `t + 1`, cannot clobber it.
//! Nothing below `t` is ever written. Siblings overwrite each other's
//! temporaries, so register demand follows nesting, not size.

use super::var_map::VariableMap;
use crate::machine::{Instruction, Reg};
use crate::parser::Expr;

/// Compile `expr` with temporaries allocated from `watermark` upward
///
/// No validation happens here: `map` must assign every identifier of
/// `expr`, and the compiled code only preserves variables whose registers
/// lie below `watermark`. Use [`super::Compiler`] for the checked path.
///
/// Recursion depth follows [`Expr::depth`]; untrusted trees should go
/// through the driver, which rejects anything nested past
/// [`CompileOptions::max_depth`](super::CompileOptions::max_depth).
///
/// # Panics
///
/// Panics if `map` has no register for an identifier of `expr`, or if
/// `watermark + expr.temporaries()` does not fit in `usize`.
pub fn compile(map: &VariableMap, expr: &Expr, watermark: Reg) -> Vec<Instruction> {
    let mut out = Vec::with_capacity(expr.size() * 2);
    emit(map, expr, watermark, &mut out);
    tracing::trace!(
        %expr,
        %watermark,
        instructions = out.len(),
        "generated code"
    );
    out
}

fn emit(map: &VariableMap, expr: &Expr, t: Reg, out: &mut Vec<Instruction>) {
    match expr {
        Expr::Const(value) => out.push(Instruction::LoadImmediate(*value)),
        Expr::Var(name) => out.push(Instruction::Load(map[name.as_str()])),
        Expr::Sum(lhs, rhs) => {
            emit(map, lhs, t, out);
            out.push(Instruction::Store(t));
            emit(map, rhs, t.next(), out);
            out.push(Instruction::Add(t));
        }
    }
}

//! Reference semantics for source expressions

use super::environment::Environment;
use crate::error::Result;
use crate::machine::Word;
use crate::parser::Expr;

/// Evaluate `expr` under `env`
///
/// Sums wrap at the word width, matching the machine's `Add`. The only
/// failure is an identifier missing from `env`.
pub fn evaluate(expr: &Expr, env: &Environment) -> Result<Word> {
    match expr {
        Expr::Const(value) => Ok(*value),
        Expr::Var(name) => env.get(name),
        Expr::Sum(lhs, rhs) => {
            let lhs = evaluate(lhs, env)?;
            let rhs = evaluate(rhs, env)?;
            Ok(lhs.wrapping_add(rhs))
        }
    }
}

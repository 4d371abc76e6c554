use crate::machine::Word;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Source expression tree
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Expr {
    /// Constant word
    Const(Word),
    /// Variable reference
    Var(String),
    /// Sum of two subexpressions
    Sum(Box<Expr>, Box<Expr>),
}

impl Expr {
    /// Constant expression
    pub fn constant(value: Word) -> Self {
        Expr::Const(value)
    }

    /// Variable expression
    pub fn var(name: impl Into<String>) -> Self {
        Expr::Var(name.into())
    }

    /// Sum of `lhs` and `rhs`
    pub fn sum(lhs: Expr, rhs: Expr) -> Self {
        Expr::Sum(Box::new(lhs), Box::new(rhs))
    }

    /// Identifiers occurring in this expression, in first-appearance order
    pub fn identifiers_in_order(&self) -> Vec<&str> {
        let mut seen = BTreeSet::new();
        let mut out = Vec::new();
        self.visit_vars(&mut |name| {
            if seen.insert(name) {
                out.push(name);
            }
        });
        out
    }

    /// Set of identifiers occurring in this expression
    pub fn identifiers(&self) -> BTreeSet<&str> {
        let mut out = BTreeSet::new();
        self.visit_vars(&mut |name| {
            out.insert(name);
        });
        out
    }

    /// Nesting depth of `Sum` nodes
    ///
    /// Walks the tree with an explicit stack, so it is safe to call on
    /// trees too deep for the recursive passes.
    pub fn depth(&self) -> usize {
        let mut deepest = 0;
        let mut stack = vec![(self, 0usize)];
        while let Some((node, level)) = stack.pop() {
            if let Expr::Sum(lhs, rhs) = node {
                deepest = deepest.max(level + 1);
                stack.push((lhs.as_ref(), level + 1));
                stack.push((rhs.as_ref(), level + 1));
            }
        }
        deepest
    }

    /// Number of temporary registers the compiled code occupies above the
    /// watermark. Never exceeds [`Expr::depth`]; a left operand reuses the
    /// register its parent spills into afterwards.
    pub fn temporaries(&self) -> usize {
        match self {
            Expr::Const(_) | Expr::Var(_) => 0,
            Expr::Sum(lhs, rhs) => lhs.temporaries().max(rhs.temporaries() + 1),
        }
    }

    /// Number of nodes in the tree
    pub fn size(&self) -> usize {
        match self {
            Expr::Const(_) | Expr::Var(_) => 1,
            Expr::Sum(lhs, rhs) => 1 + lhs.size() + rhs.size(),
        }
    }

    fn visit_vars<'a>(&'a self, f: &mut impl FnMut(&'a str)) {
        match self {
            Expr::Const(_) => {}
            Expr::Var(name) => f(name),
            Expr::Sum(lhs, rhs) => {
                lhs.visit_vars(f);
                rhs.visit_vars(f);
            }
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Const(value) => write!(f, "{}", value),
            Expr::Var(name) => write!(f, "{}", name),
            Expr::Sum(lhs, rhs) => write!(f, "(+ {} {})", lhs, rhs),
        }
    }
}

use std::collections::HashMap;

use crate::error::{Error, Result};
use crate::machine::Word;
use crate::parser::Expr;

/// Environment binding source identifiers to runtime values
///
/// Used to state what an expression means. It has no counterpart on the
/// target machine, where variables live in registers instead.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Environment {
    variables: HashMap<String, Word>,
}

impl Environment {
    /// Creates an empty environment
    pub fn new() -> Self {
        Environment {
            variables: HashMap::new(),
        }
    }

    /// Defines (or redefines) a variable
    pub fn define(&mut self, name: impl Into<String>, value: Word) {
        self.variables.insert(name.into(), value);
    }

    /// Gets the value of a variable by name
    pub fn get(&self, name: &str) -> Result<Word> {
        self.variables
            .get(name)
            .copied()
            .ok_or_else(|| Error::undefined(name))
    }

    /// Checks if a variable exists
    pub fn exists(&self, name: &str) -> bool {
        self.variables.contains_key(name)
    }

    /// Checks that every identifier of `expr` has a value
    pub fn validate_for(&self, expr: &Expr) -> Result<()> {
        for name in expr.identifiers_in_order() {
            if !self.exists(name) {
                return Err(Error::undefined(name));
            }
        }
        Ok(())
    }

    /// Number of bound variables
    pub fn len(&self) -> usize {
        self.variables.len()
    }

    /// True if nothing is bound
    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }

    /// Iterates over all bindings in arbitrary order
    pub fn iter(&self) -> impl Iterator<Item = (&str, Word)> + '_ {
        self.variables.iter().map(|(k, v)| (k.as_str(), *v))
    }
}

impl<S: Into<String>> FromIterator<(S, Word)> for Environment {
    fn from_iter<I: IntoIterator<Item = (S, Word)>>(iter: I) -> Self {
        let mut env = Environment::new();
        for (name, value) in iter {
            env.define(name, value);
        }
        env
    }
}

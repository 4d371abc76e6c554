//! # Variable Map
//!
//! Explicit, finite mapping from source identifiers to the registers that
//! hold them. The code generator treats the map as a total function, so
//! totality over an expression is checked here, before compilation, instead
//! of being assumed.
//!
//! Injectivity is reported but not enforced: two identifiers sharing a
//! register is legal input (see [`VariableMap::aliases_in`]).

use crate::error::{Error, Result};
use crate::machine::Reg;
use crate::parser::Expr;
use std::collections::BTreeMap;
use std::ops::Index;

/// Identifier → register assignment
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VariableMap {
    entries: BTreeMap<String, Reg>,
}

impl VariableMap {
    /// Creates an empty map
    pub fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    /// Symbol resolution: assigns `r0, r1, …` to the identifiers of `expr`
    /// in order of first appearance. The result is injective and its
    /// [`watermark`](Self::watermark) is the number of distinct identifiers.
    pub fn resolve(expr: &Expr) -> Self {
        expr.identifiers_in_order()
            .into_iter()
            .enumerate()
            .map(|(i, name)| (name, Reg(i)))
            .collect()
    }

    /// Assigns `reg` to `name`, returning the previous assignment
    pub fn insert(&mut self, name: impl Into<String>, reg: Reg) -> Option<Reg> {
        self.entries.insert(name.into(), reg)
    }

    /// Register assigned to `name`
    pub fn get(&self, name: &str) -> Option<Reg> {
        self.entries.get(name).copied()
    }

    /// Number of assigned identifiers
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if no identifier is assigned
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over assignments in identifier order
    pub fn iter(&self) -> impl Iterator<Item = (&str, Reg)> + '_ {
        self.entries.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// One past the highest register in the map (`r0` for an empty map)
    ///
    /// Fails with [`Error::RegisterOverflow`] when the map uses the last
    /// addressable register.
    pub fn watermark(&self) -> Result<Reg> {
        match self.entries.values().max() {
            Some(&top) => top
                .checked_next()
                .ok_or(Error::RegisterOverflow { base: top, offset: 1 }),
            None => Ok(Reg(0)),
        }
    }

    /// Checks that every identifier of `expr` is assigned a register
    pub fn validate_for(&self, expr: &Expr) -> Result<()> {
        match expr
            .identifiers_in_order()
            .into_iter()
            .find(|name| !self.entries.contains_key(*name))
        {
            Some(missing) => Err(Error::undefined(missing)),
            None => Ok(()),
        }
    }

    /// Checks that every register used by `expr` lies strictly below `watermark`
    ///
    /// Assumes [`validate_for`](Self::validate_for) already passed; unassigned
    /// identifiers are skipped.
    pub fn check_watermark(&self, expr: &Expr, watermark: Reg) -> Result<()> {
        for name in expr.identifiers_in_order() {
            if let Some(reg) = self.get(name) {
                if reg >= watermark {
                    return Err(Error::PreconditionViolation {
                        name: name.to_string(),
                        reg,
                        watermark,
                    });
                }
            }
        }
        Ok(())
    }

    /// Highest register assigned to an identifier of `expr`
    pub fn max_register_for(&self, expr: &Expr) -> Option<Reg> {
        expr.identifiers()
            .into_iter()
            .filter_map(|name| self.get(name))
            .max()
    }

    /// Registers shared by two or more identifiers of `expr`
    pub fn aliases_in(&self, expr: &Expr) -> Vec<(Reg, Vec<String>)> {
        let mut by_reg: BTreeMap<Reg, Vec<String>> = BTreeMap::new();
        for name in expr.identifiers() {
            if let Some(reg) = self.get(name) {
                by_reg.entry(reg).or_default().push(name.to_string());
            }
        }
        by_reg
            .into_iter()
            .filter(|(_, names)| names.len() > 1)
            .collect()
    }
}

/// Total-function view used by the code generator.
///
/// # Panics
///
/// Panics if `name` is unassigned; run [`VariableMap::validate_for`] first.
impl Index<&str> for VariableMap {
    type Output = Reg;

    fn index(&self, name: &str) -> &Reg {
        match self.entries.get(name) {
            Some(reg) => reg,
            None => panic!("identifier `{}` has no register assigned", name),
        }
    }
}

impl<S: Into<String>> FromIterator<(S, Reg)> for VariableMap {
    fn from_iter<I: IntoIterator<Item = (S, Reg)>>(iter: I) -> Self {
        let mut map = VariableMap::new();
        for (name, reg) in iter {
            map.insert(name, reg);
        }
        map
    }
}

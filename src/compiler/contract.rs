//! # Correctness Contract
//!
//! For a map `M`, expression `e`, environment `ξ`, initial state `η` and
//! watermark `t` such that
//!
//! - (a) `η[M(x)] == ξ(x)` for every identifier `x` of `e`, and
//! - (b) `M(x) < t` for every such `x`,
//!
//! running `compile(M, e, t)` from `η` ends in a state `η'` with
//! `η'.acc == evaluate(e, ξ)` and `η'[r] == η[r]` for every `r < t`.
//! Registers at or above `t` are scratch and their final contents are
//! unspecified.
//!
//! The partial state equivalences used to phrase the contract live here as
//! plain predicates; [`check_contract`] runs one instance end to end and
//! reports instead of panicking.

use super::codegen::compile;
use super::var_map::VariableMap;
use crate::error::{Error, Result};
use crate::machine::{run, Instruction, MachineState, Reg, Word};
use crate::parser::{Expr, MAX_NESTING_DEPTH};
use crate::runtime::{evaluate, Environment};

/// States agree on every register below `watermark`
pub fn agree_below(a: &MachineState, b: &MachineState, watermark: Reg) -> bool {
    first_disagreement_below(a, b, watermark).is_none()
}

/// States agree on the accumulator
pub fn agree_accumulator(a: &MachineState, b: &MachineState) -> bool {
    a.accumulator == b.accumulator
}

/// Lowest register below `watermark` on which the states differ
pub fn first_disagreement_below(
    a: &MachineState,
    b: &MachineState,
    watermark: Reg,
) -> Option<Reg> {
    // Past both extents every register reads zero on both sides
    let limit = watermark
        .index()
        .min(a.registers.extent().max(b.registers.extent()));
    (0..limit)
        .map(Reg)
        .find(|&r| a.register(r) != b.register(r))
}

/// Initial state satisfying precondition (a): each identifier of `expr`
/// preloaded with its value from `env`
pub fn consistent_state(map: &VariableMap, env: &Environment, expr: &Expr) -> Result<MachineState> {
    map.validate_for(expr)?;
    env.validate_for(expr)?;
    // Room for the variables and the temporaries compiled above them
    let capacity = map
        .max_register_for(expr)
        .map_or(0, |top| top.index().saturating_add(1))
        .saturating_add(expr.temporaries());
    let mut state = MachineState::with_capacity(capacity);
    for name in expr.identifiers_in_order() {
        state = state.with_register(map[name], env.get(name)?);
    }
    Ok(state)
}

/// Checks precondition (a) against a given initial state
pub fn check_consistent(
    map: &VariableMap,
    env: &Environment,
    expr: &Expr,
    initial: &MachineState,
) -> Result<()> {
    for name in expr.identifiers_in_order() {
        let reg = map.get(name).ok_or_else(|| Error::undefined(name))?;
        let expected = env.get(name)?;
        let found = initial.register(reg);
        if found != expected {
            return Err(Error::InconsistentState {
                name: name.to_string(),
                reg,
                expected,
                found,
            });
        }
    }
    Ok(())
}

/// Outcome of running one contract instance
#[derive(Debug, Clone)]
pub struct ContractReport {
    /// Watermark the code was compiled at
    pub watermark: Reg,
    /// Compiled program
    pub program: Vec<Instruction>,
    /// `evaluate(e, ξ)`
    pub expected: Word,
    /// Final accumulator
    pub actual: Word,
    /// First register below the watermark that changed, if any
    pub disturbed: Option<Reg>,
    /// State after running the program
    pub final_state: MachineState,
}

impl ContractReport {
    /// Both halves of the postcondition hold
    pub fn holds(&self) -> bool {
        self.expected == self.actual && self.disturbed.is_none()
    }
}

/// Check the contract for one `(map, expr, env, initial, watermark)` instance
///
/// Precondition failures are returned as errors; a postcondition failure
/// is a report whose [`holds`](ContractReport::holds) is false.
pub fn check_contract(
    map: &VariableMap,
    expr: &Expr,
    env: &Environment,
    initial: &MachineState,
    watermark: Reg,
) -> Result<ContractReport> {
    let depth = expr.depth();
    if depth > MAX_NESTING_DEPTH {
        return Err(Error::NestingTooDeep {
            depth,
            limit: MAX_NESTING_DEPTH,
        });
    }
    map.validate_for(expr)?;
    env.validate_for(expr)?;
    map.check_watermark(expr, watermark)?;
    if watermark.checked_offset(expr.temporaries()).is_none() {
        return Err(Error::RegisterOverflow {
            base: watermark,
            offset: expr.temporaries(),
        });
    }
    check_consistent(map, env, expr, initial)?;

    let program = compile(map, expr, watermark);
    let expected = evaluate(expr, env)?;
    let final_state = run(&program, initial.clone());
    let disturbed = first_disagreement_below(initial, &final_state, watermark);

    let report = ContractReport {
        watermark,
        actual: final_state.accumulator,
        expected,
        disturbed,
        program,
        final_state,
    };
    if !report.holds() {
        tracing::warn!(
            %expr,
            expected = report.expected,
            actual = report.actual,
            disturbed = ?report.disturbed,
            "contract violated"
        );
    }
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture() -> Expr {
        Expr::sum(
            Expr::sum(Expr::var("x"), Expr::constant(3)),
            Expr::sum(Expr::var("x"), Expr::sum(Expr::var("y"), Expr::constant(2))),
        )
    }

    fn fixture_map() -> VariableMap {
        [("x", Reg(2)), ("y", Reg(5))].into_iter().collect()
    }

    fn fixture_env() -> Environment {
        [("x", 4), ("y", 5)].into_iter().collect()
    }

    #[test]
    fn test_agree_below() {
        let a = MachineState::with_registers([(Reg(1), 1), (Reg(8), 8)]);
        let b = MachineState::with_registers([(Reg(1), 1), (Reg(8), 9)]);
        assert!(agree_below(&a, &b, Reg(8)));
        assert!(!agree_below(&a, &b, Reg(9)));
        assert_eq!(first_disagreement_below(&a, &b, Reg(100)), Some(Reg(8)));
    }

    #[test]
    fn test_agree_accumulator() {
        let a = MachineState::new().with_accumulator(3);
        let b = MachineState::with_registers([(Reg(0), 1)]).with_accumulator(3);
        assert!(agree_accumulator(&a, &b));
        assert!(!agree_below(&a, &b, Reg(1)));
    }

    #[test]
    fn test_consistent_state() {
        let state = consistent_state(&fixture_map(), &fixture_env(), &fixture()).unwrap();
        assert_eq!(state.register(Reg(2)), 4);
        assert_eq!(state.register(Reg(5)), 5);
        assert_eq!(state.accumulator, 0);
    }

    #[test]
    fn test_worked_example_holds() {
        let initial = consistent_state(&fixture_map(), &fixture_env(), &fixture()).unwrap();
        let report =
            check_contract(&fixture_map(), &fixture(), &fixture_env(), &initial, Reg(10)).unwrap();
        assert!(report.holds());
        assert_eq!(report.actual, 18);
        assert_eq!(report.program.len(), 13);
    }

    #[test]
    fn test_inconsistent_state_rejected() {
        let initial = MachineState::with_registers([(Reg(2), 4), (Reg(5), 6)]);
        let err = check_contract(&fixture_map(), &fixture(), &fixture_env(), &initial, Reg(10))
            .unwrap_err();
        assert_eq!(
            err,
            Error::InconsistentState {
                name: "y".to_string(),
                reg: Reg(5),
                expected: 5,
                found: 6,
            }
        );
    }

    #[test]
    fn test_low_watermark_rejected() {
        let initial = consistent_state(&fixture_map(), &fixture_env(), &fixture()).unwrap();
        let err = check_contract(&fixture_map(), &fixture(), &fixture_env(), &initial, Reg(3))
            .unwrap_err();
        assert!(matches!(err, Error::PreconditionViolation { reg: Reg(5), .. }));
    }

    #[test]
    fn test_consistent_state_sized_for_temporaries() {
        let state = consistent_state(&fixture_map(), &fixture_env(), &fixture()).unwrap();
        // r0..=r5 for variables, three temporaries above
        assert!(state.registers.capacity() >= 9);
        assert_eq!(state.registers.extent(), 6);
    }

    #[test]
    fn test_overflowing_watermark_rejected() {
        let env = Environment::new();
        let expr = Expr::sum(Expr::constant(1), Expr::constant(2));
        let err = check_contract(
            &VariableMap::new(),
            &expr,
            &env,
            &MachineState::new(),
            Reg(usize::MAX),
        )
        .unwrap_err();
        assert_eq!(
            err,
            Error::RegisterOverflow {
                base: Reg(usize::MAX),
                offset: 1,
            }
        );
    }

    #[test]
    fn test_missing_binding_rejected() {
        let env: Environment = [("x", 4)].into_iter().collect();
        let err = check_contract(
            &fixture_map(),
            &fixture(),
            &env,
            &MachineState::new(),
            Reg(10),
        )
        .unwrap_err();
        assert_eq!(err, Error::undefined("y"));
    }
}
